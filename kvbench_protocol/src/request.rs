use std::io::Read;

use super::message::{MessageHead, PartHead};
use super::{ProtocolError, ReadBuffer, Result, Slice};

/// Reads one request: an array of bulk strings.
pub fn read_message<T: Read>(buf: &mut ReadBuffer<T>) -> Result<Vec<Vec<u8>>> {
    let line = buf.read_line()?;
    let head = MessageHead::from_buf(&line)?;

    let mut message = Vec::with_capacity(std::cmp::min(head.count, 16));
    for _ in 0..head.count {
        let part = buf.read_line()?;
        let head = PartHead::from_buf(&part)?;
        let mut content = buf.read_exact(head.size + 2)?; // 2 for \r\n
        if !content.ends_with(b"\r\n") {
            return Err(ProtocolError::GrammarCheckFailed(
                "message part should end with \\r\\n",
            ));
        }
        content.truncate(head.size);

        message.push(content);
    }

    Ok(message)
}

#[derive(Clone, Debug, PartialEq)]
pub struct GetCommand {
    pub key: Slice,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SetCommand {
    pub key: Slice,
    pub value: Slice,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RpushCommand {
    pub key: Slice,
    pub value: Slice,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LrangeCommand {
    pub key: Slice,
    pub start: i64,
    pub stop: i64,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    GET(GetCommand),
    SET(SetCommand),
    RPUSH(RpushCommand),
    LRANGE(LrangeCommand),
    FLUSHDB,
}

fn parse_index(part: &[u8]) -> Result<i64> {
    Ok(std::str::from_utf8(part)?.parse()?)
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::GET(_) => "GET",
            Command::SET(_) => "SET",
            Command::RPUSH(_) => "RPUSH",
            Command::LRANGE(_) => "LRANGE",
            Command::FLUSHDB => "FLUSHDB",
        }
    }

    pub fn from_message(mut message: Vec<Vec<u8>>) -> Result<Command> {
        if message.is_empty() {
            return Err(ProtocolError::GrammarCheckFailed("request should not be empty"));
        }

        let command = std::str::from_utf8(&message[0])?.to_uppercase();
        match command.as_ref() {
            "GET" => {
                if message.len() == 2 {
                    let key = Slice(message.remove(1));
                    Ok(Command::GET(GetCommand { key }))
                } else {
                    Err(ProtocolError::GrammarCheckFailed(
                        "GET should have one argument",
                    ))
                }
            }
            "SET" => {
                if message.len() == 3 {
                    let value = Slice(message.remove(2));
                    let key = Slice(message.remove(1));
                    Ok(Command::SET(SetCommand { key, value }))
                } else {
                    Err(ProtocolError::GrammarCheckFailed(
                        "SET should have two arguments",
                    ))
                }
            }
            "RPUSH" => {
                if message.len() == 3 {
                    let value = Slice(message.remove(2));
                    let key = Slice(message.remove(1));
                    Ok(Command::RPUSH(RpushCommand { key, value }))
                } else {
                    Err(ProtocolError::GrammarCheckFailed(
                        "RPUSH should have two arguments",
                    ))
                }
            }
            "LRANGE" => {
                if message.len() == 4 {
                    let stop = parse_index(&message[3])?;
                    let start = parse_index(&message[2])?;
                    let key = Slice(message.remove(1));
                    Ok(Command::LRANGE(LrangeCommand { key, start, stop }))
                } else {
                    Err(ProtocolError::GrammarCheckFailed(
                        "LRANGE should have three arguments",
                    ))
                }
            }
            "FLUSHDB" => {
                if message.len() == 1 {
                    Ok(Command::FLUSHDB)
                } else {
                    Err(ProtocolError::GrammarCheckFailed(
                        "FLUSHDB should have no argument",
                    ))
                }
            }
            _ => Err(ProtocolError::CommandNotSupport(command)),
        }
    }
}

pub fn read_command<T: Read>(buf: &mut ReadBuffer<T>) -> Result<Command> {
    let message = read_message(buf)?;

    Ok(Command::from_message(message)?)
}

trait AppendSlice {
    fn append_part(&mut self, slice: &[u8]);
}

impl AppendSlice for Vec<u8> {
    fn append_part(&mut self, slice: &[u8]) {
        self.extend_from_slice(PartHead { size: slice.len() }.into_bytes().as_slice());
        self.extend_from_slice(slice);
        self.extend_from_slice(b"\r\n");
    }
}

impl From<Command> for Vec<u8> {
    fn from(command: Command) -> Vec<u8> {
        let mut message = Vec::new();
        match command {
            Command::GET(command) => {
                message.extend_from_slice(MessageHead { count: 2 }.into_bytes().as_slice());

                message.append_part(b"GET");
                message.append_part(command.key.as_bytes());
            }
            Command::SET(command) => {
                message.extend_from_slice(MessageHead { count: 3 }.into_bytes().as_slice());

                message.append_part(b"SET");
                message.append_part(command.key.as_bytes());
                message.append_part(command.value.as_bytes());
            }
            Command::RPUSH(command) => {
                message.extend_from_slice(MessageHead { count: 3 }.into_bytes().as_slice());

                message.append_part(b"RPUSH");
                message.append_part(command.key.as_bytes());
                message.append_part(command.value.as_bytes());
            }
            Command::LRANGE(command) => {
                message.extend_from_slice(MessageHead { count: 4 }.into_bytes().as_slice());

                message.append_part(b"LRANGE");
                message.append_part(command.key.as_bytes());
                message.append_part(command.start.to_string().as_bytes());
                message.append_part(command.stop.to_string().as_bytes());
            }
            Command::FLUSHDB => {
                message.extend_from_slice(MessageHead { count: 1 }.into_bytes().as_slice());

                message.append_part(b"FLUSHDB");
            }
        }

        message
    }
}
