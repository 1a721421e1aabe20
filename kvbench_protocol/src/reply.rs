use std::io::{Read, Write};

use super::message::{check_bulk_len, check_multi_bulk_len, parse_integer, trim_line};
use super::{ProtocolError, ReadBuffer, Result, Slice, WriteBuffer};

#[derive(Clone, Debug, PartialEq)]
pub enum Reply {
    StatusReply(String),
    ErrorReply(String),
    IntegerReply(i64),
    /// `None` is the nil bulk string (`$-1`).
    BulkReply(Option<Slice>),
    /// `None` is the nil array (`*-1`).
    MultiBulkReply(Option<Vec<Reply>>),
}

impl Reply {
    pub fn ok() -> Reply {
        Reply::StatusReply(String::from("OK"))
    }

    pub fn error<S: Into<String>>(message: S) -> Reply {
        Reply::ErrorReply(message.into())
    }

    pub fn is_error(&self) -> bool {
        match self {
            Reply::ErrorReply(_) => true,
            _ => false,
        }
    }

    fn write_into(self, reply: &mut Vec<u8>) {
        match self {
            Reply::StatusReply(status) => {
                reply.extend_from_slice(format!("+{}\r\n", status).as_bytes());
            }
            Reply::ErrorReply(err) => {
                reply.extend_from_slice(format!("-{}\r\n", err).as_bytes());
            }
            Reply::IntegerReply(n) => {
                reply.extend_from_slice(format!(":{}\r\n", n).as_bytes());
            }
            Reply::BulkReply(None) => reply.extend_from_slice(b"$-1\r\n"),
            Reply::BulkReply(Some(slice)) => {
                reply.extend_from_slice(format!("${}\r\n", slice.len()).as_bytes());
                reply.extend_from_slice(slice.as_bytes());
                reply.extend_from_slice(b"\r\n");
            }
            Reply::MultiBulkReply(None) => reply.extend_from_slice(b"*-1\r\n"),
            Reply::MultiBulkReply(Some(replies)) => {
                reply.extend_from_slice(format!("*{}\r\n", replies.len()).as_bytes());
                for item in replies {
                    item.write_into(reply);
                }
            }
        }
    }
}

impl From<Reply> for Vec<u8> {
    fn from(reply: Reply) -> Vec<u8> {
        let mut bytes = Vec::new();
        reply.write_into(&mut bytes);
        bytes
    }
}

impl From<Vec<Slice>> for Reply {
    fn from(slices: Vec<Slice>) -> Self {
        Reply::MultiBulkReply(Some(
            slices.into_iter().map(|s| Reply::BulkReply(Some(s))).collect(),
        ))
    }
}

fn line_text(line: &[u8]) -> Result<String> {
    Ok(std::str::from_utf8(&trim_line(line)[1..])?.to_string())
}

/// Deepest array nesting accepted in a reply.
pub const MAX_REPLY_DEPTH: usize = 128;

/// Reads one complete reply, descending into nested arrays.
pub fn read_reply<T: Read>(buf: &mut ReadBuffer<T>) -> Result<Reply> {
    read_reply_at(buf, 0)
}

fn read_reply_at<T: Read>(buf: &mut ReadBuffer<T>, depth: usize) -> Result<Reply> {
    if depth > MAX_REPLY_DEPTH {
        return Err(ProtocolError::GrammarCheckFailed("reply nested too deeply"));
    }
    let line = buf.read_line()?;

    match line.first() {
        Some(b'+') => Ok(Reply::StatusReply(line_text(&line)?)),
        Some(b'-') => Ok(Reply::ErrorReply(line_text(&line)?)),
        Some(b':') => Ok(Reply::IntegerReply(parse_integer(&line)?)),
        Some(b'$') => {
            let size = check_bulk_len(parse_integer(&line)?)?;
            if size < 0 {
                return Ok(Reply::BulkReply(None));
            }
            let size = size as usize;
            let mut content = buf.read_exact(size + 2)?; // 2 for \r\n
            if !content.ends_with(b"\r\n") {
                return Err(ProtocolError::GrammarCheckFailed(
                    "bulk reply should end with \\r\\n",
                ));
            }
            content.truncate(size);
            Ok(Reply::BulkReply(Some(Slice(content))))
        }
        Some(b'*') => {
            let count = check_multi_bulk_len(parse_integer(&line)?)?;
            if count < 0 {
                return Ok(Reply::MultiBulkReply(None));
            }
            let mut replies = Vec::with_capacity(std::cmp::min(count as usize, 64));
            for _ in 0..count {
                replies.push(read_reply_at(buf, depth + 1)?);
            }
            Ok(Reply::MultiBulkReply(Some(replies)))
        }
        _ => {
            log::debug!("unexpected reply line {:?}", String::from_utf8_lossy(&line));
            Err(ProtocolError::GrammarCheckFailed(
                "reply should start with one of + - : $ *",
            ))
        }
    }
}

pub fn send_reply<T: Write>(stream: &mut WriteBuffer<T>, reply: Reply) -> Result<()> {
    let reply: Vec<u8> = reply.into();
    stream.write_all(&reply)?;
    Ok(())
}
