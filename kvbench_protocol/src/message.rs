use super::{ProtocolError, Result};

/// Largest bulk string accepted, the same 512 MiB cap redis applies.
pub const MAX_BULK_LEN: i64 = 512 * 1024 * 1024;
/// Largest array accepted in a request or reply.
pub const MAX_MULTI_BULK_LEN: i64 = 1024 * 1024;

/// Strips the trailing `\r\n` (if any) from a line returned by `read_line`.
pub fn trim_line(line: &[u8]) -> &[u8] {
    if line.ends_with(b"\r\n") {
        &line[..line.len() - 2]
    } else {
        line
    }
}

/// Validates a `$` length header; `-1` (nil) is the only negative allowed.
pub fn check_bulk_len(len: i64) -> Result<i64> {
    if len < -1 || len > MAX_BULK_LEN {
        Err(ProtocolError::GrammarCheckFailed("invalid bulk length"))
    } else {
        Ok(len)
    }
}

/// Validates a `*` count header; `-1` (nil) is the only negative allowed.
pub fn check_multi_bulk_len(len: i64) -> Result<i64> {
    if len < -1 || len > MAX_MULTI_BULK_LEN {
        Err(ProtocolError::GrammarCheckFailed("invalid multibulk length"))
    } else {
        Ok(len)
    }
}

/// Parses the integer that follows the type byte of a header line, e.g. `$-1\r\n`.
pub fn parse_integer(line: &[u8]) -> Result<i64> {
    let line = trim_line(line);
    if line.len() < 2 {
        return Err(ProtocolError::GrammarCheckFailed(
            "header line should carry an integer",
        ));
    }
    Ok(std::str::from_utf8(&line[1..])?.parse()?)
}

pub struct MessageHead {
    pub count: usize,
}

impl MessageHead {
    pub fn from_buf(buf: &[u8]) -> Result<MessageHead> {
        if buf.first() == Some(&b'*') {
            let count = check_multi_bulk_len(parse_integer(buf)?)?;
            if count < 0 {
                return Err(ProtocolError::GrammarCheckFailed(
                    "request message should not be a null array",
                ));
            }
            Ok(MessageHead {
                count: count as usize,
            })
        } else {
            log::debug!("unexpected message head {:?}", String::from_utf8_lossy(buf));
            Err(ProtocolError::GrammarCheckFailed(
                "* should be the first character of a message",
            ))
        }
    }

    pub fn into_bytes(self) -> Vec<u8> {
        format!("*{}\r\n", self.count).into_bytes()
    }
}

pub struct PartHead {
    pub size: usize,
}

impl PartHead {
    pub fn from_buf(buf: &[u8]) -> Result<PartHead> {
        if buf.first() == Some(&b'$') {
            let size = check_bulk_len(parse_integer(buf)?)?;
            if size < 0 {
                return Err(ProtocolError::GrammarCheckFailed(
                    "request part should not be a null bulk string",
                ));
            }
            Ok(PartHead {
                size: size as usize,
            })
        } else {
            Err(ProtocolError::GrammarCheckFailed(
                "$ should be the first character of a message part",
            ))
        }
    }

    pub fn into_bytes(self) -> Vec<u8> {
        format!("${}\r\n", self.size).into_bytes()
    }
}
