use super::{ProtocolError, Result};
use std::io::{Read, Write};

pub const DEFAULT_BUF_SIZE: usize = 8 * 1024;

pub struct ReadBuffer<T: Read> {
    stream: T,
    read_buffer: Vec<u8>,

    read_pos: usize,
    read_cap: usize,
}

impl<T: Read> ReadBuffer<T> {
    pub fn new(stream: T) -> ReadBuffer<T> {
        ReadBuffer {
            stream,
            read_buffer: vec![0; DEFAULT_BUF_SIZE],

            read_cap: 0,
            read_pos: 0,
        }
    }

    pub fn fill_buf(&mut self) -> Result<&[u8]> {
        if self.read_pos >= self.read_cap {
            debug_assert_eq!(self.read_pos, self.read_cap);
            self.read_cap = self.stream.read(&mut self.read_buffer)?;
            if self.read_cap == 0 {
                self.read_pos = 0;
                return Err(ProtocolError::ConnectionClosed);
            }
            self.read_pos = 0;
        }
        Ok(&self.read_buffer[self.read_pos..self.read_cap])
    }

    pub fn consume(&mut self, amt: usize) {
        self.read_pos = std::cmp::min(self.read_pos + amt, self.read_cap);
    }

    /// Reads up to and including the next `\r\n`. A bare `\n` is kept as content.
    pub fn read_line(&mut self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();

        loop {
            let (found, used) = {
                let available = self.fill_buf()?;

                match memchr::memchr(b'\n', available) {
                    Some(index) => {
                        buf.extend_from_slice(&available[..=index]);
                        (true, index + 1)
                    }
                    None => {
                        buf.extend_from_slice(available);
                        (false, available.len())
                    }
                }
            };
            self.consume(used);

            if found && buf.ends_with(b"\r\n") {
                return Ok(buf);
            }
        }
    }

    pub fn read_exact(&mut self, size: usize) -> Result<Vec<u8>> {
        let mut buf = Vec::with_capacity(std::cmp::min(size, DEFAULT_BUF_SIZE));
        let mut read = 0;
        while read < size {
            let used = {
                let available = self.fill_buf()?;

                if read + available.len() >= size {
                    buf.extend_from_slice(&available[..size - read]);
                    size - read
                } else {
                    buf.extend_from_slice(available);
                    available.len()
                }
            };
            self.consume(used);
            read += used;
        }
        Ok(buf)
    }
}

pub struct WriteBuffer<T: Write> {
    stream: T,
}

impl<T: Write> WriteBuffer<T> {
    pub fn new(stream: T) -> WriteBuffer<T> {
        WriteBuffer { stream }
    }

    pub fn get_ref(&self) -> &T {
        &self.stream
    }

    pub fn write_all(&mut self, data: &[u8]) -> Result<()> {
        self.stream.write_all(data)?;
        self.stream.flush()?;
        Ok(())
    }
}
