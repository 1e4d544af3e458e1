use anyhow::Result;
use jcsh_types::JcshError;
use nix::errno::Errno;
use nix::unistd::read;
use std::os::unix::io::RawFd;
use tracing::debug;

const READ_CHUNK: usize = 512;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadEvent {
    Line(String),
    /// A signal arrived before a full line did. Buffered input is kept.
    Interrupted,
    Eof,
}

/// Line reader over a raw descriptor.
///
/// Reads with `read(2)` directly so an interrupting signal surfaces as
/// [`ReadEvent::Interrupted`] instead of being retried underneath us.
#[derive(Debug)]
pub struct LineReader {
    fd: RawFd,
    buf: Vec<u8>,
}

impl LineReader {
    pub fn new(fd: RawFd) -> Self {
        LineReader {
            fd,
            buf: Vec::with_capacity(READ_CHUNK),
        }
    }

    pub fn read_line(&mut self) -> Result<ReadEvent> {
        loop {
            if let Some(line) = self.take_line() {
                return Ok(ReadEvent::Line(line));
            }

            let mut chunk = [0u8; READ_CHUNK];
            match read(self.fd, &mut chunk) {
                Ok(0) => {
                    if self.buf.is_empty() {
                        debug!("eof on fd {}", self.fd);
                        return Ok(ReadEvent::Eof);
                    }
                    // unterminated last line
                    let rest = std::mem::take(&mut self.buf);
                    return Ok(ReadEvent::Line(String::from_utf8_lossy(&rest).into_owned()));
                }
                Ok(n) => self.buf.extend_from_slice(&chunk[..n]),
                Err(Errno::EINTR) => return Ok(ReadEvent::Interrupted),
                Err(e) => return Err(JcshError::Io(std::io::Error::from(e)).into()),
            }
        }
    }

    fn take_line(&mut self) -> Option<String> {
        let end = self.buf.iter().position(|b| *b == b'\n')?;
        let rest = self.buf.split_off(end + 1);
        let mut line = std::mem::replace(&mut self.buf, rest);
        line.truncate(end);
        Some(String::from_utf8_lossy(&line).into_owned())
    }
}
