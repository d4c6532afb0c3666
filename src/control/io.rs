//! `Content-Length` message framing.

use serde::Serialize;
use std::io::{self, BufRead, BufReader, Read, Write};
use std::net::TcpStream;

#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    #[error("missing Content-Length header")]
    MissingLength,
    #[error("invalid Content-Length `{0}`")]
    InvalidLength(String),
    #[error("connection closed in the middle of a message")]
    Truncated,
    #[error(transparent)]
    IO(#[from] io::Error),
}

impl FrameError {
    /// Stream is still usable after this error.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, FrameError::MissingLength | FrameError::InvalidLength(_))
    }
}

pub struct FrameReader<R> {
    reader: BufReader<R>,
}

impl<R: Read> FrameReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            reader: BufReader::new(inner),
        }
    }

    /// Read a message body. Return `None` if connection closed between messages.
    pub fn read_frame(&mut self) -> Result<Option<Vec<u8>>, FrameError> {
        let mut content_length: Option<Result<usize, FrameError>> = None;
        let mut header_seen = false;
        loop {
            let mut line = String::new();
            let read_n = self.reader.read_line(&mut line)?;
            if read_n == 0 {
                return if header_seen {
                    Err(FrameError::Truncated)
                } else {
                    Ok(None)
                };
            }
            let line = line.trim_end_matches(['\r', '\n']);
            if line.is_empty() {
                if header_seen {
                    break;
                }
                // skip blank lines between messages
                continue;
            }
            header_seen = true;
            if let Some(v) = line.strip_prefix("Content-Length:") {
                let v = v.trim();
                content_length = Some(
                    v.parse()
                        .map_err(|_| FrameError::InvalidLength(v.to_string())),
                );
            }
        }

        let len = content_length.ok_or(FrameError::MissingLength)??;
        let mut buf = vec![0u8; len];
        self.reader.read_exact(&mut buf).map_err(|e| {
            if e.kind() == io::ErrorKind::UnexpectedEof {
                FrameError::Truncated
            } else {
                FrameError::IO(e)
            }
        })?;
        Ok(Some(buf))
    }
}

pub struct FrameWriter<W> {
    writer: W,
}

impl<W: Write> FrameWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn write_message<T: Serialize>(&mut self, v: &T) -> anyhow::Result<()> {
        let payload = serde_json::to_vec(v)?;
        write!(self.writer, "Content-Length: {}\r\n\r\n", payload.len())?;
        self.writer.write_all(&payload)?;
        self.writer.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

/// Split a connection into framed reader and writer halves.
pub fn split(
    stream: TcpStream,
) -> anyhow::Result<(FrameReader<TcpStream>, FrameWriter<TcpStream>)> {
    stream.set_nodelay(true)?;
    let reader = FrameReader::new(stream.try_clone()?);
    Ok((reader, FrameWriter::new(stream)))
}
