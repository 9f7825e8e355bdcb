use crate::constants::DEFAULT_MAX_LINE_LENGTH;
use crate::core_protocol::error::ProtocolError;
use crate::core_protocol::transfer::Transfer;
use log::debug;
use std::future::Future;
use std::io;
use std::time::Duration;
use tokio::io::{
    AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader,
};

/// Where the read cursor of a connection currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadMode {
    /// Bytes are `\n`-terminated UTF-8 lines.
    Line,
    /// The next `remaining` bytes belong to a raw segment of `declared` bytes.
    Raw { declared: u64, remaining: u64 },
}

/// A byte stream framed as protocol lines with embedded raw segments.
///
/// The caller decides when a raw segment starts (`begin_raw`); the cursor
/// falls back to line mode by itself once the segment is consumed.
///
/// Only one task ever reads from or writes to a given connection, so a line
/// is written with a single `write_all` + `flush` and no lock is taken.
pub struct Connection<S> {
    stream: BufReader<S>,
    mode: ReadMode,
    max_line_length: usize,
    timeout: Option<Duration>,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S) -> Self {
        Self {
            stream: BufReader::new(stream),
            mode: ReadMode::Line,
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
            timeout: None,
        }
    }

    pub fn with_max_line_length(mut self, max_line_length: usize) -> Self {
        self.max_line_length = max_line_length;
        self
    }

    /// Applies `timeout` to every individual read and write.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn mode(&self) -> ReadMode {
        self.mode
    }

    /// Reads one line without its `\n`. `Ok(None)` means the peer closed
    /// the stream cleanly between lines.
    pub async fn read_line(&mut self) -> Result<Option<String>, ProtocolError> {
        if let ReadMode::Raw { remaining, .. } = self.mode {
            return Err(ProtocolError::ModeViolation { remaining });
        }

        // One extra byte leaves room for the delimiter itself
        let limit = (self.max_line_length as u64).saturating_add(1);
        let mut buf = Vec::new();
        let stream = &mut self.stream;
        let n = with_deadline(self.timeout, async {
            let mut limited = stream.take(limit);
            limited.read_until(b'\n', &mut buf).await
        })
        .await?;

        if n == 0 {
            return Ok(None);
        }
        if buf.last() != Some(&b'\n') {
            if n as u64 == limit {
                return Err(ProtocolError::LineTooLong(self.max_line_length));
            }
            return Err(ProtocolError::TruncatedLine);
        }
        buf.pop();

        String::from_utf8(buf)
            .map(Some)
            .map_err(|_| ProtocolError::InvalidUtf8)
    }

    /// Writes `text` as one line, adding the `\n` if it is missing.
    pub async fn write_line(&mut self, text: &str) -> Result<(), ProtocolError> {
        let mut line = String::with_capacity(text.len() + 1);
        line.push_str(text);
        if !line.ends_with('\n') {
            line.push('\n');
        }
        self.write_raw(line.as_bytes()).await
    }

    /// Writes bytes verbatim, outside any line framing.
    pub async fn write_raw(&mut self, bytes: &[u8]) -> Result<(), ProtocolError> {
        let stream = &mut self.stream;
        with_deadline(self.timeout, async {
            stream.write_all(bytes).await?;
            stream.flush().await
        })
        .await
    }

    /// Switches the read cursor to raw mode for exactly `len` bytes.
    pub fn begin_raw(&mut self, len: u64) -> Result<(), ProtocolError> {
        if let ReadMode::Raw { remaining, .. } = self.mode {
            return Err(ProtocolError::ModeViolation { remaining });
        }
        if len > 0 {
            self.mode = ReadMode::Raw {
                declared: len,
                remaining: len,
            };
        }
        Ok(())
    }

    /// Reads the next piece of the current raw segment into `buf`.
    ///
    /// Returns `Ok(0)` only when no raw segment is outstanding. A close
    /// before the segment is complete is a `PartialTransfer` error.
    pub async fn read_raw(&mut self, buf: &mut [u8]) -> Result<usize, ProtocolError> {
        let (declared, remaining) = match self.mode {
            ReadMode::Raw {
                declared,
                remaining,
            } => (declared, remaining),
            ReadMode::Line => return Ok(0),
        };
        let want = remaining.min(buf.len() as u64) as usize;
        if want == 0 {
            return Ok(0);
        }

        let stream = &mut self.stream;
        let target = &mut buf[..want];
        let n = with_deadline(self.timeout, async { stream.read(target).await }).await?;
        if n == 0 {
            return Err(ProtocolError::PartialTransfer {
                expected: declared,
                received: declared - remaining,
            });
        }

        let remaining = remaining - n as u64;
        self.mode = if remaining == 0 {
            ReadMode::Line
        } else {
            ReadMode::Raw {
                declared,
                remaining,
            }
        };
        Ok(n)
    }

    /// Streams `transfer.remaining()` bytes from `source` onto the wire.
    ///
    /// `source` running dry early is a `PartialTransfer` error: the peer has
    /// been promised an exact byte count.
    pub async fn send_raw_from<R, F>(
        &mut self,
        source: &mut R,
        transfer: &mut Transfer,
        buffer_size: usize,
        mut on_progress: F,
    ) -> Result<(), ProtocolError>
    where
        R: AsyncRead + Unpin,
        F: FnMut(&Transfer),
    {
        let mut buffer = vec![0; buffer_size.max(1)];
        while !transfer.is_complete() {
            let want = transfer.chunk_len(buffer.len());
            let n = source.read(&mut buffer[..want]).await?;
            if n == 0 {
                return Err(ProtocolError::PartialTransfer {
                    expected: transfer.declared(),
                    received: transfer.transferred(),
                });
            }
            self.write_raw(&buffer[..n]).await?;
            transfer.advance(n);
            on_progress(transfer);
        }
        debug!(
            "Sent raw segment for {} ({} bytes)",
            transfer.filename(),
            transfer.declared()
        );
        Ok(())
    }

    /// Receives a whole raw segment of `transfer.declared()` bytes into `sink`.
    pub async fn recv_raw_into<W, F>(
        &mut self,
        sink: &mut W,
        transfer: &mut Transfer,
        buffer_size: usize,
        mut on_progress: F,
    ) -> Result<(), ProtocolError>
    where
        W: AsyncWrite + Unpin,
        F: FnMut(&Transfer),
    {
        self.begin_raw(transfer.remaining())?;
        let mut buffer = vec![0; buffer_size.max(1)];
        while !transfer.is_complete() {
            let n = self.read_raw(&mut buffer).await?;
            sink.write_all(&buffer[..n]).await?;
            transfer.advance(n);
            on_progress(transfer);
        }
        sink.flush().await?;
        Ok(())
    }

    pub async fn shutdown(&mut self) -> Result<(), ProtocolError> {
        let stream = &mut self.stream;
        with_deadline(self.timeout, async { stream.shutdown().await }).await
    }
}

async fn with_deadline<T, F>(timeout: Option<Duration>, fut: F) -> Result<T, ProtocolError>
where
    F: Future<Output = io::Result<T>>,
{
    match timeout {
        Some(limit) => match tokio::time::timeout(limit, fut).await {
            Ok(result) => result.map_err(ProtocolError::from),
            Err(_) => Err(ProtocolError::TimedOut(limit)),
        },
        None => fut.await.map_err(ProtocolError::from),
    }
}
