// Errors raised while framing lines and raw segments on a connection
use std::io;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Received line is not valid UTF-8")]
    InvalidUtf8,

    #[error("Line exceeds {0} bytes")]
    LineTooLong(usize),

    #[error("Connection closed in the middle of a line")]
    TruncatedLine,

    #[error("Line mode requested with {remaining} raw bytes outstanding")]
    ModeViolation { remaining: u64 },

    #[error("Transfer ended after {received} of {expected} bytes")]
    PartialTransfer { expected: u64, received: u64 },

    #[error("No activity for {0:?}")]
    TimedOut(Duration),
}

impl ProtocolError {
    /// True when the peer simply went away, as opposed to sending garbage.
    pub fn is_disconnect(&self) -> bool {
        match self {
            ProtocolError::TruncatedLine | ProtocolError::PartialTransfer { .. } => true,
            ProtocolError::Io(e) => matches!(
                e.kind(),
                io::ErrorKind::ConnectionReset
                    | io::ErrorKind::ConnectionAborted
                    | io::ErrorKind::BrokenPipe
                    | io::ErrorKind::UnexpectedEof
            ),
            _ => false,
        }
    }
}
