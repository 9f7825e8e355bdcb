use crate::core_protocol::ProtocolError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error("Local I/O error: {0}")]
    Io(#[from] io::Error),

    /// An `ERR ...` line, kept verbatim.
    #[error("{0}")]
    Server(String),

    #[error("Unexpected response: {0}")]
    Unexpected(String),

    #[error("Connection closed by server.")]
    Disconnected,

    #[error("Local file not found: {}", .0.display())]
    LocalFileNotFound(PathBuf),

    #[error("Cannot transfer {0:?}: names must be a single token without path separators")]
    InvalidName(String),
}

impl ClientError {
    /// After a fatal error the connection can no longer be trusted to be
    /// positioned at a line boundary.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ClientError::Protocol(_) | ClientError::Disconnected | ClientError::Unexpected(_)
        )
    }
}
