// Failures of a single command, and the ERR line each one maps to
use crate::core_protocol::ProtocolError;
use std::io::{self, ErrorKind};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CommandError {
    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Missing password")]
    MissingPassword,

    #[error("Authentication failed")]
    AuthenticationFailed,

    #[error("Missing filename")]
    MissingFilename,

    #[error("UPLOAD without filename and size")]
    UploadUsage,

    #[error("Invalid filesize: {0}")]
    InvalidFilesize(String),

    #[error("Invalid filename: {0}")]
    InvalidFilename(String),

    #[error("Upload of {size} bytes exceeds the {limit} byte limit")]
    TooLarge { size: u64, limit: u64 },

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error("Storage error: {0}")]
    Storage(#[from] io::Error),

    #[error("Partial upload: received {received} of {expected} bytes")]
    PartialUpload { expected: u64, received: u64 },

    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

impl CommandError {
    pub fn to_response(&self) -> String {
        match self {
            CommandError::NotAuthenticated => {
                "ERR Not authenticated. Use: AUTH <password>".to_string()
            }
            CommandError::MissingPassword => "ERR Missing password".to_string(),
            CommandError::AuthenticationFailed => "ERR Authentication failed".to_string(),
            CommandError::MissingFilename => "ERR Missing filename".to_string(),
            CommandError::UploadUsage => "ERR Usage: UPLOAD <filename> <filesize>".to_string(),
            CommandError::InvalidFilesize(_) => "ERR Invalid filesize".to_string(),
            CommandError::InvalidFilename(_) => "ERR Invalid filename".to_string(),
            CommandError::TooLarge { .. } => "ERR File too large".to_string(),
            CommandError::FileNotFound(_) => "ERR File not found".to_string(),
            CommandError::UnknownCommand(verb) => format!("ERR Unknown command: {}", verb),
            CommandError::Storage(e) => format!("ERR Storage error: {}", storage_reason(e)),
            CommandError::PartialUpload { expected, received } => format!(
                "ERR Partial upload: received {} of {} bytes",
                received, expected
            ),
            CommandError::Protocol(_) => "ERR Protocol error".to_string(),
        }
    }

    /// Fatal errors end the session once their reply has been attempted.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            CommandError::PartialUpload { .. } | CommandError::Protocol(_)
        )
    }
}

fn storage_reason(e: &io::Error) -> &'static str {
    match e.kind() {
        ErrorKind::PermissionDenied => "permission denied",
        _ if is_out_of_space(e) => "no space left",
        _ => "local error",
    }
}

#[cfg(unix)]
fn is_out_of_space(e: &io::Error) -> bool {
    // ENOSPC and EDQUOT
    matches!(e.raw_os_error(), Some(28) | Some(122))
}

#[cfg(not(unix))]
fn is_out_of_space(e: &io::Error) -> bool {
    // ERROR_HANDLE_DISK_FULL and ERROR_DISK_FULL
    matches!(e.raw_os_error(), Some(39) | Some(112))
}
