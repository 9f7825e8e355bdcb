// One handler per protocol verb
pub mod auth;
pub mod download;
pub mod error;
pub mod list;
pub mod quit;
pub mod upload;

pub use error::CommandError;

/// What the session does after a command has been answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Close,
}
