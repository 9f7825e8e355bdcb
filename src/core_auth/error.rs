use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Shared password must not be empty")]
    EmptyPassword,

    #[error("Shared password must be a single token without whitespace")]
    UnusablePassword,

    #[error("Invalid bcrypt password hash: {0}")]
    InvalidHash(String),
}
