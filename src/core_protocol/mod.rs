// Wire framing shared by the server sessions and the client driver
pub mod command;
pub mod connection;
pub mod error;
pub mod transfer;

#[cfg(test)]
mod test_connection;

pub use command::{Command, Verb};
pub use connection::{Connection, ReadMode};
pub use error::ProtocolError;
pub use transfer::Transfer;
