// Client side of the protocol: wire client, prompt parsing, interactive loop
pub mod client;
pub mod driver;
pub mod error;
pub mod input;
pub mod progress;

#[cfg(test)]
mod test_driver;

pub use client::{Client, RemoteFile};
pub use driver::{Driver, Step};
pub use error::ClientError;
