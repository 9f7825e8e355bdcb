//! A shared-directory file server and its interactive client.
//!
//! Clients talk to the server over plain TCP with a line-oriented text
//! protocol; file contents travel as raw, length-prefixed segments embedded
//! between the text lines.

pub mod config;
pub mod constants;
pub mod core_auth;
pub mod core_cli;
pub mod core_client;
pub mod core_command;
pub mod core_log;
pub mod core_protocol;
pub mod core_session;
pub mod helpers;
pub mod server;

pub use config::{Config, ServerConfig};
