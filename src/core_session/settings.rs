use crate::config::ServerConfig;
use crate::core_auth::{AuthError, SharedSecret};
use std::path::PathBuf;
use std::time::Duration;

/// Read-only configuration shared by every session of a listener.
///
/// Built once at startup and handed out behind an `Arc`; nothing mutates it
/// afterwards.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub shared_dir: PathBuf,
    pub secret: SharedSecret,
    pub banner: String,
    pub idle_timeout: Option<Duration>,
    pub max_line_length: usize,
    pub max_upload_size: Option<u64>,
    pub transfer_buffer_size: usize,
}

impl SessionSettings {
    pub fn from_config(config: &ServerConfig) -> Result<Self, AuthError> {
        Ok(Self {
            shared_dir: config.shared_dir.clone(),
            secret: SharedSecret::from_config(config)?,
            banner: config.banner.clone(),
            idle_timeout: config.idle_timeout(),
            max_line_length: config.max_line_length,
            max_upload_size: config.max_upload_size,
            transfer_buffer_size: config.transfer_buffer_size,
        })
    }
}
