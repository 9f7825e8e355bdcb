use crate::constants::{
    DEFAULT_BANNER, DEFAULT_HOST, DEFAULT_MAX_LINE_LENGTH, DEFAULT_PASSWORD, DEFAULT_PORT,
    DEFAULT_SHARED_DIR, DEFAULT_TRANSFER_BUFFER_SIZE,
};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub shared_dir: PathBuf,
    pub password: String,
    /// bcrypt hash of the shared secret; wins over `password` when set.
    pub password_hash: Option<String>,
    pub banner: String,
    pub idle_timeout_secs: Option<u64>,
    /// Unset means no limit on concurrently open sessions.
    pub max_connections: Option<usize>,
    pub max_line_length: usize,
    pub max_upload_size: Option<u64>,
    pub transfer_buffer_size: usize,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: String::from(DEFAULT_HOST),
            port: DEFAULT_PORT,
            shared_dir: PathBuf::from(DEFAULT_SHARED_DIR),
            password: String::from(DEFAULT_PASSWORD),
            password_hash: None,
            banner: String::from(DEFAULT_BANNER),
            idle_timeout_secs: None,
            max_connections: None,
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
            max_upload_size: None,
            transfer_buffer_size: DEFAULT_TRANSFER_BUFFER_SIZE,
        }
    }
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn idle_timeout(&self) -> Option<Duration> {
        self.idle_timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }
}

impl Config {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let config_str = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file: {}", path.display()))?;
        Self::from_toml(&config_str)
            .with_context(|| format!("Failed to parse configuration file: {}", path.display()))
    }

    pub fn from_toml(config_str: &str) -> Result<Self> {
        let mut config: Config = toml::from_str(config_str)?;

        // Zero-sized buffers would stall every transfer
        if config.server.transfer_buffer_size == 0 {
            config.server.transfer_buffer_size = DEFAULT_TRANSFER_BUFFER_SIZE;
        }
        if config.server.max_line_length == 0 {
            config.server.max_line_length = DEFAULT_MAX_LINE_LENGTH;
        }

        Ok(config)
    }
}
