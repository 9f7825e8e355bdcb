// src/constants.rs

/// Accepted shape of a shared-directory filename: no separators, no NUL.
pub const FILENAME_REGEX: &str = r"^[^/\\\x00]+$";

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 9000;
pub const DEFAULT_SHARED_DIR: &str = "shared";
pub const DEFAULT_PASSWORD: &str = "secret123";
pub const DEFAULT_BANNER: &str = "Simple FileShare Server";

pub const DEFAULT_MAX_LINE_LENGTH: usize = 8192;
pub const DEFAULT_TRANSFER_BUFFER_SIZE: usize = 64 * 1024;
