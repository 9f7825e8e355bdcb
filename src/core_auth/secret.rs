use crate::config::ServerConfig;
use crate::core_auth::error::AuthError;
use bcrypt::{hash, verify, DEFAULT_COST};
use log::{info, warn};

/// The single shared secret every client authenticates against.
///
/// Either compared verbatim or checked against a bcrypt hash, so the
/// plaintext never has to live in the configuration file.
#[derive(Clone)]
pub enum SharedSecret {
    Plain(String),
    Bcrypt(String),
}

impl SharedSecret {
    pub fn from_config(config: &ServerConfig) -> Result<Self, AuthError> {
        if let Some(hashed) = &config.password_hash {
            // Catch a mangled hash at startup rather than on every AUTH
            verify("", hashed).map_err(|e| AuthError::InvalidHash(e.to_string()))?;
            info!("Using bcrypt password hash from configuration");
            return Ok(SharedSecret::Bcrypt(hashed.clone()));
        }

        if config.password.is_empty() {
            return Err(AuthError::EmptyPassword);
        }
        if config.password.split_whitespace().count() != 1 {
            // AUTH only ever carries one token
            return Err(AuthError::UnusablePassword);
        }
        Ok(SharedSecret::Plain(config.password.clone()))
    }

    pub fn verify(&self, candidate: &str) -> bool {
        match self {
            SharedSecret::Plain(expected) => candidate == expected,
            SharedSecret::Bcrypt(hashed) => verify(candidate, hashed).unwrap_or_else(|e| {
                warn!("bcrypt verification failed: {}", e);
                false
            }),
        }
    }
}

// Never print the secret itself
impl std::fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SharedSecret::Plain(_) => f.write_str("SharedSecret::Plain(<redacted>)"),
            SharedSecret::Bcrypt(_) => f.write_str("SharedSecret::Bcrypt(<redacted>)"),
        }
    }
}

pub fn hash_password(password: &str) -> Result<String, AuthError> {
    hash(password, DEFAULT_COST).map_err(|e| AuthError::InvalidHash(e.to_string()))
}
