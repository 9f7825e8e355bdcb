pub mod error;
pub mod secret;

pub use error::AuthError;
pub use secret::SharedSecret;
