pub mod session;
pub mod settings;


pub use session::{Session, SessionState};
pub use settings::SessionSettings;
