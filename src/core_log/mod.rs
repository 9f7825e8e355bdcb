pub mod logger;

pub use logger::{default_level, init_logger};
