use chrono::Local;
use env_logger::{Builder, Env};
use std::io::Write;

/// Installs the global logger with the `[timestamp] [level] message` format.
///
/// `RUST_LOG` still wins over `default_level`.
pub fn init_logger(default_level: &str) {
    Builder::from_env(Env::default().default_filter_or(default_level))
        .format(|buf, record| {
            let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
            writeln!(
                buf,
                "[{}] [{}] {}",
                timestamp,
                record.level(),
                record.args()
            )
        })
        .init();
}

/// Default filter for a binary given its `--verbose` flag.
pub fn default_level(verbose: bool, quiet_level: &'static str) -> &'static str {
    if verbose {
        "debug"
    } else {
        quiet_level
    }
}
