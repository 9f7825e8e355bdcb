use crate::constants::FILENAME_REGEX;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

fn filename_regex() -> &'static Regex {
    static FILENAME: OnceLock<Regex> = OnceLock::new();
    FILENAME.get_or_init(|| Regex::new(FILENAME_REGEX).expect("FILENAME_REGEX is a valid pattern"))
}

/// Checks that `name` addresses an entry directly inside the shared directory.
pub fn is_valid_filename(name: &str) -> bool {
    name != "." && name != ".." && filename_regex().is_match(name)
}

/// Resolves `name` inside `shared_dir`, refusing anything that could escape it.
pub fn shared_path(shared_dir: &Path, name: &str) -> Option<PathBuf> {
    is_valid_filename(name).then(|| shared_dir.join(name))
}

/// Human-readable byte count for log lines.
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} B", bytes)
    } else {
        format!("{:.2} {}", size, UNITS[unit])
    }
}
