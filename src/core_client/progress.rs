//! Console progress for DOWNLOAD and UPLOAD payloads.

use indicatif::{ProgressBar, ProgressStyle};

/// Shows bytes transferred / total for one payload.
pub struct TransferProgress {
    bar: ProgressBar,
}

impl TransferProgress {
    pub fn new(total_bytes: u64, filename: &str) -> Self {
        let bar = ProgressBar::new(total_bytes);
        if let Ok(style) =
            ProgressStyle::with_template("{msg} [{wide_bar:.cyan/blue}] {pos}/{len} bytes ({percent}%)")
        {
            bar.set_style(style.progress_chars("#>-"));
        }
        bar.set_message(filename.to_string());
        Self { bar }
    }

    /// A tracker that draws nothing.
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }

    pub fn update(&self, transferred_bytes: u64) {
        self.bar.set_position(transferred_bytes);
    }

    pub fn finish(&self) {
        self.bar.finish();
    }

    /// Leaves the bar where it stopped (for errors).
    pub fn abandon(&self) {
        self.bar.abandon();
    }
}
