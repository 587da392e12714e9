//! Byte accounting for one streamed body.
//!
//! Fed with chunk sizes as they arrive; turns them into a percentage when the
//! total size is known and a byte count otherwise.

use crate::ui::Progress;

#[derive(Debug, Clone)]
pub struct ProgressTracker {
    total: Option<u64>,
    loaded: u64,
    percent: u8,
}

impl ProgressTracker {
    /// `total` of zero is treated as unknown.
    pub fn new(total: Option<u64>) -> Self {
        Self {
            total: total.filter(|&t| t > 0),
            loaded: 0,
            percent: 0,
        }
    }

    pub fn advance(&mut self, bytes: usize) {
        self.loaded = self.loaded.saturating_add(bytes as u64);
        if let Some(total) = self.total {
            self.percent = self.percent.max(rounded_percent(self.loaded, total));
        }
    }

    pub fn loaded(&self) -> u64 {
        self.loaded
    }

    pub fn total(&self) -> Option<u64> {
        self.total
    }

    /// Percent complete; None when the size is unknown. Never decreases, capped at 100.
    pub fn percent(&self) -> Option<u8> {
        self.total.map(|_| self.percent)
    }

    pub fn snapshot(&self, label: &str) -> Progress {
        match self.percent() {
            Some(percent) => Progress::percent(percent, label),
            None => Progress::Bytes {
                loaded: self.loaded,
                label: label.to_string(),
            },
        }
    }
}

/// round(loaded / total * 100), capped at 100.
fn rounded_percent(loaded: u64, total: u64) -> u8 {
    let scaled = (loaded as u128 * 200 + total as u128) / (total as u128 * 2);
    scaled.min(100) as u8
}
