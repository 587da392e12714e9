//! Saving finished downloads to disk.
//!
//! The assembled payload is written to `<name>.part`, synced, then atomically
//! renamed to the final name. The `.part` file is removed on every failure
//! path, so nothing half-written is left next to real downloads.

mod writer;

pub use writer::PartFile;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Temporary file suffix used before atomic rename.
pub const TEMP_SUFFIX: &str = ".part";

/// Path for the temp file: appends `.part` to the final path (e.g. `report.xlsx` → `report.xlsx.part`).
pub fn temp_path(final_path: &Path) -> PathBuf {
    let mut o = final_path.as_os_str().to_owned();
    o.push(TEMP_SUFFIX);
    PathBuf::from(o)
}

/// First free path for `filename` in `dir`: `name.ext`, then `name (1).ext`, `name (2).ext`, ...
pub fn available_path(dir: &Path, filename: &str) -> PathBuf {
    let candidate = dir.join(filename);
    if !candidate.exists() {
        return candidate;
    }
    let (stem, ext) = split_extension(filename);
    (1u32..)
        .map(|n| dir.join(format!("{} ({}){}", stem, n, ext)))
        .find(|p| !p.exists())
        .unwrap_or(candidate)
}

/// `report.tar.gz` splits as (`report.tar`, `.gz`); dotfiles have no extension.
fn split_extension(filename: &str) -> (&str, &str) {
    match filename.rfind('.') {
        Some(dot) if dot > 0 => filename.split_at(dot),
        _ => (filename, ""),
    }
}

/// The final step of a download: hand the payload to whatever "saves" it.
pub trait SaveAction: Send + Sync {
    /// Stores `payload` under `filename`; returns where it ended up.
    fn save(&self, filename: &str, payload: &[u8]) -> Result<PathBuf>;
}

/// Saves into a directory, browser style.
#[derive(Debug, Clone)]
pub struct DirectorySaver {
    dir: PathBuf,
    overwrite: bool,
}

impl DirectorySaver {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            overwrite: false,
        }
    }

    /// Replace an existing file of the same name instead of numbering.
    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl SaveAction for DirectorySaver {
    fn save(&self, filename: &str, payload: &[u8]) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("create download dir: {}", self.dir.display()))?;
        let final_path = if self.overwrite {
            self.dir.join(filename)
        } else {
            available_path(&self.dir, filename)
        };

        let mut part = PartFile::create(&temp_path(&final_path))?;
        part.write_all(payload)?;
        part.sync()?;
        part.finalize(&final_path)?;

        tracing::info!(path = %final_path.display(), bytes = payload.len(), "saved download");
        Ok(final_path)
    }
}
