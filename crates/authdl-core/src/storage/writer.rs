//! Temp file that removes itself unless finalized.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// A `.part` file being written. Dropping it without [`PartFile::finalize`]
/// deletes the file.
pub struct PartFile {
    file: Option<File>,
    temp_path: PathBuf,
}

impl PartFile {
    /// Create a new temp file at `temp_path`, truncating a stale one from an earlier attempt.
    pub fn create(temp_path: &Path) -> Result<Self> {
        let file = File::options()
            .write(true)
            .create(true)
            .truncate(true)
            .open(temp_path)
            .with_context(|| format!("failed to create temp file: {}", temp_path.display()))?;
        Ok(PartFile {
            file: Some(file),
            temp_path: temp_path.to_path_buf(),
        })
    }

    pub fn write_all(&mut self, data: &[u8]) -> Result<()> {
        let file = self.file.as_mut().context("temp file already closed")?;
        file.write_all(data)
            .with_context(|| format!("write {}", self.temp_path.display()))
    }

    /// Sync file data to disk. Call before `finalize` for durability.
    pub fn sync(&self) -> Result<()> {
        if let Some(file) = &self.file {
            file.sync_all().context("temp file sync failed")?;
        }
        Ok(())
    }

    /// Atomically rename the temp file to the final path. Consumes the writer and closes the file.
    pub fn finalize(mut self, final_path: &Path) -> Result<()> {
        drop(self.file.take());
        std::fs::rename(&self.temp_path, final_path).with_context(|| {
            format!(
                "failed to rename {} to {}",
                self.temp_path.display(),
                final_path.display()
            )
        })?;
        // Renamed away: nothing left for Drop to clean up.
        self.temp_path = PathBuf::new();
        Ok(())
    }
}

impl Drop for PartFile {
    fn drop(&mut self) {
        drop(self.file.take());
        if self.temp_path.as_os_str().is_empty() {
            return;
        }
        match std::fs::remove_file(&self.temp_path) {
            Ok(()) => tracing::debug!(path = %self.temp_path.display(), "removed temp file"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(path = %self.temp_path.display(), "could not remove temp file: {}", e),
        }
    }
}
