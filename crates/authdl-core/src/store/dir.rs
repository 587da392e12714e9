//! One-file-per-key store under a directory.
//!
//! Writes go to `<key>.tmp` and are renamed over the final file so a crash
//! never leaves a half-written value behind.

use anyhow::{Context, Result};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use super::KeyValueStore;

#[derive(Debug, Clone)]
pub struct DirStore {
    dir: PathBuf,
    private: bool,
}

impl DirStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            private: false,
        }
    }

    /// Restrict the directory to 0700 and files to 0600 (Unix only).
    pub fn private(mut self) -> Self {
        self.private = true;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Persistent store: `~/.local/state/authdl`.
    pub fn state_default() -> Result<Self> {
        let xdg_dirs = xdg::BaseDirectories::with_prefix("authdl")?;
        Ok(Self::new(xdg_dirs.get_state_home().join("authdl")))
    }

    /// Volatile store for credentials: `$XDG_RUNTIME_DIR/authdl/session`, which
    /// goes away with the login session. Falls back to the state dir when no
    /// runtime dir is available.
    pub fn runtime_default() -> Result<Self> {
        let xdg_dirs = xdg::BaseDirectories::with_prefix("authdl")?;
        let dir = match xdg_dirs.place_runtime_file("session") {
            Ok(path) => path,
            Err(e) => {
                tracing::debug!("no runtime dir ({}), keeping session under state dir", e);
                xdg_dirs.get_state_home().join("authdl").join("session")
            }
        };
        Ok(Self::new(dir).private())
    }

    fn path_for(&self, key: &str) -> PathBuf {
        debug_assert!(!key.contains(['/', '\\']), "store keys are plain names");
        self.dir.join(key)
    }

    fn ensure_dir(&self) -> Result<()> {
        let mut builder = fs::DirBuilder::new();
        builder.recursive(true);
        #[cfg(unix)]
        if self.private {
            use std::os::unix::fs::DirBuilderExt;
            builder.mode(0o700);
        }
        builder
            .create(&self.dir)
            .with_context(|| format!("create dir: {}", self.dir.display()))
    }

    fn write_file(&self, path: &Path, value: &str) -> io::Result<()> {
        let mut options = fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        if self.private {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let mut file = options.open(path)?;
        file.write_all(value.as_bytes())?;
        file.sync_all()
    }
}

impl KeyValueStore for DirStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(s) => Ok(Some(s)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("read {}", path.display())),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.ensure_dir()?;
        let path = self.path_for(key);
        let tmp = self.path_for(&format!("{}.tmp", key));
        self.write_file(&tmp, value)
            .with_context(|| format!("write {}", tmp.display()))?;
        fs::rename(&tmp, &path)
            .with_context(|| format!("rename {} to {}", tmp.display(), path.display()))?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.path_for(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("remove {}", path.display())),
        }
    }
}
