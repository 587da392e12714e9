//! Key/value persistence behind the session and history stores.
//!
//! Mirrors the browser storage API the stores were designed around: string
//! values under string keys. [`DirStore`] keeps one file per key on disk;
//! [`MemoryStore`] is the in-process fake used by tests.

mod dir;
mod memory;

pub use dir::DirStore;
pub use memory::MemoryStore;

use anyhow::Result;
use std::sync::Arc;

pub trait KeyValueStore: Send + Sync {
    /// Value stored under `key`, or None when nothing is stored.
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    /// Removes `key`; removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<()>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Arc<T> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        (**self).remove(key)
    }
}
