//! Recently used download targets, most recent first.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::http::Method;
use crate::store::KeyValueStore;

/// Entries kept in the history.
pub const HISTORY_LIMIT: usize = 10;

const HISTORY_KEY: &str = "url_history.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "StoredEntry")]
pub struct HistoryEntry {
    pub url: String,
    pub method: Method,
}

impl HistoryEntry {
    pub fn new(url: impl Into<String>, method: Method) -> Self {
        Self {
            url: url.into(),
            method,
        }
    }
}

/// Older history files hold bare URL strings.
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredEntry {
    Url(String),
    Full {
        url: String,
        #[serde(default)]
        method: Method,
    },
}

impl From<StoredEntry> for HistoryEntry {
    fn from(stored: StoredEntry) -> Self {
        match stored {
            StoredEntry::Url(url) => HistoryEntry::new(url, Method::Get),
            StoredEntry::Full { url, method } => HistoryEntry::new(url, method),
        }
    }
}

/// Moves `entry` to the front, dropping any older entry for the same URL, and
/// keeps at most `limit` entries.
pub fn push_front_unique(entries: &mut Vec<HistoryEntry>, entry: HistoryEntry, limit: usize) {
    entries.retain(|e| e.url != entry.url);
    entries.insert(0, entry);
    entries.truncate(limit);
}

pub trait HistoryRepository: Send + Sync {
    fn record(&self, entry: HistoryEntry) -> Result<()>;
    fn list(&self) -> Result<Vec<HistoryEntry>>;
    fn clear(&self) -> Result<()>;
}

/// [`HistoryRepository`] persisted as one JSON list in a [`KeyValueStore`].
#[derive(Debug)]
pub struct HistoryStore<S> {
    store: S,
    limit: usize,
}

impl<S: KeyValueStore> HistoryStore<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            limit: HISTORY_LIMIT,
        }
    }
}

impl<S: KeyValueStore> HistoryRepository for HistoryStore<S> {
    fn record(&self, entry: HistoryEntry) -> Result<()> {
        let mut entries = self.list()?;
        push_front_unique(&mut entries, entry, self.limit);
        let json = serde_json::to_string(&entries).context("serialize history")?;
        self.store.set(HISTORY_KEY, &json)
    }

    /// A corrupt stored list reads as empty; the next `record` replaces it.
    fn list(&self) -> Result<Vec<HistoryEntry>> {
        let Some(raw) = self.store.get(HISTORY_KEY)? else {
            return Ok(Vec::new());
        };
        match serde_json::from_str::<Vec<HistoryEntry>>(&raw) {
            Ok(mut entries) => {
                entries.truncate(self.limit);
                Ok(entries)
            }
            Err(e) => {
                tracing::warn!("ignoring unreadable history: {}", e);
                Ok(Vec::new())
            }
        }
    }

    fn clear(&self) -> Result<()> {
        self.store.remove(HISTORY_KEY)
    }
}
