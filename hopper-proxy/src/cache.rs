use std::collections::HashMap;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub response: Bytes,
    pub stored_at: DateTime<Utc>,
}

/// Origin replies keyed by `host + path`. Entries are never evicted.
///
/// Lookups do not wait on fetches in flight: two concurrent misses for the
/// same key both go upstream and the later `put` replaces the earlier one.
#[derive(Debug, Default)]
pub struct ResponseCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl ResponseCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, key: &str) -> Option<CacheEntry> {
        self.entries.lock().await.get(key).cloned()
    }

    /// Returns the entry that was replaced, if any.
    pub async fn put(&self, key: impl Into<String>, response: Bytes) -> Option<CacheEntry> {
        let entry = CacheEntry {
            response,
            stored_at: Utc::now(),
        };
        self.entries.lock().await.insert(key.into(), entry)
    }

    pub async fn contains(&self, key: &str) -> bool {
        self.entries.lock().await.contains_key(key)
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}
