//! Saved reading positions keyed by document identity.
//!
//! The engine itself never persists anything. This module only decides what a
//! record looks like, which identity it lives under and when it goes stale;
//! the bytes go wherever the [`KeyValueStore`] puts them.

use crate::navigation::paragraph_start_for;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::{debug, info};

pub const DEFAULT_RETENTION_DAYS: u64 = 30;
const SECS_PER_DAY: u64 = 24 * 60 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressEntry {
    /// First word of the paragraph being read; resuming lands here.
    pub paragraph_start_index: usize,
    pub last_word_index: usize,
    pub saved_at_ms: u64,
}

impl ProgressEntry {
    pub fn new(paragraph_start_index: usize, last_word_index: usize, saved_at: SystemTime) -> Self {
        Self {
            paragraph_start_index,
            last_word_index,
            saved_at_ms: epoch_millis(saved_at),
        }
    }

    /// Builds an entry for `word_index`, resolving its paragraph from `boundaries`.
    pub fn at_word(word_index: usize, boundaries: &[usize], saved_at: SystemTime) -> Self {
        Self::new(
            paragraph_start_for(word_index, boundaries),
            word_index,
            saved_at,
        )
    }

    pub fn is_expired(&self, now: SystemTime, retention: Duration) -> bool {
        let now_ms = epoch_millis(now);
        let retention_ms = u64::try_from(retention.as_millis()).unwrap_or(u64::MAX);
        now_ms.saturating_sub(self.saved_at_ms) > retention_ms
    }
}

/// Backing storage for progress entries, one entry per document key.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<ProgressEntry>;
    fn put(&mut self, key: &str, entry: ProgressEntry);
    fn remove(&mut self, key: &str);
    fn keys(&self) -> Vec<String>;
}

#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: BTreeMap<String, ProgressEntry>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<ProgressEntry> {
        self.entries.get(key).copied()
    }

    fn put(&mut self, key: &str, entry: ProgressEntry) {
        self.entries.insert(key.to_string(), entry);
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }

    fn keys(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }
}

/// Normalises a document identity into its storage key.
///
/// URL identities lose their query string and fragment so that tracking
/// parameters and in-page anchors share one record. Anything else is kept
/// verbatim apart from surrounding whitespace.
pub fn document_key(identity: &str) -> String {
    let trimmed = identity.trim();
    if !trimmed.contains("://") {
        return trimmed.to_string();
    }
    let end = trimmed.find(['?', '#']).unwrap_or(trimmed.len());
    trimmed[..end].to_string()
}

pub struct ProgressBook<S: KeyValueStore> {
    store: S,
    retention: Duration,
}

impl<S: KeyValueStore> ProgressBook<S> {
    pub fn new(store: S) -> Self {
        Self::with_retention_days(store, DEFAULT_RETENTION_DAYS)
    }

    pub fn with_retention_days(store: S, days: u64) -> Self {
        Self {
            store,
            retention: Duration::from_secs(days.saturating_mul(SECS_PER_DAY)),
        }
    }

    pub fn retention(&self) -> Duration {
        self.retention
    }

    pub fn save(
        &mut self,
        identity: &str,
        paragraph_start_index: usize,
        last_word_index: usize,
        now: SystemTime,
    ) -> ProgressEntry {
        let key = document_key(identity);
        let entry = ProgressEntry::new(paragraph_start_index, last_word_index, now);
        self.store.put(&key, entry);
        debug!(
            key = %key,
            paragraph_start = paragraph_start_index,
            last_word = last_word_index,
            "Saved reading progress"
        );
        entry
    }

    /// Returns the live entry for `identity`. Expired entries are deleted on sight.
    pub fn load(&mut self, identity: &str, now: SystemTime) -> Option<ProgressEntry> {
        let key = document_key(identity);
        let entry = self.store.get(&key)?;
        if entry.is_expired(now, self.retention) {
            debug!(key = %key, "Dropping expired reading progress");
            self.store.remove(&key);
            return None;
        }
        Some(entry)
    }

    pub fn clear(&mut self, identity: &str) {
        let key = document_key(identity);
        self.store.remove(&key);
        debug!(key = %key, "Cleared reading progress");
    }

    /// Removes every expired entry and returns how many went.
    pub fn cleanup_expired(&mut self, now: SystemTime) -> usize {
        let mut removed = 0;
        for key in self.store.keys() {
            let expired = self
                .store
                .get(&key)
                .is_some_and(|entry| entry.is_expired(now, self.retention));
            if expired {
                self.store.remove(&key);
                removed += 1;
            }
        }
        if removed > 0 {
            info!(removed, "Cleaned up expired reading progress");
        }
        removed
    }

    pub fn entries(&self) -> Vec<(String, ProgressEntry)> {
        self.store
            .keys()
            .into_iter()
            .filter_map(|key| self.store.get(&key).map(|entry| (key, entry)))
            .collect()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }
}

fn epoch_millis(at: SystemTime) -> u64 {
    at.duration_since(UNIX_EPOCH)
        .map(|elapsed| u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}
