//! Query cache for a single prerender invocation
//!
//! Maps a stable [`QueryKey`] to the fetch state of one data dependency.
//! Rendering inserts entries as a side effect; the render loop resolves
//! them between passes.
//!
//! # Entry States
//!
//! | State | has_processed | render_loading | data |
//! |-------|---------------|----------------|------|
//! | Pending | false | false | none |
//! | Resolved | true | false | some |
//! | Abandoned | true | true | none |
//!
//! There is no deletion: the cache only grows or matures. One cache belongs
//! to exactly one path being prerendered.

pub mod entry;

pub use entry::{CacheEntry, EntryState, QueryKey};

use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::debug;

/// Query cache owned by one prerender invocation
#[derive(Debug, Default)]
pub struct QueryCache {
    entries: BTreeMap<QueryKey, CacheEntry>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up an entry, inserting a pending one if the key is new
    pub fn get_or_insert(
        &mut self,
        key: QueryKey,
        query: &str,
        variables: Map<String, Value>,
    ) -> &CacheEntry {
        self.entries.entry(key).or_insert_with_key(|key| {
            debug!("Discovered query {}", key);
            CacheEntry::new(key.clone(), query, variables)
        })
    }

    pub fn get(&self, key: &QueryKey) -> Option<&CacheEntry> {
        self.entries.get(key)
    }

    /// Snapshot of all entries that still need fetching
    pub fn pending(&self) -> Vec<CacheEntry> {
        self.entries
            .values()
            .filter(|entry| !entry.has_processed())
            .cloned()
            .collect()
    }

    /// Store a fetched payload. Returns false if the key is unknown or
    /// the entry was already processed.
    pub fn resolve(&mut self, key: &QueryKey, data: Value) -> bool {
        self.transition(key, EntryState::Resolved(data))
    }

    /// Mark an entry as given up on. Same return contract as [`resolve`](Self::resolve).
    pub fn abandon(&mut self, key: &QueryKey) -> bool {
        self.transition(key, EntryState::Abandoned)
    }

    fn transition(&mut self, key: &QueryKey, state: EntryState) -> bool {
        match self.entries.get_mut(key) {
            Some(entry) if !entry.has_processed() => {
                entry.state = state;
                true
            }
            _ => false,
        }
    }

    /// True when every entry has been processed
    pub fn is_settled(&self) -> bool {
        self.entries.values().all(CacheEntry::has_processed)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn processed_count(&self) -> usize {
        self.entries.values().filter(|e| e.has_processed()).count()
    }

    pub fn abandoned_count(&self) -> usize {
        self.entries.values().filter(|e| e.render_loading()).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CacheEntry> {
        self.entries.values()
    }
}
