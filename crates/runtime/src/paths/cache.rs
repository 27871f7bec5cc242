//! Time-bounded route cache.

use std::collections::HashMap;

use nav_core::{PathResult, Position};

/// Cache key: the exact endpoints plus whether the result was smoothed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PathKey {
    pub start: Position,
    pub goal: Position,
    pub smoothed: bool,
}

impl PathKey {
    pub fn new(start: Position, goal: Position, smoothed: bool) -> Self {
        Self {
            start,
            goal,
            smoothed,
        }
    }
}

#[derive(Clone, Debug)]
struct CacheEntry {
    result: PathResult,
    stored_at: u64,
    sequence: u64,
}

/// Bounded map from [`PathKey`] to result with a TTL.
///
/// An entry is valid while `now - stored_at < ttl`. Expired entries are
/// removed on lookup and behave exactly like a miss. When full, the entry
/// with the oldest timestamp is evicted (insertion order breaks ties).
#[derive(Debug)]
pub struct PathCache {
    entries: HashMap<PathKey, CacheEntry>,
    ttl_ms: u64,
    max_entries: usize,
    sequence: u64,
}

impl PathCache {
    pub fn new(ttl_ms: u64, max_entries: usize) -> Self {
        Self {
            entries: HashMap::with_capacity(max_entries.min(1024)),
            ttl_ms,
            max_entries,
            sequence: 0,
        }
    }

    /// Returns a copy of a live entry.
    pub fn get(&mut self, key: &PathKey, now_ms: u64) -> Option<PathResult> {
        let entry = self.entries.get(key)?;
        if self.is_live(entry, now_ms) {
            return Some(entry.result.clone());
        }
        self.entries.remove(key);
        None
    }

    pub fn insert(&mut self, key: PathKey, result: PathResult, now_ms: u64) {
        if self.max_entries == 0 {
            return;
        }
        if !self.entries.contains_key(&key) && self.entries.len() >= self.max_entries {
            self.prune_expired(now_ms);
            if self.entries.len() >= self.max_entries {
                self.evict_oldest();
            }
        }

        self.sequence += 1;
        self.entries.insert(
            key,
            CacheEntry {
                result,
                stored_at: now_ms,
                sequence: self.sequence,
            },
        );
    }

    /// Removes every expired entry and returns how many were dropped.
    pub fn prune_expired(&mut self, now_ms: u64) -> usize {
        let before = self.entries.len();
        let ttl_ms = self.ttl_ms;
        self.entries
            .retain(|_, entry| now_ms.saturating_sub(entry.stored_at) < ttl_ms);
        before - self.entries.len()
    }

    /// Drops everything and returns how many entries were removed.
    pub fn clear(&mut self) -> usize {
        let removed = self.entries.len();
        self.entries.clear();
        removed
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn ttl_ms(&self) -> u64 {
        self.ttl_ms
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    fn is_live(&self, entry: &CacheEntry, now_ms: u64) -> bool {
        now_ms.saturating_sub(entry.stored_at) < self.ttl_ms
    }

    fn evict_oldest(&mut self) {
        let oldest = self
            .entries
            .iter()
            .min_by_key(|(_, entry)| (entry.stored_at, entry.sequence))
            .map(|(key, _)| *key);
        if let Some(key) = oldest {
            self.entries.remove(&key);
        }
    }
}
