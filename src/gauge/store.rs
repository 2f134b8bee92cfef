//! Last-Value Store
//!
//! Concurrent map from canonical tag-set key to the most recently recorded
//! value. Producers call [`LastValueStore::record`] from any thread; a single
//! collector calls [`LastValueStore::drain`] to read and retire entries.
//!
//! # Design
//!
//! - `DashMap` shards the key space, so producers only contend per shard
//! - Drain snapshots keys first and never holds a shard guard while visiting
//! - Every record stamps its entry with a store-wide sequence number; drain
//!   removes an entry only if the stamp it visited is still there, so any
//!   record made mid-drain survives to the next cycle, even with an equal value

use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use tracing::{debug, warn};

use crate::attributes::{self, CanonicalKey, KeyValue};
use crate::error::CodecError;

/// Outcome of one drain pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrainSummary {
    /// Entries visited and retired
    pub visited: usize,
    /// Entries discarded because their key failed to decode
    pub discarded: usize,
    /// True if the visitor asked to stop early
    pub stopped: bool,
}

/// Point-in-time store statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStats {
    /// Successful record calls
    pub records: u64,
    /// Record calls dropped on a codec failure
    pub codec_errors: u64,
    /// Entries retired by drain
    pub drained: u64,
    /// Entries discarded by drain
    pub discarded: u64,
}

#[derive(Debug, Clone, Copy)]
struct Stamped {
    seq: u64,
    value: i64,
}

/// Attribute-keyed last-value store
#[derive(Debug, Default)]
pub struct LastValueStore {
    values: DashMap<CanonicalKey, Stamped>,
    sequence: AtomicU64,
    records: AtomicU64,
    codec_errors: AtomicU64,
    drained: AtomicU64,
    discarded: AtomicU64,
}

impl LastValueStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite the value for the given tag set.
    ///
    /// A tag set the codec rejects is dropped and the error returned; the rest
    /// of the store is untouched.
    pub fn record(&self, value: i64, tags: &[KeyValue]) -> Result<(), CodecError> {
        let key = match attributes::serialize(tags) {
            Ok(key) => key,
            Err(e) => {
                self.codec_errors.fetch_add(1, Ordering::Relaxed);
                warn!(error = %e, value, "Dropping observation with unencodable tags");
                return Err(e);
            }
        };

        let seq = self.sequence.fetch_add(1, Ordering::Relaxed);
        self.values.insert(key, Stamped { seq, value });
        self.records.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    /// Visit and retire current entries.
    ///
    /// `visit` receives the decoded tags and the value; returning `false`
    /// stops the pass and leaves that entry and every unvisited one in place.
    pub fn drain<F>(&self, mut visit: F) -> DrainSummary
    where
        F: FnMut(Vec<KeyValue>, i64) -> bool,
    {
        let mut summary = DrainSummary::default();
        let keys: Vec<CanonicalKey> = self.values.iter().map(|e| e.key().clone()).collect();

        for key in keys {
            let Stamped { seq, value } = match self.values.get(&key) {
                Some(entry) => *entry.value(),
                None => continue,
            };

            let tags = match attributes::deserialize(key.as_str()) {
                Ok(tags) => tags,
                Err(e) => {
                    warn!(error = %e, key = %key, "Discarding gauge entry with undecodable key");
                    self.values.remove_if(&key, |_, current| current.seq == seq);
                    self.discarded.fetch_add(1, Ordering::Relaxed);
                    summary.discarded += 1;
                    continue;
                }
            };

            if !visit(tags, value) {
                summary.stopped = true;
                break;
            }

            self.values.remove_if(&key, |_, current| current.seq == seq);
            self.drained.fetch_add(1, Ordering::Relaxed);
            summary.visited += 1;
        }

        debug!(
            visited = summary.visited,
            discarded = summary.discarded,
            stopped = summary.stopped,
            remaining = self.values.len(),
            "Drained last-value store"
        );

        summary
    }

    /// Number of live entries
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if the store has no live entries
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Snapshot of the store counters
    pub fn stats(&self) -> StoreStats {
        StoreStats {
            records: self.records.load(Ordering::Relaxed),
            codec_errors: self.codec_errors.load(Ordering::Relaxed),
            drained: self.drained.load(Ordering::Relaxed),
            discarded: self.discarded.load(Ordering::Relaxed),
        }
    }

    #[cfg(test)]
    pub(crate) fn insert_raw(&self, key: &str, value: i64) {
        let seq = self.sequence.fetch_add(1, Ordering::Relaxed);
        self.values
            .insert(CanonicalKey::from_raw(key), Stamped { seq, value });
    }
}

// =============================================================================
// Tests
// =============================================================================
