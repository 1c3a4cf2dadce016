//! Path-keyed attribute cache.
//!
//! One entry per canonical member path. Entries are either attributes
//! confirmed by the host or an explicit confirmed-absent marker; there is
//! no TTL. Staleness is bounded by editor lifecycle events (document
//! close, disconnect) and explicit provider invalidation, not by time.

use dashmap::DashMap;

use qsysfs_types::FileAttr;

/// Cached state for one path.
#[derive(Debug, Clone)]
enum CachedStat {
    /// The host reported these attributes.
    Present(FileAttr),
    /// The host confirmed the object does not exist.
    Absent,
}

/// Result of a cache lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum CacheLookup {
    /// Attributes cached from a prior successful query.
    Hit(FileAttr),
    /// A prior query confirmed the object does not exist.
    ConfirmedAbsent,
    /// Never queried since the last invalidation.
    Miss,
}

/// In-memory stat cache, shared across all provider operations.
#[derive(Debug, Default)]
pub struct StatCache {
    entries: DashMap<String, CachedStat>,
}

impl StatCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a path.
    pub fn get(&self, path: &str) -> CacheLookup {
        match self.entries.get(path).map(|e| e.value().clone()) {
            Some(CachedStat::Present(attr)) => CacheLookup::Hit(attr),
            Some(CachedStat::Absent) => CacheLookup::ConfirmedAbsent,
            None => CacheLookup::Miss,
        }
    }

    /// Record attributes reported by the host.
    pub fn insert(&self, path: impl Into<String>, attr: FileAttr) {
        self.entries.insert(path.into(), CachedStat::Present(attr));
    }

    /// Record a confirmed-absent result. Only explicit invalidation evicts
    /// this marker; a later successful creation must clear it.
    pub fn insert_absent(&self, path: impl Into<String>) {
        self.entries.insert(path.into(), CachedStat::Absent);
    }

    /// Invalidate one path.
    pub fn clear(&self, path: &str) {
        self.entries.remove(path);
    }

    /// Invalidate everything (connection dropped, global clear command).
    pub fn clear_all(&self) {
        self.entries.clear();
    }

    /// Number of cached entries, negative markers included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
