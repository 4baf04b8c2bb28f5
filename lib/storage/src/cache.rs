//! Content-keyed memoization of term vectors
//!
//! Vectors are a pure function of a record's content, so they are cached by
//! a SHA-256 digest of that content. An edited record gets a new key and the
//! stale entry is dropped on the next [`VectorCache::retain_records`].

use ahash::{AHashMap, AHashSet};
use concursim_core::{Record, TermVector};
use parking_lot::RwLock;
use sha2::{Digest, Sha256};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Which text of a record a vector was built from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VectorKind {
    /// Specialty / filename text used for clustering
    Cluster,
    /// Flattened attributes used for ranking
    Full,
}

impl VectorKind {
    fn build(self, record: &Record) -> TermVector {
        match self {
            VectorKind::Cluster => TermVector::from_text(&record.cluster_text()),
            VectorKind::Full => TermVector::from_value(&record.attributes),
        }
    }
}

type CacheKey = (VectorKind, [u8; 32]);

fn content_digest(record: &Record) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(record.filename.as_bytes());
    hasher.update([0u8]);
    hasher.update(record.attributes.to_string().as_bytes());
    hasher.finalize().into()
}

/// Hit and miss counters since creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
}

/// Thread-safe cache of derived term vectors
#[derive(Default)]
pub struct VectorCache {
    entries: RwLock<AHashMap<CacheKey, Arc<TermVector>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl VectorCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached vector for `record`, computing it on a miss
    pub fn get_or_compute(&self, record: &Record, kind: VectorKind) -> Arc<TermVector> {
        let key = (kind, content_digest(record));

        if let Some(vector) = self.entries.read().get(&key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return vector.clone();
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let vector = Arc::new(kind.build(record));
        self.entries.write().entry(key).or_insert(vector).clone()
    }

    /// Vectors for every record, in input order
    pub fn vectors(&self, records: &[Record], kind: VectorKind) -> Vec<Arc<TermVector>> {
        records.iter().map(|r| self.get_or_compute(r, kind)).collect()
    }

    /// Drop entries whose content no longer belongs to any of `records`
    pub fn retain_records(&self, records: &[Record]) -> usize {
        let live: AHashSet<[u8; 32]> = records.iter().map(content_digest).collect();
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|(_, digest), _| live.contains(digest));
        before - entries.len()
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}
