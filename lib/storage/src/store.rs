use chrono::{DateTime, Utc};
use concursim_core::{Error, Filter, Record, RecordQuery, Result};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// Processing state of an uploaded record
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum RecordStatus {
    #[default]
    Pending,
    Processed,
    Error,
}

/// A record plus the bookkeeping the store keeps about it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoredRecord {
    pub record: Record,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub status: RecordStatus,
}

#[derive(Debug, Default)]
struct Inner {
    records: Vec<StoredRecord>,
    next_id: i64,
}

/// Ordered in-memory record store
///
/// Records keep insertion order, which is the order clustering sees them in.
/// Ids are assigned from 1 upwards when a record arrives without one.
#[derive(Clone)]
pub struct RecordStore {
    inner: Arc<RwLock<Inner>>,
}

impl Default for RecordStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(Inner { records: Vec::new(), next_id: 1 })),
        }
    }

    /// Rebuild a store from previously saved entries
    pub fn from_entries(mut entries: Vec<StoredRecord>) -> Self {
        let mut next_id = entries
            .iter()
            .filter_map(|e| e.record.id.and_then(|id| id.checked_add(1)))
            .fold(1, i64::max);
        for entry in entries.iter_mut() {
            if entry.record.id.is_none() {
                entry.record.id = Some(next_id);
                next_id = next_id.saturating_add(1);
            }
        }
        Self {
            inner: Arc::new(RwLock::new(Inner { records: entries, next_id })),
        }
    }

    /// Insert a record, returning its id
    ///
    /// A record carrying an id that is already stored replaces the old entry
    /// in place.
    pub fn insert(&self, record: Record) -> i64 {
        self.insert_with_status(record, RecordStatus::Processed)
    }

    pub fn insert_with_status(&self, mut record: Record, status: RecordStatus) -> i64 {
        let mut guard = self.inner.write();
        let inner = &mut *guard;

        let id = match record.id {
            Some(id) => id,
            None => inner.next_id,
        };
        record.id = Some(id);
        // An id of i64::MAX leaves the generator where it is
        if let Some(after) = id.checked_add(1) {
            inner.next_id = inner.next_id.max(after);
        }

        let entry = StoredRecord {
            record,
            created_at: Utc::now(),
            status,
        };
        let existing = inner.records.iter().position(|e| e.record.id == Some(id));
        match existing {
            Some(pos) => inner.records[pos] = entry,
            None => inner.records.push(entry),
        }
        debug!(id, total = inner.records.len(), "record stored");
        id
    }

    pub fn get(&self, id: i64) -> Option<Record> {
        self.inner
            .read()
            .records
            .iter()
            .find(|e| e.record.id == Some(id))
            .map(|e| e.record.clone())
    }

    pub fn status(&self, id: i64) -> Option<RecordStatus> {
        self.entry(id).map(|e| e.status)
    }

    /// The stored entry for `id`, with its bookkeeping
    pub fn entry(&self, id: i64) -> Option<StoredRecord> {
        self.inner
            .read()
            .records
            .iter()
            .find(|e| e.record.id == Some(id))
            .cloned()
    }

    pub fn set_status(&self, id: i64, status: RecordStatus) -> Result<()> {
        let mut inner = self.inner.write();
        let entry = inner
            .records
            .iter_mut()
            .find(|e| e.record.id == Some(id))
            .ok_or(Error::RecordNotFound(id))?;
        entry.status = status;
        Ok(())
    }

    pub fn remove(&self, id: i64) -> Result<Record> {
        let mut inner = self.inner.write();
        let pos = inner
            .records
            .iter()
            .position(|e| e.record.id == Some(id))
            .ok_or(Error::RecordNotFound(id))?;
        Ok(inner.records.remove(pos).record)
    }

    /// All records in insertion order
    pub fn list(&self) -> Vec<Record> {
        self.inner.read().records.iter().map(|e| e.record.clone()).collect()
    }

    /// Records passing `query`, in insertion order
    pub fn query(&self, query: &RecordQuery) -> Vec<Record> {
        self.inner
            .read()
            .records
            .iter()
            .filter(|e| query.matches(&e.record))
            .map(|e| e.record.clone())
            .collect()
    }

    /// Snapshot of every entry with its bookkeeping
    pub fn entries(&self) -> Vec<StoredRecord> {
        self.inner.read().records.clone()
    }

    pub fn len(&self) -> usize {
        self.inner.read().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use concursim_core::{BooleanFilterSet, FilterKey};
    use serde_json::json;

    fn record(name: &str) -> Record {
        Record::new(None, name, json!({"especialidad": name}))
    }

    #[test]
    fn test_ids_are_assigned_in_order() {
        let store = RecordStore::new();
        assert_eq!(store.insert(record("a")), 1);
        assert_eq!(store.insert(record("b")), 2);
        assert_eq!(store.len(), 2);
        let names: Vec<String> = store.list().into_iter().map(|r| r.filename).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_explicit_id_upserts_in_place() {
        let store = RecordStore::new();
        store.insert(record("a"));
        store.insert(Record::new(Some(10), "b", json!({})));
        assert_eq!(store.insert(record("c")), 11);

        store.insert(Record::new(Some(1), "a2", json!({})));
        assert_eq!(store.len(), 3);
        assert_eq!(store.list()[0].filename, "a2");
    }

    #[test]
    fn test_remove_and_status() {
        let store = RecordStore::new();
        let id = store.insert_with_status(record("a"), RecordStatus::Pending);
        assert_eq!(store.status(id), Some(RecordStatus::Pending));
        store.set_status(id, RecordStatus::Error).unwrap();
        assert_eq!(store.status(id), Some(RecordStatus::Error));

        assert_eq!(store.remove(id).unwrap().filename, "a");
        assert!(store.get(id).is_none());
        assert!(matches!(store.remove(id), Err(Error::RecordNotFound(1))));
        assert!(store.set_status(id, RecordStatus::Processed).is_err());
        assert!(store.is_empty());
    }

    #[test]
    fn test_query_filters() {
        let store = RecordStore::new();
        store.insert(Record::new(None, "x.pdf", json!({"bloques_detectados": {"pide_tasas": true}})));
        store.insert(Record::new(None, "y.pdf", json!({})));
        let query = RecordQuery {
            search: None,
            filters: BooleanFilterSet::default().with(FilterKey::PideTasas, Some(true)),
        };
        let hits = store.query(&query);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].filename, "x.pdf");
    }

    #[test]
    fn test_from_entries_continues_ids() {
        let store = RecordStore::new();
        store.insert(Record::new(Some(4), "a", json!({})));
        let mut entries = store.entries();
        entries.push(StoredRecord {
            record: record("b"),
            created_at: Utc::now(),
            status: RecordStatus::Pending,
        });

        let restored = RecordStore::from_entries(entries);
        assert_eq!(restored.get(5).map(|r| r.filename), Some("b".to_string()));
        assert_eq!(restored.insert(record("c")), 6);
    }

    #[test]
    fn test_max_id_does_not_overflow_generator() {
        let store = RecordStore::new();
        assert_eq!(store.insert(Record::new(Some(i64::MAX), "max", json!({}))), i64::MAX);
        assert_eq!(store.insert(record("a")), 1);
        assert_eq!(store.len(), 2);

        let mut entries = store.entries();
        entries.push(StoredRecord {
            record: record("b"),
            created_at: Utc::now(),
            status: RecordStatus::Pending,
        });
        let restored = RecordStore::from_entries(entries);
        assert_eq!(restored.get(2).map(|r| r.filename), Some("b".to_string()));
        assert_eq!(restored.insert(record("c")), 3);
        assert_eq!(restored.get(i64::MAX).map(|r| r.filename), Some("max".to_string()));
    }

    #[test]
    fn test_entry_exposes_bookkeeping() {
        let store = RecordStore::new();
        let id = store.insert_with_status(record("a"), RecordStatus::Pending);
        let entry = store.entry(id).unwrap();
        assert_eq!(entry.record.filename, "a");
        assert_eq!(entry.status, RecordStatus::Pending);
        assert!(store.entry(id + 1).is_none());
    }
}
