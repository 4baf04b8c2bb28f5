// JSON persistence for the record store
use anyhow::{Context, Result};
use atomicwrites::{AtomicFile, OverwriteBehavior};
use concursim_core::Record;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;
use tracing::info;
use crate::store::{RecordStore, StoredRecord};

/// On-disk layout written by [`save_store`]
#[derive(Debug, Serialize, Deserialize)]
pub struct StoreSnapshot {
    pub version: u32,
    pub records: Vec<StoredRecord>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StoreFile {
    Snapshot(StoreSnapshot),
    Plain(Vec<Record>),
}

/// Load a store from `path`
///
/// Accepts either a snapshot written by [`save_store`] or a plain JSON array
/// of records (as exported by the ingestion side).
pub fn load_store<P: AsRef<Path>>(path: P) -> Result<RecordStore> {
    let path = path.as_ref();
    let data = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let file: StoreFile = serde_json::from_slice(&data)
        .with_context(|| format!("parsing records from {}", path.display()))?;

    let store = match file {
        StoreFile::Snapshot(snapshot) => RecordStore::from_entries(snapshot.records),
        StoreFile::Plain(records) => {
            let store = RecordStore::new();
            for record in records {
                store.insert(record);
            }
            store
        }
    };

    info!("Loaded {} records from {:?}", store.len(), path);
    Ok(store)
}

/// Atomically write every entry of `store` to `path`
pub fn save_store<P: AsRef<Path>>(store: &RecordStore, path: P) -> Result<()> {
    let path = path.as_ref();
    let snapshot = StoreSnapshot {
        version: 1,
        records: store.entries(),
    };
    let json_data = serde_json::to_vec_pretty(&snapshot)?;

    let file = AtomicFile::new(path, OverwriteBehavior::AllowOverwrite);
    file.write(|f| f.write_all(&json_data))
        .with_context(|| format!("writing {}", path.display()))?;

    info!("Saved {} records to {:?}", snapshot.records.len(), path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::RecordStatus;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn test_save_and_load_snapshot() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("records.json");

        let store = RecordStore::new();
        store.insert(Record::new(None, "a.pdf", json!({"especialidad": "Bombero"})));
        let id = store.insert_with_status(Record::new(None, "b.pdf", json!({})), RecordStatus::Error);
        save_store(&store, &path).unwrap();

        let loaded = load_store(&path).unwrap();
        assert_eq!(loaded.list(), store.list());
        assert_eq!(loaded.status(id), Some(RecordStatus::Error));
        assert_eq!(loaded.insert(Record::new(None, "c.pdf", json!({}))), 3);
    }

    #[test]
    fn test_load_plain_export() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("export.json");
        std::fs::write(
            &path,
            r#"[
                {"id": 3, "nombre_archivo": "x.pdf", "json_datos": {"especialidad": "Medicina"}},
                {"filename": "y.pdf", "attributes": {}}
            ]"#,
        )
        .unwrap();

        let store = load_store(&path).unwrap();
        let records = store.list();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, Some(3));
        assert_eq!(records[0].specialty(), "Medicina");
        assert_eq!(records[1].id, Some(4));
    }

    #[test]
    fn test_load_errors() {
        let dir = tempdir().unwrap();
        assert!(load_store(dir.path().join("missing.json")).is_err());

        let bad = dir.path().join("bad.json");
        std::fs::write(&bad, "{not json").unwrap();
        assert!(load_store(&bad).is_err());
    }
}
