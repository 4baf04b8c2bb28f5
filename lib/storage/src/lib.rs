//! # concursim Storage
//!
//! The record store the engine reads from, and a cache for the vectors
//! derived from its records.

pub mod cache;
pub mod persistence;
pub mod store;

pub use cache::{CacheStats, VectorCache, VectorKind};
pub use persistence::{load_store, save_store, StoreSnapshot};
pub use store::{RecordStatus, RecordStore, StoredRecord};
