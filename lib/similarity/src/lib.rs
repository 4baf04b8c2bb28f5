//! # concursim Similarity
//!
//! Grouping, ranking and diffing of extracted records.
//!
//! ## Features
//!
//! - **Clustering**: threshold (single pass) and centroid-iterative strategies
//! - **Match ranking**: top matches for a newly supplied document
//! - **Diffing**: tracked-field differences between two documents
//! - **Benchmarks**: timed sweeps over thresholds and strategies
//!
//! ## Example
//!
//! ```rust
//! use concursim_core::Record;
//! use concursim_similarity::{cluster_records, rank_similar, ClusterStrategy, EngineConfig};
//! use serde_json::json;
//!
//! let corpus = vec![
//!     Record::new(Some(1), "a.pdf", json!({"especialidad": "Bombero"})),
//!     Record::new(Some(2), "b.pdf", json!({"especialidad": "Bombero municipal"})),
//!     Record::new(Some(3), "c.pdf", json!({"especialidad": "Medicina interna"})),
//! ];
//!
//! let groups = cluster_records(&corpus, &EngineConfig::new(0.5, ClusterStrategy::Threshold));
//! assert_eq!(groups.len(), 2);
//!
//! let matches = rank_similar(&json!({"especialidad": "bombero"}), &corpus);
//! assert_eq!(matches.len(), 2);
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   Records   │────>│ Normalizer  │────>│ TermVector  │
//! │   (JSON)    │     │ (flatten)   │     │  (tf map)   │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!       │                                   │        │
//!       │              ┌─────────────┐      │        │
//!       │              │  Clustering │<─────┘        │
//!       │              └─────────────┘               │
//!       │              ┌─────────────┐               │
//!       ├─────────────>│   Ranker    │<──────────────┘
//!       │              └─────────────┘
//!       │              ┌─────────────┐
//!       └─────────────>│    Diff     │
//!                      └─────────────┘
//! ```

pub mod benchmark;
pub mod cluster;
pub mod config;
pub mod diff;
pub mod rank;

// Re-export main types for convenience
pub use benchmark::{run_performance_matrix, run_similarity_benchmarks, thresholds_around, BenchmarkResult};
pub use cluster::{
    cluster_by_centroids, cluster_by_threshold, cluster_items, cluster_records, cluster_vectors,
    ClusterGroup, ClusterItem,
};
pub use config::{ClusterStrategy, ConfigError, EngineConfig};
pub use diff::{diff_documents, DiffSchema, DifferenceDetail, FieldValue, TrackedField, ValueFormat};
pub use rank::{compare_documents, corpus_vectors, rank_similar, MatchRanker, MatchResult};
