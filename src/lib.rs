//! # concursim
//!
//! Similarity engine for records extracted from scanned administrative forms.
//!
//! Each record is an arbitrary nested JSON document plus a filename and an
//! optional numeric id. concursim groups similar records without predefined
//! categories, ranks existing records against a new one, and reports the
//! tracked fields that changed between two documents.
//!
//! ## Quick Start
//!
//! ### As a Server
//!
//! ```bash
//! concursim --records records.json --http-port 6340
//! ```
//!
//! ### As a Library
//!
//! ```rust
//! use concursim::prelude::*;
//! use serde_json::json;
//!
//! let corpus = vec![
//!     Record::new(Some(1), "a.pdf", json!({"especialidad": "Bombero"})),
//!     Record::new(Some(2), "b.pdf", json!({"especialidad": "Bombero municipal"})),
//!     Record::new(Some(3), "c.pdf", json!({"especialidad": "Medicina interna"})),
//! ];
//!
//! // Group without predefined categories
//! let groups = cluster_records(&corpus, &EngineConfig::new(0.5, ClusterStrategy::Threshold));
//! assert_eq!(groups[0].member_ids, vec![1, 2]);
//!
//! // Rank the corpus against a new document, with field differences
//! let matches = compare_documents(&json!({"especialidad": "Bombero"}), &corpus);
//! assert_eq!(matches[0].id, 1);
//! ```
//!
//! ## Crate Structure
//!
//! - `concursim-core` - Records, normalization, term vectors, cosine similarity, filters
//! - `concursim-similarity` - Clustering, match ranking, diffing, benchmarks
//! - `concursim-storage` - Record store, vector cache, JSON persistence
//! - `concursim-api` - REST API

// Re-export core types
pub use concursim_core::{
    cosine_similarity, flatten_json, tokenize,
    BooleanFilterSet, Filter, FilterKey, Record, RecordQuery, TermVector, TextSearch,
    Error, Result,
};

// Re-export similarity engine
pub use concursim_similarity::{
    cluster_items, cluster_records, compare_documents, diff_documents, rank_similar,
    run_performance_matrix, run_similarity_benchmarks,
    BenchmarkResult, ClusterGroup, ClusterItem, ClusterStrategy, DiffSchema, DifferenceDetail,
    EngineConfig, MatchRanker, MatchResult,
};

// Re-export storage
pub use concursim_storage::{RecordStore, VectorCache, VectorKind};

// Re-export API
pub use concursim_api::{AppState, RestApi};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        cluster_records, compare_documents, diff_documents, rank_similar,
        BooleanFilterSet, ClusterGroup, ClusterStrategy, DifferenceDetail, EngineConfig,
        Filter, MatchRanker, MatchResult, Record, RecordQuery, RecordStore, TermVector,
    };
}
