//! # concursim Core
//!
//! Core library for the concursim similarity engine.
//!
//! This crate provides the leaf components every query is built from:
//!
//! - [`Record`] - A form extracted into an arbitrary JSON document, plus filename and id
//! - [`flatten_json`] - Text normalization of nested JSON values
//! - [`TermVector`] - Bag-of-words term-frequency vector
//! - [`cosine_similarity`] - Cosine similarity between two term vectors
//! - [`BooleanFilterSet`] - Tri-state filters over the detected blocks of a record
//!
//! ## Example
//!
//! ```rust
//! use concursim_core::{Record, TermVector, cosine_similarity};
//! use serde_json::json;
//!
//! let a = Record::new(Some(1), "a.pdf", json!({"especialidad": "Bombero"}));
//! let b = Record::new(Some(2), "b.pdf", json!({"especialidad": "Bombero municipal"}));
//!
//! let va = TermVector::from_value(&a.attributes);
//! let vb = TermVector::from_value(&b.attributes);
//! assert!(cosine_similarity(&va, &vb) > 0.5);
//! ```

pub mod error;
pub mod filter;
pub mod normalize;
pub mod record;
pub mod vector;

pub use error::{Error, Result};
pub use filter::{BooleanFilterSet, Filter, FilterKey, RecordQuery, TextSearch};
pub use normalize::{flatten_json, flatten_json_with, normalize_text, NormalizerLimits};
pub use record::{extract_specialty, is_truthy, Record};
pub use vector::{cosine_similarity, tokenize, TermVector};
