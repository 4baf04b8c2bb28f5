//! Match ranking for a newly supplied document
//!
//! Scores every corpus record by cosine similarity between the flattened
//! attributes of both documents and keeps the best strictly positive matches.

use crate::diff::{DiffSchema, DifferenceDetail};
use concursim_core::{cosine_similarity, Record, TermVector};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// Maximum number of matches returned
pub const DEFAULT_MATCH_LIMIT: usize = 10;

/// A corpus record ranked against a query document
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatchResult {
    /// Record id, 0 when the record has none
    pub id: i64,
    pub filename: String,
    /// Cosine similarity in (0, 1]
    pub score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specialty_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub differences: Option<Vec<DifferenceDetail>>,
}

/// Ranks corpus records against a query document
#[derive(Debug, Clone)]
pub struct MatchRanker {
    limit: usize,
    diff_schema: DiffSchema,
}

impl Default for MatchRanker {
    fn default() -> Self {
        Self::new()
    }
}

impl MatchRanker {
    pub fn new() -> Self {
        Self {
            limit: DEFAULT_MATCH_LIMIT,
            diff_schema: DiffSchema::default(),
        }
    }

    #[must_use]
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    #[must_use]
    pub fn with_diff_schema(mut self, diff_schema: DiffSchema) -> Self {
        self.diff_schema = diff_schema;
        self
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Get a reference to the tracked-field table used by [`compare`](Self::compare)
    pub fn diff_schema(&self) -> &DiffSchema {
        &self.diff_schema
    }

    /// Rank `corpus` by similarity to `new_doc`
    ///
    /// Returns an empty list when the document normalizes to empty text.
    pub fn rank(&self, new_doc: &Value, corpus: &[Record]) -> Vec<MatchResult> {
        let query = TermVector::from_value(new_doc);
        if query.summary().is_empty() {
            return Vec::new();
        }
        let vectors = corpus_vectors(corpus);
        self.rank_candidates(&query, corpus.iter().zip(&vectors))
    }

    /// Like [`rank`](Self::rank), with the tracked-field differences between
    /// `new_doc` and each matched record attached
    pub fn compare(&self, new_doc: &Value, corpus: &[Record]) -> Vec<MatchResult> {
        let query = TermVector::from_value(new_doc);
        if query.summary().is_empty() {
            return Vec::new();
        }
        let vectors = corpus_vectors(corpus);
        self.compare_candidates(new_doc, &query, corpus.iter().zip(&vectors))
    }

    /// Rank records whose vectors were computed ahead of time
    pub fn rank_candidates<'r, I>(&self, query: &TermVector, candidates: I) -> Vec<MatchResult>
    where
        I: IntoIterator<Item = (&'r Record, &'r TermVector)>,
    {
        self.top_matches(query, candidates)
            .into_iter()
            .map(|(record, score)| to_result(record, score, None))
            .collect()
    }

    /// Compare against records whose vectors were computed ahead of time
    pub fn compare_candidates<'r, I>(&self, new_doc: &Value, query: &TermVector, candidates: I) -> Vec<MatchResult>
    where
        I: IntoIterator<Item = (&'r Record, &'r TermVector)>,
    {
        self.top_matches(query, candidates)
            .into_iter()
            .map(|(record, score)| {
                let differences = self.diff_schema.diff(new_doc, &record.attributes);
                to_result(record, score, Some(differences))
            })
            .collect()
    }

    fn top_matches<'r, I>(&self, query: &TermVector, candidates: I) -> Vec<(&'r Record, f64)>
    where
        I: IntoIterator<Item = (&'r Record, &'r TermVector)>,
    {
        if query.summary().is_empty() {
            return Vec::new();
        }

        let mut scored: Vec<(&Record, f64)> = candidates
            .into_iter()
            .map(|(record, vector)| (record, cosine_similarity(query, vector)))
            .filter(|(_, score)| *score > 0.0)
            .collect();
        let positive = scored.len();

        // Sort by score descending, stable for equal scores
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(self.limit);

        debug!(positive, returned = scored.len(), "ranked corpus against query");
        scored
    }
}

fn to_result(record: &Record, score: f64, differences: Option<Vec<DifferenceDetail>>) -> MatchResult {
    MatchResult {
        id: record.id.unwrap_or(0),
        filename: record.filename.clone(),
        score,
        specialty_label: Some(record.specialty()),
        differences,
    }
}

/// Vectors used for ranking, one per record, from the flattened attributes
pub fn corpus_vectors(corpus: &[Record]) -> Vec<TermVector> {
    corpus
        .par_iter()
        .map(|record| TermVector::from_value(&record.attributes))
        .collect()
}

/// Rank with the default limit of [`DEFAULT_MATCH_LIMIT`]
pub fn rank_similar(new_doc: &Value, corpus: &[Record]) -> Vec<MatchResult> {
    MatchRanker::new().rank(new_doc, corpus)
}

/// Rank with differences attached, default limit and tracked fields
pub fn compare_documents(new_doc: &Value, corpus: &[Record]) -> Vec<MatchResult> {
    MatchRanker::new().compare(new_doc, corpus)
}
