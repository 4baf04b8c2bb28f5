//! Clustering of vectorized records
//!
//! Two interchangeable strategies:
//!
//! - **Threshold**: single pass in input order. Each item joins the first
//!   cluster whose representative reaches the threshold, otherwise it opens
//!   a new cluster and becomes its representative. Representatives never
//!   change, so the result depends on input order.
//! - **Centroid-iterative**: deterministic k-means seeded with the first `k`
//!   items. Heuristic local optimum; `max_iterations` is a hard cap.
//!
//! Either way, clusters come back sorted by descending size, ties keeping
//! creation order.

use crate::config::{ClusterStrategy, EngineConfig};
use concursim_core::{cosine_similarity, Record, TermVector};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Number of example filenames kept per cluster
pub const MAX_EXAMPLES: usize = 3;
/// Number of top terms used for a cluster label
pub const LABEL_TERMS: usize = 4;
/// Upper bound on the number of centroids
pub const MAX_CENTROIDS: usize = 8;
/// Label used when neither terms nor summary text are available
pub const UNCLASSIFIED_LABEL: &str = "Sin clasificar";

/// A vectorized record as seen by the clustering engine
#[derive(Debug, Clone, Copy)]
pub struct ClusterItem<'a> {
    pub id: Option<i64>,
    pub filename: &'a str,
    pub vector: &'a TermVector,
}

/// A group of similar records
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClusterGroup {
    pub label: String,
    /// True member count, including members without an id
    pub size: usize,
    /// Ids of members in the order they joined
    pub member_ids: Vec<i64>,
    /// Up to [`MAX_EXAMPLES`] filenames, first encountered first
    pub examples: Vec<String>,
}

impl ClusterGroup {
    fn new(label: String) -> Self {
        Self {
            label,
            size: 0,
            member_ids: Vec::new(),
            examples: Vec::new(),
        }
    }

    fn push(&mut self, item: &ClusterItem<'_>) {
        self.size += 1;
        if let Some(id) = item.id {
            self.member_ids.push(id);
        }
        if self.examples.len() < MAX_EXAMPLES {
            self.examples.push(item.filename.to_string());
        }
    }
}

fn label_for(vector: &TermVector, summary: &str) -> String {
    let fallback = if summary.is_empty() { UNCLASSIFIED_LABEL } else { summary };
    let top = vector.top_terms(LABEL_TERMS);
    if top.is_empty() {
        fallback.to_string()
    } else {
        top.join(" ")
    }
}

fn sort_by_size(groups: &mut [ClusterGroup]) {
    // sort_by is stable, equal sizes keep creation order
    groups.sort_by(|a, b| b.size.cmp(&a.size));
}

/// Single-pass clustering against fixed representatives
pub fn cluster_by_threshold(items: &[ClusterItem<'_>], similarity_threshold: f64) -> Vec<ClusterGroup> {
    let mut clusters: Vec<(&TermVector, ClusterGroup)> = Vec::new();

    for item in items {
        let target = clusters
            .iter()
            .position(|(representative, _)| cosine_similarity(representative, item.vector) >= similarity_threshold);

        let idx = match target {
            Some(idx) => idx,
            None => {
                let label = label_for(item.vector, item.vector.summary());
                clusters.push((item.vector, ClusterGroup::new(label)));
                clusters.len() - 1
            }
        };
        clusters[idx].1.push(item);
    }

    let mut groups: Vec<ClusterGroup> = clusters.into_iter().map(|(_, group)| group).collect();
    sort_by_size(&mut groups);
    debug!(items = items.len(), clusters = groups.len(), similarity_threshold, "threshold clustering done");
    groups
}

/// Number of centroids for a corpus of `n` items: `round(sqrt(n / 2))` clamped to `[1, 8]`
pub fn centroid_count(n: usize) -> usize {
    let k = ((n as f64) / 2.0).sqrt().round() as usize;
    k.clamp(1, MAX_CENTROIDS)
}

/// Index of the most similar centroid, lowest index on ties
fn nearest_centroid(vector: &TermVector, centroids: &[TermVector]) -> usize {
    let mut best = 0;
    let mut best_score = f64::NEG_INFINITY;
    for (idx, centroid) in centroids.iter().enumerate() {
        let score = cosine_similarity(vector, centroid);
        if score > best_score {
            best_score = score;
            best = idx;
        }
    }
    best
}

/// Iterative centroid clustering seeded with the first `k` items
pub fn cluster_by_centroids(items: &[ClusterItem<'_>], max_iterations: usize) -> Vec<ClusterGroup> {
    if items.is_empty() {
        return Vec::new();
    }

    let k = centroid_count(items.len()).min(items.len());
    let mut centroids: Vec<TermVector> = items[..k].iter().map(|item| item.vector.clone()).collect();
    let mut assignments = vec![0usize; items.len()];
    let mut rounds = 0;

    for _ in 0..max_iterations {
        rounds += 1;
        let next: Vec<usize> = items
            .par_iter()
            .map(|item| nearest_centroid(item.vector, &centroids))
            .collect();

        let changed = next != assignments;
        assignments = next;
        if !changed {
            break;
        }

        for (c_idx, centroid) in centroids.iter_mut().enumerate() {
            let members: Vec<&TermVector> = items
                .iter()
                .zip(&assignments)
                .filter(|(_, assigned)| **assigned == c_idx)
                .map(|(item, _)| item.vector)
                .collect();
            // An empty centroid keeps its previous value
            if !members.is_empty() {
                *centroid = TermVector::mean(members);
            }
        }
    }

    // Buckets in order of first appearance
    let mut slot_of: Vec<Option<usize>> = vec![None; k];
    let mut groups: Vec<ClusterGroup> = Vec::new();
    for (item, &c_idx) in items.iter().zip(&assignments) {
        let slot = *slot_of[c_idx].get_or_insert_with(|| {
            groups.push(ClusterGroup::new(label_for(&centroids[c_idx], item.vector.summary())));
            groups.len() - 1
        });
        groups[slot].push(item);
    }

    sort_by_size(&mut groups);
    debug!(items = items.len(), k, rounds, clusters = groups.len(), "centroid clustering done");
    groups
}

/// Cluster items with the strategy chosen in `config`
///
/// The centroid strategy needs more than two items, smaller inputs fall back
/// to threshold clustering.
pub fn cluster_items(items: &[ClusterItem<'_>], config: &EngineConfig) -> Vec<ClusterGroup> {
    match config.strategy {
        ClusterStrategy::Kmeans if items.len() > 2 => cluster_by_centroids(items, config.max_iterations),
        _ => cluster_by_threshold(items, config.similarity_threshold),
    }
}

/// Vectors used for clustering, one per record, in input order
pub fn cluster_vectors(records: &[Record]) -> Vec<TermVector> {
    records
        .par_iter()
        .map(|record| TermVector::from_text(&record.cluster_text()))
        .collect()
}

/// Vectorize and cluster records
pub fn cluster_records(records: &[Record], config: &EngineConfig) -> Vec<ClusterGroup> {
    let vectors = cluster_vectors(records);
    let items: Vec<ClusterItem<'_>> = records
        .iter()
        .zip(&vectors)
        .map(|(record, vector)| ClusterItem {
            id: record.id,
            filename: &record.filename,
            vector,
        })
        .collect();
    cluster_items(&items, config)
}
