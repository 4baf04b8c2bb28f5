//! Timing sweeps over clustering parameters
//!
//! Used to pick a threshold interactively: each run clusters the same corpus
//! and reports how many groups came out and how long it took.

use crate::cluster::{cluster_items, cluster_vectors, ClusterItem};
use crate::config::{ClusterStrategy, EngineConfig, RECOMMENDED_THRESHOLD_RANGE};
use concursim_core::Record;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::info;

/// Thresholds swept by [`run_performance_matrix`]
pub const MATRIX_THRESHOLDS: [f64; 4] = [0.4, 0.5, 0.6, 0.7];

/// One timed clustering run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BenchmarkResult {
    pub strategy: ClusterStrategy,
    pub threshold: f64,
    pub duration_ms: f64,
    pub clusters: usize,
}

/// `threshold` and its neighbours 0.1 apart, kept within the recommended range
pub fn thresholds_around(threshold: f64) -> [f64; 3] {
    let (lo, hi) = RECOMMENDED_THRESHOLD_RANGE;
    [(threshold - 0.1).max(lo), threshold, (threshold + 0.1).min(hi)]
}

/// Cluster `records` once per threshold with a fixed strategy
///
/// Vectorization happens once up front and is not part of the timings.
pub fn run_similarity_benchmarks(
    records: &[Record],
    thresholds: &[f64],
    strategy: ClusterStrategy,
) -> Vec<BenchmarkResult> {
    let runs: Vec<(ClusterStrategy, f64)> = thresholds.iter().map(|&t| (strategy, t)).collect();
    run_grid(records, &runs)
}

/// Sweep [`MATRIX_THRESHOLDS`] against both strategies, logging every run
pub fn run_performance_matrix(records: &[Record]) -> Vec<BenchmarkResult> {
    let runs: Vec<(ClusterStrategy, f64)> = MATRIX_THRESHOLDS
        .iter()
        .flat_map(|&t| ClusterStrategy::ALL.into_iter().map(move |s| (s, t)))
        .collect();

    let results = run_grid(records, &runs);
    for r in &results {
        info!(
            "Cluster strategy: {}, threshold: {:.0}%, duration: {:.2}ms, clusters: {}",
            r.strategy,
            r.threshold * 100.0,
            r.duration_ms,
            r.clusters
        );
    }
    results
}

fn run_grid(records: &[Record], runs: &[(ClusterStrategy, f64)]) -> Vec<BenchmarkResult> {
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

    runs.iter()
        .map(|&(strategy, threshold)| {
            let config = EngineConfig::new(threshold, strategy);
            let start = Instant::now();
            let groups = cluster_items(&items, &config);
            let duration_ms = start.elapsed().as_secs_f64() * 1000.0;
            BenchmarkResult {
                strategy,
                threshold,
                duration_ms,
                clusters: groups.len(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn records() -> Vec<Record> {
        ["Bombero", "Bombero municipal", "Medicina interna", "Medicina", "Auxiliar administrativo"]
            .iter()
            .enumerate()
            .map(|(i, s)| Record::new(Some(i as i64), format!("{}.pdf", i), json!({ "especialidad": s })))
            .collect()
    }

    #[test]
    fn test_thresholds_around() {
        let t = thresholds_around(0.6);
        assert!((t[0] - 0.5).abs() < 1e-9);
        assert_eq!(t[1], 0.6);
        assert!((t[2] - 0.7).abs() < 1e-9);
        let low = thresholds_around(0.3);
        assert_eq!(low[0], 0.3);
        assert!((low[2] - 0.4).abs() < 1e-9);
        assert_eq!(thresholds_around(0.9)[2], 0.9);
    }

    #[test]
    fn test_similarity_benchmarks_one_run_per_threshold() {
        let results = run_similarity_benchmarks(&records(), &[0.5, 0.95], ClusterStrategy::Threshold);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].threshold, 0.5);
        assert_eq!(results[0].clusters, 3);
        assert_eq!(results[1].clusters, 5);
        assert!(results.iter().all(|r| r.duration_ms >= 0.0 && r.strategy == ClusterStrategy::Threshold));
    }

    #[test]
    fn test_performance_matrix_covers_grid() {
        let results = run_performance_matrix(&records());
        assert_eq!(results.len(), MATRIX_THRESHOLDS.len() * 2);
        assert_eq!(results[0].strategy, ClusterStrategy::Threshold);
        assert_eq!(results[1].strategy, ClusterStrategy::Kmeans);
        assert_eq!(results[1].threshold, 0.4);
    }

    #[test]
    fn test_empty_corpus() {
        let results = run_similarity_benchmarks(&[], &[0.6], ClusterStrategy::Kmeans);
        assert_eq!(results[0].clusters, 0);
    }
}
