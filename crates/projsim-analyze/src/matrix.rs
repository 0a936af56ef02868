//! Similarity matrix construction over every pair of projects.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use derive_builder::Builder;
use itertools::Itertools;
use rayon::prelude::*;
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::{info, warn};

use projsim_core::{PairResult, ProjectCatalog, ScanWarning, SimilarityMatrix};

use crate::compare::ProjectComparer;
use crate::progress::CompareProgress;

/// Configuration for matrix construction.
#[derive(Debug, Clone, Builder)]
#[builder(setter(into))]
pub struct MatrixConfig {
    /// Worker threads for pair comparison (0 = rayon's global pool).
    #[builder(default = "0")]
    pub threads: usize,
}

impl Default for MatrixConfig {
    fn default() -> Self {
        Self { threads: 0 }
    }
}

impl MatrixConfig {
    /// Create a new config builder.
    pub fn builder() -> MatrixConfigBuilder {
        MatrixConfigBuilder::default()
    }
}

/// Output of a matrix build.
#[derive(Debug, Clone, Serialize)]
pub struct MatrixReport {
    /// Symmetric score table over projects sorted by name.
    pub matrix: SimilarityMatrix,
    /// One result per distinct pair, in row-major `(i, j)`, `i < j` order.
    pub pairs: Vec<PairResult>,
    /// Warnings collected from every comparison.
    pub warnings: Vec<ScanWarning>,
    /// Time spent comparing.
    pub duration: Duration,
}

impl MatrixReport {
    /// Pairs classified as exact copies.
    pub fn exact_copies(&self) -> Vec<&PairResult> {
        self.pairs.iter().filter(|p| p.is_exact_copy).collect()
    }

    /// Pairs scoring strictly above `threshold`, most similar first.
    pub fn pairs_above(&self, threshold: f64) -> Vec<&PairResult> {
        let mut flagged: Vec<_> = self
            .pairs
            .iter()
            .filter(|p| p.similarity_percentage > threshold)
            .collect();
        flagged.sort_by(|a, b| b.similarity_percentage.total_cmp(&a.similarity_percentage));
        flagged
    }

    /// Look up the result for two project names, in either order.
    pub fn pair(&self, a: &str, b: &str) -> Option<&PairResult> {
        self.pairs
            .iter()
            .find(|p| (p.first == a && p.second == b) || (p.first == b && p.second == a))
    }
}

/// Builds a [`SimilarityMatrix`] by comparing every distinct pair once.
pub struct MatrixBuilder {
    config: MatrixConfig,
    comparer: ProjectComparer,
    progress_tx: broadcast::Sender<CompareProgress>,
}

impl MatrixBuilder {
    /// Create a builder with default config.
    pub fn new() -> Self {
        Self::with_config(MatrixConfig::default())
    }

    /// Create a builder with custom config.
    pub fn with_config(config: MatrixConfig) -> Self {
        let (progress_tx, _) = broadcast::channel(100);
        Self {
            config,
            comparer: ProjectComparer::new(),
            progress_tx,
        }
    }

    /// Subscribe to comparison progress updates.
    pub fn subscribe(&self) -> broadcast::Receiver<CompareProgress> {
        self.progress_tx.subscribe()
    }

    /// Compare all projects against each other.
    ///
    /// Projects are ordered by name. The diagonal is 100.0 without running a
    /// comparison; each distinct pair is compared exactly once and written to
    /// both `[i][j]` and `[j][i]`.
    pub fn build(&self, projects: &[ProjectCatalog]) -> MatrixReport {
        let start = Instant::now();

        let mut sorted: Vec<&ProjectCatalog> = projects.iter().collect();
        sorted.sort_by(|a, b| a.name.cmp(&b.name));

        let mut matrix = SimilarityMatrix::new(sorted.iter().map(|p| p.name.clone()).collect());
        let indices: Vec<(usize, usize)> = (0..sorted.len()).tuple_combinations().collect();
        let total_pairs = indices.len() as u64;

        info!(
            projects = sorted.len(),
            pairs = total_pairs,
            "Building similarity matrix"
        );

        let compared = AtomicU64::new(0);
        let compare_all = || {
            indices
                .par_iter()
                .map(|&(i, j)| {
                    let result = self.comparer.compare(sorted[i], sorted[j]);
                    let done = compared.fetch_add(1, Ordering::Relaxed) + 1;
                    let _ = self.progress_tx.send(CompareProgress {
                        pairs_compared: done,
                        total_pairs,
                        current: Some((result.first.clone(), result.second.clone())),
                        elapsed: start.elapsed(),
                    });
                    (i, j, result)
                })
                .collect::<Vec<_>>()
        };

        let results = match self.config.threads {
            0 => compare_all(),
            n => match rayon::ThreadPoolBuilder::new().num_threads(n).build() {
                Ok(pool) => pool.install(compare_all),
                Err(err) => {
                    warn!("Could not build a {n}-thread pool, using the global pool: {err}");
                    compare_all()
                }
            },
        };

        let mut pairs = Vec::with_capacity(results.len());
        let mut warnings = Vec::new();
        for (i, j, result) in results {
            matrix.set(i, j, result.similarity_percentage);
            warnings.extend(result.warnings.iter().cloned());
            pairs.push(result);
        }

        let duration = start.elapsed();
        info!(
            pairs = pairs.len(),
            elapsed_ms = duration.as_millis() as u64,
            "Similarity matrix complete"
        );

        MatrixReport {
            matrix,
            pairs,
            warnings,
            duration,
        }
    }
}

impl Default for MatrixBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use projsim_core::{FileDescriptor, Timestamps};
    use std::fs;
    use std::time::{Duration, SystemTime};
    use tempfile::TempDir;

    fn project(temp: &TempDir, name: &str, files: &[(&str, &str)]) -> ProjectCatalog {
        let root = temp.path().join(name);
        let stamp = SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000);
        let mut catalog = ProjectCatalog::new(name, &root);
        for (rel, content) in files {
            let path = root.join(rel);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(&path, content).unwrap();
            catalog.insert(FileDescriptor::new(
                *rel,
                &path,
                Timestamps::new(Some(stamp), Some(stamp)),
                content.len() as u64,
            ));
        }
        catalog
    }

    #[test]
    fn test_empty_input() {
        let report = MatrixBuilder::new().build(&[]);
        assert!(report.matrix.is_empty());
        assert!(report.pairs.is_empty());
    }

    #[test]
    fn test_single_project_needs_no_comparison() {
        let temp = TempDir::new().unwrap();
        let only = project(&temp, "solo", &[("a.txt", "x")]);

        let report = MatrixBuilder::new().build(&[only]);

        assert_eq!(report.matrix.get("solo", "solo"), Some(100.0));
        assert!(report.pairs.is_empty());
    }

    #[test]
    fn test_names_sorted_and_pairs_counted() {
        let temp = TempDir::new().unwrap();
        let projects = vec![
            project(&temp, "carol", &[("a.txt", "one")]),
            project(&temp, "alice", &[("a.txt", "one")]),
            project(&temp, "bob", &[("b.txt", "two")]),
            project(&temp, "dave", &[("a.txt", "uno")]),
        ];

        let report = MatrixBuilder::new().build(&projects);

        let names: Vec<_> = report.matrix.names().iter().map(|n| n.as_str()).collect();
        assert_eq!(names, vec!["alice", "bob", "carol", "dave"]);
        assert_eq!(report.pairs.len(), 6);
        assert_eq!(report.pairs[0].first, "alice");
        assert_eq!(report.pairs[0].second, "bob");
    }

    #[test]
    fn test_dedicated_pool() {
        let temp = TempDir::new().unwrap();
        let projects = vec![
            project(&temp, "a", &[("x.txt", "same")]),
            project(&temp, "b", &[("x.txt", "same")]),
        ];

        let builder = MatrixBuilder::with_config(MatrixConfig::builder().threads(2usize).build().unwrap());
        let report = builder.build(&projects);

        assert_eq!(report.matrix.get("a", "b"), Some(100.0));
        assert_eq!(report.exact_copies().len(), 1);
    }

    #[test]
    fn test_progress_updates() {
        let temp = TempDir::new().unwrap();
        let projects = vec![
            project(&temp, "a", &[("x.txt", "1")]),
            project(&temp, "b", &[("x.txt", "2")]),
            project(&temp, "c", &[("x.txt", "3")]),
        ];

        let builder = MatrixBuilder::new();
        let mut rx = builder.subscribe();
        builder.build(&projects);

        // Workers may deliver updates out of order; the furthest one counts.
        let mut furthest: Option<CompareProgress> = None;
        while let Ok(progress) = rx.try_recv() {
            if furthest
                .as_ref()
                .is_none_or(|f| progress.pairs_compared > f.pairs_compared)
            {
                furthest = Some(progress);
            }
        }
        let furthest = furthest.unwrap();
        assert_eq!(furthest.total_pairs, 3);
        assert!(furthest.is_complete());
    }
}
