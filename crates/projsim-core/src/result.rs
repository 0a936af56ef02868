//! Comparison outcomes.

use compact_str::CompactString;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::ScanWarning;

/// Which side(s) of a pair a relative path was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilePresence {
    /// Present in both projects.
    Both,
    /// Present only in the first project.
    FirstOnly,
    /// Present only in the second project.
    SecondOnly,
}

/// Per-path breakdown of a pair comparison.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileScore {
    /// Relative path shared by (or unique to) the projects.
    pub relative_path: String,
    /// Where the path was found.
    pub presence: FilePresence,
    /// Normalized text similarity, 0.0 to 1.0.
    pub content: f64,
    /// 1.0 if creation times are known and equal.
    pub creation: f64,
    /// 1.0 if modification times are known and equal.
    pub modification: f64,
    /// Weighted score, 0.0 to 1.0 (0.0 when present on one side only).
    pub score: f64,
}

impl FileScore {
    /// Score for a path that exists in only one project.
    pub fn missing(relative_path: impl Into<String>, presence: FilePresence) -> Self {
        Self {
            relative_path: relative_path.into(),
            presence,
            content: 0.0,
            creation: 0.0,
            modification: 0.0,
            score: 0.0,
        }
    }

    /// Check if every factor matched perfectly.
    pub fn is_perfect(&self) -> bool {
        self.presence == FilePresence::Both
            && self.content == 1.0
            && self.creation == 1.0
            && self.modification == 1.0
    }
}

/// Outcome of comparing two projects.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PairResult {
    /// Name of the first project.
    pub first: CompactString,
    /// Name of the second project.
    pub second: CompactString,
    /// Identical file sets with identical content and timestamps.
    pub is_exact_copy: bool,
    /// Aggregate weighted similarity, 0.0 to 100.0.
    pub similarity_percentage: f64,
    /// Per-path scores, sorted by relative path.
    pub files: Vec<FileScore>,
    /// Problems met while reading content.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<ScanWarning>,
}

impl PairResult {
    /// Number of paths present in both projects.
    pub fn shared_files(&self) -> usize {
        self.files
            .iter()
            .filter(|f| f.presence == FilePresence::Both)
            .count()
    }

    /// Look up the score of one relative path.
    pub fn file(&self, relative_path: &str) -> Option<&FileScore> {
        self.files.iter().find(|f| f.relative_path == relative_path)
    }
}

/// Symmetric similarity table over projects sorted by name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimilarityMatrix {
    names: Vec<CompactString>,
    scores: Vec<Vec<f64>>,
}

impl SimilarityMatrix {
    /// Create a matrix with 100.0 on the diagonal and 0.0 elsewhere.
    pub fn new(names: Vec<CompactString>) -> Self {
        let n = names.len();
        let scores = (0..n)
            .map(|i| (0..n).map(|j| if i == j { 100.0 } else { 0.0 }).collect())
            .collect();
        Self { names, scores }
    }

    /// Write a score into both `[i][j]` and `[j][i]`.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of range.
    pub fn set(&mut self, i: usize, j: usize, value: f64) {
        self.scores[i][j] = value;
        self.scores[j][i] = value;
    }

    /// Project names in row/column order.
    pub fn names(&self) -> &[CompactString] {
        &self.names
    }

    /// Number of projects.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Check if the matrix has no projects.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Position of a project name.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    /// Score by position.
    pub fn score(&self, i: usize, j: usize) -> Option<f64> {
        self.scores.get(i)?.get(j).copied()
    }

    /// Score by project names.
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        self.score(self.index_of(a)?, self.index_of(b)?)
    }

    /// One row of the table.
    pub fn row(&self, i: usize) -> Option<&[f64]> {
        self.scores.get(i).map(Vec::as_slice)
    }

    /// Name-keyed view of the table: row name → column name → percentage.
    pub fn to_nested_map(&self) -> IndexMap<String, IndexMap<String, f64>> {
        self.names
            .iter()
            .zip(&self.scores)
            .map(|(row_name, row)| {
                let cols = self
                    .names
                    .iter()
                    .zip(row)
                    .map(|(col_name, score)| (col_name.to_string(), *score))
                    .collect();
                (row_name.to_string(), cols)
            })
            .collect()
    }
}
