//! Comparison progress reporting.

use std::time::Duration;

use compact_str::CompactString;

/// Progress information while a similarity matrix is being built.
#[derive(Debug, Clone)]
pub struct CompareProgress {
    /// Distinct pairs compared so far.
    pub pairs_compared: u64,
    /// Distinct pairs to compare in total.
    pub total_pairs: u64,
    /// Pair that just finished.
    pub current: Option<(CompactString, CompactString)>,
    /// Time elapsed since the build started.
    pub elapsed: Duration,
}

impl CompareProgress {
    /// Create initial progress state.
    pub fn new(total_pairs: u64) -> Self {
        Self {
            pairs_compared: 0,
            total_pairs,
            current: None,
            elapsed: Duration::ZERO,
        }
    }

    /// Fraction of pairs done, 0.0 to 1.0.
    pub fn fraction(&self) -> f64 {
        if self.total_pairs == 0 {
            1.0
        } else {
            self.pairs_compared as f64 / self.total_pairs as f64
        }
    }

    /// Calculate rate in pairs per second.
    pub fn pairs_per_second(&self) -> f64 {
        if self.elapsed.as_secs_f64() > 0.0 {
            self.pairs_compared as f64 / self.elapsed.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Check if every pair has been compared.
    pub fn is_complete(&self) -> bool {
        self.pairs_compared >= self.total_pairs
    }
}
