//! Comparison algorithms for projsim.
//!
//! This crate turns discovered project catalogs into similarity scores:
//!
//! - **Normalization** - make text comparison blind to indentation, trailing
//!   whitespace, line endings and blank-line runs
//! - **Pairwise comparison** - weighted per-file score over the union of both
//!   projects' relative paths
//! - **Similarity matrix** - every distinct pair compared once, in parallel,
//!   written symmetrically
//!
//! # Pairwise Comparison
//!
//! ```rust,ignore
//! use projsim_analyze::ProjectComparer;
//!
//! let result = ProjectComparer::new().compare(&alice, &bob);
//! if result.is_exact_copy {
//!     println!("{} and {} are exact copies", result.first, result.second);
//! } else {
//!     println!("{:.2}% similar", result.similarity_percentage);
//! }
//! ```
//!
//! # Similarity Matrix
//!
//! ```rust,ignore
//! use projsim_analyze::MatrixBuilder;
//! use projsim_scan::{DiscoveryConfig, DiscoveryMode, ProjectFinder};
//!
//! let config = DiscoveryConfig::new("/path/to/submissions", DiscoveryMode::Marker);
//! let discovery = ProjectFinder::new().discover(&config).unwrap();
//!
//! let report = MatrixBuilder::new().build(&discovery.projects);
//! for pair in report.pairs_above(20.0) {
//!     println!("{} / {}: {:.2}%", pair.first, pair.second, pair.similarity_percentage);
//! }
//! ```

pub mod compare;
mod matrix;
mod normalize;
mod progress;

pub use compare::{
    ProjectComparer, WEIGHT_CONTENT, WEIGHT_CREATION, WEIGHT_MODIFICATION, text_similarity,
    weighted_score,
};
pub use matrix::{MatrixBuilder, MatrixConfig, MatrixConfigBuilder, MatrixReport};
pub use normalize::normalize;
pub use progress::CompareProgress;

pub use projsim_core::{FilePresence, FileScore, PairResult, SimilarityMatrix};
