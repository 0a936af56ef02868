//! Core types for projsim.
//!
//! This crate provides the data model shared by discovery and comparison:
//! file descriptors, project catalogs, pair results, the similarity matrix,
//! and the discovery configuration.

mod catalog;
mod config;
mod error;
mod result;

pub use catalog::{ContentHash, FileDescriptor, ProjectCatalog, Timestamps, relative_path};
pub use config::{
    DiscoveryConfig, DiscoveryConfigBuilder, DiscoveryMode, FileRules, file_extension,
};
pub use error::{DiscoveryError, ScanWarning, WarningKind};
pub use result::{FilePresence, FileScore, PairResult, SimilarityMatrix};
