//! Project discovery engine for projsim.
//!
//! This crate turns a parent directory full of submissions into a list of
//! [`ProjectCatalog`]s, one per candidate subdirectory that contains a
//! recognisable project root.
//!
//! # Overview
//!
//! - **Root detection** by build marker (`pom.xml`, `build.gradle`, ...) or by
//!   the first markup page, searched a few levels deep
//! - **Filtering** by excluded directories, excluded names and extensions, and
//!   an allow-list of relevant extensions
//! - **Metadata capture**: forward-slash relative paths, creation and
//!   modification times, optional BLAKE3 content hashes
//!
//! # Example
//!
//! ```rust,no_run
//! use projsim_scan::{DiscoveryConfig, DiscoveryMode, ProjectFinder};
//!
//! let config = DiscoveryConfig::new("/path/to/submissions", DiscoveryMode::Marker);
//! let discovery = ProjectFinder::new().discover(&config).unwrap();
//!
//! for project in &discovery.projects {
//!     println!("{}: {} files", project.name, project.file_count());
//! }
//! ```

mod finder;
mod hash;

pub use finder::{Discovery, ProjectFinder, catalog_files, locate_root};
pub use hash::hash_file;

// Re-export core types for convenience
pub use projsim_core::{
    DiscoveryConfig, DiscoveryError, DiscoveryMode, FileDescriptor, FileRules, ProjectCatalog,
    ScanWarning, Timestamps, WarningKind,
};
