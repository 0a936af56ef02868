//! Discovered files and projects.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use compact_str::CompactString;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// BLAKE3 content hash of a file's raw bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentHash(pub [u8; 32]);

impl ContentHash {
    /// Create a new ContentHash from raw bytes.
    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the hash as a hex string.
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }
}

/// File timestamps as reported by the filesystem.
///
/// `None` means the platform or filesystem did not provide the value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timestamps {
    /// Creation (birth) time.
    pub created: Option<SystemTime>,
    /// Last modification time.
    pub modified: Option<SystemTime>,
}

impl Timestamps {
    /// Create timestamps from optional values.
    pub fn new(created: Option<SystemTime>, modified: Option<SystemTime>) -> Self {
        Self { created, modified }
    }

    /// Read both timestamps from file metadata.
    pub fn from_metadata(metadata: &std::fs::Metadata) -> Self {
        Self {
            created: metadata.created().ok(),
            modified: metadata.modified().ok(),
        }
    }

    /// True only if both creation times are known and identical.
    pub fn same_created(&self, other: &Timestamps) -> bool {
        known_and_equal(self.created, other.created)
    }

    /// True only if both modification times are known and identical.
    pub fn same_modified(&self, other: &Timestamps) -> bool {
        known_and_equal(self.modified, other.modified)
    }
}

// An unknown timestamp never matches, not even another unknown one.
fn known_and_equal(a: Option<SystemTime>, b: Option<SystemTime>) -> bool {
    matches!((a, b), (Some(a), Some(b)) if a == b)
}

/// One file of a project that takes part in comparison.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileDescriptor {
    /// Path relative to the project root, always with `/` separators.
    pub relative_path: String,

    /// Location used to read the content later.
    pub absolute_path: PathBuf,

    /// Creation and modification times.
    pub timestamps: Timestamps,

    /// Size in bytes at discovery time.
    pub size: u64,

    /// Content hash (if computed during discovery).
    pub content_hash: Option<ContentHash>,
}

impl FileDescriptor {
    /// Create a new descriptor without a content hash.
    pub fn new(
        relative_path: impl Into<String>,
        absolute_path: impl Into<PathBuf>,
        timestamps: Timestamps,
        size: u64,
    ) -> Self {
        Self {
            relative_path: relative_path.into(),
            absolute_path: absolute_path.into(),
            timestamps,
            size,
            content_hash: None,
        }
    }

    /// Attach a content hash.
    pub fn with_hash(mut self, hash: ContentHash) -> Self {
        self.content_hash = Some(hash);
        self
    }

    /// File name component of the relative path.
    pub fn file_name(&self) -> &str {
        self.relative_path
            .rsplit('/')
            .next()
            .unwrap_or(&self.relative_path)
    }
}

/// Build a forward-slash relative path for `path` under `root`.
///
/// Returns `None` if `path` is not inside `root`.
pub fn relative_path(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let parts: Vec<_> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect();
    if parts.is_empty() {
        return None;
    }
    Some(parts.join("/"))
}

/// One discovered project and its comparable files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectCatalog {
    /// Name of the candidate directory the project was found in.
    pub name: CompactString,

    /// Detected project root.
    pub root: PathBuf,

    /// Files keyed by relative path, in discovery order.
    pub files: IndexMap<String, FileDescriptor>,
}

impl ProjectCatalog {
    /// Create an empty catalog.
    pub fn new(name: impl Into<CompactString>, root: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            root: root.into(),
            files: IndexMap::new(),
        }
    }

    /// Add a file, keyed by its relative path.
    ///
    /// A later descriptor with the same path replaces the earlier one.
    pub fn insert(&mut self, file: FileDescriptor) {
        self.files.insert(file.relative_path.clone(), file);
    }

    /// Look up a file by relative path.
    pub fn get(&self, relative_path: &str) -> Option<&FileDescriptor> {
        self.files.get(relative_path)
    }

    /// Number of catalogued files.
    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    /// Check if the catalog has no files.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Sum of catalogued file sizes.
    pub fn total_size(&self) -> u64 {
        self.files.values().map(|f| f.size).sum()
    }
}
