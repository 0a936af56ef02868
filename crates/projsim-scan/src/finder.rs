//! Project discovery: locating project roots and cataloguing their files.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use jwalk::{Parallelism, WalkDir};
use serde::Serialize;
use tracing::{debug, info, warn};

use projsim_core::{
    DiscoveryConfig, DiscoveryError, DiscoveryMode, FileDescriptor, FileRules, ProjectCatalog,
    ScanWarning, Timestamps, WarningKind, relative_path,
};

use crate::hash::hash_file;

/// Result of a discovery run.
#[derive(Debug, Clone, Serialize)]
pub struct Discovery {
    /// Discovered projects, sorted by name.
    pub projects: Vec<ProjectCatalog>,
    /// Number of candidate directories examined.
    pub candidates: usize,
    /// Non-fatal problems met along the way.
    pub warnings: Vec<ScanWarning>,
    /// Time spent discovering.
    pub duration: Duration,
}

impl Discovery {
    /// Check if there were any warnings.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Look up a project by name.
    pub fn project(&self, name: &str) -> Option<&ProjectCatalog> {
        self.projects.iter().find(|p| p.name == name)
    }
}

/// Finds projects inside the immediate subdirectories of a parent directory.
#[derive(Debug, Default)]
pub struct ProjectFinder;

impl ProjectFinder {
    /// Create a new finder.
    pub fn new() -> Self {
        Self
    }

    /// Discover every project under `config.parent`.
    ///
    /// Only an unusable parent directory is an error. Problems with single
    /// candidates or files are recorded as warnings and skipped.
    pub fn discover(&self, config: &DiscoveryConfig) -> Result<Discovery, DiscoveryError> {
        let start = Instant::now();

        if config.root_search_depth == 0 {
            return Err(DiscoveryError::InvalidConfig {
                message: "root search depth must be at least 1".to_string(),
            });
        }

        let parent = config
            .parent
            .canonicalize()
            .map_err(|e| DiscoveryError::io(&config.parent, e))?;
        if !parent.is_dir() {
            return Err(DiscoveryError::NotADirectory { path: parent });
        }

        let rules = Arc::new(config.rules.clone().normalized());
        let mut warnings = Vec::new();

        let candidates = list_candidates(&parent, &mut warnings)?;
        info!(
            parent = %parent.display(),
            candidates = candidates.len(),
            mode = %config.mode,
            "Discovering projects"
        );

        let mut projects = Vec::new();
        for candidate in &candidates {
            let Some(name) = candidate.file_name().map(|n| n.to_string_lossy().to_string()) else {
                continue;
            };

            let Some(root) = locate_root(
                candidate,
                config.mode,
                config.root_search_depth,
                &rules,
                &mut warnings,
            ) else {
                debug!(candidate = %candidate.display(), "No project root found, skipping");
                continue;
            };

            info!(project = %name, root = %root.display(), "Found project");

            let mut catalog = ProjectCatalog::new(name, &root);
            for file in catalog_files(&root, &rules, config.compute_hashes, &mut warnings) {
                catalog.insert(file);
            }

            if catalog.is_empty() {
                record(&mut warnings, ScanWarning::empty_project(&root));
                continue;
            }

            debug!(project = %catalog.name, files = catalog.file_count(), "Catalogued project");
            projects.push(catalog);
        }

        Ok(Discovery {
            projects,
            candidates: candidates.len(),
            warnings,
            duration: start.elapsed(),
        })
    }
}

/// Immediate subdirectories of `parent`, sorted by name.
fn list_candidates(
    parent: &Path,
    warnings: &mut Vec<ScanWarning>,
) -> Result<Vec<PathBuf>, DiscoveryError> {
    let entries = std::fs::read_dir(parent).map_err(|e| DiscoveryError::io(parent, e))?;
    Ok(collect_candidates(
        parent,
        entries.map(|entry| entry.map(|e| e.path())),
        warnings,
    ))
}

/// Keep the directories of a parent listing, recording entries that could
/// not be read.
fn collect_candidates(
    parent: &Path,
    entries: impl IntoIterator<Item = std::io::Result<PathBuf>>,
    warnings: &mut Vec<ScanWarning>,
) -> Vec<PathBuf> {
    let mut candidates = Vec::new();
    for entry in entries {
        match entry {
            Ok(path) if path.is_dir() => candidates.push(path),
            Ok(_) => {}
            Err(err) => record(warnings, ScanWarning::read_error(parent, &err)),
        }
    }
    candidates.sort();
    candidates
}

/// Find the project root inside a candidate directory.
///
/// The root is the parent directory of the shallowest matching file within
/// `max_depth` levels. Matches at equal depth are taken in sorted walk order.
pub fn locate_root(
    candidate: &Path,
    mode: DiscoveryMode,
    max_depth: usize,
    rules: &FileRules,
    warnings: &mut Vec<ScanWarning>,
) -> Option<PathBuf> {
    let walker = WalkDir::new(candidate)
        .parallelism(Parallelism::Serial)
        .skip_hidden(false)
        .follow_links(false)
        .sort(true)
        .min_depth(1)
        .max_depth(max_depth);

    let mut best: Option<(usize, PathBuf)> = None;

    for entry_result in walker {
        let entry = match entry_result {
            Ok(e) => e,
            Err(err) => {
                record(warnings, walk_warning(&err, candidate));
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        let file_name = entry.file_name().to_string_lossy();
        let matched = match mode {
            DiscoveryMode::Marker => rules.is_marker_file(&file_name),
            DiscoveryMode::Markup => rules.is_markup_file(&file_name),
        };
        if !matched {
            continue;
        }

        let depth = entry.depth();
        if best.as_ref().is_none_or(|(d, _)| depth < *d) {
            best = Some((depth, entry.path()));
        }
        if depth == 1 {
            break;
        }
    }

    best.and_then(|(_, path)| path.parent().map(Path::to_path_buf))
}

/// Walk a project root and describe every relevant file.
///
/// Excluded directories are pruned with their whole subtree; the root itself
/// is never pruned, whatever its name.
pub fn catalog_files(
    root: &Path,
    rules: &Arc<FileRules>,
    compute_hashes: bool,
    warnings: &mut Vec<ScanWarning>,
) -> Vec<FileDescriptor> {
    let prune_rules = Arc::clone(rules);
    let walker = WalkDir::new(root)
        .parallelism(Parallelism::Serial)
        .skip_hidden(false)
        .follow_links(false)
        .sort(true)
        .min_depth(1)
        .process_read_dir(move |_depth, _path, _state, children| {
            children.retain(|child| match child {
                Ok(entry) => {
                    let excluded = entry.file_type().is_dir()
                        && prune_rules.is_excluded_dir(&entry.file_name().to_string_lossy());
                    if excluded {
                        debug!(dir = %entry.path().display(), "Skipping excluded directory");
                    }
                    !excluded
                }
                Err(_) => true,
            });
        });

    let mut files = Vec::new();

    for entry_result in walker {
        let entry = match entry_result {
            Ok(e) => e,
            Err(err) => {
                record(warnings, walk_warning(&err, root));
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        let file_name = entry.file_name().to_string_lossy().to_string();
        if !rules.is_relevant_file(&file_name) {
            debug!(file = %entry.path().display(), "Ignoring file");
            continue;
        }

        let path = entry.path();
        let metadata = match entry.metadata() {
            Ok(m) => m,
            Err(err) => {
                record(
                    warnings,
                    ScanWarning::new(&path, err.to_string(), WarningKind::MetadataError),
                );
                continue;
            }
        };

        let Some(rel) = relative_path(root, &path) else {
            continue;
        };

        let mut descriptor =
            FileDescriptor::new(rel, &path, Timestamps::from_metadata(&metadata), metadata.len());

        if compute_hashes {
            match hash_file(&path) {
                Ok(hash) => descriptor = descriptor.with_hash(hash),
                Err(err) => {
                    record(
                        warnings,
                        ScanWarning::new(&path, format!("Hash error: {err}"), WarningKind::HashError),
                    );
                    continue;
                }
            }
        }

        debug!(file = %descriptor.relative_path, "Added file");
        files.push(descriptor);
    }

    files
}

/// Convert a walk failure into a warning, attributing it to `fallback` when
/// the error carries no path.
fn walk_warning(err: &jwalk::Error, fallback: &Path) -> ScanWarning {
    let path = err.path().unwrap_or(fallback);
    match err.io_error() {
        Some(io) => ScanWarning::read_error(path, io),
        None => ScanWarning::new(path, err.to_string(), WarningKind::ReadError),
    }
}

fn record(warnings: &mut Vec<ScanWarning>, warning: ScanWarning) {
    warn!(path = %warning.path.display(), kind = ?warning.kind, "{}", warning.message);
    warnings.push(warning);
}
