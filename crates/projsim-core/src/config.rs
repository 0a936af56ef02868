//! Discovery configuration types.

use std::collections::BTreeSet;
use std::path::PathBuf;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// How a project root is recognised inside a candidate directory.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum DiscoveryMode {
    /// Root is the directory holding the first build-descriptor file.
    #[default]
    Marker,
    /// Root is the directory holding the first markup page.
    Markup,
}

impl DiscoveryMode {
    /// Highlight threshold (percent) usually applied to reports for this mode.
    ///
    /// Web projects share a lot of boilerplate markup, so they need a higher
    /// bar before a pair looks suspicious.
    pub fn default_threshold(&self) -> f64 {
        match self {
            DiscoveryMode::Marker => 20.0,
            DiscoveryMode::Markup => 40.0,
        }
    }
}

/// File and directory filtering rules applied during discovery.
///
/// Extensions are stored lower-case without the leading dot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileRules {
    /// File names that mark a build-based project root.
    pub marker_files: BTreeSet<String>,
    /// Extensions that mark a markup-based project root.
    pub markup_extensions: BTreeSet<String>,
    /// Extensions kept for comparison.
    pub relevant_extensions: BTreeSet<String>,
    /// Directory names whose whole subtree is skipped.
    pub excluded_dirs: BTreeSet<String>,
    /// Exact file names that are never kept.
    pub excluded_file_names: BTreeSet<String>,
    /// Extensions that are never kept, even if listed as relevant.
    pub excluded_extensions: BTreeSet<String>,
}

fn set(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for FileRules {
    fn default() -> Self {
        Self {
            marker_files: set(&["pom.xml", "build.gradle", "build.gradle.kts"]),
            markup_extensions: set(&["html", "htm"]),
            relevant_extensions: set(&[
                "java",
                "html",
                "htm",
                "css",
                "js",
                "xml",
                "properties",
                "yml",
                "yaml",
                "json",
                "md",
                "txt",
                "sql",
            ]),
            excluded_dirs: set(&[
                "target",
                "build",
                "bin",
                ".git",
                ".svn",
                ".idea",
                ".vscode",
                ".settings",
                "node_modules",
                "out",
                ".mvn",
                ".gradle",
                ".angular",
            ]),
            excluded_file_names: BTreeSet::new(),
            excluded_extensions: set(&[
                "class", "jar", "log", "tmp", "bak", "zip", "gz", "png", "jpg", "jpeg", "gif",
            ]),
        }
    }
}

impl FileRules {
    /// Lower-case every case-insensitive entry and strip leading dots from
    /// extensions, so hand-written rule files can say `.HTML` or `html`.
    pub fn normalized(mut self) -> Self {
        fn lower(set: BTreeSet<String>) -> BTreeSet<String> {
            set.into_iter().map(|s| s.trim().to_lowercase()).collect()
        }
        fn ext(set: BTreeSet<String>) -> BTreeSet<String> {
            set.into_iter()
                .map(|s| s.trim().trim_start_matches('.').to_lowercase())
                .filter(|s| !s.is_empty())
                .collect()
        }

        self.marker_files = lower(self.marker_files);
        self.excluded_dirs = lower(self.excluded_dirs);
        self.markup_extensions = ext(self.markup_extensions);
        self.relevant_extensions = ext(self.relevant_extensions);
        self.excluded_extensions = ext(self.excluded_extensions);
        self
    }

    /// Check if a directory's subtree should be pruned.
    pub fn is_excluded_dir(&self, name: &str) -> bool {
        self.excluded_dirs.contains(&name.to_lowercase())
    }

    /// Check if a file name is a build marker.
    pub fn is_marker_file(&self, name: &str) -> bool {
        self.marker_files.contains(&name.to_lowercase())
    }

    /// Check if a file name has a markup-page extension.
    pub fn is_markup_file(&self, name: &str) -> bool {
        file_extension(name).is_some_and(|ext| self.markup_extensions.contains(&ext))
    }

    /// Check if a file should be part of a project catalog.
    pub fn is_relevant_file(&self, name: &str) -> bool {
        if self.excluded_file_names.contains(name) {
            return false;
        }
        match file_extension(name) {
            Some(ext) => {
                !self.excluded_extensions.contains(&ext) && self.relevant_extensions.contains(&ext)
            }
            None => false,
        }
    }
}

/// Lower-cased extension of a file name (text after the last dot).
///
/// Dot-files such as `.gitignore` and names ending in a dot have none.
pub fn file_extension(name: &str) -> Option<String> {
    match name.rfind('.') {
        Some(dot) if dot > 0 && dot < name.len() - 1 => Some(name[dot + 1..].to_lowercase()),
        _ => None,
    }
}

/// Configuration for project discovery.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct DiscoveryConfig {
    /// Directory whose immediate subdirectories are candidate projects.
    pub parent: PathBuf,

    /// How project roots are located.
    #[builder(default)]
    #[serde(default)]
    pub mode: DiscoveryMode,

    /// Filtering rules.
    #[builder(default)]
    #[serde(default)]
    pub rules: FileRules,

    /// How many levels below a candidate to search for its root.
    #[builder(default = "3")]
    #[serde(default = "default_root_search_depth")]
    pub root_search_depth: usize,

    /// Compute BLAKE3 content hashes for catalogued files.
    #[builder(default = "true")]
    #[serde(default = "default_true")]
    pub compute_hashes: bool,
}

fn default_true() -> bool {
    true
}

fn default_root_search_depth() -> usize {
    3
}

impl DiscoveryConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        match self.parent {
            Some(ref parent) if parent.as_os_str().is_empty() => {
                return Err("Parent path cannot be empty".to_string());
            }
            Some(_) => {}
            None => return Err("Parent path is required".to_string()),
        }
        if self.root_search_depth == Some(0) {
            return Err("Root search depth must be at least 1".to_string());
        }
        Ok(())
    }
}

impl DiscoveryConfig {
    /// Create a new discovery config builder.
    pub fn builder() -> DiscoveryConfigBuilder {
        DiscoveryConfigBuilder::default()
    }

    /// Create a config with default rules for the given parent and mode.
    pub fn new(parent: impl Into<PathBuf>, mode: DiscoveryMode) -> Self {
        Self {
            parent: parent.into(),
            mode,
            rules: FileRules::default(),
            root_search_depth: 3,
            compute_hashes: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = DiscoveryConfig::builder()
            .parent("/submissions")
            .mode(DiscoveryMode::Markup)
            .root_search_depth(2usize)
            .build()
            .unwrap();

        assert_eq!(config.parent, PathBuf::from("/submissions"));
        assert_eq!(config.mode, DiscoveryMode::Markup);
        assert_eq!(config.root_search_depth, 2);
        assert!(config.compute_hashes);
    }

    #[test]
    fn test_config_builder_rejects_zero_depth() {
        let result = DiscoveryConfig::builder()
            .parent("/submissions")
            .root_search_depth(0usize)
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_config_builder_requires_parent() {
        assert!(DiscoveryConfig::builder().build().is_err());
    }

    #[test]
    fn test_file_extension() {
        assert_eq!(file_extension("Main.JAVA"), Some("java".to_string()));
        assert_eq!(file_extension("archive.tar.gz"), Some("gz".to_string()));
        assert_eq!(file_extension(".gitignore"), None);
        assert_eq!(file_extension("Makefile"), None);
        assert_eq!(file_extension("trailing."), None);
    }

    #[test]
    fn test_relevant_files() {
        let rules = FileRules::default();
        assert!(rules.is_relevant_file("App.java"));
        assert!(rules.is_relevant_file("INDEX.HTML"));
        assert!(!rules.is_relevant_file("App.class"));
        assert!(!rules.is_relevant_file("README"));
        assert!(!rules.is_relevant_file("photo.png"));
    }

    #[test]
    fn test_excluded_extension_wins_over_relevant() {
        let mut rules = FileRules::default();
        rules.relevant_extensions.insert("log".to_string());
        assert!(!rules.is_relevant_file("server.log"));
    }

    #[test]
    fn test_markers() {
        let rules = FileRules::default();
        assert!(rules.is_marker_file("POM.xml"));
        assert!(rules.is_marker_file("build.gradle.kts"));
        assert!(!rules.is_marker_file("settings.gradle"));
        assert!(rules.is_markup_file("index.htm"));
        assert!(!rules.is_markup_file("index.xhtml"));
        assert!(rules.is_excluded_dir("Node_Modules"));
    }

    #[test]
    fn test_normalized_rules() {
        let mut rules = FileRules::default();
        rules.relevant_extensions.insert(".TSX".to_string());
        rules.excluded_dirs.insert("Dist".to_string());
        let rules = rules.normalized();

        assert!(rules.relevant_extensions.contains("tsx"));
        assert!(rules.excluded_dirs.contains("dist"));
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!("markup".parse::<DiscoveryMode>().unwrap(), DiscoveryMode::Markup);
        assert_eq!("MARKER".parse::<DiscoveryMode>().unwrap(), DiscoveryMode::Marker);
        assert_eq!(DiscoveryMode::Markup.to_string(), "markup");
        assert_eq!(DiscoveryMode::Markup.default_threshold(), 40.0);
    }
}
