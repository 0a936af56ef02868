//! Weighted pairwise comparison of two project catalogs.
//!
//! Every relative path in the union of both catalogs counts once. A path
//! present on both sides scores
//!
//! ```text
//! 0.70 * content + 0.15 * creation + 0.15 * modification
//! ```
//!
//! where `content` is the Jaro-Winkler similarity of the normalized text and
//! the timestamp factors are 1.0 only for known, identical times. A path
//! present on one side only scores 0. The pair percentage is the mean score
//! over the union, scaled to 0-100.

use std::collections::BTreeSet;

use tracing::{debug, warn};

use projsim_core::{
    FileDescriptor, FilePresence, FileScore, PairResult, ProjectCatalog, ScanWarning,
};

use crate::normalize::normalize;

/// Weight of normalized content similarity.
pub const WEIGHT_CONTENT: f64 = 0.70;
/// Weight of matching creation times.
pub const WEIGHT_CREATION: f64 = 0.15;
/// Weight of matching modification times.
pub const WEIGHT_MODIFICATION: f64 = 0.15;

/// Compares two projects file by file.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProjectComparer;

impl ProjectComparer {
    /// Create a new comparer.
    pub fn new() -> Self {
        Self
    }

    /// Compare two projects.
    ///
    /// Never fails: unreadable files are compared as empty text and the
    /// problem is recorded in [`PairResult::warnings`].
    pub fn compare(&self, first: &ProjectCatalog, second: &ProjectCatalog) -> PairResult {
        let union: BTreeSet<&str> = first
            .files
            .keys()
            .chain(second.files.keys())
            .map(String::as_str)
            .collect();

        if union.is_empty() {
            return PairResult {
                first: first.name.clone(),
                second: second.name.clone(),
                is_exact_copy: true,
                similarity_percentage: 100.0,
                files: Vec::new(),
                warnings: Vec::new(),
            };
        }

        let mut warnings = Vec::new();
        let mut files = Vec::with_capacity(union.len());
        let mut all_perfect = true;
        let mut total = 0.0;

        for path in &union {
            let score = match (first.get(path), second.get(path)) {
                (Some(a), Some(b)) => score_file(path, a, b, &mut warnings),
                (Some(_), None) => FileScore::missing(*path, FilePresence::FirstOnly),
                (None, Some(_)) => FileScore::missing(*path, FilePresence::SecondOnly),
                (None, None) => continue,
            };

            all_perfect &= score.is_perfect();
            total += score.score;
            files.push(score);
        }

        let is_exact_copy = all_perfect
            && first.file_count() == union.len()
            && second.file_count() == union.len();

        let similarity_percentage = if is_exact_copy {
            100.0
        } else {
            (total / union.len() as f64 * 100.0).clamp(0.0, 100.0)
        };

        debug!(
            first = %first.name,
            second = %second.name,
            similarity = similarity_percentage,
            exact = is_exact_copy,
            "Compared projects"
        );

        PairResult {
            first: first.name.clone(),
            second: second.name.clone(),
            is_exact_copy,
            similarity_percentage,
            files,
            warnings,
        }
    }
}

/// Score one path that exists in both projects.
fn score_file(
    path: &str,
    a: &FileDescriptor,
    b: &FileDescriptor,
    warnings: &mut Vec<ScanWarning>,
) -> FileScore {
    let content = content_similarity(a, b, warnings);
    let creation = if a.timestamps.same_created(&b.timestamps) { 1.0 } else { 0.0 };
    let modification = if a.timestamps.same_modified(&b.timestamps) { 1.0 } else { 0.0 };

    FileScore {
        relative_path: path.to_string(),
        presence: FilePresence::Both,
        content,
        creation,
        modification,
        score: weighted_score(content, creation, modification),
    }
}

/// Combine the three factors into a single 0.0-1.0 score.
///
/// Exactly 1.0 when all factors are 1.0, so float rounding in the weighted sum
/// cannot hide a perfect match.
pub fn weighted_score(content: f64, creation: f64, modification: f64) -> f64 {
    if content == 1.0 && creation == 1.0 && modification == 1.0 {
        return 1.0;
    }
    (WEIGHT_CONTENT * content + WEIGHT_CREATION * creation + WEIGHT_MODIFICATION * modification)
        .clamp(0.0, 1.0)
}

/// Similarity of the normalized text of two files, 0.0 to 1.0.
fn content_similarity(
    a: &FileDescriptor,
    b: &FileDescriptor,
    warnings: &mut Vec<ScanWarning>,
) -> f64 {
    // Identical bytes normalize identically.
    if let (Some(ha), Some(hb)) = (a.content_hash, b.content_hash) {
        if ha == hb {
            return 1.0;
        }
    }

    let left = normalize(&read_text(a, warnings));
    let right = normalize(&read_text(b, warnings));
    text_similarity(&left, &right)
}

/// Similarity of two already-normalized texts.
///
/// Two empty texts match fully; an empty text never matches a non-empty one.
pub fn text_similarity(left: &str, right: &str) -> f64 {
    match (left.is_empty(), right.is_empty()) {
        (true, true) => 1.0,
        (true, false) | (false, true) => 0.0,
        _ if left == right => 1.0,
        _ => strsim::jaro_winkler(left, right).clamp(0.0, 1.0),
    }
}

/// Read a file as UTF-8, falling back to empty text.
fn read_text(file: &FileDescriptor, warnings: &mut Vec<ScanWarning>) -> String {
    let bytes = match std::fs::read(&file.absolute_path) {
        Ok(bytes) => bytes,
        Err(err) => {
            let warning = ScanWarning::content_unreadable(&file.absolute_path, &err);
            warn!(path = %file.absolute_path.display(), "{}", warning.message);
            warnings.push(warning);
            return String::new();
        }
    };

    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(err) => {
            let warning = ScanWarning::content_unreadable(&file.absolute_path, &err);
            warn!(path = %file.absolute_path.display(), "{}", warning.message);
            warnings.push(warning);
            String::new()
        }
    }
}
