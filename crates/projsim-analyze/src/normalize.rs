//! Text normalization applied before content comparison.

use itertools::Itertools;

/// Canonicalize text so formatting-only differences disappear.
///
/// Line endings become `\n` and every line is trimmed with interior ASCII
/// whitespace runs collapsed to one space. Runs of blank lines shrink to a
/// single blank line and a trailing blank line is dropped. Non-ASCII spaces
/// such as NBSP are content, not whitespace.
pub fn normalize(raw: &str) -> String {
    let unified = raw.replace("\r\n", "\n").replace('\r', "\n");

    let mut lines: Vec<String> = Vec::new();
    for line in unified.split('\n') {
        let collapsed = line
            .split(|c: char| c.is_ascii_whitespace())
            .filter(|word| !word.is_empty())
            .join(" ");
        if collapsed.is_empty() && lines.last().is_some_and(|l| l.is_empty()) {
            continue;
        }
        lines.push(collapsed);
    }

    if lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_and_blank_input() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   \t  "), "");
        assert_eq!(normalize("\n\n \r\n\t\n"), "");
    }

    #[test]
    fn test_line_endings_unified() {
        assert_eq!(normalize("a\r\nb\rc\nd"), "a\nb\nc\nd");
    }

    #[test]
    fn test_trim_and_collapse() {
        assert_eq!(
            normalize("  int   x\t=\t 1;  \n\tint y;"),
            "int x = 1;\nint y;"
        );
    }

    #[test]
    fn test_blank_runs_collapse() {
        assert_eq!(normalize("a\n\n\n\nb"), "a\n\nb");
        assert_eq!(normalize("a\n  \n\t\nb"), "a\n\nb");
    }

    #[test]
    fn test_trailing_blank_line_dropped() {
        assert_eq!(normalize("a\n"), "a");
        assert_eq!(normalize("a\n\n\n"), "a");
    }

    #[test]
    fn test_leading_blank_line_kept_once() {
        assert_eq!(normalize("\n\n\na"), "\na");
    }

    #[test]
    fn test_formatting_variants_match() {
        assert_eq!(normalize("hello\n\nworld"), normalize("hello   \n\n\nworld  "));
    }

    #[test]
    fn test_idempotent() {
        let samples = [
            "",
            "x",
            "\n\na  b \r\n\r\n\r\nc\t\td\n\n",
            "  lead\n\n\n  \ttrail  \n",
            "\r\r\rz",
            "public class A {\n\n\n    void f() {}\n}\n",
        ];
        for sample in samples {
            let once = normalize(sample);
            assert_eq!(normalize(&once), once, "not idempotent for {sample:?}");
        }
    }

    #[test]
    fn test_non_ascii_spaces_are_content() {
        assert_eq!(normalize("a\u{00A0}b"), "a\u{00A0}b");
        assert_ne!(normalize("a\u{00A0}b"), normalize("a b"));
        assert_eq!(normalize("x\u{3000}\u{3000}y"), "x\u{3000}\u{3000}y");
        assert_eq!(normalize("\u{00A0} a \u{00A0}"), "\u{00A0} a \u{00A0}");
    }

    #[test]
    fn test_content_differences_survive() {
        assert_ne!(normalize("a b"), normalize("ab"));
        assert_ne!(normalize("a\nb"), normalize("a b"));
    }
}
