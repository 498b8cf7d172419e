//! Utilities module for gettype-nameof.
//!
//! Line mapping, suppression comments and generated-code detection.

mod paths;

pub use paths::{collect_cs_files_gitignore, is_excluded, normalize_display_path};

use crate::constants::{AUTO_GENERATED_RE, GENERATED_FILE_RE, PRAGMA_RE, SUPPRESSION_RE};
use ruff_text_size::TextSize;
use rustc_hash::{FxHashMap, FxHashSet};
use std::path::Path;

/// A utility struct to convert byte offsets to line numbers.
///
/// Tree-sitter works with byte offsets, but findings are reported with
/// line and column numbers which are more human-readable.
#[derive(Debug, Clone)]
pub struct LineIndex {
    /// Stores the byte index of the start of each line.
    line_starts: Vec<usize>,
}

impl LineIndex {
    /// Creates a new `LineIndex` by scanning the source code for newlines.
    /// Uses byte iteration since '\n' is always a single byte in UTF-8.
    #[must_use]
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0];
        for (i, byte) in source.as_bytes().iter().enumerate() {
            if *byte == b'\n' {
                line_starts.push(i + 1);
            }
        }
        Self { line_starts }
    }

    /// Converts a `TextSize` (byte offset) to a 1-indexed line number.
    #[must_use]
    pub fn line_index(&self, offset: TextSize) -> usize {
        let offset = offset.to_usize();
        match self.line_starts.binary_search(&offset) {
            Ok(line) => line + 1,
            Err(line) => line,
        }
    }

    /// Converts a `TextSize` to a 1-indexed byte column within its line.
    #[must_use]
    pub fn column_index(&self, offset: TextSize) -> usize {
        let line = self.line_index(offset);
        let start = self.line_starts.get(line - 1).copied().unwrap_or(0);
        offset.to_usize().saturating_sub(start) + 1
    }
}

/// Suppression specification.
#[derive(Debug, Clone, PartialEq)]
pub enum Suppression {
    /// Suppress all findings.
    All,
    /// Suppress findings for specific rule IDs.
    Specific(FxHashSet<String>),
}

impl Suppression {
    fn covers(&self, rule_id: &str) -> bool {
        match self {
            Self::All => true,
            Self::Specific(rules) => rules.contains(rule_id),
        }
    }
}

fn parse_rule_list(list: &str) -> Suppression {
    let rules: FxHashSet<String> = list
        .split([',', ' ', '\t'])
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(str::to_owned)
        .collect();
    if rules.is_empty() {
        Suppression::All
    } else {
        Suppression::Specific(rules)
    }
}

/// Detects an end-of-line suppression comment.
///
/// Supports:
/// - `// gettype-nameof: ignore` - Bare ignore (All)
/// - `// gettype-nameof: ignore[GetTypeToNameOf]` - Specific ids
#[must_use]
pub fn get_line_suppression(line: &str) -> Option<Suppression> {
    let caps = SUPPRESSION_RE().captures(line)?;
    Some(caps.get(1).map_or(Suppression::All, |ids| parse_rule_list(ids.as_str())))
}

#[derive(Debug, Clone)]
struct PragmaDirective {
    line: usize,
    disable: bool,
    rules: Suppression,
}

/// Suppressions in effect for one document.
///
/// Combines end-of-line ignore comments with `#pragma warning disable` /
/// `#pragma warning restore` regions. A pragma takes effect on the line
/// after the directive.
#[derive(Debug, Clone, Default)]
pub struct Suppressions {
    lines: FxHashMap<usize, Suppression>,
    pragmas: Vec<PragmaDirective>,
}

impl Suppressions {
    /// Scans `source` for suppression comments and pragmas.
    #[must_use]
    pub fn parse(source: &str) -> Self {
        let mut out = Self::default();
        for (i, line) in source.lines().enumerate() {
            if let Some(caps) = PRAGMA_RE().captures(line) {
                out.pragmas.push(PragmaDirective {
                    line: i + 1,
                    disable: &caps[1] == "disable",
                    rules: parse_rule_list(caps.get(2).map_or("", |m| m.as_str())),
                });
            } else if let Some(suppression) = get_line_suppression(line) {
                out.lines.insert(i + 1, suppression);
            }
        }
        out
    }

    /// Returns true if a finding of `rule_id` on `line` should be ignored.
    #[must_use]
    pub fn is_suppressed(&self, line: usize, rule_id: &str) -> bool {
        if self.lines.get(&line).is_some_and(|s| s.covers(rule_id)) {
            return true;
        }
        // The last directive naming the rule, or naming no rule, wins.
        self.pragmas
            .iter()
            .take_while(|p| p.line < line)
            .filter(|p| p.rules.covers(rule_id))
            .last()
            .is_some_and(|p| p.disable)
    }

    /// Whether the document contains no suppressions at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty() && self.pragmas.is_empty()
    }
}

/// Whether a file was produced by a code generator.
///
/// Looks at the file name (`*.g.cs`, `*.designer.cs`, ...) and at the
/// comment header before the first line of code.
#[must_use]
pub fn is_generated_code(path: &Path, source: &str) -> bool {
    if GENERATED_FILE_RE().is_match(&path.to_string_lossy()) {
        return true;
    }
    let mut in_block = false;
    for line in source.lines() {
        let trimmed = line.trim();
        let is_comment = in_block
            || trimmed.is_empty()
            || trimmed.starts_with("//")
            || trimmed.starts_with("/*");
        if !is_comment {
            return false;
        }
        if AUTO_GENERATED_RE().is_match(trimmed) {
            return true;
        }
        if trimmed.starts_with("/*") {
            in_block = true;
        }
        if in_block && trimmed.ends_with("*/") {
            in_block = false;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_and_column() {
        let index = LineIndex::new("ab\ncd\nef");

        assert_eq!(index.line_index(TextSize::from(0)), 1);
        assert_eq!(index.line_index(TextSize::from(4)), 2);
        assert_eq!(index.column_index(TextSize::from(4)), 2);
        assert_eq!(index.column_index(TextSize::from(6)), 1);
    }

    #[test]
    fn test_line_suppression_forms() {
        assert_eq!(
            get_line_suppression("var n = GetType().Name; // gettype-nameof: ignore"),
            Some(Suppression::All)
        );
        let specific = get_line_suppression("x(); // gettype-nameof: ignore[GetTypeToNameOf]");
        assert!(matches!(
            specific,
            Some(Suppression::Specific(ref r)) if r.contains("GetTypeToNameOf")
        ));
        assert_eq!(get_line_suppression("// unrelated"), None);
    }

    #[test]
    fn test_pragma_regions() {
        let source = "\
class A {
#pragma warning disable GetTypeToNameOf
    string X => GetType().Name;
#pragma warning restore GetTypeToNameOf
    string Y => GetType().Name;
}";
        let s = Suppressions::parse(source);

        assert!(s.is_suppressed(3, "GetTypeToNameOf"));
        assert!(!s.is_suppressed(5, "GetTypeToNameOf"));
        assert!(!s.is_suppressed(3, "OtherRule"));
    }

    #[test]
    fn test_bare_pragma_disables_everything() {
        let s = Suppressions::parse("#pragma warning disable\nx\n#pragma warning restore\ny");

        assert!(s.is_suppressed(2, "GetTypeToNameOf"));
        assert!(!s.is_suppressed(4, "GetTypeToNameOf"));
    }

    #[test]
    fn test_specific_restore_inside_bare_disable() {
        let source = "\
#pragma warning disable
x
#pragma warning restore GetTypeToNameOf
y
#pragma warning disable GetTypeToNameOf
z";
        let s = Suppressions::parse(source);

        assert!(s.is_suppressed(2, "GetTypeToNameOf"));
        assert!(!s.is_suppressed(4, "GetTypeToNameOf"));
        assert!(s.is_suppressed(4, "OtherRule"));
        assert!(s.is_suppressed(6, "GetTypeToNameOf"));
    }

    #[test]
    fn test_generated_detection() {
        assert!(is_generated_code(Path::new("obj/Foo.g.cs"), ""));
        assert!(is_generated_code(Path::new("Form1.Designer.cs"), ""));
        assert!(is_generated_code(
            Path::new("Foo.cs"),
            "// <auto-generated>\n//   tool\n// </auto-generated>\nclass A { }"
        ));
        assert!(!is_generated_code(
            Path::new("Foo.cs"),
            "class A { }\n// <auto-generated>"
        ));
    }
}
