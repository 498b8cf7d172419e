//! Applies rule findings to document text.
//!
//! A finding carries the byte span of the expression it matched and the
//! text that should replace it. Before editing, the span is located again
//! in a fresh parse of the current text: if the node there is no longer the
//! expression the finding was made for, the fix is refused. The replacement
//! is parsed on its own and must be a single well-formed expression.

use super::rewriter::{ByteRangeRewriter, Edit, RewriteError};
use crate::cst::{CstError, CstParser, CstTree, NodeId};
use crate::rules::ids::PROPERTY_PREFER;
use crate::rules::Finding;
use crate::syntax::{ancestors, SyntaxKind, SyntaxTree};

/// Why a finding could not be applied.
#[derive(Debug, thiserror::Error)]
pub enum FixError {
    /// The text at the finding's span is not the expression it was made for.
    #[error(
        "no `{original}` at bytes {start_byte}..{end_byte}; the document changed since analysis"
    )]
    StaleLocator {
        /// Expected expression text.
        original: String,
        /// Start of the recorded span.
        start_byte: usize,
        /// End of the recorded span.
        end_byte: usize,
    },
    /// The replacement text is not a single well-formed expression.
    #[error("replacement `{replacement}` is not a single expression")]
    InvalidReplacement {
        /// The rejected replacement.
        replacement: String,
    },
    /// Another finding already rewrites an overlapping span.
    #[error("bytes {start_byte}..{end_byte} overlap an earlier fix")]
    Overlapping {
        /// Start of the skipped span.
        start_byte: usize,
        /// End of the skipped span.
        end_byte: usize,
    },
    /// The document could not be parsed.
    #[error(transparent)]
    Parse(#[from] CstError),
    /// The edit could not be applied.
    #[error(transparent)]
    Rewrite(#[from] RewriteError),
}

/// Result of applying several findings to one document.
#[derive(Debug)]
pub struct FixOutcome {
    /// The rewritten document.
    pub text: String,
    /// Findings that were applied.
    pub applied: Vec<Finding>,
    /// Findings that were skipped, with the reason.
    pub skipped: Vec<(Finding, FixError)>,
}

/// Replacement text of a finding: the `prefer` property when present.
#[must_use]
pub fn replacement_of(finding: &Finding) -> &str {
    finding
        .properties
        .get(PROPERTY_PREFER)
        .map_or(finding.replacement.as_str(), String::as_str)
}

const WRAPPER_PREFIX: &str = "class __NameOfFix { object __value = ";
const WRAPPER_SUFFIX: &str = "; }";

/// Checks that `text` parses as exactly one C# expression.
///
/// # Errors
/// Returns [`FixError::InvalidReplacement`] when it does not.
pub fn parse_expression(parser: &mut CstParser, text: &str) -> Result<(), FixError> {
    let invalid = || FixError::InvalidReplacement {
        replacement: text.to_owned(),
    };
    if text.trim().is_empty() || text.contains(';') {
        return Err(invalid());
    }
    let tree = parser.parse(&format!("{WRAPPER_PREFIX}{text}{WRAPPER_SUFFIX}"))?;
    if tree.has_error() {
        return Err(invalid());
    }

    let declarators: Vec<NodeId> = tree
        .node_ids()
        .filter(|&n| tree.node(n).raw_kind == "variable_declarator")
        .collect();
    let [declarator] = declarators.as_slice() else {
        return Err(invalid());
    };
    let value_holder = tree
        .named_children(*declarator)
        .find(|&c| tree.node(c).raw_kind == "equals_value_clause")
        .unwrap_or(*declarator);
    let name = tree.field_child(*declarator, "name");
    let expressions: Vec<NodeId> = tree
        .named_children(value_holder)
        .filter(|&c| Some(c) != name && tree.kind(c) != SyntaxKind::Comment)
        .filter(|&c| tree.node(c).raw_kind != "equals_value_clause")
        .collect();

    match expressions.as_slice() {
        [expr] if tree.text(*expr).trim() == text.trim() => Ok(()),
        _ => Err(invalid()),
    }
}

/// Finds the member access spanning exactly the finding's range.
fn locate(tree: &CstTree, finding: &Finding) -> Result<NodeId, FixError> {
    let stale = || FixError::StaleLocator {
        original: finding.original.clone(),
        start_byte: finding.start_byte,
        end_byte: finding.end_byte,
    };
    let range = finding.range();
    let covering = tree.covering_node(range).ok_or_else(stale)?;
    std::iter::once(covering)
        .chain(ancestors(tree, covering))
        .take_while(|&n| tree.range(n) == range)
        .find(|&n| tree.kind(n) == SyntaxKind::MemberAccess)
        .filter(|&n| tree.text(n) == finding.original)
        .ok_or_else(stale)
}

fn edit_for(parser: &mut CstParser, tree: &CstTree, finding: &Finding) -> Result<Edit, FixError> {
    let node = locate(tree, finding)?;
    let replacement = replacement_of(finding);
    parse_expression(parser, replacement)?;
    Ok(
        Edit::replace_range(tree.range(node), replacement)
            .with_description(format!("{} -> {replacement}", finding.original)),
    )
}

/// Applies one finding to `source`.
///
/// # Errors
/// Returns [`FixError`] without touching the text when the finding is
/// stale or its replacement is malformed.
pub fn apply_finding(
    parser: &mut CstParser,
    source: &str,
    finding: &Finding,
) -> Result<String, FixError> {
    let tree = parser.parse(source)?;
    let edit = edit_for(parser, &tree, finding)?;
    let mut rewriter = ByteRangeRewriter::new(source);
    rewriter.add_edit(edit);
    Ok(rewriter.apply()?)
}

/// Applies every applicable finding of one document in a single pass.
///
/// Findings that are stale, malformed or overlap an earlier one are
/// reported in [`FixOutcome::skipped`]; the rest are applied together.
///
/// # Errors
/// Returns [`FixError`] only when the document itself cannot be parsed or
/// rewritten.
pub fn apply_findings(
    parser: &mut CstParser,
    source: &str,
    findings: &[Finding],
) -> Result<FixOutcome, FixError> {
    let tree = parser.parse(source)?;
    let mut ordered: Vec<&Finding> = findings.iter().collect();
    ordered.sort_by_key(|f| (f.start_byte, f.end_byte));

    let mut rewriter = ByteRangeRewriter::new(source);
    let mut applied = Vec::new();
    let mut skipped = Vec::new();
    let mut last_end = 0usize;

    for finding in ordered {
        if !applied.is_empty() && finding.start_byte < last_end {
            skipped.push((
                finding.clone(),
                FixError::Overlapping {
                    start_byte: finding.start_byte,
                    end_byte: finding.end_byte,
                },
            ));
            continue;
        }
        match edit_for(parser, &tree, finding) {
            Ok(edit) => {
                last_end = edit.end_byte;
                rewriter.add_edit(edit);
                applied.push(finding.clone());
            }
            Err(e) => {
                tracing::warn!(
                    file = %finding.file.display(),
                    line = finding.line,
                    "skipping fix: {e}"
                );
                skipped.push((finding.clone(), e));
            }
        }
    }

    Ok(FixOutcome {
        text: rewriter.apply()?,
        applied,
        skipped,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn finding_at(source: &str, original: &str, replacement: &str, nth: usize) -> Finding {
        let start = source.match_indices(original).nth(nth).unwrap().0;
        Finding {
            rule_id: "GetTypeToNameOf".to_owned(),
            category: "Simplification".to_owned(),
            severity: "warning".to_owned(),
            message: String::new(),
            file: "A.cs".into(),
            line: 1,
            col: 1,
            start_byte: start,
            end_byte: start + original.len(),
            original: original.to_owned(),
            replacement: replacement.to_owned(),
            properties: BTreeMap::from([("prefer".to_owned(), replacement.to_owned())]),
        }
    }

    #[test]
    fn test_apply_single_fix() {
        let source = "sealed class A { string M() => this.GetType().Name; }";
        let finding = finding_at(source, "this.GetType().Name", "nameof(A)", 0);
        let mut parser = CstParser::new().unwrap();

        let fixed = apply_finding(&mut parser, source, &finding).unwrap();
        assert_eq!(fixed, "sealed class A { string M() => nameof(A); }");
    }

    #[test]
    fn test_stale_locator_leaves_text() {
        let source = "sealed class A { string M() => GetType().Name; }";
        let mut finding = finding_at(source, "GetType().Name", "nameof(A)", 0);
        finding.start_byte += 1;
        let mut parser = CstParser::new().unwrap();

        let err = apply_finding(&mut parser, source, &finding).unwrap_err();
        assert!(matches!(err, FixError::StaleLocator { .. }));
    }

    #[test]
    fn test_changed_text_is_stale() {
        let analyzed = "sealed class A { string M() => GetType().Name; }";
        let finding = finding_at(analyzed, "GetType().Name", "nameof(A)", 0);
        let edited = "sealed class A { string M() => GetType().Type; }";
        let mut parser = CstParser::new().unwrap();

        let err = apply_finding(&mut parser, edited, &finding).unwrap_err();
        assert!(matches!(err, FixError::StaleLocator { .. }));
    }

    #[test]
    fn test_invalid_replacement_rejected() {
        let source = "sealed class A { string M() => GetType().Name; }";
        let finding = finding_at(source, "GetType().Name", "nameof(A", 0);
        let mut parser = CstParser::new().unwrap();

        let err = apply_finding(&mut parser, source, &finding).unwrap_err();
        assert!(matches!(err, FixError::InvalidReplacement { .. }));
    }

    #[test]
    fn test_parse_expression_shapes() {
        let mut parser = CstParser::new().unwrap();

        assert!(parse_expression(&mut parser, "nameof(Foo)").is_ok());
        assert!(parse_expression(&mut parser, "").is_err());
        assert!(parse_expression(&mut parser, "a; b").is_err());
        assert!(parse_expression(&mut parser, "x, y = 1").is_err());
    }

    #[test]
    fn test_fix_all_in_document() {
        let source = concat!(
            "sealed class A {\n",
            "  string X => GetType().Name;\n",
            "  string Y => this.GetType().Name;\n",
            "}"
        );
        let findings = vec![
            finding_at(source, "this.GetType().Name", "nameof(A)", 0),
            finding_at(source, "GetType().Name", "nameof(A)", 0),
        ];
        let mut parser = CstParser::new().unwrap();

        let outcome = apply_findings(&mut parser, source, &findings).unwrap();
        assert_eq!(outcome.applied.len(), 2);
        assert!(outcome.skipped.is_empty());
        assert_eq!(
            outcome.text,
            "sealed class A {\n  string X => nameof(A);\n  string Y => nameof(A);\n}"
        );
    }

    #[test]
    fn test_fix_all_skips_stale_and_keeps_rest() {
        let source = concat!(
            "sealed class A {\n",
            "  string X => GetType().Name;\n",
            "  string Y => GetType().Name;\n",
            "}"
        );
        let good = finding_at(source, "GetType().Name", "nameof(A)", 0);
        let mut stale = finding_at(source, "GetType().Name", "nameof(A)", 1);
        stale.original = "this.GetType().Name".to_owned();
        let mut parser = CstParser::new().unwrap();

        let outcome = apply_findings(&mut parser, source, &[good, stale]).unwrap();
        assert_eq!(outcome.applied.len(), 1);
        assert_eq!(outcome.skipped.len(), 1);
        assert!(outcome.text.contains("X => nameof(A);"));
        assert!(outcome.text.contains("Y => GetType().Name;"));
    }

    #[test]
    fn test_replacement_falls_back_to_field() {
        let source = "sealed class A { string M() => GetType().Name; }";
        let mut finding = finding_at(source, "GetType().Name", "nameof(A)", 0);
        finding.properties.clear();

        assert_eq!(replacement_of(&finding), "nameof(A)");
    }
}
