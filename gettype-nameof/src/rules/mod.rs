use crate::config::Config;
use crate::cst::{CstTree, DocumentSemantics, NodeId};
use crate::syntax::{text_range, SyntaxKind};
use crate::utils::LineIndex;
use ruff_text_size::TextRange;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

#[derive(Debug, Clone)]
/// Context passed to rules during analysis.
pub struct Context {
    /// Path to the file being analyzed.
    pub filename: PathBuf,
    /// Line index for accurate line/column mapping.
    pub line_index: LineIndex,
}

impl Context {
    /// Builds the context for one document.
    #[must_use]
    pub fn new(filename: impl Into<PathBuf>, source: &str) -> Self {
        Self {
            filename: filename.into(),
            line_index: LineIndex::new(source),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// A single issue found by a rule, together with the rewrite it proposes.
pub struct Finding {
    /// ID of the rule that triggered the finding.
    pub rule_id: String,
    /// Category of the rule.
    pub category: String,
    /// Severity level (e.g., "warning", "error").
    pub severity: String,
    /// Description of the issue.
    pub message: String,
    /// File where the issue was found.
    pub file: PathBuf,
    /// Line number (1-indexed).
    pub line: usize,
    /// Column number (1-indexed, in bytes).
    pub col: usize,
    /// Start byte offset of the matched expression (inclusive).
    pub start_byte: usize,
    /// End byte offset of the matched expression (exclusive).
    pub end_byte: usize,
    /// Source text of the matched expression.
    pub original: String,
    /// Text proposed in its place.
    pub replacement: String,
    /// Extra data for fixers; the replacement is stored under `prefer`.
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
}

impl Finding {
    /// Byte range of the matched expression.
    #[must_use]
    pub fn range(&self) -> TextRange {
        text_range(self.start_byte, self.end_byte)
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
/// Metadata associated with a rule.
pub struct RuleMetadata {
    /// Unique code/ID of the rule.
    pub id: &'static str,
    /// Category of the rule.
    pub category: &'static str,
    /// Short title.
    pub title: &'static str,
    /// Message template with `{0}`/`{1}` placeholders.
    pub message_format: &'static str,
    /// Default severity.
    pub severity: &'static str,
    /// Longer description for the rule catalogue.
    pub description: &'static str,
}

/// Trait defining a linting rule.
pub trait Rule: Send + Sync {
    /// Returns the descriptive name of the rule.
    fn name(&self) -> &'static str;
    /// Returns the unique code/ID of the rule.
    fn code(&self) -> &'static str {
        self.metadata().id
    }
    /// Returns the category/functional group of the rule.
    fn category(&self) -> &'static str {
        self.metadata().category
    }
    /// Returns the full metadata for the rule.
    fn metadata(&self) -> RuleMetadata;
    /// Node kinds this rule wants to see.
    fn interests(&self) -> &'static [SyntaxKind];
    /// Called for every node whose kind is listed in [`Rule::interests`].
    fn visit_node(
        &self,
        tree: &CstTree,
        semantics: &DocumentSemantics<'_>,
        node: NodeId,
        context: &Context,
    ) -> Option<Vec<Finding>>;
}

/// Module containing rule ID constants.
pub mod ids;
/// Module containing the `GetType().Name` rule.
pub mod nameof;

/// Metadata of every rule this crate ships.
#[must_use]
pub fn all_rule_metadata() -> Vec<RuleMetadata> {
    vec![nameof::METADATA]
}

/// Returns the enabled rules for a configuration.
#[must_use]
pub fn get_rules(config: &Config) -> Vec<Box<dyn Rule>> {
    let section = &config.gettype_nameof;
    let mut rules: Vec<Box<dyn Rule>> = Vec::new();
    if !section.is_rule_ignored(ids::RULE_ID_GETTYPE_TO_NAMEOF) {
        rules.push(Box::new(nameof::GetTypeNameDetector::new(
            nameof::DetectorOptions {
                external_bases: section.external_bases.unwrap_or_default(),
            },
        )));
    }
    rules
}
