use crate::cst::{CstTree, DocumentSemantics};
use crate::rules::{Context, Finding, Rule};
use crate::utils::Suppressions;
use std::sync::atomic::{AtomicBool, Ordering};

/// Visitor for walking a parsed document and applying linter rules.
pub struct LinterVisitor<'a> {
    rules: &'a [Box<dyn Rule>],
    context: Context,
    suppressions: Suppressions,
    cancel: Option<&'a AtomicBool>,
    /// List of findings collected during the traversal.
    pub findings: Vec<Finding>,
    /// Number of findings dropped by suppression comments or pragmas.
    pub suppressed: usize,
    /// Whether the walk stopped early because cancellation was requested.
    pub cancelled: bool,
}

impl<'a> LinterVisitor<'a> {
    /// Creates a new `LinterVisitor` with the given rules and context.
    #[must_use]
    pub fn new(rules: &'a [Box<dyn Rule>], context: Context, source: &str) -> Self {
        Self {
            rules,
            context,
            suppressions: Suppressions::parse(source),
            cancel: None,
            findings: Vec::new(),
            suppressed: 0,
            cancelled: false,
        }
    }

    /// Stops the walk as soon as `flag` is set.
    #[must_use]
    pub fn with_cancellation(mut self, flag: &'a AtomicBool) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Visits every node of `tree` in source order.
    pub fn visit_tree(&mut self, tree: &CstTree, semantics: &DocumentSemantics<'_>) {
        for node in tree.node_ids() {
            let kind = tree.node(node).kind;
            for rule in self.rules {
                if !rule.interests().contains(&kind) {
                    continue;
                }
                if self.cancel.is_some_and(|flag| flag.load(Ordering::Relaxed)) {
                    self.cancelled = true;
                    return;
                }
                let Some(findings) = rule.visit_node(tree, semantics, node, &self.context) else {
                    continue;
                };
                for finding in findings {
                    if self.suppressions.is_suppressed(finding.line, &finding.rule_id) {
                        self.suppressed += 1;
                    } else {
                        self.findings.push(finding);
                    }
                }
            }
        }
    }
}
