//! Code fixes for rule findings.
//!
//! `ByteRangeRewriter` applies byte-offset edits to source text;
//! `code_fix` turns findings into validated edits, one at a time or all
//! findings of a document in a single batch.

pub mod code_fix;
mod rewriter;

pub use code_fix::{apply_finding, apply_findings, parse_expression, FixError, FixOutcome};
pub use rewriter::{ByteRangeRewriter, Edit, RewriteError};
