//! Type definitions for analysis results.

use crate::rules::Finding;
use serde::{Deserialize, Serialize};

/// Represents a parsing error in a file.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ParseError {
    /// The file where the error occurred.
    pub file: std::path::PathBuf,
    /// The error message.
    pub error: String,
}

/// Holds the results of the analysis.
/// This struct is serialized to JSON if requested.
#[derive(Debug, Serialize, Deserialize, Default)]
pub struct AnalysisResult {
    /// Findings in file order, then source order.
    pub findings: Vec<Finding>,
    /// List of parse errors encountered.
    pub parse_errors: Vec<ParseError>,
    /// Summary statistics of the analysis.
    pub analysis_summary: AnalysisSummary,
}

/// Summary statistics for the analysis result.
#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct AnalysisSummary {
    /// Total number of files scanned.
    pub total_files: usize,
    /// Total number of lines analyzed.
    pub total_lines_analyzed: usize,
    /// Number of types declared across all files.
    pub types_declared: usize,
    /// Total number of findings reported.
    pub findings_count: usize,
    /// Findings dropped by suppression comments or pragmas.
    pub suppressed_count: usize,
    /// Generated files that were not linted.
    pub generated_files_skipped: usize,
    /// Total number of parse errors found.
    pub parse_errors_count: usize,
    /// Whether the run stopped early on request.
    pub cancelled: bool,
}
