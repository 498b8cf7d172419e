//! gettype-nameof analyzer module.
//!
//! This module contains the analysis engine, broken down into:
//! - `types`: Result types (`AnalysisResult`, `ParseError`, `AnalysisSummary`)
//! - `processing`: File collection, parsing, model building and linting
//! - Core `NameofAnalyzer` struct and its builder methods

mod processing;
/// Result types and analysis summaries.
pub mod types;

pub use types::{AnalysisResult, AnalysisSummary, ParseError};

use crate::config::{Config, ExternalBasePolicy};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

/// The main analyzer struct.
/// Configuration options for the analysis are stored here.
pub struct NameofAnalyzer {
    /// Folders to exclude from analysis.
    pub exclude_folders: Vec<String>,
    /// Folders to force-include in analysis (overrides default exclusions).
    pub include_folders: Vec<String>,
    /// Whether generated files are linted.
    pub include_generated: bool,
    /// Total number of files analyzed.
    pub total_files_analyzed: usize,
    /// Total number of lines analyzed.
    pub total_lines_analyzed: usize,
    /// Configuration object.
    pub config: Config,
    /// Progress bar for tracking analysis progress (thread-safe).
    pub progress_bar: Option<Arc<indicatif::ProgressBar>>,
    cancel: Arc<AtomicBool>,
}

impl Default for NameofAnalyzer {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl NameofAnalyzer {
    /// Creates an analyzer whose options come from `config`.
    #[must_use]
    pub fn new(config: Config) -> Self {
        let section = &config.gettype_nameof;
        Self {
            exclude_folders: section.exclude_folders.clone().unwrap_or_default(),
            include_folders: section.include_folders.clone().unwrap_or_default(),
            include_generated: section.include_generated.unwrap_or(false),
            total_files_analyzed: 0,
            total_lines_analyzed: 0,
            config,
            progress_bar: None,
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Adds folders to exclude.
    #[must_use]
    pub fn with_excludes(mut self, folders: Vec<String>) -> Self {
        self.exclude_folders.extend(folders);
        self
    }

    /// Adds folders to force-include.
    #[must_use]
    pub fn with_includes(mut self, folders: Vec<String>) -> Self {
        self.include_folders.extend(folders);
        self
    }

    /// Sets whether generated files are linted.
    #[must_use]
    pub fn with_generated(mut self, include: bool) -> Self {
        self.include_generated = include;
        self
    }

    /// Sets the policy for base types outside the analyzed sources.
    #[must_use]
    pub fn with_external_bases(mut self, policy: ExternalBasePolicy) -> Self {
        self.config.gettype_nameof.external_bases = Some(policy);
        self
    }

    /// Attaches a progress bar advanced once per parsed file.
    #[must_use]
    pub fn with_progress(mut self, bar: Arc<indicatif::ProgressBar>) -> Self {
        self.progress_bar = Some(bar);
        self
    }

    /// Shares a cancellation flag; setting it stops the run early.
    #[must_use]
    pub fn with_cancellation(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = flag;
        self
    }
}
