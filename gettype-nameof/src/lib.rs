//! Core library for the gettype-nameof analyzer.
//!
//! Finds `GetType().Name` evaluated on an instance of its own sealed C#
//! type and offers to rewrite it to the compile-time constant
//! `nameof(Type)`. The crate provides the C# syntax tree, the semantic
//! model used to check inheritance chains, the detector rule, and the
//! code fix.

// Allow common complexity warnings - these are intentional design choices
#![allow(
    clippy::type_complexity,
    clippy::too_many_arguments,
    clippy::similar_names,
    clippy::format_push_string,
    clippy::map_unwrap_or,
    clippy::items_after_statements
)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

/// Module containing the core analyzer logic.
/// This includes the `NameofAnalyzer` struct and its methods for running the analysis.
pub mod analyzer;

/// Module for loading configuration.
pub mod config;

/// Module containing the implementation of the analysis rules.
pub mod rules;

/// Module containing utility functions.
/// This includes path walking, line indexing, and suppression parsing.
pub mod utils;

/// Module defining the shared entry point for the binaries.
pub mod entry_point;

/// Module containing shared constants and regex patterns.
pub mod constants;
/// Module containing the linter logic and visitor.
pub mod linter;

/// Module for rich CLI output formatting with colored text and spinners.
pub mod output;

/// Module defining the command-line interface arguments and structs.
pub mod cli;

/// Module for handling CLI commands and their execution logic.
pub mod commands;

/// Concrete syntax tree for C# sources, backed by tree-sitter.
pub mod cst;
/// Byte-range rewriting and the `nameof` code fix.
pub mod fix;
/// Tracing subscriber setup.
pub mod logging;
/// Abstract view of type symbols used by the detector.
pub mod semantic;
/// Abstract view of syntax trees used by the detector.
pub mod syntax;
