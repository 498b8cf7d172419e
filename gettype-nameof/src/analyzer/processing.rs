//! Processing methods for the analyzer.
//!
//! Contains: `analyze_paths`, `analyze_sources`, `analyze_code`

use super::{AnalysisResult, AnalysisSummary, NameofAnalyzer, ParseError};
use crate::cst::{CstParser, CstTree, DocumentId, SemanticModel};
use crate::linter::LinterVisitor;
use crate::rules::{get_rules, Context, Finding};
use crate::utils::{collect_cs_files_gitignore, is_generated_code};
use rayon::prelude::*;
use std::path::PathBuf;
use std::sync::atomic::Ordering;

struct ParsedDocument {
    path: PathBuf,
    tree: CstTree,
    generated: bool,
}

#[derive(Default)]
struct DocumentReport {
    findings: Vec<Finding>,
    suppressed: usize,
    cancelled: bool,
}

/// Describes the first place tree-sitter had to recover from.
fn describe_syntax_error(tree: &CstTree) -> String {
    tree.node_ids()
        .map(|id| tree.node(id))
        .find(|n| n.raw_kind == "ERROR" || n.is_missing)
        .map_or_else(
            || "syntax errors recovered".to_owned(),
            |n| {
                format!(
                    "syntax errors recovered; first at line {}, column {}",
                    n.start_point.row + 1,
                    n.start_point.column + 1
                )
            },
        )
}

impl NameofAnalyzer {
    /// Runs the analysis on multiple paths (files or directories).
    ///
    /// Directories are walked for `.cs` files; files are taken as given.
    /// With no paths the current directory is analyzed.
    pub fn analyze_paths(&mut self, paths: &[PathBuf]) -> AnalysisResult {
        let default_root = [PathBuf::from(".")];
        let roots = if paths.is_empty() { &default_root[..] } else { paths };

        let mut files = Vec::new();
        for path in roots {
            if path.is_file() {
                if path.extension().is_some_and(|ext| ext == "cs") {
                    files.push(path.clone());
                }
            } else if path.is_dir() {
                let (found, dirs) =
                    collect_cs_files_gitignore(path, &self.exclude_folders, &self.include_folders);
                tracing::debug!(
                    root = %path.display(),
                    files = found.len(),
                    dirs,
                    "collected files"
                );
                files.extend(found);
            }
        }
        files.sort();
        files.dedup();
        if let Some(bar) = &self.progress_bar {
            bar.set_length(files.len() as u64);
        }

        let (sources, read_errors): (Vec<_>, Vec<_>) = files
            .par_iter()
            .map(|path| {
                std::fs::read_to_string(path)
                    .map(|source| (path.clone(), source))
                    .map_err(|e| ParseError {
                        file: path.clone(),
                        error: format!("could not read file: {e}"),
                    })
            })
            .partition_map(|r| match r {
                Ok(doc) => rayon::iter::Either::Left(doc),
                Err(e) => rayon::iter::Either::Right(e),
            });

        let mut result = self.analyze_sources(sources);
        result.parse_errors.extend(read_errors);
        result.parse_errors.sort_by(|a, b| a.file.cmp(&b.file));
        result.analysis_summary.parse_errors_count = result.parse_errors.len();
        result
    }

    /// Analyzes a single in-memory document.
    pub fn analyze_code(&mut self, code: &str, file_path: impl Into<PathBuf>) -> AnalysisResult {
        self.analyze_sources(vec![(file_path.into(), code.to_owned())])
    }

    /// Analyzes in-memory documents as one program: declarations from every
    /// document are visible when resolving base types.
    pub fn analyze_sources(&mut self, sources: Vec<(PathBuf, String)>) -> AnalysisResult {
        let cancel = &*self.cancel;
        let progress = self.progress_bar.as_deref();
        let total_files = sources.len();
        let total_lines: usize = sources.iter().map(|(_, s)| s.lines().count()).sum();

        let parsed: Vec<Result<ParsedDocument, ParseError>> = sources
            .into_par_iter()
            .map_init(CstParser::new, |parser, (path, source)| {
                if let Some(bar) = progress {
                    bar.inc(1);
                }
                let parser = match parser {
                    Ok(p) => p,
                    Err(e) => {
                        return Err(ParseError {
                            file: path,
                            error: e.to_string(),
                        })
                    }
                };
                let tree = parser.parse(&source).map_err(|e| ParseError {
                    file: path.clone(),
                    error: e.to_string(),
                })?;
                let generated = is_generated_code(&path, &source);
                tracing::debug!(file = %path.display(), nodes = tree.len(), generated, "parsed");
                Ok(ParsedDocument {
                    path,
                    tree,
                    generated,
                })
            })
            .collect();

        let mut parse_errors = Vec::new();
        let mut documents = Vec::with_capacity(parsed.len());
        for doc in parsed {
            match doc {
                Ok(doc) => {
                    if doc.tree.has_error() {
                        parse_errors.push(ParseError {
                            file: doc.path.clone(),
                            error: describe_syntax_error(&doc.tree),
                        });
                    }
                    documents.push(doc);
                }
                Err(e) => parse_errors.push(e),
            }
        }

        let model = SemanticModel::build(
            documents
                .iter()
                .enumerate()
                .map(|(i, d)| (DocumentId(u32::try_from(i).unwrap_or(u32::MAX)), &d.tree)),
        );

        let rules = get_rules(&self.config);
        let include_generated = self.include_generated;
        let reports: Vec<DocumentReport> = documents
            .par_iter()
            .enumerate()
            .map(|(i, doc)| {
                if doc.generated && !include_generated {
                    tracing::debug!(file = %doc.path.display(), "skipping generated file");
                    return DocumentReport::default();
                }
                if cancel.load(Ordering::Relaxed) {
                    return DocumentReport {
                        cancelled: true,
                        ..DocumentReport::default()
                    };
                }
                let source = &doc.tree.source;
                let semantics =
                    model.for_document(DocumentId(u32::try_from(i).unwrap_or(u32::MAX)));
                let mut visitor =
                    LinterVisitor::new(&rules, Context::new(doc.path.clone(), source), source)
                        .with_cancellation(cancel);
                visitor.visit_tree(&doc.tree, &semantics);
                DocumentReport {
                    findings: visitor.findings,
                    suppressed: visitor.suppressed,
                    cancelled: visitor.cancelled,
                }
            })
            .collect();

        let generated_files_skipped = if include_generated {
            0
        } else {
            documents.iter().filter(|d| d.generated).count()
        };

        let mut findings = Vec::new();
        let mut suppressed_count = 0;
        let mut cancelled = false;
        for report in reports {
            findings.extend(report.findings);
            suppressed_count += report.suppressed;
            cancelled |= report.cancelled;
        }
        findings.sort_by(|a, b| (&a.file, a.start_byte).cmp(&(&b.file, b.start_byte)));
        parse_errors.sort_by(|a, b| a.file.cmp(&b.file));

        self.total_files_analyzed = total_files;
        self.total_lines_analyzed = total_lines;
        if cancelled {
            tracing::warn!("analysis cancelled; results are partial");
        }

        AnalysisResult {
            analysis_summary: AnalysisSummary {
                total_files,
                total_lines_analyzed: total_lines,
                types_declared: model.types().len(),
                findings_count: findings.len(),
                suppressed_count,
                generated_files_skipped,
                parse_errors_count: parse_errors.len(),
                cancelled,
            },
            findings,
            parse_errors,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExternalBasePolicy;
    use std::sync::atomic::AtomicBool;
    use std::sync::Arc;

    #[test]
    fn test_cross_file_base_shadowing() {
        let mut analyzer = NameofAnalyzer::default();
        let result = analyzer.analyze_sources(vec![
            (
                "Base.cs".into(),
                "namespace App { public class Base { public new string GetType() => \"x\"; } }"
                    .to_owned(),
            ),
            (
                "Derived.cs".into(),
                "namespace App { sealed class Derived : Base { string N => GetType().Name; } }"
                    .to_owned(),
            ),
        ]);

        assert!(result.findings.is_empty());
        assert_eq!(result.analysis_summary.types_declared, 2);
    }

    #[test]
    fn test_generated_files_skipped() {
        let source = "sealed class A { string N => GetType().Name; }";
        let mut analyzer = NameofAnalyzer::default();
        let result = analyzer.analyze_sources(vec![("A.g.cs".into(), source.to_owned())]);

        assert!(result.findings.is_empty());
        assert_eq!(result.analysis_summary.generated_files_skipped, 1);

        let mut analyzer = NameofAnalyzer::default().with_generated(true);
        let result = analyzer.analyze_sources(vec![("A.g.cs".into(), source.to_owned())]);
        assert_eq!(result.findings.len(), 1);
    }

    #[test]
    fn test_external_base_policy_applies() {
        let source = "sealed class Boom : Exception { string N => GetType().Name; }";

        let mut analyzer = NameofAnalyzer::default();
        assert_eq!(analyzer.analyze_code(source, "Boom.cs").findings.len(), 1);

        let mut analyzer =
            NameofAnalyzer::default().with_external_bases(ExternalBasePolicy::Reject);
        assert!(analyzer.analyze_code(source, "Boom.cs").findings.is_empty());
    }

    #[test]
    fn test_syntax_errors_recorded_but_linted() {
        let source = "sealed class A { string N => GetType().Name; void Broken( }";
        let mut analyzer = NameofAnalyzer::default();
        let result = analyzer.analyze_code(source, "A.cs");

        assert_eq!(result.parse_errors.len(), 1);
        assert!(result.parse_errors[0].error.contains("syntax errors"));
    }

    #[test]
    fn test_cancelled_run_is_partial() {
        let flag = Arc::new(AtomicBool::new(true));
        let mut analyzer = NameofAnalyzer::default().with_cancellation(Arc::clone(&flag));
        let source = "sealed class A { string N => GetType().Name; }";
        let result = analyzer.analyze_code(source, "A.cs");

        assert!(result.findings.is_empty());
        assert!(result.analysis_summary.cancelled);
    }
}
