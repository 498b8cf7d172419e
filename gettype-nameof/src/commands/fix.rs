//! `--fix` command: rewrites findings to `nameof(...)`.

use crate::analyzer::AnalysisResult;
use crate::cst::CstParser;
use crate::fix::apply_findings;
use crate::rules::Finding;
use crate::utils::normalize_display_path;

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::Path;

/// Options for the nameof fix.
#[derive(Debug, Default, Clone, Copy)]
pub struct NameofFixOptions {
    /// Dry-run mode (show what would change)
    pub dry_run: bool,
    /// Verbose output
    pub verbose: bool,
}

/// Result of fixing one file.
#[derive(Debug, Serialize)]
pub struct FixResult {
    /// File that was fixed
    pub file: String,
    /// Number of expressions rewritten
    pub fixes_applied: usize,
    /// Findings left untouched, with the reason
    pub skipped: Vec<String>,
}

fn group_by_file(results: &AnalysisResult) -> BTreeMap<&Path, Vec<Finding>> {
    let mut by_file: BTreeMap<&Path, Vec<Finding>> = BTreeMap::new();
    for finding in &results.findings {
        by_file
            .entry(finding.file.as_path())
            .or_default()
            .push(finding.clone());
    }
    by_file
}

/// Apply `--fix` to the findings of an analysis run.
///
/// In dry-run mode nothing is written; every finding is listed with its
/// replacement.
///
/// # Errors
///
/// Returns an error if writing to `writer` fails or the parser cannot be
/// created. Per-file read and write failures are reported and skipped.
pub fn run_fix_nameof<W: Write>(
    results: &AnalysisResult,
    options: &NameofFixOptions,
    mut writer: W,
) -> Result<Vec<FixResult>> {
    if options.dry_run {
        writeln!(
            writer,
            "\n{}",
            "[DRY-RUN] Expressions that would be rewritten:".yellow()
        )?;
    } else {
        writeln!(writer, "\n{}", "Applying nameof fixes...".cyan())?;
    }

    let by_file = group_by_file(results);
    if by_file.is_empty() {
        writeln!(writer, "  Nothing to fix.")?;
        return Ok(vec![]);
    }

    if options.dry_run {
        for findings in by_file.values() {
            for f in findings {
                writeln!(
                    writer,
                    "  Would replace '{}' with '{}' at {}:{}:{}",
                    f.original,
                    f.replacement,
                    normalize_display_path(&f.file),
                    f.line,
                    f.col
                )?;
            }
        }
        return Ok(vec![]);
    }

    let mut parser = CstParser::new()?;
    let mut all_results = Vec::new();
    for (file, findings) in by_file {
        if let Some(result) = fix_file(&mut parser, file, &findings, options, &mut writer)? {
            all_results.push(result);
        }
    }

    let total: usize = all_results.iter().map(|r| r.fixes_applied).sum();
    writeln!(
        writer,
        "\n{}",
        format!("Rewrote {total} expressions in {} files.", all_results.len()).green()
    )?;
    Ok(all_results)
}

fn fix_file<W: Write>(
    parser: &mut CstParser,
    file: &Path,
    findings: &[Finding],
    options: &NameofFixOptions,
    writer: &mut W,
) -> Result<Option<FixResult>> {
    let display = normalize_display_path(file);
    let source = match fs::read_to_string(file) {
        Ok(s) => s,
        Err(e) => {
            writeln!(writer, "  {} {display} ({e})", "Skip:".yellow())?;
            return Ok(None);
        }
    };

    let outcome = match apply_findings(parser, &source, findings) {
        Ok(outcome) => outcome,
        Err(e) => {
            writeln!(writer, "  {} {display} ({e})", "Skip:".yellow())?;
            return Ok(None);
        }
    };

    let skipped: Vec<String> = outcome
        .skipped
        .iter()
        .map(|(f, e)| format!("{}:{}: {e}", f.line, f.col))
        .collect();
    for reason in &skipped {
        writeln!(writer, "  {} {display}:{reason}", "Skip:".yellow())?;
    }

    if outcome.applied.is_empty() {
        return Ok(Some(FixResult {
            file: display,
            fixes_applied: 0,
            skipped,
        }));
    }

    if let Err(e) = fs::write(file, &outcome.text) {
        writeln!(writer, "  {} {display} ({e})", "Skip:".yellow())?;
        return Ok(None);
    }

    writeln!(
        writer,
        "  {} {display} ({} replaced)",
        "Fixed:".green(),
        outcome.applied.len()
    )?;
    if options.verbose {
        for f in &outcome.applied {
            writeln!(
                writer,
                "    {}:{} {} -> {}",
                f.line,
                f.col,
                f.original.dimmed(),
                f.replacement
            )?;
        }
    }

    Ok(Some(FixResult {
        file: display,
        fixes_applied: outcome.applied.len(),
        skipped,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::NameofAnalyzer;
    use tempfile::TempDir;

    const SOURCE: &str = r"namespace App
{
    sealed class Widget
    {
        public string Label => GetType().Name;
    }
}
";

    fn analyze(dir: &TempDir) -> AnalysisResult {
        NameofAnalyzer::default().analyze_paths(&[dir.path().to_path_buf()])
    }

    #[test]
    fn test_dry_run_leaves_files_untouched() {
        colored::control::set_override(false);
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Widget.cs");
        fs::write(&path, SOURCE).unwrap();

        let results = analyze(&dir);
        let mut out = Vec::new();
        let fixed = run_fix_nameof(
            &results,
            &NameofFixOptions {
                dry_run: true,
                verbose: false,
            },
            &mut out,
        )
        .unwrap();

        assert!(fixed.is_empty());
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Would replace 'GetType().Name' with 'nameof(Widget)'"));
        assert_eq!(fs::read_to_string(&path).unwrap(), SOURCE);
    }

    #[test]
    fn test_apply_rewrites_file() {
        colored::control::set_override(false);
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Widget.cs");
        fs::write(&path, SOURCE).unwrap();

        let results = analyze(&dir);
        assert_eq!(results.findings[0].file, path);

        let mut out = Vec::new();
        let fixed = run_fix_nameof(&results, &NameofFixOptions::default(), &mut out).unwrap();

        assert_eq!(fixed.len(), 1);
        assert_eq!(fixed[0].fixes_applied, 1);
        assert!(fs::read_to_string(&path)
            .unwrap()
            .contains("public string Label => nameof(Widget);"));

        // A second run finds nothing left to do.
        assert!(analyze(&dir).findings.is_empty());
    }

    #[test]
    fn test_stale_file_is_skipped() {
        colored::control::set_override(false);
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Widget.cs");
        fs::write(&path, SOURCE).unwrap();

        let results = analyze(&dir);
        fs::write(&path, format!("// edited\n{SOURCE}")).unwrap();

        let mut out = Vec::new();
        let fixed = run_fix_nameof(&results, &NameofFixOptions::default(), &mut out).unwrap();

        assert_eq!(fixed[0].fixes_applied, 0);
        assert_eq!(fixed[0].skipped.len(), 1);
        assert!(fs::read_to_string(&path).unwrap().starts_with("// edited"));
    }
}
