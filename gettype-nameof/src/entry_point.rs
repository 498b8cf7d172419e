//! Shared entry point used by both binaries.

use crate::analyzer::{AnalysisResult, NameofAnalyzer};
use crate::cli::{Cli, Commands};
use crate::commands::{run_fix_nameof, run_rules, FixResult, NameofFixOptions};
use crate::config::{Config, ExternalBasePolicy};
use crate::logging::init_tracing;
use anyhow::Result;
use clap::Parser;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;

/// Run gettype-nameof with the given arguments, writing to stdout.
///
/// # Errors
///
/// Returns an error if the command execution fails.
pub fn run_with_args(args: Vec<String>) -> Result<i32> {
    run_with_args_to(args, &mut std::io::stdout())
}

#[derive(Serialize)]
struct FixedOutput<'a> {
    analysis: &'a AnalysisResult,
    fixes: Vec<FixResult>,
}

/// Run gettype-nameof with the given arguments, writing output to the specified writer.
///
/// This is the testable version of `run_with_args` that allows output capture.
/// Returns the process exit code: 0 on success, 1 on usage errors, missing
/// paths, or findings when `fail_on_findings` is enabled.
///
/// # Errors
///
/// Returns an error if writing the report fails.
#[allow(clippy::too_many_lines)]
pub fn run_with_args_to<W: std::io::Write>(args: Vec<String>, writer: &mut W) -> Result<i32> {
    let mut program_args = vec!["gettype-nameof".to_owned()];
    program_args.extend(args);
    let cli_var = match Cli::try_parse_from(program_args) {
        Ok(c) => c,
        Err(e) => match e.kind() {
            clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion => {
                write!(writer, "{e}")?;
                writer.flush()?;
                return Ok(0);
            }
            _ => {
                eprint!("{e}");
                return Ok(1);
            }
        },
    };

    init_tracing(cli_var.output.verbose);

    if let Some(Commands::Rules { json }) = cli_var.command {
        run_rules(json, &mut *writer)?;
        return Ok(0);
    }

    for path in &cli_var.paths {
        if !path.exists() {
            eprintln!(
                "Error: The file or directory '{}' does not exist.",
                path.display()
            );
            return Ok(1);
        }
    }

    // Load config from the first path or current directory
    let config_path = cli_var
        .paths
        .first()
        .map_or(Path::new("."), std::path::PathBuf::as_path);
    let config = Config::load_from_path(config_path);
    if let Some(found) = &config.config_file_path {
        tracing::debug!(path = %found.display(), "using configuration file");
    }

    let include_generated =
        cli_var.include_generated || config.gettype_nameof.include_generated.unwrap_or(false);
    let external_bases = cli_var
        .external_bases
        .or(config.gettype_nameof.external_bases)
        .unwrap_or_default();
    let fail_on_findings =
        cli_var.output.fail_on_findings || config.gettype_nameof.fail_on_findings.unwrap_or(false);

    let mut analyzer = NameofAnalyzer::new(config)
        .with_excludes(cli_var.exclude_folders.clone())
        .with_includes(cli_var.include_folders.clone())
        .with_generated(include_generated)
        .with_external_bases(external_bases);

    let json = cli_var.output.json;
    if !json && !cli_var.output.quiet {
        crate::output::print_exclusion_list(writer, &analyzer.exclude_folders).ok();
    }

    if cli_var.output.verbose && !json {
        eprintln!("[VERBOSE] gettype-nameof v{}", env!("CARGO_PKG_VERSION"));
        eprintln!("[VERBOSE] Using {} threads", rayon::current_num_threads());
        eprintln!("[VERBOSE] Configuration:");
        eprintln!("   Paths: {:?}", cli_var.paths);
        eprintln!("   Include generated: {include_generated}");
        eprintln!(
            "   External bases: {}",
            match external_bases {
                ExternalBasePolicy::Trust => "trust",
                ExternalBasePolicy::Reject => "reject",
            }
        );
        if !analyzer.include_folders.is_empty() {
            eprintln!("   Include folders: {:?}", analyzer.include_folders);
        }
        eprintln!();
    }

    let progress = if json || cli_var.output.quiet {
        None
    } else {
        Some(Arc::new(crate::output::create_progress_bar(0)))
    };
    if let Some(bar) = &progress {
        analyzer = analyzer.with_progress(Arc::clone(bar));
    }

    let start_time = std::time::Instant::now();
    let result = analyzer.analyze_paths(&cli_var.paths);

    if let Some(bar) = progress {
        bar.finish_and_clear();
    }
    if cli_var.output.verbose && !json {
        eprintln!(
            "[VERBOSE] Analysis completed in {:.2}s",
            start_time.elapsed().as_secs_f64()
        );
    }

    let fix_options = NameofFixOptions {
        dry_run: !cli_var.apply,
        verbose: cli_var.output.verbose,
    };

    let mut remaining = result.findings.len();
    if json {
        if cli_var.fix {
            let fixes = run_fix_nameof(&result, &fix_options, std::io::sink())?;
            remaining -= fixes.iter().map(|f| f.fixes_applied).sum::<usize>();
            let combined = FixedOutput {
                analysis: &result,
                fixes,
            };
            writeln!(writer, "{}", serde_json::to_string_pretty(&combined)?)?;
        } else {
            writeln!(writer, "{}", serde_json::to_string_pretty(&result)?)?;
        }
    } else {
        if cli_var.output.quiet {
            crate::output::print_report_quiet(writer, &result)?;
        } else {
            crate::output::print_report(writer, &result)?;
            crate::output::print_analysis_stats(writer, &result.analysis_summary)?;
        }

        if cli_var.fix {
            let fixes = run_fix_nameof(&result, &fix_options, &mut *writer)?;
            remaining -= fixes.iter().map(|f| f.fixes_applied).sum::<usize>();
        }
    }

    if fail_on_findings && remaining > 0 {
        if !json {
            eprintln!("\n[GATE] {remaining} GetType().Name findings - FAILED");
        }
        return Ok(1);
    }

    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn run(args: &[&str]) -> (i32, String) {
        let mut out = Vec::new();
        let code =
            run_with_args_to(args.iter().map(|s| (*s).to_owned()).collect(), &mut out).unwrap();
        (code, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_help_exits_zero() {
        let (code, out) = run(&["--help"]);
        assert_eq!(code, 0);
        assert!(out.contains("nameof"));
    }

    #[test]
    fn test_unknown_flag_exits_one() {
        let (code, _) = run(&["--no-such-flag"]);
        assert_eq!(code, 1);
    }

    #[test]
    fn test_missing_path_exits_one() {
        let (code, _) = run(&["definitely/not/here"]);
        assert_eq!(code, 1);
    }

    #[test]
    fn test_json_and_fail_on_findings() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("A.cs"),
            "sealed class A { string N => GetType().Name; }",
        )
        .unwrap();
        let root = dir.path().to_str().unwrap();

        let (code, out) = run(&[root, "--json"]);
        assert_eq!(code, 0);
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["findings"][0]["replacement"], "nameof(A)");

        let (code, _) = run(&[root, "--json", "--fail-on-findings"]);
        assert_eq!(code, 1);
    }

    #[test]
    fn test_apply_clears_gate() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("A.cs");
        fs::write(&file, "sealed class A { string N => GetType().Name; }").unwrap();
        let root = dir.path().to_str().unwrap();

        let (code, _) = run(&[root, "--quiet", "--fix", "--apply", "--fail-on-findings"]);
        assert_eq!(code, 0);
        assert_eq!(
            fs::read_to_string(&file).unwrap(),
            "sealed class A { string N => nameof(A); }"
        );
    }
}
