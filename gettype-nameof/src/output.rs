use crate::analyzer::{AnalysisResult, AnalysisSummary, ParseError};
use crate::rules::{Finding, RuleMetadata};
use crate::utils::normalize_display_path;
use colored::Colorize;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::io::Write;
use std::time::Duration;

/// Print the exclusion list in styled format.
///
/// # Errors
///
/// Returns an error if writing to the output fails.
pub fn print_exclusion_list(writer: &mut impl Write, folders: &[String]) -> std::io::Result<()> {
    if folders.is_empty() {
        let mut defaults: Vec<&str> = crate::constants::DEFAULT_EXCLUDE_FOLDERS()
            .iter()
            .copied()
            .collect();
        defaults.sort_unstable();
        writeln!(
            writer,
            "{} {}",
            "[OK] Using default exclusions only:".green(),
            defaults.join(", ").dimmed()
        )?;
    } else {
        writeln!(writer, "{} {}", "Excluding:".yellow().bold(), folders.join(", "))?;
    }
    Ok(())
}

/// Create a progress bar with file count.
///
/// In test mode, returns a hidden progress bar to avoid polluting test output.
#[must_use]
pub fn create_progress_bar(total_files: u64) -> ProgressBar {
    if cfg!(test) {
        return ProgressBar::hidden();
    }

    let pb =
        ProgressBar::with_draw_target(Some(total_files), ProgressDrawTarget::stderr_with_hz(20));
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} files ({percent}%) {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░"),
    );
    pb.set_message("parsing...");
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.tick();
    pb
}

/// Print the main header with box-drawing characters.
///
/// # Errors
///
/// Returns an error if writing to the output fails.
pub fn print_header(writer: &mut impl Write) -> std::io::Result<()> {
    writeln!(writer)?;
    writeln!(writer, "{}", "╔════════════════════════════════════════╗".cyan())?;
    writeln!(writer, "{}", "║  GetType().Name -> nameof Results      ║".cyan().bold())?;
    writeln!(writer, "{}", "╚════════════════════════════════════════╝".cyan())?;
    writeln!(writer)?;
    Ok(())
}

/// Print analysis statistics (files and lines processed).
///
/// # Errors
///
/// Returns an error if writing to the output fails.
pub fn print_analysis_stats(
    writer: &mut impl Write,
    summary: &AnalysisSummary,
) -> std::io::Result<()> {
    writeln!(
        writer,
        "{}",
        format!(
            "Analyzed {} files ({} lines, {} types)",
            summary.total_files.to_string().bold(),
            summary.total_lines_analyzed.to_string().bold(),
            summary.types_declared.to_string().bold()
        )
        .dimmed()
    )?;
    if summary.generated_files_skipped > 0 || summary.suppressed_count > 0 {
        writeln!(
            writer,
            "{}",
            format!(
                "Skipped {} generated files, {} suppressed findings",
                summary.generated_files_skipped, summary.suppressed_count
            )
            .dimmed()
        )?;
    }
    if summary.cancelled {
        writeln!(writer, "{}", "Analysis was cancelled; results are partial.".yellow())?;
    }
    writeln!(writer)?;
    Ok(())
}

fn create_table(headers: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(headers);
    table
}

fn get_severity_color(severity: &str) -> Color {
    match severity.to_lowercase().as_str() {
        "error" => Color::Red,
        "warning" => Color::Yellow,
        "info" => Color::Blue,
        _ => Color::White,
    }
}

/// Print a list of findings.
///
/// # Errors
///
/// Returns an error if writing to the output fails.
pub fn print_findings(
    writer: &mut impl Write,
    title: &str,
    findings: &[Finding],
) -> std::io::Result<()> {
    if findings.is_empty() {
        return Ok(());
    }

    writeln!(writer, "\n{}", title.bold().underline())?;

    let mut table = create_table(vec!["Rule ID", "Message", "Location", "Severity"]);
    for f in findings {
        let location = format!("{}:{}:{}", normalize_display_path(&f.file), f.line, f.col);
        table.add_row(vec![
            Cell::new(&f.rule_id).add_attribute(Attribute::Dim),
            Cell::new(&f.message).add_attribute(Attribute::Bold),
            Cell::new(location),
            Cell::new(&f.severity).fg(get_severity_color(&f.severity)),
        ]);
    }

    writeln!(writer, "{table}")?;
    Ok(())
}

/// Print a list of parse errors.
///
/// # Errors
///
/// Returns an error if writing to the output fails.
pub fn print_parse_errors(writer: &mut impl Write, errors: &[ParseError]) -> std::io::Result<()> {
    if errors.is_empty() {
        return Ok(());
    }

    writeln!(writer, "\n{}", "Parse Errors".bold().underline().red())?;

    let mut table = create_table(vec!["File", "Error"]);
    for e in errors {
        table.add_row(vec![
            Cell::new(normalize_display_path(&e.file)).add_attribute(Attribute::Bold),
            Cell::new(&e.error).fg(Color::Red),
        ]);
    }

    writeln!(writer, "{table}")?;
    Ok(())
}

/// Print the full report.
///
/// # Errors
///
/// Returns an error if writing to the writer fails.
pub fn print_report(writer: &mut impl Write, result: &AnalysisResult) -> std::io::Result<()> {
    print_header(writer)?;

    if result.findings.is_empty() && result.parse_errors.is_empty() {
        writeln!(writer, "{}", "✓ All clean! No issues found.".green())?;
        return Ok(());
    }

    print_findings(writer, "Simplifications", &result.findings)?;
    print_parse_errors(writer, &result.parse_errors)?;
    Ok(())
}

/// Print a quiet report (no detailed tables) for CI/CD mode.
///
/// # Errors
///
/// Returns an error if writing to the output fails.
pub fn print_report_quiet(writer: &mut impl Write, result: &AnalysisResult) -> std::io::Result<()> {
    writeln!(
        writer,
        "[SUMMARY] {} findings, {} parse errors",
        result.findings.len(),
        result.parse_errors.len()
    )?;
    Ok(())
}

/// Print the rule catalogue.
///
/// # Errors
///
/// Returns an error if writing to the output fails.
pub fn print_rules(writer: &mut impl Write, rules: &[RuleMetadata]) -> std::io::Result<()> {
    let mut table = create_table(vec!["Rule ID", "Title", "Category", "Severity", "Description"]);
    for rule in rules {
        table.add_row(vec![
            Cell::new(rule.id).add_attribute(Attribute::Bold),
            Cell::new(rule.title),
            Cell::new(rule.category),
            Cell::new(rule.severity).fg(get_severity_color(rule.severity)),
            Cell::new(rule.description),
        ]);
    }
    writeln!(writer, "{table}")?;
    Ok(())
}
