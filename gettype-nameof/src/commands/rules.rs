//! `rules` subcommand: lists the available rules.

use crate::output::print_rules;
use crate::rules::all_rule_metadata;

use anyhow::Result;
use std::io::Write;

/// Prints the rule catalogue as a table, or as JSON when `json` is set.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn run_rules<W: Write>(json: bool, mut writer: W) -> Result<()> {
    let rules = all_rule_metadata();
    if json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&rules)?)?;
    } else {
        print_rules(&mut writer, &rules)?;
    }
    Ok(())
}
