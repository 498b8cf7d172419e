use crate::config::ExternalBasePolicy;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Help text for configuration file options, shown at the bottom of --help.
const CONFIG_HELP: &str = "\
CONFIGURATION FILE (.gettype-nameof.toml):
  Create this file in your project root to set defaults.
  It is looked up from the first analyzed path upwards.

  [gettype-nameof]
  # Path filters
  exclude_folders = [\"Legacy\", \"ThirdParty\"]
  include_folders = [\"packages\"]  # Force-include these
  include_generated = false         # Lint *.g.cs, *.designer.cs, <auto-generated> files

  # Analysis
  external_bases = \"trust\"          # or \"reject\": bases outside the sources
  ignore = [\"GetTypeToNameOf\"]      # Disable rules by id

  # CI/CD
  fail_on_findings = true           # Exit 1 when anything is reported

SUPPRESSIONS:
  #pragma warning disable GetTypeToNameOf ... #pragma warning restore GetTypeToNameOf
  var n = GetType().Name; // gettype-nameof: ignore
";

/// Options for output formatting and verbosity.
#[derive(Args, Debug, Default, Clone)]
#[allow(clippy::struct_excessive_bools)] // CLI flags are legitimately booleans
pub struct OutputOptions {
    /// Output raw JSON.
    #[arg(long)]
    pub json: bool,

    /// Enable verbose output for debugging (debug-level logs on stderr).
    #[arg(short, long)]
    pub verbose: bool,

    /// Quiet mode: show only the summary line (no detailed tables).
    #[arg(long)]
    pub quiet: bool,

    /// Exit with code 1 if any finding is reported.
    #[arg(long)]
    pub fail_on_findings: bool,
}

/// Command line interface configuration using `clap`.
/// This struct defines the arguments and flags accepted by the program.
#[derive(Parser, Debug)]
#[command(
    name = "gettype-nameof",
    version,
    about = "Finds GetType().Name on sealed C# types and rewrites it to nameof(Type)",
    long_about = None,
    after_help = CONFIG_HELP
)]
#[allow(clippy::struct_excessive_bools)] // CLI flags are legitimately booleans
pub struct Cli {
    #[command(subcommand)]
    /// The subcommand to execute.
    pub command: Option<Commands>,

    /// Paths to analyze (files or directories).
    /// When no paths are provided, defaults to the current directory.
    pub paths: Vec<PathBuf>,

    /// Output formatting options.
    #[command(flatten)]
    pub output: OutputOptions,

    /// Folders to exclude from analysis.
    #[arg(long = "exclude-folder", alias = "exclude-folders")]
    pub exclude_folders: Vec<String>,

    /// Folders to force-include in analysis (overrides default exclusions).
    #[arg(long = "include-folder", alias = "include-folders")]
    pub include_folders: Vec<String>,

    /// Also lint generated files (*.g.cs, *.designer.cs, `<auto-generated>` headers).
    #[arg(long)]
    pub include_generated: bool,

    /// How base types declared outside the analyzed sources are treated.
    #[arg(long, value_enum)]
    pub external_bases: Option<ExternalBasePolicy>,

    /// Rewrite findings to `nameof(...)`.
    /// By default, shows a preview of what would be changed (dry-run).
    /// Use --apply to actually modify files.
    #[arg(long)]
    pub fix: bool,

    /// Apply the fixes to files (use with --fix).
    /// Without this flag, --fix only shows a preview of what would be changed.
    #[arg(short = 'a', long, requires = "fix")]
    pub apply: bool,
}

#[derive(Subcommand, Debug)]
/// Available subcommands.
pub enum Commands {
    /// List the rules with their id, category and severity
    Rules {
        /// Output JSON.
        #[arg(long)]
        json: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_flags() {
        let cli = Cli::try_parse_from([
            "gettype-nameof",
            "src",
            "--fix",
            "--apply",
            "--external-bases",
            "reject",
            "--exclude-folder",
            "Legacy",
        ])
        .unwrap();

        assert_eq!(cli.paths, vec![PathBuf::from("src")]);
        assert!(cli.fix && cli.apply);
        assert_eq!(cli.external_bases, Some(ExternalBasePolicy::Reject));
        assert_eq!(cli.exclude_folders, vec!["Legacy".to_owned()]);
    }

    #[test]
    fn test_apply_requires_fix() {
        assert!(Cli::try_parse_from(["gettype-nameof", "--apply"]).is_err());
    }

    #[test]
    fn test_rules_subcommand() {
        let cli = Cli::try_parse_from(["gettype-nameof", "rules", "--json"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Rules { json: true })));
    }
}
