use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::constants::CONFIG_FILE_NAME;

/// How base types declared outside the analyzed sources are treated when
/// checking a type's inheritance chain for a `GetType` member.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ExternalBasePolicy {
    /// Assume external bases declare no `GetType` of their own.
    #[default]
    Trust,
    /// Refuse to suggest a rewrite when the chain leaves the analyzed sources.
    Reject,
}

#[derive(Debug, Deserialize, Default, Clone)]
/// Top-level configuration struct.
pub struct Config {
    #[serde(default, rename = "gettype-nameof")]
    /// The main configuration section.
    pub gettype_nameof: NameofConfig,
    /// The path to the configuration file this was loaded from.
    /// Set during `load_from_path`, `None` if using defaults or programmatic config.
    #[serde(skip)]
    pub config_file_path: Option<std::path::PathBuf>,
}

#[derive(Debug, Deserialize, Default, Clone)]
/// Configuration options for the analyzer.
pub struct NameofConfig {
    /// List of folders to exclude.
    pub exclude_folders: Option<Vec<String>>,
    /// List of folders to include even when excluded by default.
    pub include_folders: Option<Vec<String>>,
    /// Whether generated files are linted too.
    pub include_generated: Option<bool>,
    /// Policy for base types outside the analyzed sources.
    pub external_bases: Option<ExternalBasePolicy>,
    /// List of rule ids to ignore.
    pub ignore: Option<Vec<String>>,
    /// Exit with a failure status when findings are reported.
    pub fail_on_findings: Option<bool>,
}

impl NameofConfig {
    /// Whether `rule_id` is listed under `ignore`.
    #[must_use]
    pub fn is_rule_ignored(&self, rule_id: &str) -> bool {
        self.ignore
            .as_ref()
            .is_some_and(|ids| ids.iter().any(|id| id == rule_id))
    }
}

/// Absolute directory the upward search starts from.
///
/// Relative paths are resolved first; popping `src` off a relative `src`
/// would otherwise end the search at the working directory.
fn search_start(path: &Path) -> PathBuf {
    let mut start = path
        .canonicalize()
        .or_else(|_| std::env::current_dir().map(|cwd| cwd.join(path)))
        .unwrap_or_else(|_| path.to_path_buf());
    if start.is_file() {
        start.pop();
    }
    start
}

impl Config {
    /// Loads configuration starting from a specific path and traversing up.
    ///
    /// A file that cannot be read or parsed is skipped with a warning and
    /// the search continues in the parent directory.
    #[must_use]
    pub fn load_from_path(path: &Path) -> Self {
        let mut current = search_start(path);

        loop {
            let candidate = current.join(CONFIG_FILE_NAME);
            if candidate.exists() {
                match fs::read_to_string(&candidate)
                    .map_err(anyhow::Error::from)
                    .and_then(|content| Ok(toml::from_str::<Config>(&content)?))
                {
                    Ok(mut config) => {
                        tracing::debug!(path = %candidate.display(), "loaded configuration");
                        config.config_file_path = Some(candidate);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!(path = %candidate.display(), "ignoring configuration: {e}");
                    }
                }
            }

            if !current.pop() {
                break;
            }
        }

        Config::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_parse_all_keys() {
        let content = r#"
[gettype-nameof]
exclude_folders = ["Legacy"]
include_folders = ["packages"]
include_generated = true
external_bases = "reject"
ignore = ["GetTypeToNameOf"]
fail_on_findings = true
"#;
        let config = toml::from_str::<Config>(content).unwrap();
        let section = &config.gettype_nameof;
        assert_eq!(section.exclude_folders, Some(vec!["Legacy".to_owned()]));
        assert_eq!(section.include_folders, Some(vec!["packages".to_owned()]));
        assert_eq!(section.include_generated, Some(true));
        assert_eq!(section.external_bases, Some(ExternalBasePolicy::Reject));
        assert!(section.is_rule_ignored("GetTypeToNameOf"));
        assert_eq!(section.fail_on_findings, Some(true));
    }

    #[test]
    fn test_load_from_path_no_config() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_from_path(dir.path());
        assert!(config.config_file_path.is_none());
        assert!(config.gettype_nameof.external_bases.is_none());
    }

    #[test]
    fn test_load_from_path_traverses_up() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("src").join("Core");
        std::fs::create_dir_all(&nested).unwrap();

        let mut file = std::fs::File::create(dir.path().join(CONFIG_FILE_NAME)).unwrap();
        writeln!(
            file,
            r#"[gettype-nameof]
external_bases = "trust"
"#
        )
        .unwrap();

        let config = Config::load_from_path(&nested);
        assert_eq!(
            config.gettype_nameof.external_bases,
            Some(ExternalBasePolicy::Trust)
        );
        assert!(config.config_file_path.is_some());
    }

    #[test]
    fn test_load_from_file_path() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "[gettype-nameof]\nfail_on_findings = true\n",
        )
        .unwrap();
        let cs_file = dir.path().join("Program.cs");
        std::fs::write(&cs_file, "class Program { }").unwrap();

        let config = Config::load_from_path(&cs_file);
        assert_eq!(config.gettype_nameof.fail_on_findings, Some(true));
    }

    #[test]
    fn test_malformed_config_is_skipped() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "[gettype-nameof\nbroken").unwrap();

        let config = Config::load_from_path(dir.path());
        assert!(config.gettype_nameof.fail_on_findings.is_none());
    }

    #[test]
    fn test_relative_start_reaches_parents() {
        let start = search_start(Path::new("."));
        assert!(start.is_absolute());
        assert_eq!(start, std::env::current_dir().unwrap().canonicalize().unwrap());
    }
}
