use regex::Regex;
use rustc_hash::FxHashSet;
use std::sync::OnceLock;

/// Name of the project configuration file.
pub const CONFIG_FILE_NAME: &str = ".gettype-nameof.toml";

/// Environment variable holding the log filter.
pub const LOG_ENV_VAR: &str = "GETTYPE_NAMEOF_LOG";

/// Regex for end-of-line ignore comments.
///
/// Matches `// gettype-nameof: ignore` and `// gettype-nameof: ignore[Rule1, Rule2]`.
///
/// # Panics
///
/// Panics if the regex pattern is invalid.
pub fn get_suppression_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    #[allow(clippy::expect_used)]
    RE.get_or_init(|| {
        Regex::new(r"//\s*gettype-nameof:\s*ignore(?:\[([^\]]*)\])?")
            .expect("Invalid suppression regex pattern")
    })
}

/// Regex for `#pragma warning disable|restore [ids]` directives.
///
/// # Panics
///
/// Panics if the regex pattern is invalid.
pub fn get_pragma_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    #[allow(clippy::expect_used)]
    RE.get_or_init(|| {
        Regex::new(r"^\s*#\s*pragma\s+warning\s+(disable|restore)\b([^/\r\n]*)")
            .expect("Invalid pragma regex pattern")
    })
}

/// Regex for file names produced by code generators.
///
/// # Panics
///
/// Panics if the regex pattern is invalid.
pub fn get_generated_file_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    #[allow(clippy::expect_used)]
    RE.get_or_init(|| {
        Regex::new(concat!(
            r"(?i)(?:^|[/\\])",
            r"(?:TemporaryGeneratedFile_[^/\\]*|[^/\\]+\.(?:g|g\.i|designer|generated)\.cs)$",
        ))
        .expect("Invalid generated file regex pattern")
    })
}

/// Regex for the `<auto-generated>` header emitted by .NET tooling.
///
/// # Panics
///
/// Panics if the regex pattern is invalid.
pub fn get_auto_generated_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    #[allow(clippy::expect_used)]
    RE.get_or_init(|| {
        Regex::new(r"(?i)<auto-?generated").expect("Invalid auto-generated regex pattern")
    })
}

/// Set of folders to exclude by default.
pub fn get_default_exclude_folders() -> &'static FxHashSet<&'static str> {
    static SET: OnceLock<FxHashSet<&'static str>> = OnceLock::new();
    SET.get_or_init(|| {
        let mut s = FxHashSet::default();
        s.insert("bin");
        s.insert("obj");
        s.insert(".git");
        s.insert(".vs");
        s.insert(".idea");
        s.insert("packages");
        s.insert("node_modules");
        s.insert("TestResults");
        s
    })
}

pub use get_auto_generated_re as AUTO_GENERATED_RE;
pub use get_default_exclude_folders as DEFAULT_EXCLUDE_FOLDERS;
pub use get_generated_file_re as GENERATED_FILE_RE;
pub use get_pragma_re as PRAGMA_RE;
pub use get_suppression_re as SUPPRESSION_RE;
