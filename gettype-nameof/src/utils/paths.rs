//! Path utilities for gettype-nameof.
//!
//! Cross-platform path normalization and C# file discovery with gitignore
//! support.

use crate::constants::DEFAULT_EXCLUDE_FOLDERS;

/// Normalizes a path for CLI display.
///
/// - Converts backslashes to forward slashes (for cross-platform consistency)
/// - Strips leading "./" or ".\" prefix (for cleaner output)
///
/// # Examples
/// ```
/// use std::path::Path;
/// use gettype_nameof::utils::normalize_display_path;
///
/// assert_eq!(normalize_display_path(Path::new(".\\src\\Program.cs")), "src/Program.cs");
/// assert_eq!(normalize_display_path(Path::new("./src/Widget.cs")), "src/Widget.cs");
/// ```
#[must_use]
pub fn normalize_display_path(path: &std::path::Path) -> String {
    let s = path.to_string_lossy();
    // Strip Windows extended path prefix if present
    let clean = s.trim_start_matches(r"\\?\");
    let normalized = clean.replace('\\', "/");
    normalized
        .strip_prefix("./")
        .unwrap_or(&normalized)
        .to_owned()
}

/// Checks if a name matches any exclusion pattern.
/// Supports exact matching and wildcard patterns starting with `*.`.
#[must_use]
pub fn is_excluded(name: &str, excludes: &[String]) -> bool {
    excludes.iter().any(|exclude| match exclude.strip_prefix('*') {
        Some(suffix) if exclude.starts_with("*.") => name.ends_with(suffix),
        _ => name == exclude,
    })
}

/// Collects C# files below `root` with gitignore support.
///
/// Uses the `ignore` crate to respect .gitignore, .git/info/exclude, and
/// global gitignore IN ADDITION to the default exclusions (`bin`, `obj`,
/// `.vs`, ...). A `root` that is itself a file is returned as-is.
///
/// # Returns
/// Tuple of (all `.cs` files found, directory count)
#[must_use]
pub fn collect_cs_files_gitignore(
    root: &std::path::Path,
    exclude: &[String],
    include: &[String],
) -> (Vec<std::path::PathBuf>, usize) {
    use ignore::WalkBuilder;

    if root.is_file() {
        return (vec![root.to_path_buf()], 0);
    }

    let mut all_excludes: Vec<String> = exclude
        .iter()
        .cloned()
        .chain(DEFAULT_EXCLUDE_FOLDERS().iter().map(|&s| s.to_owned()))
        .collect();
    // Force-included folders win over every exclusion
    all_excludes.retain(|ex| !include.iter().any(|inc| ex == inc));

    let root_for_filter = root.to_path_buf();
    let walker = WalkBuilder::new(root)
        .hidden(false)
        .git_ignore(true)
        .git_global(true)
        .git_exclude(true)
        .filter_entry(move |entry| {
            if entry.path() == root_for_filter {
                return true;
            }
            if !entry.file_type().is_some_and(|ft| ft.is_dir()) {
                return true;
            }
            entry
                .file_name()
                .to_str()
                .is_none_or(|name| !is_excluded(name, &all_excludes))
        })
        .build();

    let mut files = Vec::new();
    let mut dir_count = 0;

    for result in walker {
        match result {
            Ok(entry) => {
                let path = entry.path();
                if entry.file_type().is_some_and(|ft| ft.is_dir()) {
                    if path != root {
                        dir_count += 1;
                    }
                    continue;
                }
                if path.extension().is_some_and(|ext| ext == "cs") {
                    files.push(path.to_path_buf());
                }
            }
            Err(e) => tracing::debug!("walk error: {e}"),
        }
    }

    files.sort();
    (files, dir_count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_collect_cs_files_exclusion() -> anyhow::Result<()> {
        let temp = tempdir()?;
        let root = temp.path();

        fs::write(root.join("Program.cs"), "class Program { }")?;
        fs::write(root.join("notes.txt"), "not code")?;
        fs::create_dir_all(root.join("obj/Debug"))?;
        fs::write(root.join("obj/Debug/AssemblyInfo.cs"), "// generated")?;
        fs::create_dir_all(root.join("bin"))?;
        fs::write(root.join("bin/Stale.cs"), "class Stale { }")?;
        fs::create_dir_all(root.join("src"))?;
        fs::write(root.join("src/Widget.cs"), "class Widget { }")?;

        let (files, _) = collect_cs_files_gitignore(root, &[], &[]);

        let file_names: Vec<_> = files
            .iter()
            .filter_map(|p| p.file_name())
            .filter_map(|f| f.to_str())
            .collect();
        assert_eq!(file_names.len(), 2);
        assert!(file_names.contains(&"Program.cs"));
        assert!(file_names.contains(&"Widget.cs"));
        assert!(!file_names.contains(&"AssemblyInfo.cs"));

        Ok(())
    }

    #[test]
    fn test_collect_cs_files_force_include() -> anyhow::Result<()> {
        let temp = tempdir()?;
        let root = temp.path();

        fs::create_dir_all(root.join("packages"))?;
        fs::write(root.join("packages/Vendored.cs"), "class Vendored { }")?;

        let (files, _) = collect_cs_files_gitignore(root, &[], &[]);
        assert!(files.is_empty());

        let (files, _) = collect_cs_files_gitignore(root, &[], &["packages".to_owned()]);
        assert_eq!(files.len(), 1);

        Ok(())
    }

    #[test]
    fn test_single_file_root() -> anyhow::Result<()> {
        let temp = tempdir()?;
        let file = temp.path().join("One.cs");
        fs::write(&file, "class One { }")?;

        let (files, dirs) = collect_cs_files_gitignore(&file, &[], &[]);
        assert_eq!(files, vec![file]);
        assert_eq!(dirs, 0);

        Ok(())
    }

    #[test]
    fn test_is_excluded_wildcard() {
        let excludes = vec!["*.Tests".to_owned(), "obj".to_owned()];
        assert!(is_excluded("App.Tests", &excludes));
        assert!(is_excluded("obj", &excludes));
        assert!(!is_excluded("objects", &excludes));
    }
}
