//! Input expansion for CLI commands.
//!
//! An input argument may be a single diagram file, a glob such as
//! `diagrams/**/*.erdplus`, or a directory whose diagram files are all taken.

use std::path::{Path, PathBuf};

/// Result of expanding an input argument.
#[derive(Debug)]
pub struct ExpandedFiles {
    pub files: Vec<PathBuf>,
    /// True when the argument was a glob or a directory
    pub pattern_was_glob: bool,
}

/// Check if a path string contains glob pattern characters.
pub fn is_glob_pattern(path: &str) -> bool {
    path.contains('*') || path.contains('?') || path.contains('[')
}

/// Expand a file path, directory or glob pattern into a sorted list of files.
///
/// Directories contribute their direct children ending in `.<extension>`.
///
/// # Errors
///
/// Returns an error if:
/// - The glob pattern is invalid
/// - No files match the pattern or directory
/// - A literal path doesn't exist
pub fn expand_file_pattern(pattern: &Path, extension: &str) -> anyhow::Result<ExpandedFiles> {
    let pattern_str = pattern.to_string_lossy();

    if !is_glob_pattern(&pattern_str) {
        if !pattern.exists() {
            anyhow::bail!("file does not exist: {}", pattern.display());
        }
        if pattern.is_dir() {
            return expand_directory(pattern, extension);
        }
        return Ok(ExpandedFiles {
            files: vec![pattern.to_path_buf()],
            pattern_was_glob: false,
        });
    }

    let entries: Vec<_> = glob::glob(&pattern_str)
        .map_err(|e| anyhow::anyhow!("invalid glob pattern '{}': {}", pattern_str, e))?
        .collect();

    let mut files = Vec::new();
    for entry in entries {
        match entry {
            Ok(path) => {
                if path.is_file() {
                    files.push(path);
                }
            }
            Err(e) => {
                anyhow::bail!("error reading path for pattern '{}': {}", pattern_str, e);
            }
        }
    }

    if files.is_empty() {
        anyhow::bail!("no files match pattern: {}", pattern_str);
    }

    files.sort();

    Ok(ExpandedFiles {
        files,
        pattern_was_glob: true,
    })
}

fn expand_directory(dir: &Path, extension: &str) -> anyhow::Result<ExpandedFiles> {
    let escaped = glob::Pattern::escape(&dir.to_string_lossy());
    let pattern = format!("{}/*.{}", escaped, extension.trim_start_matches('.'));

    let mut files: Vec<PathBuf> = glob::glob(&pattern)
        .map_err(|e| anyhow::anyhow!("invalid directory pattern '{}': {}", pattern, e))?
        .filter_map(Result::ok)
        .filter(|p| p.is_file())
        .collect();

    if files.is_empty() {
        anyhow::bail!(
            "no .{} files in directory: {}",
            extension.trim_start_matches('.'),
            dir.display()
        );
    }

    files.sort();

    Ok(ExpandedFiles {
        files,
        pattern_was_glob: true,
    })
}

/// Result type for multi-file command execution.
#[derive(Debug, Default)]
pub struct MultiFileResult {
    pub total_files: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub errors: Vec<(PathBuf, String)>,
}

impl MultiFileResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_success(&mut self) {
        self.succeeded += 1;
    }

    pub fn record_failure(&mut self, path: PathBuf, error: String) {
        self.failed += 1;
        self.errors.push((path, error));
    }

    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_is_glob_pattern() {
        assert!(!is_glob_pattern("school.erdplus"));
        assert!(!is_glob_pattern("/path/to/school.erdplus"));
        assert!(is_glob_pattern("*.erdplus"));
        assert!(is_glob_pattern("dir/*.erdplus"));
        assert!(is_glob_pattern("**/*.erdplus"));
        assert!(is_glob_pattern("file?.erdplus"));
        assert!(is_glob_pattern("[abc].erdplus"));
    }

    #[test]
    fn test_expand_literal_path_exists() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("school.erdplus");
        fs::write(&file, "{}").unwrap();

        let result = expand_file_pattern(&file, "erdplus").unwrap();
        assert!(!result.pattern_was_glob);
        assert_eq!(result.files, vec![file]);
    }

    #[test]
    fn test_expand_literal_path_not_exists() {
        let path = PathBuf::from("/nonexistent/school.erdplus");
        let result = expand_file_pattern(&path, "erdplus");
        assert!(result.unwrap_err().to_string().contains("does not exist"));
    }

    #[test]
    fn test_expand_glob_pattern() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.erdplus"), "{}").unwrap();
        fs::write(dir.path().join("b.erdplus"), "{}").unwrap();
        fs::write(dir.path().join("c.txt"), "notes").unwrap();

        let pattern = dir.path().join("*.erdplus");
        let result = expand_file_pattern(&pattern, "erdplus").unwrap();

        assert!(result.pattern_was_glob);
        assert_eq!(result.files.len(), 2);
        assert!(result.files[0].ends_with("a.erdplus"));
        assert!(result.files[1].ends_with("b.erdplus"));
    }

    #[test]
    fn test_expand_glob_no_matches() {
        let dir = TempDir::new().unwrap();
        let pattern = dir.path().join("*.erdplus");
        let err = expand_file_pattern(&pattern, "erdplus").unwrap_err();
        assert!(err.to_string().contains("no files match"));
    }

    #[test]
    fn test_expand_directory_filters_by_extension() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("b.erdplus"), "{}").unwrap();
        fs::write(dir.path().join("a.erdplus"), "{}").unwrap();
        fs::write(dir.path().join("notes.md"), "#").unwrap();
        fs::create_dir(dir.path().join("nested.erdplus")).unwrap();

        let result = expand_file_pattern(dir.path(), ".erdplus").unwrap();
        assert!(result.pattern_was_glob);
        assert_eq!(result.files.len(), 2);
        assert!(result.files[0].ends_with("a.erdplus"));
    }

    #[test]
    fn test_expand_empty_directory() {
        let dir = TempDir::new().unwrap();
        let err = expand_file_pattern(dir.path(), "erdplus").unwrap_err();
        assert!(err.to_string().contains("no .erdplus files"));
    }

    #[test]
    fn test_multi_file_result() {
        let mut result = MultiFileResult::new();
        result.total_files = 2;
        result.record_success();
        assert!(!result.has_failures());
        result.record_failure(PathBuf::from("bad.erdplus"), "invalid".to_string());
        assert!(result.has_failures());
        assert_eq!(result.succeeded, 1);
        assert_eq!(result.errors[0].1, "invalid");
    }
}
