//! Architectural Enforcement Integration Tests
//!
//! This package contains integration tests that enforce the engine's
//! architectural rules:
//! - No sleep() calls in production code (timers are deadlines)
//! - Speech, haptic and tone devices are only touched by the feedback layer
//!
//! The helpers below walk the workspace sources; each test under `tests/`
//! applies one rule to the production lines they yield.

use std::fs;
use std::path::{Path, PathBuf};

/// Crates whose `src/` trees are production code
pub const PRODUCTION_SOURCES: &[&str] = &["engine/core/src", "screens/src"];

/// Workspace root, resolved from this package's manifest directory
#[must_use]
pub fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .ancestors()
        .nth(2)
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
}

/// Every `.rs` file under `dir` (relative to the workspace root)
#[must_use]
pub fn rust_files(dir: &str) -> Vec<PathBuf> {
    let path = workspace_root().join(dir);
    if !path.exists() {
        return Vec::new();
    }

    walkdir::WalkDir::new(path)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.path().extension().and_then(|s| s.to_str()) == Some("rs"))
        .map(walkdir::DirEntry::into_path)
        .collect()
}

/// A line of production code
#[derive(Debug, Clone)]
pub struct SourceLine {
    /// File the line came from
    pub path: PathBuf,
    /// 1-based line number
    pub number: usize,
    /// Code with any trailing `//` comment removed
    pub code: String,
}

impl std::fmt::Display for SourceLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{} - {}", self.path.display(), self.number, self.code.trim())
    }
}

/// Production lines of a file: comments stripped, `#[cfg(test)]` modules skipped
#[must_use]
pub fn production_lines(path: &Path) -> Vec<SourceLine> {
    let Ok(content) = fs::read_to_string(path) else {
        return Vec::new();
    };
    production_lines_of(path, &content)
}

/// [`production_lines`] over already-loaded text
#[must_use]
pub fn production_lines_of(path: &Path, content: &str) -> Vec<SourceLine> {
    let mut lines = Vec::new();
    for (idx, line) in content.lines().enumerate() {
        // Test modules sit at the bottom of each file
        if line.trim_start().starts_with("#[cfg(test)]") {
            break;
        }
        let code = line.split("//").next().unwrap_or(line);
        if code.trim().is_empty() {
            continue;
        }
        lines.push(SourceLine {
            path: path.to_path_buf(),
            number: idx + 1,
            code: code.to_string(),
        });
    }
    lines
}

/// Production lines of every file in [`PRODUCTION_SOURCES`]
#[must_use]
pub fn all_production_lines() -> Vec<SourceLine> {
    PRODUCTION_SOURCES
        .iter()
        .flat_map(|dir| rust_files(dir))
        .flat_map(|path| production_lines(&path))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comments_and_test_modules_are_skipped() {
        let source = "fn run() {\n    // tokio::time::sleep(x)\n    go(); // trailing\n}\n#[cfg(test)]\nmod tests {\n    fn t() { sleep(); }\n}\n";
        let lines = production_lines_of(Path::new("x.rs"), source);
        let code: Vec<_> = lines.iter().map(|l| l.code.trim().to_string()).collect();
        assert_eq!(code, vec!["fn run() {", "go();", "}"]);
        assert_eq!(lines[1].number, 3);
    }

    #[test]
    fn test_workspace_root_contains_engine() {
        assert!(workspace_root().join("engine/core/Cargo.toml").exists());
    }
}
