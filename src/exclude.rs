//! Path exclusion.
//!
//! Exclude patterns are globs over `/`-separated paths relative to the source
//! root. `*` stays inside one path segment and `**` spans any number of them.
//! A path is skipped when it, or any directory above it, matches a pattern,
//! so excluding a directory excludes everything beneath it.

use glob::{MatchOptions, Pattern, PatternError};
use thiserror::Error;

#[derive(Error, Debug)]
#[error("invalid exclude pattern '{pattern}': {source}")]
pub struct ExcludeError {
    pub pattern: String,
    pub source: PatternError,
}

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Compiled exclude patterns.
#[derive(Debug, Clone, Default)]
pub struct Excludes {
    patterns: Vec<Pattern>,
}

impl Excludes {
    pub fn new(patterns: &[String]) -> Result<Self, ExcludeError> {
        let patterns = patterns
            .iter()
            .map(|p| {
                Pattern::new(p).map_err(|source| ExcludeError {
                    pattern: p.clone(),
                    source,
                })
            })
            .collect::<Result<_, _>>()?;
        Ok(Self { patterns })
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Whether `path` (file or directory, relative to the source root) is excluded.
    pub fn should_skip_path(&self, path: &str) -> bool {
        if self.patterns.is_empty() {
            return false;
        }
        let path = path.trim_start_matches("./").trim_matches('/');
        if path.is_empty() || path == "." {
            return false;
        }
        prefixes(path).any(|candidate| {
            self.patterns
                .iter()
                .any(|p| p.matches_with(candidate, MATCH_OPTIONS))
        })
    }
}

/// `a/b/c` → `a`, `a/b`, `a/b/c`
fn prefixes(path: &str) -> impl Iterator<Item = &str> {
    path.match_indices('/')
        .map(|(i, _)| &path[..i])
        .chain(std::iter::once(path))
}
