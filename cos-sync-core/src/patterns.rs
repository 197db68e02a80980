//! Artifact pattern parsing and glob expansion.

use std::path::{Path, PathBuf};

use glob::{MatchOptions, Pattern};
use tracing::{debug, info};

use crate::error::SyncError;

/// Splits a comma and/or newline separated list into trimmed, non-empty patterns.
pub fn split_patterns(raw: &str) -> Vec<String> {
    raw.split(',')
        .flat_map(str::lines)
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

fn match_options() -> MatchOptions {
    MatchOptions {
        case_sensitive: true,
        require_literal_separator: true,
        // Hidden entries need an explicit leading dot in the pattern.
        require_literal_leading_dot: true,
    }
}

fn glob_paths(full: &str, pattern: &str, options: MatchOptions) -> Result<Vec<PathBuf>, SyncError> {
    let entries = glob::glob_with(full, options).map_err(|e| SyncError::InvalidPattern {
        pattern: pattern.to_string(),
        message: e.msg.to_string(),
    })?;

    let mut matches = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| {
            let path = e.path().to_path_buf();
            SyncError::io(path, e.into_error())
        })?;
        matches.push(path);
    }
    Ok(matches)
}

/// Expands every pattern relative to `root`.
///
/// A trailing `**` component selects everything below its base, files included, plus the
/// base directory itself (a bare relative `**` does not select `root`). `glob` alone only
/// yields directories there.
///
/// Fails on the first pattern that is invalid or matches nothing, so no partial result
/// ever reaches the stager.
pub fn resolve_paths(patterns: &[String], root: &Path) -> Result<Vec<PathBuf>, SyncError> {
    let options = match_options();
    let escaped_root = Pattern::escape(&root.to_string_lossy());
    let mut paths = Vec::new();

    for pattern in patterns {
        let full = if Path::new(pattern).is_absolute() {
            pattern.clone()
        } else {
            format!("{}/{}", escaped_root.trim_end_matches('/'), pattern)
        };

        let mut matches = glob_paths(&full, pattern, options)?;

        if pattern == "**" || pattern.ends_with("/**") {
            matches.extend(glob_paths(&format!("{full}/*"), pattern, options)?);
            if pattern != "**" {
                let base = full.strip_suffix("/**").unwrap_or(full.as_str());
                if !base.is_empty() {
                    let dirs = glob_paths(base, pattern, options)?;
                    matches.extend(dirs.into_iter().filter(|p| p.is_dir()));
                }
            }
            matches.sort();
            matches.dedup();
        }

        if matches.is_empty() {
            return Err(SyncError::NoMatches(pattern.clone()));
        }
        info!(pattern = %pattern, matches = matches.len(), "[MATCH] Pattern resolved");
        debug!(pattern = %pattern, ?matches, "[MATCH] Pattern matches");
        paths.extend(matches);
    }

    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_handles_commas_newlines_and_blanks() {
        let raw = "dist/*.bin, docs/**\n\n  assets/ ,\r\nREADME.md,,";
        assert_eq!(
            split_patterns(raw),
            vec!["dist/*.bin", "docs/**", "assets/", "README.md"]
        );
    }

    #[test]
    fn split_of_whitespace_is_empty() {
        assert!(split_patterns(" \n , \n").is_empty());
    }
}
