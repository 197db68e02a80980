//! Resolved run configuration and the value parsers used to build it.
//!
//! [`SyncConfig`] is the single explicit input to the pipeline: credentials, target
//! bucket, patterns and flags travel through it instead of process-wide environment
//! state. Building one from raw inputs is the CLI crate's job; the helpers below hold the
//! validation rules so they can be shared and tested in isolation.

use std::fmt;
use std::path::{Component, Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info};

use crate::error::SyncError;

/// API credentials for both the storage client and the CDN CLI.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub secret_id: String,
    pub secret_key: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("secret_id", &"***")
            .field("secret_key", &"***")
            .finish()
    }
}

/// How the CDN should invalidate the purged path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FlushType {
    /// Refresh only resources that changed at the origin.
    #[default]
    Flush,
    /// Drop every cached resource under the path.
    Delete,
}

impl FlushType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlushType::Flush => "flush",
            FlushType::Delete => "delete",
        }
    }

    /// Parses an input value; empty means the default.
    pub fn parse(name: &str, raw: &str) -> Result<Self, SyncError> {
        match raw.trim().to_lowercase().as_str() {
            "" | "flush" => Ok(FlushType::Flush),
            "delete" => Ok(FlushType::Delete),
            _ => Err(SyncError::InvalidChoice {
                name: name.to_string(),
                value: raw.to_string(),
                expected: "flush, delete",
            }),
        }
    }
}

/// Everything one sync run needs.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub credentials: Credentials,
    pub bucket: String,
    pub region: String,
    /// Remote key prefix, always ending in `/`.
    pub prefix: String,
    pub patterns: Vec<String>,
    pub flush_url: Option<String>,
    pub flush_type: FlushType,
    pub delete_remote: bool,
    /// Canonical directory that patterns and staging are relative to.
    pub working_dir: PathBuf,
}

impl SyncConfig {
    pub fn trace_loaded(&self) {
        info!(
            bucket = %self.bucket,
            region = %self.region,
            prefix = %self.prefix,
            patterns = self.patterns.len(),
            delete_remote = self.delete_remote,
            flush = self.flush_url.is_some(),
            working_dir = %self.working_dir.display(),
            "[CONFIG] Loaded sync configuration"
        );
        debug!(?self, "[CONFIG] Sync configuration (full debug)");
    }
}

/// Parses a boolean input: `true/1/yes/y` or `false/0/no/n/` (case-insensitive).
pub fn parse_bool(name: &str, raw: &str) -> Result<bool, SyncError> {
    match raw.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "y" => Ok(true),
        "false" | "0" | "no" | "n" | "" => Ok(false),
        _ => Err(SyncError::InvalidBoolean {
            name: name.to_string(),
            value: raw.to_string(),
        }),
    }
}

pub fn normalize_prefix(prefix: &str) -> String {
    if prefix.ends_with('/') {
        prefix.to_string()
    } else {
        format!("{prefix}/")
    }
}

/// Resolves the optional `working_directory` input against the workspace root.
///
/// `workspace_root` must already be canonical. An empty input yields the root itself.
/// The joined path is checked lexically first, then again after canonicalization so a
/// symlink cannot lead outside the workspace.
pub fn resolve_working_directory(workspace_root: &Path, raw: &str) -> Result<PathBuf, SyncError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(workspace_root.to_path_buf());
    }

    let joined = lexical_normalize(&workspace_root.join(raw));
    if !joined.starts_with(workspace_root) {
        return Err(SyncError::WorkingDirectoryOutside(joined));
    }

    let resolved = joined
        .canonicalize()
        .map_err(|_| SyncError::WorkingDirectoryMissing(joined.clone()))?;
    if !resolved.starts_with(workspace_root) {
        return Err(SyncError::WorkingDirectoryOutside(resolved));
    }
    if !resolved.is_dir() {
        return Err(SyncError::WorkingDirectoryMissing(resolved));
    }

    info!(working_dir = %resolved.display(), "[CONFIG] Using working_directory");
    Ok(resolved)
}

/// Removes `.` and resolves `..` without touching the filesystem.
fn lexical_normalize(path: &Path) -> PathBuf {
    let mut components: Vec<Component> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match components.last() {
                Some(Component::Normal(_)) => {
                    components.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => components.push(component),
            },
            _ => components.push(component),
        }
    }
    components.iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_bool_accepts_documented_spellings() {
        for raw in ["true", "TRUE", "1", "yes", "Y", " yes "] {
            assert!(parse_bool("delete_remote", raw).unwrap(), "{raw}");
        }
        for raw in ["false", "0", "No", "n", "", "  "] {
            assert!(!parse_bool("delete_remote", raw).unwrap(), "{raw}");
        }
    }

    #[test]
    fn parse_bool_rejects_anything_else() {
        let err = parse_bool("delete_remote", "maybe").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid boolean value for delete_remote: maybe"
        );
    }

    #[test]
    fn normalize_prefix_appends_separator_once() {
        assert_eq!(normalize_prefix("site"), "site/");
        assert_eq!(normalize_prefix("site/"), "site/");
        assert_eq!(normalize_prefix(""), "/");
    }

    #[test]
    fn flush_type_defaults_to_flush() {
        assert_eq!(FlushType::parse("flush_type", "").unwrap(), FlushType::Flush);
        assert_eq!(
            FlushType::parse("flush_type", "Delete").unwrap(),
            FlushType::Delete
        );
        assert!(FlushType::parse("flush_type", "purge").is_err());
    }

    #[test]
    fn credentials_debug_hides_values() {
        let creds = Credentials {
            secret_id: "AKID123".into(),
            secret_key: "hunter2".into(),
        };
        let printed = format!("{creds:?}");
        assert!(!printed.contains("AKID123"));
        assert!(!printed.contains("hunter2"));
    }

    #[test]
    fn lexical_normalize_resolves_parent_components() {
        assert_eq!(
            lexical_normalize(Path::new("/ws/a/./b/../c")),
            PathBuf::from("/ws/a/c")
        );
        assert_eq!(lexical_normalize(Path::new("/ws/../..")), PathBuf::from("/"));
    }

    #[test]
    fn working_directory_resolution() {
        let ws = tempfile::tempdir().unwrap();
        let root = ws.path().canonicalize().unwrap();
        std::fs::create_dir_all(root.join("site/public")).unwrap();

        assert_eq!(resolve_working_directory(&root, "").unwrap(), root);
        assert_eq!(
            resolve_working_directory(&root, "site/public").unwrap(),
            root.join("site/public")
        );
        assert!(matches!(
            resolve_working_directory(&root, "../elsewhere"),
            Err(SyncError::WorkingDirectoryOutside(_))
        ));
        assert!(matches!(
            resolve_working_directory(&root, "missing"),
            Err(SyncError::WorkingDirectoryMissing(_))
        ));
    }
}
