//! Staging of matched artifacts into an isolated upload root.
//!
//! Staging happens in two phases. [`plan`] canonicalizes and classifies every matched
//! path without writing anything, so a path outside the working root fails the run before
//! the staging directory is touched. [`StagePlan::execute`] then copies entries in order,
//! mirroring each one's path relative to the working root.
//!
//! # Merge rules
//! - Directories are copied recursively and merged into whatever is already staged:
//!   existing directories are reused, existing files are overwritten.
//! - A file whose destination is already a staged file is skipped. Overlapping patterns
//!   therefore stage a file exactly once.
//! - Any destination that would change type (file vs. directory) is a collision.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::error::SyncError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
}

/// A validated source path and where it lands inside the staging root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageEntry {
    pub source: PathBuf,
    pub relative: PathBuf,
    pub kind: EntryKind,
}

#[derive(Debug, Clone, Default)]
pub struct StagePlan {
    pub entries: Vec<StageEntry>,
}

/// What [`StagePlan::execute`] did, by relative path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StageReport {
    pub files: Vec<PathBuf>,
    pub directories: Vec<PathBuf>,
    /// Files already staged by an earlier, overlapping pattern.
    pub skipped: Vec<PathBuf>,
}

/// Creates the temporary staging root. Removed when the returned guard drops.
pub fn staging_dir() -> Result<TempDir, SyncError> {
    tempfile::Builder::new()
        .prefix("cos-sync-")
        .tempdir()
        .map_err(|e| SyncError::io(std::env::temp_dir(), e))
}

/// Validates `paths` against the canonical working `root`.
pub fn plan(paths: &[PathBuf], root: &Path) -> Result<StagePlan, SyncError> {
    let mut entries = Vec::with_capacity(paths.len());

    for src in paths {
        let resolved = src
            .canonicalize()
            .map_err(|_| SyncError::NotFileOrDirectory(src.clone()))?;
        let relative = resolved
            .strip_prefix(root)
            .map_err(|_| SyncError::OutsideWorkspace(resolved.clone()))?
            .to_path_buf();

        let kind = if resolved.is_dir() {
            EntryKind::Directory
        } else if resolved.is_file() {
            EntryKind::File
        } else {
            return Err(SyncError::NotFileOrDirectory(src.clone()));
        };

        entries.push(StageEntry {
            source: resolved,
            relative,
            kind,
        });
    }

    Ok(StagePlan { entries })
}

impl StagePlan {
    /// Copies every entry into `staging_root`.
    pub fn execute(&self, staging_root: &Path) -> Result<StageReport, SyncError> {
        let mut report = StageReport::default();

        for entry in &self.entries {
            let dest = staging_root.join(&entry.relative);
            match entry.kind {
                EntryKind::Directory => {
                    if dest.is_file() {
                        return Err(collision(EntryKind::Directory, dest));
                    }
                    ensure_parent(staging_root, &dest)?;
                    info!(path = %entry.relative.display(), "[STAGE] Staging directory");
                    copy_tree(&entry.source, &dest)?;
                    report.directories.push(entry.relative.clone());
                }
                EntryKind::File => {
                    if dest.is_file() {
                        info!(
                            path = %entry.relative.display(),
                            "[STAGE] Skipping already staged file from overlapping glob"
                        );
                        report.skipped.push(entry.relative.clone());
                        continue;
                    }
                    if dest.exists() {
                        return Err(collision(EntryKind::File, dest));
                    }
                    ensure_parent(staging_root, &dest)?;
                    info!(path = %entry.relative.display(), "[STAGE] Staging file");
                    copy_file(&entry.source, &dest)?;
                    report.files.push(entry.relative.clone());
                }
            }
        }

        Ok(report)
    }
}

fn collision(kind: EntryKind, path: PathBuf) -> SyncError {
    let (kind, existing) = match kind {
        EntryKind::File => ("file", "directory"),
        EntryKind::Directory => ("directory", "file"),
    };
    SyncError::Collision {
        kind,
        existing,
        path,
    }
}

/// Creates the parent of `dest`, refusing to descend through an already staged file.
fn ensure_parent(staging_root: &Path, dest: &Path) -> Result<(), SyncError> {
    let Some(parent) = dest.parent() else {
        return Ok(());
    };
    for ancestor in parent.ancestors() {
        if ancestor == staging_root {
            break;
        }
        if ancestor.is_file() {
            return Err(collision(EntryKind::Directory, ancestor.to_path_buf()));
        }
    }
    fs::create_dir_all(parent).map_err(|e| SyncError::io(parent, e))
}

fn copy_file(src: &Path, dest: &Path) -> Result<(), SyncError> {
    fs::copy(src, dest).map_err(|e| SyncError::io(dest, e))?;
    Ok(())
}

/// Recursive copy that merges into an existing destination tree.
fn copy_tree(src: &Path, dest: &Path) -> Result<(), SyncError> {
    for entry in WalkDir::new(src).follow_links(true) {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(src).to_path_buf();
            let source = e
                .into_io_error()
                .unwrap_or_else(|| std::io::Error::other("symlink loop"));
            SyncError::io(path, source)
        })?;
        let rel = entry
            .path()
            .strip_prefix(src)
            .map_err(|_| SyncError::OutsideWorkspace(entry.path().to_path_buf()))?;
        let target = dest.join(rel);

        if entry.file_type().is_dir() {
            if target.is_file() {
                return Err(collision(EntryKind::Directory, target));
            }
            fs::create_dir_all(&target).map_err(|e| SyncError::io(&target, e))?;
        } else if entry.file_type().is_file() {
            if target.is_dir() {
                return Err(collision(EntryKind::File, target));
            }
            debug!(path = %target.display(), "[STAGE] Copying file");
            copy_file(entry.path(), &target)?;
        }
    }
    Ok(())
}
