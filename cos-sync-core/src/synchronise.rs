//! High-level pipeline: match → stage → upload → purge.
//!
//! [`synchronise`] runs one sync for a resolved [`SyncConfig`]. The sequence is strictly
//! linear and fail-fast:
//!   1. Expand every artifact pattern (a pattern with no matches stops the run).
//!   2. Validate and classify the matches into a [`StagePlan`] (nothing written yet).
//!   3. Configure `coscmd` for the regional endpoint.
//!   4. Copy the plan into a fresh temporary staging root.
//!   5. Upload the staging root, falling back once to the accelerate endpoint.
//!   6. Remove the staging root, then purge the CDN if a flush URL is configured.
//!
//! The staging root is a [`tempfile::TempDir`] owned by this function, so it is removed
//! whether the upload succeeds or fails.
//!
//! # Errors
//! Every step returns [`SyncError`] immediately; the only retry is the upload fallback in
//! [`CosUploader::upload_with_fallback`].

use std::path::PathBuf;

use serde::Serialize;
use tracing::{error, info};

use crate::config::SyncConfig;
use crate::contract::CommandRunner;
use crate::error::SyncError;
use crate::patterns::resolve_paths;
use crate::purge::purge_cdn;
use crate::stage::{self, StagePlan};
use crate::uploader::{CosUploader, Endpoint};

/// Outcome of a successful run.
#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    pub patterns: Vec<String>,
    pub resolved_paths: Vec<PathBuf>,
    pub staged_files: Vec<PathBuf>,
    pub staged_directories: Vec<PathBuf>,
    pub skipped: Vec<PathBuf>,
    pub endpoint: Endpoint,
    pub purged: bool,
}

pub async fn synchronise<R>(config: &SyncConfig, runner: &R) -> Result<SyncReport, SyncError>
where
    R: CommandRunner,
{
    info!(patterns = ?config.patterns, "[SYNC] Starting artifact sync");

    let paths = resolve_paths(&config.patterns, &config.working_dir).map_err(|e| {
        error!(error = %e, "[SYNC] Pattern matching failed");
        e
    })?;
    let plan: StagePlan = stage::plan(&paths, &config.working_dir).map_err(|e| {
        error!(error = %e, "[SYNC] Staging validation failed");
        e
    })?;

    let uploader = CosUploader::new(runner, config);
    uploader
        .configure(&Endpoint::Regional {
            region: config.region.clone(),
        })
        .await?;

    let (staged, endpoint) = {
        let staging = stage::staging_dir()?;
        info!(staging_root = %staging.path().display(), "[SYNC] Staging uploads");
        let staged = plan.execute(staging.path())?;
        info!(
            files = staged.files.len(),
            directories = staged.directories.len(),
            skipped = staged.skipped.len(),
            "[SYNC] Staging complete"
        );
        let endpoint = uploader.upload_with_fallback(staging.path()).await?;
        (staged, endpoint)
    };

    let purged = purge_cdn(runner, config).await?;

    info!(?endpoint, purged, "[SYNC] Sync complete");
    Ok(SyncReport {
        patterns: config.patterns.clone(),
        resolved_paths: paths,
        staged_files: staged.files,
        staged_directories: staged.directories,
        skipped: staged.skipped,
        endpoint,
        purged,
    })
}
