//! This module implements the CLI interface for cos-sync: command parsing, input loading
//! and the call into the core pipeline.
//!
//! All pipeline logic (matching, staging, upload fallback, purge) lives in the
//! [`cos-sync-core`] crate. This module is strictly CLI glue.
//!
//! ## How To Use
//! - In CI: set the `INPUT_*` variables and run `cos-sync upload`.
//! - Locally: put non-secret settings in a YAML file and pass `--config`; secrets still
//!   come from the environment (or a `.env` file).
//! - For programmatic use: call [`run`] with a constructed [`Cli`].
//!
//! [`cos-sync-core`]: ../../cos-sync-core/
use crate::load_config::{load_config, Inputs};
use crate::runner::ProcessRunner;
use anyhow::Result;
use clap::{Parser, Subcommand};
use cos_sync_core::synchronise;
use std::path::PathBuf;

/// CLI for cos-sync: upload build artifacts to Tencent COS and purge the CDN.
#[derive(Parser)]
#[clap(
    name = "cos-sync",
    version,
    about = "Upload CI build artifacts to a Tencent COS bucket, with accelerate-endpoint fallback and optional CDN purge"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Stage the files matched by the artifacts input and upload them to the bucket
    Upload {
        /// Optional YAML file with non-secret settings; INPUT_* variables override it
        #[clap(long)]
        config: Option<PathBuf>,
    },
}

/// Async CLI entrypoint for main() and integration tests.
pub async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Upload { config } => {
            let workspace_root = std::env::current_dir()
                .and_then(|dir| dir.canonicalize())
                .map_err(|e| anyhow::anyhow!("Failed to resolve workspace root: {e}"))?;
            let inputs = Inputs::from_env();
            let config = load_config(config.as_deref(), &inputs, &workspace_root)?;

            tracing::info!(command = "upload", "Starting artifact upload");
            match synchronise(&config, &ProcessRunner).await {
                Ok(report) => {
                    tracing::info!(
                        command = "upload",
                        files = report.staged_files.len(),
                        directories = report.staged_directories.len(),
                        endpoint = ?report.endpoint,
                        purged = report.purged,
                        "Upload complete"
                    );
                    match serde_json::to_string_pretty(&report) {
                        Ok(json) => tracing::debug!(json = %json, "Sync report as JSON"),
                        Err(e) => tracing::error!(error = ?e, "Failed to serialize sync report"),
                    }
                    Ok(())
                }
                Err(e) => {
                    tracing::error!(command = "upload", error = %e, "Upload failed");
                    Err(e.into())
                }
            }
        }
    }
}
