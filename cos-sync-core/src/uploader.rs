//! `coscmd` driver: endpoint configuration and recursive upload with a single fallback.
//!
//! The regional endpoint is tried first with a short retry/timeout budget so a slow
//! cross-border link fails fast. If the upload exits non-zero, the client is reconfigured
//! for the global accelerate endpoint and the same upload runs exactly once more.

use std::path::Path;

use serde::Serialize;
use tracing::{error, info, warn};

use crate::config::SyncConfig;
use crate::contract::{CommandRunner, Invocation};
use crate::error::SyncError;

pub const COSCMD: &str = "coscmd";
pub const ACCELERATE_ENDPOINT: &str = "cos.accelerate.myqcloud.com";

/// Where `coscmd` sends requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Endpoint {
    Regional { region: String },
    Accelerated,
}

impl Endpoint {
    /// Endpoint-specific `coscmd config` flags.
    fn config_args(&self) -> Vec<String> {
        let args: Vec<&str> = match self {
            Endpoint::Regional { region } => vec![
                "-r",
                region.as_str(),
                "--retry",
                "1",
                "--timeout",
                "10",
                "-m",
                "1",
            ],
            Endpoint::Accelerated => {
                vec!["-e", ACCELERATE_ENDPOINT, "--retry", "5", "--timeout", "60"]
            }
        };
        args.into_iter().map(str::to_string).collect()
    }
}

/// Builds `coscmd config` for the given endpoint.
pub fn config_invocation(config: &SyncConfig, endpoint: &Endpoint) -> Invocation {
    Invocation::new(COSCMD)
        .args(["config", "-a"])
        .secret_arg(&config.credentials.secret_id)
        .arg("-s")
        .secret_arg(&config.credentials.secret_key)
        .args(["-b", config.bucket.as_str()])
        .args(endpoint.config_args())
}

/// Builds `coscmd upload -rs --yes [--delete] . <prefix>` run from the staging root.
pub fn upload_invocation(config: &SyncConfig, staging_root: &Path) -> Invocation {
    let mut inv = Invocation::new(COSCMD).args(["upload", "-rs", "--yes"]);
    if config.delete_remote {
        inv = inv.arg("--delete");
    }
    inv.args([".", config.prefix.as_str()])
        .current_dir(staging_root)
}

pub struct CosUploader<'a, R: CommandRunner> {
    runner: &'a R,
    config: &'a SyncConfig,
}

impl<'a, R: CommandRunner> CosUploader<'a, R> {
    pub fn new(runner: &'a R, config: &'a SyncConfig) -> Self {
        Self { runner, config }
    }

    /// Writes the `coscmd` configuration for `endpoint`. Any failure is fatal.
    pub async fn configure(&self, endpoint: &Endpoint) -> Result<(), SyncError> {
        info!(?endpoint, "[UPLOAD] Configuring coscmd");
        let inv = config_invocation(self.config, endpoint);
        info!(command = %inv, "[UPLOAD] Running");
        self.runner.run(&inv).await?.check(&inv)
    }

    async fn upload(&self, staging_root: &Path) -> Result<(), SyncError> {
        let inv = upload_invocation(self.config, staging_root);
        info!(command = %inv, "[UPLOAD] Running");
        self.runner.run(&inv).await?.check(&inv)
    }

    /// Uploads `staging_root`, assuming the regional endpoint is already configured.
    ///
    /// Returns the endpoint the upload finally went through.
    pub async fn upload_with_fallback(&self, staging_root: &Path) -> Result<Endpoint, SyncError> {
        match self.upload(staging_root).await {
            Ok(()) => {
                info!("[UPLOAD] Upload via regional endpoint succeeded");
                Ok(Endpoint::Regional {
                    region: self.config.region.clone(),
                })
            }
            // Retry only uploads that ran and failed; a missing binary will not improve.
            Err(e @ SyncError::CommandFailed { .. }) => {
                warn!(error = %e, "[UPLOAD] Upload failed with regional endpoint, retrying with global accelerate endpoint");
                self.configure(&Endpoint::Accelerated).await?;
                match self.upload(staging_root).await {
                    Ok(()) => {
                        info!("[UPLOAD] Upload via accelerate endpoint succeeded");
                        Ok(Endpoint::Accelerated)
                    }
                    Err(e) => {
                        error!(error = %e, "[UPLOAD] Upload failed after retry with accelerate endpoint");
                        Err(SyncError::UploadFailed(Box::new(e)))
                    }
                }
            }
            Err(e) => Err(e),
        }
    }
}
