//! CDN cache purge through `tccli`.

use tracing::{error, info};

use crate::config::SyncConfig;
use crate::contract::{CommandRunner, Invocation};
use crate::error::SyncError;

pub const TCCLI: &str = "tccli";

/// Builds `tccli cdn PurgePathCache` for `flush_url`.
///
/// Credentials go into the child's environment only, never onto the command line.
pub fn purge_invocation(config: &SyncConfig, flush_url: &str) -> Invocation {
    Invocation::new(TCCLI)
        .args([
            "cdn",
            "PurgePathCache",
            "--cli-unfold-argument",
            "--Paths",
            flush_url,
            "--FlushType",
            config.flush_type.as_str(),
        ])
        .env("TENCENTCLOUD_SECRET_ID", &config.credentials.secret_id)
        .env("TENCENTCLOUD_SECRET_KEY", &config.credentials.secret_key)
        .env("TENCENTCLOUD_REGION", &config.region)
}

/// Purges the configured flush URL, if any. Returns whether a purge ran.
pub async fn purge_cdn<R: CommandRunner>(runner: &R, config: &SyncConfig) -> Result<bool, SyncError> {
    let Some(flush_url) = config.flush_url.as_deref() else {
        info!("[PURGE] flush_url not provided; skipping CDN purge");
        return Ok(false);
    };

    info!(flush_url = %flush_url, flush_type = config.flush_type.as_str(), "[PURGE] Purge CDN cache");
    let inv = purge_invocation(config, flush_url);
    info!(command = %inv, "[PURGE] Running");

    let result = match runner.run(&inv).await {
        Ok(outcome) => outcome.check(&inv),
        Err(e) => Err(e),
    };
    result.map_err(|e| {
        error!(error = %e, flush_url = %flush_url, "[PURGE] CDN purge failed");
        SyncError::PurgeFailed(Box::new(e))
    })?;
    Ok(true)
}
