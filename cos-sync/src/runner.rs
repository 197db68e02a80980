#![doc = "Process-backed CommandRunner: runs coscmd/tccli as child processes for the CLI."]
//
//! Children inherit stdout/stderr so tool output streams straight into the CI log, and
//! inherit the parent environment with the invocation's extra variables layered on top.
//! Each command is awaited to completion before the next one starts.

use async_trait::async_trait;
use cos_sync_core::contract::{CommandOutcome, CommandRunner, Invocation};
use cos_sync_core::SyncError;
use tokio::process::Command;

#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessRunner;

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, invocation: &Invocation) -> Result<CommandOutcome, SyncError> {
        let mut cmd = Command::new(&invocation.program);
        cmd.args(&invocation.args)
            .envs(invocation.env.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        if let Some(cwd) = &invocation.cwd {
            cmd.current_dir(cwd);
        }

        tracing::debug!(command = %invocation, "Spawning external command");
        let status = cmd.status().await.map_err(|source| {
            tracing::error!(error = ?source, program = %invocation.program, "Failed to launch external command");
            SyncError::Launch {
                program: invocation.program.clone(),
                source,
            }
        })?;

        tracing::debug!(command = %invocation, ?status, "External command finished");
        Ok(CommandOutcome {
            code: status.code(),
        })
    }
}
