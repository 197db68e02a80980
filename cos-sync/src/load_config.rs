//! `load_config` module: merges an optional static YAML file with `INPUT_*` environment
//! inputs into the core [`SyncConfig`].
//!
//! # Responsibilities
//! - Collect CI action inputs (`INPUT_<NAME>`) into an [`Inputs`] lookup
//! - Parse the optional YAML file; it may hold every non-secret field
//! - Let environment inputs override file values; secrets come from the environment only
//! - Validate required fields, booleans, flush type and the working directory
//!
//! # Errors
//! Failures surface as `anyhow::Error` wrapping the core `SyncError`, so the message the
//! CLI prints is the same one the core would produce.
use anyhow::Result;
use cos_sync_core::config::{normalize_prefix, parse_bool, resolve_working_directory};
use cos_sync_core::patterns::split_patterns;
use cos_sync_core::{Credentials, FlushType, SyncConfig, SyncError};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::{error, info};

pub const INPUT_PREFIX: &str = "INPUT_";

/// Action inputs keyed by lower-case name (`INPUT_SECRET_ID` → `secret_id`).
#[derive(Debug, Default, Clone)]
pub struct Inputs {
    values: HashMap<String, String>,
}

impl Inputs {
    /// Reads `INPUT_*` variables from the process environment. Entries that are not valid
    /// UTF-8 are ignored instead of aborting the run.
    pub fn from_env() -> Self {
        Self::from_vars(
            std::env::vars_os()
                .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?))),
        )
    }

    pub fn from_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let values = vars
            .into_iter()
            .filter_map(|(k, v)| {
                k.as_ref()
                    .strip_prefix(INPUT_PREFIX)
                    .map(|name| (name.to_lowercase(), v.into()))
            })
            .collect();
        Self { values }
    }

    /// Non-empty value of an input.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values
            .get(name)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }
}

/// Static file schema. Secrets are deliberately absent, so `deny_unknown_fields` rejects them.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StaticConfig {
    pub region: Option<String>,
    pub bucket: Option<String>,
    pub prefix: Option<String>,
    pub artifacts: Option<Artifacts>,
    pub flush_url: Option<String>,
    pub flush_type: Option<String>,
    pub delete_remote: Option<Scalar>,
    pub working_directory: Option<String>,
}

/// `artifacts` may be one comma/newline separated string or a YAML list.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Artifacts {
    List(Vec<String>),
    Raw(String),
}

impl Artifacts {
    fn to_raw(&self) -> String {
        match self {
            Artifacts::List(items) => items.join("\n"),
            Artifacts::Raw(raw) => raw.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Bool(bool),
    Int(i64),
    Text(String),
}

impl Scalar {
    fn to_raw(&self) -> String {
        match self {
            Scalar::Bool(b) => b.to_string(),
            Scalar::Int(i) => i.to_string(),
            Scalar::Text(s) => s.clone(),
        }
    }
}

pub fn read_static_config(path: &Path) -> Result<StaticConfig> {
    info!(config_path = ?path, "Loading configuration from file");

    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            error!(error = ?e, config_path = ?path, "Failed to read config file");
            return Err(anyhow::anyhow!(
                "Failed to read config file {:?}: {}",
                path,
                e
            ));
        }
    };

    match serde_yaml::from_str::<Option<StaticConfig>>(&content) {
        Ok(conf) => {
            info!(config_path = ?path, "Parsed config YAML successfully");
            Ok(conf.unwrap_or_default())
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path, "Failed to parse config YAML");
            Err(anyhow::anyhow!("Failed to parse config YAML: {e}"))
        }
    }
}

/// Builds the run configuration.
///
/// `workspace_root` must be canonical; `working_directory` is resolved against it.
pub fn load_config(
    config_path: Option<&Path>,
    inputs: &Inputs,
    workspace_root: &Path,
) -> Result<SyncConfig> {
    let file = match config_path {
        Some(path) => read_static_config(path)?,
        None => StaticConfig::default(),
    };

    let pick = |name: &str, fallback: Option<String>| -> Option<String> {
        inputs
            .get(name)
            .map(str::to_string)
            .or(fallback.filter(|v| !v.is_empty()))
    };
    let require = |name: &str, value: Option<String>| -> Result<String> {
        value.ok_or_else(|| {
            error!(input = name, "Missing required input");
            SyncError::MissingInput(name.to_string()).into()
        })
    };

    let secret_id = require("secret_id", pick("secret_id", None))?;
    let secret_key = require("secret_key", pick("secret_key", None))?;
    let region = require("region", pick("region", file.region))?;
    let bucket = require("bucket", pick("bucket", file.bucket))?;
    let prefix = normalize_prefix(&require("prefix", pick("prefix", file.prefix))?);
    let artifacts_raw = require(
        "artifacts",
        pick("artifacts", file.artifacts.as_ref().map(Artifacts::to_raw)),
    )?;

    let flush_url = pick("flush_url", file.flush_url)
        .map(|u| u.trim().to_string())
        .filter(|u| !u.is_empty());
    let flush_type = FlushType::parse(
        "flush_type",
        &pick("flush_type", file.flush_type).unwrap_or_default(),
    )?;
    let delete_remote = parse_bool(
        "delete_remote",
        &pick("delete_remote", file.delete_remote.as_ref().map(Scalar::to_raw))
            .unwrap_or_else(|| "false".to_string()),
    )?;
    let working_dir = resolve_working_directory(
        workspace_root,
        &pick("working_directory", file.working_directory).unwrap_or_default(),
    )
    .map_err(|e| {
        error!(error = %e, "Invalid working_directory");
        e
    })?;

    let patterns = split_patterns(&artifacts_raw);
    if patterns.is_empty() {
        error!("No artifact patterns provided after normalization");
        return Err(SyncError::NoPatterns.into());
    }

    let config = SyncConfig {
        credentials: Credentials {
            secret_id,
            secret_key,
        },
        bucket,
        region,
        prefix,
        patterns,
        flush_url,
        flush_type,
        delete_remote,
        working_dir,
    };
    config.trace_loaded();
    Ok(config)
}
