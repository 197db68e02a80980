#![doc = "cos-sync-core: core logic library for cos-sync."]

//! This crate holds the artifact pipeline: configuration types and value parsing,
//! glob expansion, staging, and the `coscmd`/`tccli` drivers behind the
//! [`contract::CommandRunner`] seam. It never spawns processes or reads the environment
//! itself; the `cos-sync` binary supplies both.

pub mod config;
pub mod contract;
pub mod error;
pub mod patterns;
pub mod purge;
pub mod stage;
pub mod synchronise;
pub mod uploader;

pub use config::{Credentials, FlushType, SyncConfig};
pub use error::SyncError;
pub use synchronise::{synchronise, SyncReport};
