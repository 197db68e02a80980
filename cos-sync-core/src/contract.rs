#![allow(unused)]

//! # contract: interface to the external command-line tools
//!
//! The pipeline never spawns processes itself. Every call to `coscmd` or `tccli` is
//! described as an [`Invocation`] and handed to a [`CommandRunner`]. The CLI crate
//! provides the process-backed implementation; tests use the `mockall`-generated
//! `MockCommandRunner` to script exit codes and inspect arguments.

use std::fmt;
use std::path::PathBuf;

use async_trait::async_trait;
use mockall::{automock, predicate::*};

use crate::error::SyncError;

/// A single external command: program, arguments, working directory and extra environment.
#[derive(Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
    /// Added on top of the inherited environment of the parent process.
    pub env: Vec<(String, String)>,
    /// Positions in `args` whose values must never be printed.
    pub secret_indices: Vec<usize>,
}

impl Invocation {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
            env: Vec::new(),
            secret_indices: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Adds an argument whose value is masked when the invocation is displayed.
    pub fn secret_arg(mut self, arg: impl Into<String>) -> Self {
        self.secret_indices.push(self.args.len());
        self.args.push(arg.into());
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    pub fn has_arg(&self, arg: &str) -> bool {
        self.args.iter().any(|a| a == arg)
    }

    /// First argument, i.e. the tool's subcommand.
    pub fn subcommand(&self) -> Option<&str> {
        self.args.first().map(String::as_str)
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for (i, arg) in self.args.iter().enumerate() {
            if self.secret_indices.contains(&i) {
                write!(f, " ***")?;
            } else {
                write!(f, " {arg}")?;
            }
        }
        if let Some(cwd) = &self.cwd {
            write!(f, " (cwd={})", cwd.display())?;
        }
        Ok(())
    }
}

// Debug goes through Display so secrets and env values stay out of logs.
impl fmt::Debug for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invocation({self})")
    }
}

/// Exit status of a finished command. `None` means it was killed by a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandOutcome {
    pub code: Option<i32>,
}

impl CommandOutcome {
    pub fn success() -> Self {
        Self { code: Some(0) }
    }

    pub fn failure(code: i32) -> Self {
        Self { code: Some(code) }
    }

    pub fn is_success(&self) -> bool {
        self.code == Some(0)
    }

    /// Converts a non-zero exit into [`SyncError::CommandFailed`].
    pub fn check(self, invocation: &Invocation) -> Result<(), SyncError> {
        if self.is_success() {
            return Ok(());
        }
        let status = match self.code {
            Some(code) => format!("exit status {code}"),
            None => "termination by signal".to_string(),
        };
        Err(SyncError::CommandFailed {
            command: invocation.to_string(),
            status,
        })
    }
}

/// Runs external commands one at a time and reports how they exited.
///
/// `Err` is reserved for commands that could not be started at all; a command that ran
/// and failed is an `Ok` outcome with a non-zero code.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, invocation: &Invocation) -> Result<CommandOutcome, SyncError>;
}
