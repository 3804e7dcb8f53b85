// SPDX-License-Identifier: Apache-2.0 OR MIT
//! Error types.
//!
//! Only lifecycle and configuration calls return these. Producer-facing
//! calls (`log` and the severity wrappers) never fail; transient I/O
//! problems on the write path are reported through [`crate::diagnostics`].

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors returned synchronously by lifecycle and configuration calls
#[derive(Error, Debug)]
pub enum LoggerError {
    #[error("directory does not exist: {}", .0.display())]
    MissingParentDirectory(PathBuf),

    #[error("failed to open log file '{}': {source}", .path.display())]
    OpenSink {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("unrecognized level: {0}")]
    UnknownSeverity(String),

    #[error("invalid logger configuration: {0}")]
    InvalidConfig(String),

    #[error("logger must be initialized from within a tokio runtime")]
    NoRuntime,

    #[error("logger is closed")]
    Closed,

    #[error("global logger is not initialized")]
    NotInitialized,

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Rotation(#[from] RotationError),

    #[error(transparent)]
    Archive(#[from] ArchiveError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Errors while loading a [`crate::LoggerConfig`] from JSON5
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(String),
}

/// The rotation step that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationStep {
    Close,
    Rename,
    Open,
}

impl std::fmt::Display for RotationStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            RotationStep::Close => "close",
            RotationStep::Rename => "rename",
            RotationStep::Open => "open",
        })
    }
}

/// A rotation aborted at one of its steps
#[derive(Error, Debug)]
#[error("rotation failed at {step} of '{}': {source}", .path.display())]
pub struct RotationError {
    pub step: RotationStep,
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
    /// Set when the active file was already renamed away before the failure
    pub backup: Option<PathBuf>,
}

impl RotationError {
    pub(crate) fn new(step: RotationStep, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self {
            step,
            path: path.into(),
            source,
            backup: None,
        }
    }

    pub(crate) fn with_backup(mut self, backup: PathBuf) -> Self {
        self.backup = Some(backup);
        self
    }
}

/// Failures of the archiver, one variant per step
#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("failed to read backup '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write archive '{}': {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to remove backup '{}': {source}", .path.display())]
    Remove {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("archive job did not complete: {0}")]
    Join(String),
}
