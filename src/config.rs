// SPDX-License-Identifier: Apache-2.0 OR MIT
//! Logger configuration.
//!
//! Loadable from JSON5 (comments and trailing commas allowed) or built in
//! code:
//!
//! ```ignore
//! let config = LoggerConfig::new("logs/app.log")
//!     .with_max_size_bytes(64 << 20)
//!     .with_level(Severity::Info);
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, LoggerError};
use crate::Severity;

pub const DEFAULT_MAX_SIZE_BYTES: u64 = 100 << 20;
pub const DEFAULT_QUEUE_CAPACITY: usize = 4096;
pub const DEFAULT_POOL_CAPACITY: usize = 4096;
pub const DEFAULT_FLUSH_INTERVAL_MS: u64 = 1_000;
pub const DEFAULT_MONITOR_INTERVAL_MS: u64 = 15 * 60 * 1_000;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoggerConfig {
    /// Active log file; its parent directory must already exist
    pub path: PathBuf,

    /// Size above which the size monitor rotates the file; `0` rotates any
    /// non-empty file
    #[serde(default = "default_max_size_bytes")]
    pub max_size_bytes: u64,

    #[serde(default = "default_flush_interval_ms")]
    pub flush_interval_ms: u64,

    /// How often the size monitor stats the file
    #[serde(default = "default_monitor_interval_ms")]
    pub monitor_interval_ms: u64,

    /// Records that may wait for the writer before producers start dropping
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    #[serde(default = "default_pool_capacity")]
    pub pool_capacity: usize,

    /// Initial severity threshold
    #[serde(default)]
    pub level: Severity,
}

fn default_max_size_bytes() -> u64 {
    DEFAULT_MAX_SIZE_BYTES
}

fn default_flush_interval_ms() -> u64 {
    DEFAULT_FLUSH_INTERVAL_MS
}

fn default_monitor_interval_ms() -> u64 {
    DEFAULT_MONITOR_INTERVAL_MS
}

fn default_queue_capacity() -> usize {
    DEFAULT_QUEUE_CAPACITY
}

fn default_pool_capacity() -> usize {
    DEFAULT_POOL_CAPACITY
}

impl LoggerConfig {
    /// Configuration for `path` with every other field at its default
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            max_size_bytes: DEFAULT_MAX_SIZE_BYTES,
            flush_interval_ms: DEFAULT_FLUSH_INTERVAL_MS,
            monitor_interval_ms: DEFAULT_MONITOR_INTERVAL_MS,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            pool_capacity: DEFAULT_POOL_CAPACITY,
            level: Severity::default(),
        }
    }

    pub fn with_max_size_bytes(mut self, max_size_bytes: u64) -> Self {
        self.max_size_bytes = max_size_bytes;
        self
    }

    pub fn with_flush_interval(mut self, interval: Duration) -> Self {
        self.flush_interval_ms = duration_ms(interval);
        self
    }

    pub fn with_monitor_interval(mut self, interval: Duration) -> Self {
        self.monitor_interval_ms = duration_ms(interval);
        self
    }

    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    pub fn with_pool_capacity(mut self, capacity: usize) -> Self {
        self.pool_capacity = capacity;
        self
    }

    pub fn with_level(mut self, level: Severity) -> Self {
        self.level = level;
        self
    }

    pub fn flush_interval(&self) -> Duration {
        Duration::from_millis(self.flush_interval_ms)
    }

    pub fn monitor_interval(&self) -> Duration {
        Duration::from_millis(self.monitor_interval_ms)
    }

    /// Load configuration from a JSON5 file
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content)
    }

    /// Parse configuration from a JSON5 string
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        json5::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Serialize as JSON (a valid subset of JSON5)
    pub fn to_json5(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }

    /// Check values the logger cannot run with
    ///
    /// The parent directory is checked separately at init, since it may
    /// be created between loading and starting.
    pub fn validate(&self) -> Result<(), LoggerError> {
        if self.path.as_os_str().is_empty() {
            return Err(LoggerError::InvalidConfig("path must not be empty".into()));
        }
        if self.path.file_name().is_none() {
            return Err(LoggerError::InvalidConfig(format!(
                "path '{}' does not name a file",
                self.path.display()
            )));
        }

        let nonzero = [
            ("flush_interval_ms", self.flush_interval_ms),
            ("monitor_interval_ms", self.monitor_interval_ms),
            ("queue_capacity", self.queue_capacity as u64),
            ("pool_capacity", self.pool_capacity as u64),
        ];
        for (field, value) in nonzero {
            if value == 0 {
                return Err(LoggerError::InvalidConfig(format!(
                    "{field} must be greater than zero"
                )));
            }
        }
        Ok(())
    }
}

/// Whole milliseconds, rounding a non-zero sub-millisecond remainder up
fn duration_ms(interval: Duration) -> u64 {
    let ms = u64::try_from(interval.as_millis()).unwrap_or(u64::MAX);
    if interval.subsec_nanos() % 1_000_000 != 0 {
        ms.saturating_add(1)
    } else {
        ms
    }
}
