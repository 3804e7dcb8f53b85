// SPDX-License-Identifier: Apache-2.0 OR MIT
// Severity levels and the atomic threshold used for enqueue-time filtering

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::atomic::{AtomicU8, Ordering};

use crate::error::LoggerError;

/// Log severity levels (0-5, higher is more severe)
///
/// `None` is only meaningful as a threshold: it silences every record.
#[repr(u8)]
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Raw request/response dumps
    #[default]
    Dump = 0,
    /// Debug-level messages
    Debug = 1,
    /// Informational
    Info = 2,
    /// Warning conditions
    Warn = 3,
    /// Error conditions
    Error = 4,
    /// Threshold that disables all output
    None = 5,
}

impl Severity {
    /// All severities, in ascending order
    pub const ALL: [Severity; 6] = [
        Severity::Dump,
        Severity::Debug,
        Severity::Info,
        Severity::Warn,
        Severity::Error,
        Severity::None,
    ];

    /// Get severity level as u8 (0-5)
    #[inline]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Lowercase level name, as accepted by [`Severity::from_str`]
    pub const fn as_str(self) -> &'static str {
        match self {
            Severity::Dump => "dump",
            Severity::Debug => "debug",
            Severity::Info => "info",
            Severity::Warn => "warn",
            Severity::Error => "error",
            Severity::None => "none",
        }
    }

    /// Bracketed prefix used by the per-severity convenience wrappers
    pub const fn tag(self) -> &'static str {
        match self {
            Severity::Dump => "[DUMP] ",
            Severity::Debug => "[DEBUG] ",
            Severity::Info => "[INFO] ",
            Severity::Warn => "[WARNING] ",
            Severity::Error => "[ERROR] ",
            Severity::None => "",
        }
    }

    /// Create from u8 value (returns None if invalid)
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Severity::Dump),
            1 => Some(Severity::Debug),
            2 => Some(Severity::Info),
            3 => Some(Severity::Warn),
            4 => Some(Severity::Error),
            5 => Some(Severity::None),
            _ => None,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = LoggerError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Severity::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(name))
            .ok_or_else(|| LoggerError::UnknownSeverity(name.to_string()))
    }
}

/// Process-wide minimum severity, shared between a logger and its handles
///
/// A single relaxed atomic load decides whether a record is queued at all.
#[derive(Debug)]
pub struct SeverityFilter {
    min_level: AtomicU8,
}

impl SeverityFilter {
    pub fn new(level: Severity) -> Self {
        Self {
            min_level: AtomicU8::new(level.as_u8()),
        }
    }

    /// Returns true if a record at `severity` passes the current threshold
    #[inline]
    pub fn allows(&self, severity: Severity) -> bool {
        severity != Severity::None && severity.as_u8() >= self.min_level.load(Ordering::Relaxed)
    }

    pub fn set(&self, level: Severity) {
        self.min_level.store(level.as_u8(), Ordering::Relaxed);
    }

    /// Parse `name` and install it; an unknown name leaves the threshold untouched
    pub fn set_by_name(&self, name: &str) -> Result<Severity, LoggerError> {
        let level = name.parse::<Severity>()?;
        self.set(level);
        Ok(level)
    }

    pub fn get(&self) -> Severity {
        Severity::from_u8(self.min_level.load(Ordering::Relaxed)).unwrap_or(Severity::Dump)
    }
}

impl Default for SeverityFilter {
    fn default() -> Self {
        Self::new(Severity::Dump)
    }
}
