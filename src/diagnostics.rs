// SPDX-License-Identifier: Apache-2.0 OR MIT
//! Diagnostic stream for the logger's own failures.
//!
//! The logger cannot report through itself, so write, flush, rotation and
//! archive failures go to stderr as one JSON object per line. Repetitive
//! failures on the hot path go through [`RateLimitedReporter`], which emits
//! at most one line per interval with a count of what it suppressed.

use std::io::Write;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use parking_lot::Mutex;

/// Default interval between rate-limited diagnostics
pub const DEFAULT_REPORT_INTERVAL: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Warn,
    Error,
}

impl Level {
    pub const fn as_str(self) -> &'static str {
        match self {
            Level::Warn => "WARN",
            Level::Error => "ERROR",
        }
    }
}

/// Render one diagnostic line (without the trailing newline)
pub fn render(level: Level, component: &str, message: &str, suppressed: u64) -> String {
    let mut line = serde_json::json!({
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "level": level.as_str(),
        "component": component,
        "message": message,
    });
    if suppressed > 0 {
        line["suppressed"] = serde_json::Value::from(suppressed);
    }
    line.to_string()
}

/// Write a diagnostic line to stderr, ignoring failures of stderr itself
pub fn report(level: Level, component: &str, message: impl std::fmt::Display) {
    emit(&render(level, component, &message.to_string(), 0));
}

pub fn warn(component: &str, message: impl std::fmt::Display) {
    report(Level::Warn, component, message);
}

pub fn error(component: &str, message: impl std::fmt::Display) {
    report(Level::Error, component, message);
}

fn emit(line: &str) {
    let mut stderr = std::io::stderr().lock();
    let _ = writeln!(stderr, "{line}");
}

/// Throttles a single class of diagnostic
///
/// Every call is counted; at most one line per `min_interval` reaches
/// stderr, carrying the number of occurrences suppressed since the last one.
pub struct RateLimitedReporter {
    component: &'static str,
    level: Level,
    min_interval: Duration,
    last_report: Mutex<Option<Instant>>,
    pending: AtomicU64,
    total: AtomicU64,
}

impl RateLimitedReporter {
    pub fn new(component: &'static str, level: Level, min_interval: Duration) -> Self {
        Self {
            component,
            level,
            min_interval,
            last_report: Mutex::new(None),
            pending: AtomicU64::new(0),
            total: AtomicU64::new(0),
        }
    }

    /// Record one occurrence; returns true if a line was emitted
    pub fn report(&self, message: impl std::fmt::Display) -> bool {
        self.pending.fetch_add(1, Ordering::Relaxed);
        self.total.fetch_add(1, Ordering::Relaxed);

        if !self.should_emit(Instant::now()) {
            return false;
        }

        let suppressed = self.pending.swap(0, Ordering::Relaxed).saturating_sub(1);
        emit(&render(
            self.level,
            self.component,
            &message.to_string(),
            suppressed,
        ));
        true
    }

    fn should_emit(&self, now: Instant) -> bool {
        let mut last = self.last_report.lock();
        match *last {
            Some(at) if now.duration_since(at) < self.min_interval => false,
            _ => {
                *last = Some(now);
                true
            }
        }
    }

    /// Occurrences recorded since the last emitted line
    pub fn pending_count(&self) -> u64 {
        self.pending.load(Ordering::Relaxed)
    }

    pub fn total_count(&self) -> u64 {
        self.total.load(Ordering::Relaxed)
    }
}

impl std::fmt::Debug for RateLimitedReporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimitedReporter")
            .field("component", &self.component)
            .field("min_interval", &self.min_interval)
            .field("total", &self.total_count())
            .finish()
    }
}
