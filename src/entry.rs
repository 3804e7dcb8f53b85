// SPDX-License-Identifier: Apache-2.0 OR MIT
// Log record carried through the ingress queue, and the line formatter

use chrono::{DateTime, Local, SecondsFormat, TimeZone};

use super::Severity;

/// A pending log record
///
/// Records are recycled through [`crate::pool::RecordPool`]; the message
/// buffer keeps its capacity between uses so steady-state logging does not
/// allocate.
pub struct LogRecord {
    pub severity: Severity,
    message: String,
}

impl LogRecord {
    /// Create a new record
    pub fn new(severity: Severity, message: &str) -> Self {
        let mut record = Self::default();
        record.fill(severity, message);
        record
    }

    /// Overwrite this record's contents, reusing the message buffer
    pub fn fill(&mut self, severity: Severity, message: &str) {
        self.severity = severity;
        self.message.clear();
        self.message.push_str(message);
    }

    /// Overwrite with a tagged message (`"[INFO] " + message`)
    pub fn fill_tagged(&mut self, severity: Severity, message: &str) {
        self.severity = severity;
        self.message.clear();
        self.message.push_str(severity.tag());
        self.message.push_str(message);
    }

    /// Overwrite with a tagged, formatted message without an intermediate `String`
    pub fn fill_tagged_fmt(&mut self, severity: Severity, args: std::fmt::Arguments<'_>) {
        use std::fmt::Write;

        self.severity = severity;
        self.message.clear();
        self.message.push_str(severity.tag());
        let _ = self.message.write_fmt(args);
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Clear contents before the record goes back to the pool
    pub(crate) fn reset(&mut self) {
        self.severity = Severity::Dump;
        self.message.clear();
    }

    pub(crate) fn message_capacity(&self) -> usize {
        self.message.capacity()
    }

    pub(crate) fn shrink_message(&mut self, max_capacity: usize) {
        self.message.shrink_to(max_capacity);
    }
}

impl Default for LogRecord {
    fn default() -> Self {
        Self {
            severity: Severity::Dump,
            message: String::new(),
        }
    }
}

impl std::fmt::Debug for LogRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogRecord")
            .field("severity", &self.severity)
            .field("message", &self.message())
            .finish()
    }
}

/// Render `"<timestamp> - <message>\n"` into `line`
///
/// The timestamp is RFC 3339 at second precision with the local offset.
pub fn format_line<Tz>(line: &mut String, now: &DateTime<Tz>, message: &str)
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    line.clear();
    line.push_str(&now.to_rfc3339_opts(SecondsFormat::Secs, false));
    line.push_str(" - ");
    line.push_str(message);
    line.push('\n');
}

/// Format a record stamped with the current local time
pub fn format_now(line: &mut String, record: &LogRecord) {
    format_line(line, &Local::now(), record.message());
}
