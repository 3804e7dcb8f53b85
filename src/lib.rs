// SPDX-License-Identifier: Apache-2.0 OR MIT
//! Asynchronous rotating line logger.
//!
//! Producers on any thread hand a severity and a message to a
//! [`RotatingLogger`]; the call filters, takes a pooled record and offers it
//! to a bounded queue without ever blocking. A single writer task stamps each
//! record and appends `"<timestamp> - <message>\n"` to the log file. A size
//! monitor rotates the file to `<path>.<YYYYMMDD-HHMMSS>` once it grows past
//! the configured size, and the backup is packed into a `.tar.gz` archive
//! off the write path.
//!
//! ```ignore
//! let logger = RotatingLogger::open("logs/app.log", 64 << 20, Duration::from_secs(1))?;
//! logger.set_severity("info")?;
//! logger.info("started");
//! log_warn!(logger, "{} retries left", retries);
//! logger.close().await?;
//! ```

#[macro_use]
mod macros;

pub mod archive;
pub mod config;
pub mod consumer;
pub mod diagnostics;
pub mod entry;
pub mod error;
pub mod flusher;
pub mod global;
pub mod logger;
pub mod monitor;
pub mod pool;
pub mod queue;
pub mod rotation;
pub mod severity;
pub mod sink;

pub use config::LoggerConfig;
pub use entry::LogRecord;
pub use error::{ArchiveError, ConfigError, LoggerError, RotationError, RotationStep};
pub use logger::RotatingLogger;
pub use queue::Enqueue;
pub use severity::{Severity, SeverityFilter};
