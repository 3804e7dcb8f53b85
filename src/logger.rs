// SPDX-License-Identifier: Apache-2.0 OR MIT
//! The rotating logger and its lifecycle.
//!
//! [`RotatingLogger::init`] opens the file and spawns three tasks on the
//! current tokio runtime: the writer, the flush scheduler and the size
//! monitor. Producer calls are synchronous and never wait: a record is
//! filtered by severity, filled from the pool and offered to the bounded
//! queue, and if the queue is full it is counted as dropped.
//!
//! [`RotatingLogger::close`] stops the timers, lets the writer drain what is
//! already queued, waits for archive jobs and closes the file.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Once};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::archive::ARCHIVE_FAILURE_METRIC;
use crate::config::LoggerConfig;
use crate::consumer::{Writer, WriterStats};
use crate::diagnostics;
use crate::error::LoggerError;
use crate::flusher::FlushScheduler;
use crate::monitor::SizeMonitor;
use crate::pool::RecordPool;
use crate::queue::{self, Enqueue, IngressQueue, DROPPED_METRIC};
use crate::rotation::{Rotator, ROTATIONS_METRIC, ROTATION_FAILURES_METRIC};
use crate::sink::{FileSink, SinkSlot};
use crate::{Severity, SeverityFilter};

struct Tasks {
    writer: JoinHandle<WriterStats>,
    flusher: JoinHandle<()>,
    monitor: JoinHandle<()>,
}

/// Asynchronous line logger writing to a size-rotated file
pub struct RotatingLogger {
    path: PathBuf,
    filter: SeverityFilter,
    queue: IngressQueue,
    slot: Arc<SinkSlot>,
    rotator: Arc<Rotator>,
    shutdown: CancellationToken,
    tasks: Mutex<Option<Tasks>>,
}

impl RotatingLogger {
    /// Open the log file and start the background tasks
    ///
    /// Must be called from within a tokio runtime. Nothing is spawned if any
    /// step fails.
    pub fn init(config: LoggerConfig) -> Result<Self, LoggerError> {
        config.validate()?;
        let runtime = Handle::try_current().map_err(|_| LoggerError::NoRuntime)?;

        let parent = match config.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        if !parent.is_dir() {
            return Err(LoggerError::MissingParentDirectory(parent.to_path_buf()));
        }

        let sink = FileSink::open(&config.path).map_err(|source| LoggerError::OpenSink {
            path: config.path.clone(),
            source,
        })?;

        describe_metrics();

        let pool = Arc::new(RecordPool::new(config.pool_capacity));
        let (queue, rx) = queue::channel(config.queue_capacity, Arc::clone(&pool));
        let slot = Arc::new(SinkSlot::new(sink));
        let rotator = Arc::new(Rotator::new(config.path.clone(), Arc::clone(&slot)));
        let shutdown = CancellationToken::new();

        let writer = Writer::new(rx, Arc::clone(&slot), pool);
        let flusher = FlushScheduler::new(Arc::clone(&slot), config.flush_interval());
        let monitor = SizeMonitor::new(
            Arc::clone(&slot),
            Arc::clone(&rotator),
            config.max_size_bytes,
            config.monitor_interval(),
        );

        let tasks = Tasks {
            writer: runtime.spawn(writer.run(shutdown.clone())),
            flusher: runtime.spawn(flusher.run(shutdown.clone())),
            monitor: runtime.spawn(monitor.run(shutdown.clone())),
        };

        Ok(Self {
            path: config.path,
            filter: SeverityFilter::new(config.level),
            queue,
            slot,
            rotator,
            shutdown,
            tasks: Mutex::new(Some(tasks)),
        })
    }

    /// Load a JSON5 configuration file and start the logger it describes
    pub fn init_from_file(config_path: &Path) -> Result<Self, LoggerError> {
        let config = LoggerConfig::load_from_file(config_path)?;
        Self::init(config)
    }

    /// Open `path` with the given rotation size and flush interval
    pub fn open(
        path: impl Into<PathBuf>,
        max_size_bytes: u64,
        flush_interval: Duration,
    ) -> Result<Self, LoggerError> {
        Self::init(
            LoggerConfig::new(path)
                .with_max_size_bytes(max_size_bytes)
                .with_flush_interval(flush_interval),
        )
    }

    /// True if a record at `severity` would be queued
    #[inline]
    pub fn enabled(&self, severity: Severity) -> bool {
        self.filter.allows(severity)
    }

    /// Queue `message` as-is
    ///
    /// Never blocks. Filtered records cost one atomic load; records that do
    /// not fit in the queue are counted in [`dropped_count`](Self::dropped_count).
    #[inline]
    pub fn log(&self, severity: Severity, message: &str) {
        self.try_log(severity, message);
    }

    /// Like [`log`](Self::log), reporting what happened to the record
    ///
    /// `None` means the record was filtered out.
    pub fn try_log(&self, severity: Severity, message: &str) -> Option<Enqueue> {
        if !self.filter.allows(severity) {
            return None;
        }
        let mut record = self.queue.pool().acquire();
        record.fill(severity, message);
        Some(self.queue.try_enqueue(record))
    }

    /// Queue `message` behind its severity tag, e.g. `"[INFO] "`
    #[inline]
    pub fn log_tagged(&self, severity: Severity, message: &str) {
        if !self.filter.allows(severity) {
            return;
        }
        let mut record = self.queue.pool().acquire();
        record.fill_tagged(severity, message);
        self.queue.try_enqueue(record);
    }

    /// Tagged variant taking format arguments; nothing is formatted when filtered
    #[inline]
    pub fn log_fmt(&self, severity: Severity, args: std::fmt::Arguments<'_>) {
        if !self.filter.allows(severity) {
            return;
        }
        let mut record = self.queue.pool().acquire();
        record.fill_tagged_fmt(severity, args);
        self.queue.try_enqueue(record);
    }

    pub fn dump(&self, message: &str) {
        self.log_tagged(Severity::Dump, message);
    }

    pub fn debug(&self, message: &str) {
        self.log_tagged(Severity::Debug, message);
    }

    pub fn info(&self, message: &str) {
        self.log_tagged(Severity::Info, message);
    }

    pub fn warn(&self, message: &str) {
        self.log_tagged(Severity::Warn, message);
    }

    pub fn error(&self, message: &str) {
        self.log_tagged(Severity::Error, message);
    }

    /// Set the threshold by name (`dump`, `debug`, `info`, `warn`, `error`, `none`)
    ///
    /// Unknown names are rejected and leave the threshold unchanged.
    pub fn set_severity(&self, name: &str) -> Result<(), LoggerError> {
        self.filter.set_by_name(name).map(|_| ())
    }

    pub fn set_level(&self, level: Severity) {
        self.filter.set(level);
    }

    pub fn severity(&self) -> Severity {
        self.filter.get()
    }

    /// Records rejected because the queue was full
    pub fn dropped_count(&self) -> u64 {
        self.queue.dropped()
    }

    /// Records queued and not yet written
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_closed(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    /// Rotate now regardless of size and wait for the archive
    ///
    /// Returns the path of the `.tar.gz` archive.
    pub async fn rotate(&self) -> Result<PathBuf, LoggerError> {
        if self.is_closed() {
            return Err(LoggerError::Closed);
        }
        self.rotator.rotate_and_archive().await
    }

    /// Stop the background tasks, drain the queue and close the file
    ///
    /// Idempotent: only the first call does any work, later calls return
    /// `Ok(())` immediately.
    pub async fn close(&self) -> Result<(), LoggerError> {
        let Some(tasks) = self.tasks.lock().take() else {
            return Ok(());
        };
        self.shutdown.cancel();

        match tasks.writer.await {
            Ok(stats) if stats.failed > 0 => diagnostics::warn(
                "lifecycle",
                format_args!("{} records could not be written", stats.failed),
            ),
            Ok(_) => {}
            Err(e) => diagnostics::error("lifecycle", format_args!("writer task failed: {e}")),
        }
        for (name, handle) in [("flusher", tasks.flusher), ("monitor", tasks.monitor)] {
            if let Err(e) = handle.await {
                diagnostics::error("lifecycle", format_args!("{name} task failed: {e}"));
            }
        }

        // Failures were already reported by the jobs themselves
        self.rotator.wait_archives().await;

        self.slot.close()?;
        Ok(())
    }
}

/// Dropping without [`close`](RotatingLogger::close) cancels the tasks
/// without waiting; archive jobs already dispatched keep running detached.
impl Drop for RotatingLogger {
    fn drop(&mut self) {
        // Tasks still running drain and release the file on their own
        self.shutdown.cancel();
    }
}

impl std::fmt::Debug for RotatingLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RotatingLogger")
            .field("path", &self.path)
            .field("severity", &self.severity())
            .field("queue", &self.queue)
            .field("closed", &self.is_closed())
            .finish()
    }
}

fn describe_metrics() {
    static DESCRIBED: Once = Once::new();
    DESCRIBED.call_once(|| {
        metrics::describe_counter!(DROPPED_METRIC, "Log records dropped because the queue was full");
        metrics::describe_counter!(ROTATIONS_METRIC, "Log file rotations completed");
        metrics::describe_counter!(ROTATION_FAILURES_METRIC, "Log file rotations that failed");
        metrics::describe_counter!(ARCHIVE_FAILURE_METRIC, "Rotated log files that failed to archive");
    });
}
