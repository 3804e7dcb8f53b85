// SPDX-License-Identifier: Apache-2.0 OR MIT
//! Rotation of the active log file.
//!
//! Close, rename to `<path>.<YYYYMMDD-HHMMSS>` and reopen all happen while
//! the sink mutex is held, so no write lands between the old and the new
//! file. Archiving of the backup is dispatched after the mutex is released.

use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Local, TimeZone};
use parking_lot::Mutex;
use tokio::task::JoinSet;

use crate::archive;
use crate::diagnostics;
use crate::error::{ArchiveError, LoggerError, RotationError, RotationStep};
use crate::sink::{FileSink, SinkSlot};

pub(crate) const ROTATIONS_METRIC: &str = "linelog_rotations_total";
pub(crate) const ROTATION_FAILURES_METRIC: &str = "linelog_rotation_failures_total";

const BACKUP_STAMP_FORMAT: &str = "%Y%m%d-%H%M%S";

/// Backup name for `path` rotated at `now`
///
/// `<path>.<YYYYMMDD-HHMMSS>`, or with `.1`, `.2`, ... appended when that
/// name (or its archive) is already taken by an earlier rotation in the same
/// second.
pub fn backup_path<Tz>(path: &Path, now: &DateTime<Tz>) -> PathBuf
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let base = with_suffix(path, &now.format(BACKUP_STAMP_FORMAT).to_string());
    if is_free(&base) {
        return base;
    }

    let mut n: u64 = 1;
    loop {
        let candidate = with_suffix(&base, &n.to_string());
        if is_free(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".");
    name.push(suffix);
    PathBuf::from(name)
}

fn is_free(candidate: &Path) -> bool {
    !candidate.exists() && !archive::archive_path(candidate).exists()
}

type ArchiveJobs = JoinSet<Result<PathBuf, ArchiveError>>;
type Opener = fn(&Path) -> io::Result<FileSink>;

fn open_sink(path: &Path) -> io::Result<FileSink> {
    FileSink::open(path)
}

/// Rotates the file behind a [`SinkSlot`] and tracks the archive jobs it
/// dispatches
pub struct Rotator {
    path: PathBuf,
    slot: Arc<SinkSlot>,
    archives: Mutex<ArchiveJobs>,
    open: Opener,
}

impl Rotator {
    pub fn new(path: impl Into<PathBuf>, slot: Arc<SinkSlot>) -> Self {
        Self {
            path: path.into(),
            slot,
            archives: Mutex::new(JoinSet::new()),
            open: open_sink,
        }
    }

    #[cfg(test)]
    fn with_opener(mut self, open: Opener) -> Self {
        self.open = open;
        self
    }

    /// Active log file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Rotate with the sink mutex already held by the caller
    ///
    /// Returns the backup path. Success and failure are both counted;
    /// failures are also reported on the diagnostic stream.
    pub fn rotate_locked(&self, slot: &mut Option<FileSink>) -> Result<PathBuf, RotationError> {
        let result = self.swap(slot);
        match &result {
            Ok(_) => metrics::counter!(ROTATIONS_METRIC).increment(1),
            Err(e) => {
                metrics::counter!(ROTATION_FAILURES_METRIC).increment(1);
                diagnostics::error("rotation", e);
            }
        }
        result
    }

    fn swap(&self, slot: &mut Option<FileSink>) -> Result<PathBuf, RotationError> {
        // A sink that cannot flush keeps its buffered bytes and stays installed
        if let Some(sink) = slot.as_mut() {
            sink.flush()
                .map_err(|e| RotationError::new(RotationStep::Close, &self.path, e))?;
        }
        if let Some(sink) = slot.take() {
            if let Err(e) = sink.close() {
                diagnostics::warn(
                    "rotation",
                    format_args!("sync of '{}' before rename failed: {e}", self.path.display()),
                );
            }
        }

        let backup = backup_path(&self.path, &Local::now());
        if let Err(e) = fs::rename(&self.path, &backup) {
            self.restore_locked(slot);
            return Err(RotationError::new(RotationStep::Rename, &self.path, e));
        }

        match (self.open)(&self.path) {
            Ok(sink) => {
                *slot = Some(sink);
                Ok(backup)
            }
            Err(e) => Err(RotationError::new(RotationStep::Open, &self.path, e).with_backup(backup)),
        }
    }

    /// Reopen the active path in append mode if the slot is empty
    ///
    /// Returns true if a sink is installed afterwards.
    pub fn restore_locked(&self, slot: &mut Option<FileSink>) -> bool {
        if slot.is_some() {
            return true;
        }
        match (self.open)(&self.path) {
            Ok(sink) => {
                *slot = Some(sink);
                true
            }
            Err(e) => {
                diagnostics::error(
                    "rotation",
                    format_args!("reopening '{}' failed: {e}", self.path.display()),
                );
                false
            }
        }
    }

    /// Rotate now and archive the backup in the background
    pub fn rotate(&self) -> Result<PathBuf, RotationError> {
        let result = {
            let mut slot = self.slot.lock();
            self.rotate_locked(&mut slot)
        };
        self.dispatch(&result);
        result
    }

    /// Rotate now and wait for the backup to be archived
    ///
    /// Returns the archive path.
    pub async fn rotate_and_archive(&self) -> Result<PathBuf, LoggerError> {
        let result = {
            let mut slot = self.slot.lock();
            self.rotate_locked(&mut slot)
        };
        let backup = match result {
            Ok(backup) => backup,
            Err(e) => {
                if let Some(backup) = &e.backup {
                    self.spawn_archive(backup.clone());
                }
                return Err(e.into());
            }
        };

        let archive = tokio::task::spawn_blocking(move || archive::run_reported(&backup))
            .await
            .map_err(|e| ArchiveError::Join(e.to_string()))??;
        Ok(archive)
    }

    /// Archive the backup a rotation produced, if any, on the blocking pool
    pub fn dispatch(&self, result: &Result<PathBuf, RotationError>) {
        let backup = match result {
            Ok(backup) => backup,
            Err(RotationError {
                backup: Some(backup),
                ..
            }) => backup,
            Err(_) => return,
        };
        self.spawn_archive(backup.clone());
    }

    fn spawn_archive(&self, backup: PathBuf) {
        let mut jobs = self.archives.lock();
        while jobs.try_join_next().is_some() {}
        jobs.spawn_blocking(move || archive::run_reported(&backup));
    }

    /// Archive jobs dispatched and not yet reaped
    pub fn pending_archives(&self) -> usize {
        self.archives.lock().len()
    }

    /// Wait for every archive job dispatched so far
    pub async fn wait_archives(&self) -> Vec<Result<PathBuf, ArchiveError>> {
        let mut jobs = std::mem::take(&mut *self.archives.lock());
        let mut results = Vec::with_capacity(jobs.len());
        while let Some(joined) = jobs.join_next().await {
            results.push(joined.unwrap_or_else(|e| Err(ArchiveError::Join(e.to_string()))));
        }
        results
    }
}

/// Archive jobs outlive the rotator instead of being aborted with it
impl Drop for Rotator {
    fn drop(&mut self) {
        self.archives.get_mut().detach_all();
    }
}

impl std::fmt::Debug for Rotator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rotator")
            .field("path", &self.path)
            .field("pending_archives", &self.pending_archives())
            .finish()
    }
}
