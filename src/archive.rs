// SPDX-License-Identifier: Apache-2.0 OR MIT
//! Archiver for rotated log files.
//!
//! A backup `<path>.<stamp>` becomes `<path>.<stamp>.tar.gz` holding a
//! single tar entry with the backup's name, size, mode and modification
//! time. Runs on tokio's blocking pool, off the write path.

use std::ffi::OsString;
use std::fs::{self, File, Metadata};
use std::io;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use flate2::write::GzEncoder;
use flate2::Compression;

use crate::diagnostics;
use crate::error::ArchiveError;

pub(crate) const ARCHIVE_FAILURE_METRIC: &str = "linelog_archive_failures_total";

const ARCHIVE_SUFFIX: &str = ".tar.gz";

/// `<backup>.tar.gz`
pub fn archive_path(backup: &Path) -> PathBuf {
    let mut name = OsString::from(backup.as_os_str());
    name.push(ARCHIVE_SUFFIX);
    PathBuf::from(name)
}

/// Compress `backup` into `<backup>.tar.gz`, returning the archive path
///
/// The backup itself is left in place. A partially written archive is
/// removed on failure.
pub fn compress(backup: &Path) -> Result<PathBuf, ArchiveError> {
    let read_err = |source| ArchiveError::Read {
        path: backup.to_path_buf(),
        source,
    };

    let mut source = File::open(backup).map_err(read_err)?;
    let metadata = source.metadata().map_err(read_err)?;
    let entry_name = backup
        .file_name()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("log"));

    let target = archive_path(backup);
    let write_err = |source| ArchiveError::Write {
        path: target.clone(),
        source,
    };

    let result = (|| {
        let file = File::create(&target)?;
        let mut builder = tar::Builder::new(GzEncoder::new(file, Compression::default()));

        let mut header = tar::Header::new_gnu();
        header.set_entry_type(tar::EntryType::Regular);
        header.set_size(metadata.len());
        header.set_mode(file_mode(&metadata));
        header.set_mtime(modified_secs(&metadata));
        builder.append_data(&mut header, &entry_name, &mut source)?;

        let file = builder.into_inner()?.finish()?;
        file.sync_all()
    })();

    if let Err(source) = result {
        let _ = fs::remove_file(&target);
        return Err(write_err(source));
    }
    Ok(target)
}

/// Compress `backup`, then delete it
///
/// If compression fails the backup is kept so no data is lost. A failed
/// deletion leaves the backup next to its archive and is not retried.
pub fn archive_and_remove(backup: &Path) -> Result<PathBuf, ArchiveError> {
    archive_then(backup, |path| fs::remove_file(path))
}

fn archive_then<F>(backup: &Path, remove: F) -> Result<PathBuf, ArchiveError>
where
    F: FnOnce(&Path) -> io::Result<()>,
{
    let archive = compress(backup)?;
    remove(backup).map_err(|source| ArchiveError::Remove {
        path: backup.to_path_buf(),
        source,
    })?;
    Ok(archive)
}

/// Run [`archive_and_remove`] and report any failure on the diagnostic stream
pub(crate) fn run_reported(backup: &Path) -> Result<PathBuf, ArchiveError> {
    let result = archive_and_remove(backup);
    if let Err(e) = &result {
        metrics::counter!(ARCHIVE_FAILURE_METRIC).increment(1);
        diagnostics::error("archive", e);
    }
    result
}

#[cfg(unix)]
fn file_mode(metadata: &Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode() & 0o7777
}

#[cfg(not(unix))]
fn file_mode(metadata: &Metadata) -> u32 {
    if metadata.permissions().readonly() {
        0o444
    } else {
        0o644
    }
}

fn modified_secs(metadata: &Metadata) -> u64 {
    metadata
        .modified()
        .ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
