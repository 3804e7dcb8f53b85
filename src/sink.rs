// SPDX-License-Identifier: Apache-2.0 OR MIT
//! The active log file and the mutex shared by writer, flusher, monitor and
//! rotator.

use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use parking_lot::{Mutex, MutexGuard};

/// Buffer size of the writer in front of the log file
pub const SINK_BUFFER_SIZE: usize = 4096;

/// An open log file behind a buffered writer
pub struct FileSink {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl FileSink {
    /// Open `path` for appending, creating it if absent
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            writer: BufWriter::with_capacity(SINK_BUFFER_SIZE, file),
        })
    }

    pub fn write_line(&mut self, line: &str) -> io::Result<()> {
        self.writer.write_all(line.as_bytes())
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }

    /// Logical size: bytes on disk plus bytes still buffered
    pub fn len(&self) -> io::Result<u64> {
        let on_disk = self.writer.get_ref().metadata()?.len();
        Ok(on_disk + self.writer.buffer().len() as u64)
    }

    pub fn is_empty(&self) -> io::Result<bool> {
        self.len().map(|len| len == 0)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Flush, fsync and close the file
    pub fn close(mut self) -> io::Result<()> {
        self.writer.flush()?;
        let file = self
            .writer
            .into_inner()
            .map_err(|e| e.into_error())?;
        file.sync_all()
    }
}

impl std::fmt::Debug for FileSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileSink")
            .field("path", &self.path)
            .field("buffered", &self.writer.buffer().len())
            .finish()
    }
}

/// The single shared slot holding the live sink
///
/// `None` means the logger has no writable sink: either a rotation failed to
/// reopen the file, or the logger has been closed. Every stat, write, flush
/// and swap happens while holding this mutex.
#[derive(Debug, Default)]
pub struct SinkSlot {
    inner: Mutex<Option<FileSink>>,
}

impl SinkSlot {
    pub fn new(sink: FileSink) -> Self {
        Self {
            inner: Mutex::new(Some(sink)),
        }
    }

    pub fn lock(&self) -> MutexGuard<'_, Option<FileSink>> {
        self.inner.lock()
    }

    /// Flush the live sink, if any
    pub fn flush(&self) -> io::Result<()> {
        match self.inner.lock().as_mut() {
            Some(sink) => sink.flush(),
            None => Ok(()),
        }
    }

    /// Current size of the live sink, `None` if there is no sink
    pub fn len(&self) -> io::Result<Option<u64>> {
        self.inner.lock().as_ref().map(FileSink::len).transpose()
    }

    /// Remove the live sink and close it
    pub fn close(&self) -> io::Result<()> {
        match self.inner.lock().take() {
            Some(sink) => sink.close(),
            None => Ok(()),
        }
    }
}
