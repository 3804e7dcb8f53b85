// SPDX-License-Identifier: Apache-2.0 OR MIT
//! Record pool for the producer hot path.
//!
//! A fixed-capacity, lock-free free-list of boxed [`LogRecord`]s built on
//! `crossbeam-queue`. Producers acquire a record, fill it and hand it to the
//! ingress queue; the writer task releases it once the line is written.
//! When the free-list is empty a fresh record is allocated, and when it is
//! full a released record is simply dropped, so the pool never blocks and
//! never grows past its capacity.

use crossbeam_queue::ArrayQueue;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::entry::LogRecord;

/// Messages larger than this are shrunk before the record is pooled again
const MAX_POOLED_MESSAGE_CAPACITY: usize = 64 << 10;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Acquisitions served from the free-list
    pub reused: u64,
    /// Acquisitions that had to allocate
    pub allocated: u64,
    /// Releases dropped because the free-list was full
    pub discarded: u64,
}

pub struct RecordPool {
    free: ArrayQueue<Box<LogRecord>>,
    reused: AtomicU64,
    allocated: AtomicU64,
    discarded: AtomicU64,
}

impl RecordPool {
    /// Create a pool holding at most `capacity` idle records
    ///
    /// Records are allocated lazily; `capacity` is clamped to at least one.
    pub fn new(capacity: usize) -> Self {
        Self {
            free: ArrayQueue::new(capacity.max(1)),
            reused: AtomicU64::new(0),
            allocated: AtomicU64::new(0),
            discarded: AtomicU64::new(0),
        }
    }

    /// Take a record from the free-list, allocating if it is empty
    #[inline]
    pub fn acquire(&self) -> Box<LogRecord> {
        match self.free.pop() {
            Some(record) => {
                self.reused.fetch_add(1, Ordering::Relaxed);
                record
            }
            None => {
                self.allocated.fetch_add(1, Ordering::Relaxed);
                Box::default()
            }
        }
    }

    /// Return a record to the free-list
    #[inline]
    pub fn release(&self, mut record: Box<LogRecord>) {
        record.reset();
        if record.message_capacity() > MAX_POOLED_MESSAGE_CAPACITY {
            record.shrink_message(MAX_POOLED_MESSAGE_CAPACITY);
        }
        if self.free.push(record).is_err() {
            self.discarded.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Number of idle records currently pooled
    pub fn available(&self) -> usize {
        self.free.len()
    }

    pub fn capacity(&self) -> usize {
        self.free.capacity()
    }

    pub fn stats(&self) -> PoolStats {
        PoolStats {
            reused: self.reused.load(Ordering::Relaxed),
            allocated: self.allocated.load(Ordering::Relaxed),
            discarded: self.discarded.load(Ordering::Relaxed),
        }
    }
}

impl std::fmt::Debug for RecordPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordPool")
            .field("available", &self.available())
            .field("capacity", &self.capacity())
            .field("stats", &self.stats())
            .finish()
    }
}
