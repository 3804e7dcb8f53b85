// SPDX-License-Identifier: Apache-2.0 OR MIT
// Bounded ingress queue between producers and the writer task
//
// Producers never block: a full queue rejects the record, counts the drop
// and recycles the record. Order through the queue is FIFO.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc::{self, error::TrySendError};

use crate::diagnostics::{Level, RateLimitedReporter, DEFAULT_REPORT_INTERVAL};
use crate::entry::LogRecord;
use crate::pool::RecordPool;

pub(crate) const DROPPED_METRIC: &str = "linelog_records_dropped_total";

/// Receiving half, owned by the writer task
pub type IngressReceiver = mpsc::Receiver<Box<LogRecord>>;

/// Result of a non-blocking enqueue attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Enqueue {
    /// Accepted; the writer task will write it exactly once
    Queued,
    /// Queue was full; the record was counted and discarded
    Dropped,
    /// Writer has shut down; the record was discarded
    Closed,
}

/// Producer side of the ingress queue
pub struct IngressQueue {
    tx: mpsc::Sender<Box<LogRecord>>,
    pool: Arc<RecordPool>,
    dropped: AtomicU64,
    full: RateLimitedReporter,
}

/// Create a queue holding at most `capacity` pending records
///
/// # Panics
/// Panics if capacity is zero
pub fn channel(capacity: usize, pool: Arc<RecordPool>) -> (IngressQueue, IngressReceiver) {
    assert!(capacity > 0, "Capacity must be non-zero");
    let (tx, rx) = mpsc::channel(capacity);
    let queue = IngressQueue {
        tx,
        pool,
        dropped: AtomicU64::new(0),
        full: RateLimitedReporter::new("ingress", Level::Warn, DEFAULT_REPORT_INTERVAL),
    };
    (queue, rx)
}

impl IngressQueue {
    /// Hand a record to the writer without waiting
    #[inline]
    pub fn try_enqueue(&self, record: Box<LogRecord>) -> Enqueue {
        match self.tx.try_send(record) {
            Ok(()) => Enqueue::Queued,
            Err(TrySendError::Full(record)) => {
                let total = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
                metrics::counter!(DROPPED_METRIC).increment(1);
                self.full.report(format_args!(
                    "log queue full, dropping messages ({total} dropped so far)"
                ));
                self.pool.release(record);
                Enqueue::Dropped
            }
            Err(TrySendError::Closed(record)) => {
                self.pool.release(record);
                Enqueue::Closed
            }
        }
    }

    /// Records rejected because the queue was full
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Records currently waiting for the writer
    pub fn len(&self) -> usize {
        self.tx.max_capacity() - self.tx.capacity()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.tx.max_capacity()
    }

    /// True once the writer has stopped accepting records
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    pub fn pool(&self) -> &Arc<RecordPool> {
        &self.pool
    }
}

impl std::fmt::Debug for IngressQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IngressQueue")
            .field("len", &self.len())
            .field("capacity", &self.capacity())
            .field("dropped", &self.dropped())
            .finish()
    }
}
