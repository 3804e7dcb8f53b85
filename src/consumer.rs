// SPDX-License-Identifier: Apache-2.0 OR MIT
// Writer task - sole consumer of the ingress queue

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::diagnostics::{Level, RateLimitedReporter, DEFAULT_REPORT_INTERVAL};
use crate::entry::{format_now, LogRecord};
use crate::pool::RecordPool;
use crate::queue::IngressReceiver;
use crate::sink::SinkSlot;

/// Counts kept by the writer over its lifetime
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriterStats {
    /// Lines handed to the sink
    pub written: u64,
    /// Records lost to write errors or a missing sink
    pub failed: u64,
}

/// Owns the receiving half of the queue and writes every record it gets
pub struct Writer {
    rx: IngressReceiver,
    slot: Arc<SinkSlot>,
    pool: Arc<RecordPool>,
    line: String,
    stats: WriterStats,
    write_errors: RateLimitedReporter,
    no_sink: RateLimitedReporter,
}

impl Writer {
    pub fn new(rx: IngressReceiver, slot: Arc<SinkSlot>, pool: Arc<RecordPool>) -> Self {
        Self {
            rx,
            slot,
            pool,
            line: String::with_capacity(256),
            stats: WriterStats::default(),
            write_errors: RateLimitedReporter::new("writer", Level::Error, DEFAULT_REPORT_INTERVAL),
            no_sink: RateLimitedReporter::new("writer", Level::Error, DEFAULT_REPORT_INTERVAL),
        }
    }

    /// Run until `shutdown` fires or every producer handle is gone
    ///
    /// On shutdown the queue is closed to new records and whatever is
    /// already in it is written before returning.
    pub async fn run(mut self, shutdown: CancellationToken) -> WriterStats {
        loop {
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                record = self.rx.recv() => match record {
                    Some(record) => self.write(record),
                    None => return self.stats,
                },
            }
        }

        self.drain();
        self.stats
    }

    /// Close the queue and write every record still in it
    pub fn drain(&mut self) {
        self.rx.close();
        while let Ok(record) = self.rx.try_recv() {
            self.write(record);
        }
    }

    fn write(&mut self, record: Box<LogRecord>) {
        // Formatting stays outside the sink mutex
        format_now(&mut self.line, &record);
        self.pool.release(record);

        let result = self
            .slot
            .lock()
            .as_mut()
            .map(|sink| sink.write_line(&self.line));

        match result {
            Some(Ok(())) => self.stats.written += 1,
            Some(Err(e)) => {
                self.stats.failed += 1;
                self.write_errors.report(format_args!("write failed: {e}"));
            }
            None => {
                self.stats.failed += 1;
                self.no_sink.report("no writable log file, discarding record");
            }
        }
    }
}
