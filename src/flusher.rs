// SPDX-License-Identifier: Apache-2.0 OR MIT
// Periodic flush of the sink's buffered writer

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::diagnostics::{Level, RateLimitedReporter, DEFAULT_REPORT_INTERVAL};
use crate::sink::SinkSlot;

pub struct FlushScheduler {
    slot: Arc<SinkSlot>,
    period: Duration,
    failures: RateLimitedReporter,
}

impl FlushScheduler {
    pub fn new(slot: Arc<SinkSlot>, period: Duration) -> Self {
        Self {
            slot,
            period,
            failures: RateLimitedReporter::new("flush", Level::Error, DEFAULT_REPORT_INTERVAL),
        }
    }

    /// Flush every `period` until `shutdown` fires, then flush once more
    pub async fn run(self, shutdown: CancellationToken) {
        let mut ticker = interval_at(Instant::now() + self.period, self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                _ = ticker.tick() => self.flush(),
            }
        }

        self.flush();
    }

    fn flush(&self) {
        if let Err(e) = self.slot.flush() {
            self.failures.report(format_args!("flush failed: {e}"));
        }
    }
}
