// SPDX-License-Identifier: Apache-2.0 OR MIT
//! Size monitor.
//!
//! Wakes every `period`, takes the sink mutex, reads the logical size of the
//! active file and rotates it when it exceeds `max_size_bytes`. The first
//! check happens one full period after start. When an earlier rotation left
//! no sink behind, each tick tries to reopen the active path instead.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::diagnostics;
use crate::rotation::Rotator;
use crate::sink::{FileSink, SinkSlot};

/// What a single size check did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Check {
    /// Below the threshold
    Within(u64),
    /// Above the threshold; a rotation was attempted
    Rotated { size: u64, ok: bool },
    /// There was no sink; a reopen was attempted
    Reopened(bool),
    /// The size could not be read
    Failed,
}

pub struct SizeMonitor {
    slot: Arc<SinkSlot>,
    rotator: Arc<Rotator>,
    max_size_bytes: u64,
    period: Duration,
}

impl SizeMonitor {
    pub fn new(
        slot: Arc<SinkSlot>,
        rotator: Arc<Rotator>,
        max_size_bytes: u64,
        period: Duration,
    ) -> Self {
        Self {
            slot,
            rotator,
            max_size_bytes,
            period,
        }
    }

    pub async fn run(self, shutdown: CancellationToken) {
        let mut ticker = interval_at(Instant::now() + self.period, self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                _ = ticker.tick() => {
                    self.check();
                }
            }
        }
    }

    /// Stat the sink and rotate if it is over the threshold
    pub fn check(&self) -> Check {
        let mut slot = self.slot.lock();

        let size = slot.as_ref().map(FileSink::len).transpose();
        let size = match size {
            Ok(Some(size)) => size,
            Ok(None) => return Check::Reopened(self.rotator.restore_locked(&mut slot)),
            Err(e) => {
                diagnostics::error(
                    "monitor",
                    format_args!("stat of '{}' failed: {e}", self.rotator.path().display()),
                );
                return Check::Failed;
            }
        };

        if size <= self.max_size_bytes {
            return Check::Within(size);
        }

        let result = self.rotator.rotate_locked(&mut slot);
        drop(slot);

        let ok = result.is_ok();
        self.rotator.dispatch(&result);
        Check::Rotated { size, ok }
    }
}
