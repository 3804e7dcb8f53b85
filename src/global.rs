// SPDX-License-Identifier: Apache-2.0 OR MIT
//! Process-wide logger.
//!
//! A thin facade over one [`RotatingLogger`] stored in a `OnceLock`. Calls
//! made before [`init`] succeeds are silently ignored, so library code can
//! log unconditionally.

use std::sync::OnceLock;

use parking_lot::Mutex;

use crate::{LoggerConfig, LoggerError, RotatingLogger, Severity};

static LOGGER: OnceLock<RotatingLogger> = OnceLock::new();
static INIT_LOCK: Mutex<()> = parking_lot::const_mutex(());

/// Initialize the process-wide logger
///
/// Runs at most once per process. A call after a successful init is a no-op
/// returning `Ok(())`, even if the logger has since been closed. A failed
/// init leaves nothing running and may be retried.
pub fn init(config: LoggerConfig) -> Result<(), LoggerError> {
    let _guard = INIT_LOCK.lock();
    if LOGGER.get().is_some() {
        return Ok(());
    }
    let logger = RotatingLogger::init(config)?;
    let _ = LOGGER.set(logger);
    Ok(())
}

/// The process-wide logger, if initialized
pub fn logger() -> Option<&'static RotatingLogger> {
    LOGGER.get()
}

pub fn log(severity: Severity, message: &str) {
    if let Some(logger) = LOGGER.get() {
        logger.log(severity, message);
    }
}

pub fn dump(message: &str) {
    if let Some(logger) = LOGGER.get() {
        logger.dump(message);
    }
}

pub fn debug(message: &str) {
    if let Some(logger) = LOGGER.get() {
        logger.debug(message);
    }
}

pub fn info(message: &str) {
    if let Some(logger) = LOGGER.get() {
        logger.info(message);
    }
}

pub fn warn(message: &str) {
    if let Some(logger) = LOGGER.get() {
        logger.warn(message);
    }
}

pub fn error(message: &str) {
    if let Some(logger) = LOGGER.get() {
        logger.error(message);
    }
}

pub fn set_severity(name: &str) -> Result<(), LoggerError> {
    LOGGER
        .get()
        .ok_or(LoggerError::NotInitialized)?
        .set_severity(name)
}

/// Dropped records so far; zero before init
pub fn dropped_count() -> u64 {
    LOGGER.get().map_or(0, RotatingLogger::dropped_count)
}

/// Close the process-wide logger; a no-op if it was never initialized
pub async fn close() -> Result<(), LoggerError> {
    match LOGGER.get() {
        Some(logger) => logger.close().await,
        None => Ok(()),
    }
}
