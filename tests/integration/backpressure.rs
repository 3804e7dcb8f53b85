//! Full queue behaviour: producers never wait, drops are counted.

use anyhow::Result;
use linelog::{Enqueue, LoggerConfig, RotatingLogger, Severity};
use tempfile::TempDir;

use crate::common::messages;

// On the current-thread runtime the writer cannot run until this test yields,
// so the queue fills deterministically.
#[tokio::test]
async fn test_five_records_into_capacity_two() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("app.log");
    let logger = RotatingLogger::init(LoggerConfig::new(&path).with_queue_capacity(2))?;

    for i in 0..5 {
        logger.info(&format!("m{i}"));
    }
    assert!(logger.dropped_count() >= 3);
    assert_eq!(logger.dropped_count(), 3);

    logger.close().await?;
    assert_eq!(messages(&path), ["[INFO] m0", "[INFO] m1"]);
    Ok(())
}

#[tokio::test]
async fn test_drop_counter_is_monotonic() -> Result<()> {
    let dir = TempDir::new()?;
    let logger = RotatingLogger::init(
        LoggerConfig::new(dir.path().join("app.log")).with_queue_capacity(1),
    )?;

    assert_eq!(logger.try_log(Severity::Info, "a"), Some(Enqueue::Queued));
    assert_eq!(logger.try_log(Severity::Info, "b"), Some(Enqueue::Dropped));
    assert_eq!(logger.dropped_count(), 1);

    // Let the writer empty the queue; the counter keeps its value
    while logger.pending() > 0 {
        tokio::task::yield_now().await;
    }
    assert_eq!(logger.try_log(Severity::Info, "c"), Some(Enqueue::Queued));
    assert_eq!(logger.try_log(Severity::Info, "d"), Some(Enqueue::Dropped));
    assert_eq!(logger.dropped_count(), 2);

    logger.close().await?;
    Ok(())
}

#[tokio::test]
async fn test_filtered_records_take_no_capacity() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("app.log");
    let logger = RotatingLogger::init(
        LoggerConfig::new(&path)
            .with_queue_capacity(2)
            .with_level(Severity::Error),
    )?;

    for _ in 0..100 {
        logger.debug("noise");
        logger.warn("noise");
    }
    assert_eq!(logger.pending(), 0);
    assert_eq!(logger.dropped_count(), 0);

    logger.error("one");
    logger.error("two");
    assert_eq!(logger.dropped_count(), 0);

    logger.close().await?;
    assert_eq!(messages(&path), ["[ERROR] one", "[ERROR] two"]);
    Ok(())
}
