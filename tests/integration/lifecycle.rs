//! Open, log, close: what ends up on disk.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use linelog::{LoggerConfig, LoggerError, RotatingLogger, Severity};
use tempfile::TempDir;

use crate::common::messages;

#[tokio::test]
async fn test_ten_info_lines() -> Result<()> {
    let dir = TempDir::new()?;
    std::fs::create_dir(dir.path().join("logs"))?;
    let path = dir.path().join("logs").join("app.log");

    let logger = RotatingLogger::open(&path, 1 << 20, Duration::from_secs(1))?;
    logger.set_severity("info")?;
    for _ in 0..10 {
        logger.log(Severity::Info, "x");
    }
    logger.close().await?;

    let lines = messages(&path);
    assert_eq!(lines.len(), 10);
    assert!(lines.iter().all(|m| m.ends_with('x')));
    Ok(())
}

#[tokio::test]
async fn test_appends_to_existing_file() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("app.log");
    std::fs::write(&path, "2024-01-01T00:00:00+00:00 - earlier\n")?;

    let logger = RotatingLogger::init(LoggerConfig::new(&path))?;
    logger.info("later");
    logger.close().await?;

    assert_eq!(messages(&path), ["earlier", "[INFO] later"]);
    Ok(())
}

#[tokio::test]
async fn test_close_writes_everything_queued_in_order() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("app.log");
    let logger = RotatingLogger::init(LoggerConfig::new(&path).with_queue_capacity(1000))?;

    for i in 0..1000 {
        logger.log(Severity::Debug, &format!("record {i}"));
    }
    assert_eq!(logger.dropped_count(), 0);
    logger.close().await?;

    let expected: Vec<_> = (0..1000).map(|i| format!("record {i}")).collect();
    assert_eq!(messages(&path), expected);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_concurrent_producers_keep_per_thread_order() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("app.log");
    let logger = Arc::new(RotatingLogger::init(
        LoggerConfig::new(&path).with_queue_capacity(8192),
    )?);

    let producers: Vec<_> = (0..4)
        .map(|t| {
            let logger = Arc::clone(&logger);
            std::thread::spawn(move || {
                for i in 0..500 {
                    logger.log(Severity::Info, &format!("t{t} {i}"));
                }
            })
        })
        .collect();
    for producer in producers {
        producer.join().unwrap();
    }
    logger.close().await?;

    let lines = messages(&path);
    assert_eq!(lines.len() as u64 + logger.dropped_count(), 2000);

    for t in 0..4 {
        let prefix = format!("t{t} ");
        let seq: Vec<u32> = lines
            .iter()
            .filter_map(|l| l.strip_prefix(&prefix))
            .map(|n| n.parse().unwrap())
            .collect();
        assert!(seq.windows(2).all(|w| w[0] < w[1]), "thread {t} out of order");
    }
    Ok(())
}

#[tokio::test]
async fn test_close_twice() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("app.log");
    let logger = RotatingLogger::init(LoggerConfig::new(&path))?;
    logger.warn("once");

    logger.close().await?;
    logger.close().await?;
    logger.error("after close");

    assert_eq!(messages(&path), ["[WARNING] once"]);
    Ok(())
}

#[tokio::test]
async fn test_bogus_severity_keeps_threshold() -> Result<()> {
    let dir = TempDir::new()?;
    let logger = RotatingLogger::init(LoggerConfig::new(dir.path().join("app.log")))?;
    logger.set_severity("warn")?;

    let err = logger.set_severity("bogus").unwrap_err();
    assert!(matches!(err, LoggerError::UnknownSeverity(_)));
    assert_eq!(logger.severity(), Severity::Warn);

    logger.close().await?;
    Ok(())
}

#[tokio::test]
async fn test_missing_parent_directory() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("no").join("such").join("app.log");

    let err = RotatingLogger::open(&path, 1024, Duration::from_secs(1)).unwrap_err();
    assert!(matches!(err, LoggerError::MissingParentDirectory(_)));
    assert!(!path.exists());
}

#[tokio::test(start_paused = true)]
async fn test_flush_interval_makes_lines_visible() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("app.log");
    let logger = RotatingLogger::open(&path, 1 << 20, Duration::from_millis(100))?;

    logger.info("buffered");
    tokio::task::yield_now().await;
    assert!(messages(&path).is_empty(), "not flushed before the interval");

    tokio::time::sleep(Duration::from_millis(150)).await;
    assert_eq!(messages(&path), ["[INFO] buffered"]);

    logger.close().await?;
    Ok(())
}
