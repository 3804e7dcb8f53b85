//! Size-triggered and forced rotation, and the archives they leave behind.

use std::collections::HashSet;
use std::time::Duration;

use anyhow::Result;
use linelog::{LoggerConfig, RotatingLogger};
use tempfile::TempDir;

use crate::common::{archive_entry, archives, messages, wait_for};

#[tokio::test]
async fn test_forced_rotation_archives_exact_bytes() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("app.log");
    let logger = RotatingLogger::init(LoggerConfig::new(&path))?;

    for i in 0..20 {
        logger.info(&format!("before {i}"));
    }
    while logger.pending() > 0 {
        tokio::task::yield_now().await;
    }

    let archive = logger.rotate().await?;
    logger.info("after");
    logger.close().await?;

    let (name, data) = archive_entry(&archive);
    let backup = archive.to_string_lossy().trim_end_matches(".tar.gz").to_string();
    assert!(name.starts_with("app.log."));
    assert!(backup.ends_with(&name));
    assert!(!std::path::Path::new(&backup).exists(), "backup removed after archiving");

    let archived: Vec<_> = String::from_utf8(data)?
        .lines()
        .map(|l| l.split_once(" - ").unwrap().1.to_string())
        .collect();
    let expected: Vec<_> = (0..20).map(|i| format!("[INFO] before {i}")).collect();
    assert_eq!(archived, expected);

    assert_eq!(messages(&path), ["[INFO] after"]);
    Ok(())
}

#[tokio::test]
async fn test_back_to_back_rotations_get_distinct_names() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("app.log");
    let logger = RotatingLogger::init(LoggerConfig::new(&path))?;

    let mut seen = HashSet::new();
    for i in 0..3 {
        logger.info(&format!("gen {i}"));
        while logger.pending() > 0 {
            tokio::task::yield_now().await;
        }
        assert!(seen.insert(logger.rotate().await?));
    }
    logger.close().await?;

    assert_eq!(archives(&path).len(), 3);
    let mut contents: Vec<_> = archives(&path)
        .iter()
        .map(|a| String::from_utf8(archive_entry(a).1).unwrap())
        .collect();
    contents.sort();
    assert!(contents[0].ends_with("[INFO] gen 0\n"));
    assert!(contents[1].ends_with("[INFO] gen 1\n"));
    assert!(contents[2].ends_with("[INFO] gen 2\n"));
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_size_monitor_rotates_above_threshold() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("app.log");
    let logger = RotatingLogger::init(
        LoggerConfig::new(&path)
            .with_max_size_bytes(512)
            .with_monitor_interval(Duration::from_millis(20))
            .with_flush_interval(Duration::from_millis(10)),
    )?;

    for i in 0..40 {
        logger.info(&format!("line {i:02} padded to make the file grow"));
    }

    let rotated = wait_for(Duration::from_secs(10), || !archives(&path).is_empty()).await;
    assert!(rotated, "no archive appeared");
    logger.close().await?;

    // Every line is either in an archive or still in the active file, once
    let mut all: Vec<String> = archives(&path)
        .iter()
        .flat_map(|a| {
            String::from_utf8(archive_entry(a).1)
                .unwrap()
                .lines()
                .map(|l| l.split_once(" - ").unwrap().1.to_string())
                .collect::<Vec<_>>()
        })
        .collect();
    all.extend(messages(&path));
    all.sort();

    let mut expected: Vec<_> = (0..40)
        .map(|i| format!("[INFO] line {i:02} padded to make the file grow"))
        .collect();
    expected.sort();
    assert_eq!(all, expected);

    // No uncompressed backups are left behind
    let leftovers = std::fs::read_dir(dir.path())?
        .filter_map(|e| e.ok())
        .filter(|e| {
            let name = e.file_name().to_string_lossy().into_owned();
            name.starts_with("app.log.") && !name.ends_with(".tar.gz")
        })
        .count();
    assert_eq!(leftovers, 0);
    Ok(())
}

#[tokio::test]
async fn test_small_file_is_not_rotated() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("app.log");
    let logger = RotatingLogger::init(
        LoggerConfig::new(&path)
            .with_max_size_bytes(1 << 20)
            .with_monitor_interval(Duration::from_millis(10)),
    )?;

    logger.info("tiny");
    tokio::time::sleep(Duration::from_millis(50)).await;
    logger.close().await?;

    assert!(archives(&path).is_empty());
    assert_eq!(messages(&path), ["[INFO] tiny"]);
    Ok(())
}
