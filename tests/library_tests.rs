// Integration tests for the JSON-file transcript library

use anyhow::Result;
use chrono::{TimeZone, Utc};
use dicta::library::{FileLibrary, StoreError, TranscriptRecord, TranscriptStore};
use tempfile::TempDir;

fn record_at(id: &str, title: &str, created_secs: i64) -> TranscriptRecord {
    TranscriptRecord {
        id: id.to_string(),
        title: title.to_string(),
        created_at: Utc.timestamp_opt(1_700_000_000 + created_secs, 0).unwrap(),
        language: "en-US".to_string(),
        duration_secs: 30,
        word_count: 2,
        text: "hello there".to_string(),
        segments: Vec::new(),
    }
}

#[tokio::test]
async fn test_save_get_round_trip_preserves_record() -> Result<()> {
    let dir = TempDir::new()?;
    let library = FileLibrary::new(dir.path());

    let record = record_at("tr-one", "First dictation", 0);
    let id = library.save(&record).await?;
    assert_eq!(id, "tr-one");

    let loaded = library.get("tr-one").await?;
    assert_eq!(loaded.title, "First dictation");
    assert_eq!(loaded.text, "hello there");
    assert_eq!(loaded.created_at, record.created_at);
    assert_eq!(loaded.language, "en-US");

    // On disk it is one JSON document named after the id
    assert!(dir.path().join("tr-one.json").exists());
    Ok(())
}

#[tokio::test]
async fn test_list_sorts_newest_first() -> Result<()> {
    let dir = TempDir::new()?;
    let library = FileLibrary::new(dir.path());

    library.save(&record_at("tr-old", "Old", 0)).await?;
    library.save(&record_at("tr-new", "New", 200)).await?;
    library.save(&record_at("tr-mid", "Mid", 100)).await?;

    let summaries = library.list().await?;
    let ids: Vec<&str> = summaries.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, vec!["tr-new", "tr-mid", "tr-old"]);
    Ok(())
}

#[tokio::test]
async fn test_list_skips_corrupt_and_foreign_files() -> Result<()> {
    let dir = TempDir::new()?;
    let library = FileLibrary::new(dir.path());

    library.save(&record_at("tr-good", "Good", 0)).await?;
    std::fs::write(dir.path().join("broken.json"), "{ not json")?;
    std::fs::write(dir.path().join("notes.txt"), "not a record")?;

    let summaries = library.list().await?;
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].id, "tr-good");
    Ok(())
}

#[tokio::test]
async fn test_list_on_missing_directory_is_empty() -> Result<()> {
    let dir = TempDir::new()?;
    let library = FileLibrary::new(dir.path().join("never-created"));

    assert!(library.list().await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_get_missing_and_invalid_ids() -> Result<()> {
    let dir = TempDir::new()?;
    let library = FileLibrary::new(dir.path());

    assert!(matches!(
        library.get("tr-absent").await,
        Err(StoreError::NotFound(_))
    ));
    // Path traversal attempts read as not-found, they never hit the fs
    assert!(matches!(
        library.get("../../etc/passwd").await,
        Err(StoreError::NotFound(_))
    ));
    assert!(matches!(library.get("").await, Err(StoreError::NotFound(_))));
    Ok(())
}

#[tokio::test]
async fn test_get_corrupt_record_is_an_error() -> Result<()> {
    let dir = TempDir::new()?;
    let library = FileLibrary::new(dir.path());
    std::fs::write(dir.path().join("tr-bad.json"), "{ not json")?;

    assert!(matches!(
        library.get("tr-bad").await,
        Err(StoreError::Corrupt(_))
    ));
    Ok(())
}

#[tokio::test]
async fn test_save_overwrites_same_id() -> Result<()> {
    let dir = TempDir::new()?;
    let library = FileLibrary::new(dir.path());

    library.save(&record_at("tr-one", "First title", 0)).await?;
    let mut updated = record_at("tr-one", "Renamed", 50);
    updated.text = "changed text".to_string();
    library.save(&updated).await?;

    let loaded = library.get("tr-one").await?;
    assert_eq!(loaded.title, "Renamed");
    assert_eq!(loaded.text, "changed text");
    assert_eq!(library.list().await?.len(), 1);
    Ok(())
}
