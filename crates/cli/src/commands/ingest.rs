//! `missionloom ingest` — Load simulation export files into the store.

use missionloom_config::AppConfig;
use missionloom_store::{IngestOutcome, SqliteStore};
use std::path::{Path, PathBuf};
use tracing::warn;

pub async fn run(config_path: &Path, files: &[PathBuf]) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load_from(config_path)?;
    let store = SqliteStore::open(&config.db_path).await?;

    let mut ingested = 0usize;
    let mut duplicates = 0usize;
    let mut failed = 0usize;
    for file in files {
        // One bad export must not sink the rest of the batch.
        match store.ingest_file(file).await {
            Ok(IngestOutcome::Ingested { sample_id }) => {
                println!("✅ {} → sample {sample_id}", file.display());
                ingested += 1;
            }
            Ok(IngestOutcome::Duplicate) => {
                println!("  {} already ingested, skipped", file.display());
                duplicates += 1;
            }
            Err(e) => {
                warn!("failed to ingest {}: {e}", file.display());
                println!("⚠️  {} failed: {e}", file.display());
                failed += 1;
            }
        }
    }

    println!("\n  {ingested} ingested, {duplicates} duplicates, {failed} failed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const EXPORT: &str = r#"{
        "agents": {
            "1": {
                "role": "scout",
                "mission": "sweep",
                "sended_messages": {},
                "positions": {"10": [1, 2]},
                "target_in_fov": {},
                "local_strategy": {},
                "global_strategy": {},
                "mission_progress": {}
            }
        }
    }"#;

    #[tokio::test]
    async fn malformed_file_does_not_abort_the_batch() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("missionloom.toml");
        let db_path = dir.path().join("events.db");
        std::fs::write(
            &config_path,
            format!("db_path = {:?}\n", db_path.display().to_string()),
        )
        .unwrap();

        let bad = dir.path().join("bad.json");
        std::fs::write(&bad, "{ not json").unwrap();
        let good = dir.path().join("good.json");
        std::fs::write(&good, EXPORT).unwrap();

        run(&config_path, &[bad, good.clone()]).await.unwrap();

        // The good file after the bad one still landed.
        let store = SqliteStore::open(&db_path).await.unwrap();
        let counts = store.counts().await.unwrap();
        assert_eq!(counts.samples, 1);
        assert_eq!(counts.agents, 1);
    }
}
