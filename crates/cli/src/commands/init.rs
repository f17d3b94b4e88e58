//! `missionloom init` — Write a default config file and create the store.

use missionloom_config::AppConfig;
use missionloom_store::SqliteStore;
use std::path::Path;

pub async fn run(config_path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    if config_path.exists() {
        println!("  Config exists: {}", config_path.display());
    } else {
        std::fs::write(config_path, AppConfig::default_toml())?;
        println!("✅ Wrote default config: {}", config_path.display());
    }

    let config = AppConfig::load_from(config_path)?;
    let store = SqliteStore::open(&config.db_path).await?;
    let counts = store.counts().await?;
    println!(
        "✅ Event store ready: {} ({} samples)",
        config.db_path.display(),
        counts.samples
    );

    Ok(())
}
