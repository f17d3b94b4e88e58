//! `missionloom status` — Show store contents and configuration.

use missionloom_config::AppConfig;
use missionloom_core::tokens;
use missionloom_store::SqliteStore;
use std::path::Path;

pub async fn run(config_path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load_from(config_path)?;

    println!("MissionLoom Status");
    println!("==================");
    println!("  Config:           {}", config_path.display());
    println!("  Store:            {}", config.db_path.display());
    println!("  Output dir:       {}", config.output_dir.display());
    println!("  Dataset version:  {}", config.dataset_version);
    println!("  Target category:  {}", config.window.target_category);
    println!("  Window size:      {}", config.window.max_window_size);
    match config.window.exclude_at_target {
        Some(category) => println!("  Exclude @ target: {category}"),
        None => println!("  Exclude @ target: none"),
    }
    println!("  Special tokens:   {}", tokens::all_tokens().len());

    if !config.db_path.exists() {
        println!("\n  ⚠️  No event store — run `missionloom init` first");
        return Ok(());
    }

    let store = SqliteStore::open(&config.db_path).await?;
    let counts = store.counts().await?;
    println!("\n  Samples:          {}", counts.samples);
    println!("  Agents:           {}", counts.agents);
    println!("  Messages:         {}", counts.messages);
    println!("  Positions:        {}", counts.positions);
    println!("  Strategies:       {}", counts.strategies);
    println!("  Progress records: {}", counts.mission_progress);

    Ok(())
}
