//! `missionloom build` — Run the full dataset pipeline.

use missionloom_config::AppConfig;
use missionloom_dataset::{DatasetBuilder, TimelineAssembler, WindowSplitter};
use missionloom_store::SqliteStore;
use std::path::{Path, PathBuf};

pub async fn run(
    config_path: &Path,
    output: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load_from(config_path)?;
    let output_dir = output.unwrap_or_else(|| config.output_dir.clone());

    let store = SqliteStore::open(&config.db_path).await?;
    let builder = DatasetBuilder::new(
        store,
        TimelineAssembler::new(config.sources.clone()),
        WindowSplitter {
            target_category: config.window.target_category,
            max_window_size: config.window.max_window_size,
            exclude_at_target: config.window.exclude_at_target,
        },
        config.dataset_version,
    );

    let report = builder.build(&output_dir).await?;

    println!("✅ Dataset build complete");
    println!("  Agents processed:  {}", report.agents_processed);
    println!("  Events assembled:  {}", report.events_assembled);
    println!("  Samples written:   {}", report.samples_written);
    println!("  Targets skipped:   {}", report.targets_skipped);
    if report.agents_failed > 0 {
        println!("  ⚠️  Agents failed:   {}", report.agents_failed);
    }
    if report.write_failures > 0 {
        println!("  ⚠️  Write failures:  {}", report.write_failures);
    }

    Ok(())
}
