//! End-to-end tests for the MissionLoom pipeline.
//!
//! These exercise the full path from a raw simulation export file to the
//! written dataset: ingest into SQLite, assemble timelines, window, and
//! check the Alpaca-format output on disk.

use missionloom_config::AppConfig;
use missionloom_dataset::{DatasetBuilder, TimelineAssembler, WindowSplitter};
use missionloom_store::{IngestOutcome, SqliteStore};
use tempfile::TempDir;

const EXPORT: &str = r#"{
    "agents": {
        "3": {
            "role": "scout",
            "mission": "locate survivors in sector B",
            "sended_messages": {
                "40": [{"type": "info", "message": "survivor at (12, 7)", "receiver": 5}],
                "90": [{"type": "info", "message": "moving to Rescuer 5", "receiver": 5}]
            },
            "positions": {"10": [1, 2], "40": [12, 6], "80": [14, 9]},
            "target_in_fov": {"40": [[12, 7]]},
            "local_strategy": {"5": "spiral search"},
            "global_strategy": {"5": "cover sector B first"},
            "mission_progress": {"45": "1 survivor located"}
        },
        "5": {
            "role": "rescuer",
            "mission": "extract located survivors",
            "sended_messages": {
                "50": [{"type": "order", "message": "Scout 3 hold position", "receiver": 3}]
            },
            "positions": {"10": [0, 0], "50": [5, 5]},
            "target_in_fov": {},
            "local_strategy": {},
            "global_strategy": {},
            "mission_progress": {}
        }
    }
}"#;

fn builder_for(store: SqliteStore, config: &AppConfig) -> DatasetBuilder {
    DatasetBuilder::new(
        store,
        TimelineAssembler::new(config.sources.clone()),
        WindowSplitter {
            target_category: config.window.target_category,
            max_window_size: config.window.max_window_size,
            exclude_at_target: config.window.exclude_at_target,
        },
        config.dataset_version,
    )
}

#[tokio::test]
async fn export_file_to_dataset_on_disk() {
    let dir = TempDir::new().unwrap();
    let export_path = dir.path().join("run_017.json");
    std::fs::write(&export_path, EXPORT).unwrap();

    let store = SqliteStore::open(dir.path().join("events.db")).await.unwrap();
    let outcome = store.ingest_file(&export_path).await.unwrap();
    assert!(matches!(outcome, IngestOutcome::Ingested { .. }));

    // Re-ingesting the same bytes is a no-op.
    let again = store.ingest_file(&export_path).await.unwrap();
    assert!(matches!(again, IngestOutcome::Duplicate));

    let config = AppConfig::default();
    let out = dir.path().join("dataset");
    let report = builder_for(store, &config).build(&out).await.unwrap();

    assert_eq!(report.agents_processed, 2);
    assert_eq!(report.agents_failed, 0);
    // Scout sends at ticks 40 and 90, rescuer at 50.
    assert_eq!(report.samples_written, 3);

    let first: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(out.join("samples/0000.json")).unwrap())
            .unwrap();
    for key in ["instruction", "input", "output", "system"] {
        assert!(first.get(key).is_some(), "missing field {key}");
    }
    let input = first["input"].as_str().unwrap();
    let output = first["output"].as_str().unwrap();
    // Context carries metadata plus time-bucketed events; the target is a
    // normalized sent message.
    assert!(input.contains("<START_META>"));
    assert!(output.contains("<SND>"));
    assert!(output.contains("<MESSAGE>"));

    let annotation: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(out.join("annotations/0000.json")).unwrap())
            .unwrap();
    assert_eq!(annotation["dataset_version"], 1);
    assert!(annotation["rollout_length"].as_u64().unwrap() >= 1);
}

#[tokio::test]
async fn coordinates_and_names_are_normalized_in_output() {
    let dir = TempDir::new().unwrap();
    let export_path = dir.path().join("run.json");
    std::fs::write(&export_path, EXPORT).unwrap();

    let store = SqliteStore::open(dir.path().join("events.db")).await.unwrap();
    store.ingest_file(&export_path).await.unwrap();

    let config = AppConfig::default();
    let out = dir.path().join("dataset");
    builder_for(store, &config).build(&out).await.unwrap();

    let mut all = String::new();
    for entry in std::fs::read_dir(out.join("samples")).unwrap() {
        all.push_str(&std::fs::read_to_string(entry.unwrap().path()).unwrap());
    }
    // "(12, 7)" becomes a position token, "Rescuer 5" and "Scout 3" become
    // agent tokens, in every sample that carries them.
    assert!(all.contains("<POS> 12 7"));
    assert!(all.contains("AGENT#5"));
    assert!(!all.contains("Rescuer 5"));
    assert!(!all.contains("Scout 3"));
}
