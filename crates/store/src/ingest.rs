//! Ingestion of simulation export files.
//!
//! A simulation run is exported as one JSON document with an `agents` map
//! keyed by agent number. Each agent carries its role, mission text, sent
//! messages, position track, targets in field of view, strategies, and
//! mission progress, all keyed by simulation tick. Ingestion loads one
//! export as one sample inside a single transaction and dedupes by the
//! SHA-256 hash of the file contents, so re-running an ingest over the same
//! directory is idempotent.

use crate::sqlite::SqliteStore;
use missionloom_core::error::StoreError;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{info, warn};

/// Result of ingesting one export file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestOutcome {
    /// The file was loaded as a new sample.
    Ingested { sample_id: i64 },
    /// A sample with the same content hash already exists; nothing written.
    Duplicate,
}

/// Top-level shape of a simulation export.
///
/// Only the fields the store persists are modeled; targets, bases, and the
/// area bounds in the export are world-level data the per-agent pipeline
/// never reads.
#[derive(Debug, Deserialize)]
pub struct ExportSample {
    pub agents: BTreeMap<String, ExportAgent>,
}

#[derive(Debug, Deserialize)]
pub struct ExportAgent {
    pub role: String,
    pub mission: String,

    /// Sent messages keyed by tick. Received messages are not stored
    /// separately: agent A's received messages are the rows where A is the
    /// receiver of someone else's sent message.
    #[serde(rename = "sended_messages", default)]
    pub sent_messages: BTreeMap<String, Vec<ExportMessage>>,

    /// Own position per tick, as an `[x, y]` pair.
    #[serde(default)]
    pub positions: BTreeMap<String, [i64; 2]>,

    /// Target positions in field of view per tick.
    #[serde(default)]
    pub target_in_fov: BTreeMap<String, Vec<[i64; 2]>>,

    #[serde(default)]
    pub local_strategy: BTreeMap<String, String>,

    #[serde(default)]
    pub global_strategy: BTreeMap<String, String>,

    #[serde(default)]
    pub mission_progress: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
pub struct ExportMessage {
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
    /// Agent number of the receiver.
    pub receiver: i64,
}

impl SqliteStore {
    /// Ingest one export file as one sample.
    ///
    /// Returns [`IngestOutcome::Duplicate`] without writing anything when a
    /// sample with the same content hash is already present.
    pub async fn ingest_file(&self, path: &Path) -> Result<IngestOutcome, StoreError> {
        let bytes = std::fs::read(path).map_err(|e| StoreError::MalformedExport {
            path: path.display().to_string(),
            reason: format!("read failed: {e}"),
        })?;
        let hash = format!("{:x}", Sha256::digest(&bytes));

        if self.find_sample_by_hash(&hash).await?.is_some() {
            info!("export {} already ingested, skipping", path.display());
            return Ok(IngestOutcome::Duplicate);
        }

        let export: ExportSample =
            serde_json::from_slice(&bytes).map_err(|e| StoreError::MalformedExport {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;

        let sample_id = self.ingest_export(&export, &hash, path).await?;
        info!("ingested {} as sample {sample_id}", path.display());
        Ok(IngestOutcome::Ingested { sample_id })
    }

    /// Load a parsed export under the given hash. Split out for tests.
    pub async fn ingest_export(
        &self,
        export: &ExportSample,
        hash: &str,
        path: &Path,
    ) -> Result<i64, StoreError> {
        let mut tx = self
            .pool()
            .begin()
            .await
            .map_err(|e| StoreError::Storage(format!("begin transaction: {e}")))?;

        let sample_id = Self::insert_sample(&mut tx, hash).await?;

        // First pass inserts every agent so messages can reference receivers
        // that appear later in the map.
        let mut agent_ids: BTreeMap<i64, i64> = BTreeMap::new();
        for (agent_no_key, agent) in &export.agents {
            let agent_no = parse_key(agent_no_key, path, "agent number")?;
            let agent_id =
                Self::insert_agent(&mut tx, sample_id, agent_no, &agent.role, &agent.mission)
                    .await?;
            agent_ids.insert(agent_no, agent_id);
        }

        for (agent_no_key, agent) in &export.agents {
            let agent_no = parse_key(agent_no_key, path, "agent number")?;
            let agent_id = agent_ids[&agent_no];

            for (tick_key, messages) in &agent.sent_messages {
                let timestamp = parse_key(tick_key, path, "message tick")?;
                for message in messages {
                    let Some(&receiver_id) = agent_ids.get(&message.receiver) else {
                        warn!(
                            "message at tick {timestamp} references unknown agent {}, skipping",
                            message.receiver
                        );
                        continue;
                    };
                    Self::insert_message(
                        &mut tx,
                        sample_id,
                        timestamp,
                        agent_id,
                        receiver_id,
                        &message.message,
                        &message.kind,
                    )
                    .await?;
                }
            }

            for (tick_key, &[x, y]) in &agent.positions {
                let timestamp = parse_key(tick_key, path, "position tick")?;
                Self::insert_position(&mut tx, sample_id, agent_id, timestamp, x, y, "agent")
                    .await?;
            }

            for (tick_key, targets) in &agent.target_in_fov {
                let timestamp = parse_key(tick_key, path, "target tick")?;
                for &[x, y] in targets {
                    Self::insert_position(&mut tx, sample_id, agent_id, timestamp, x, y, "target")
                        .await?;
                }
            }

            for (tick_key, text) in &agent.local_strategy {
                let timestamp = parse_key(tick_key, path, "strategy tick")?;
                Self::insert_strategy(&mut tx, sample_id, agent_id, timestamp, text, "local")
                    .await?;
            }

            for (tick_key, text) in &agent.global_strategy {
                let timestamp = parse_key(tick_key, path, "strategy tick")?;
                Self::insert_strategy(&mut tx, sample_id, agent_id, timestamp, text, "global")
                    .await?;
            }

            for (tick_key, progress) in &agent.mission_progress {
                let timestamp = parse_key(tick_key, path, "progress tick")?;
                Self::insert_progress(&mut tx, sample_id, agent_id, timestamp, progress).await?;
            }
        }

        tx.commit()
            .await
            .map_err(|e| StoreError::Storage(format!("commit: {e}")))?;
        Ok(sample_id)
    }
}

fn parse_key(key: &str, path: &Path, what: &str) -> Result<i64, StoreError> {
    key.parse().map_err(|_| StoreError::MalformedExport {
        path: path.display().to_string(),
        reason: format!("non-integer {what}: {key:?}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite::test_support::memory_store;

    const EXPORT: &str = r#"{
        "agents": {
            "1": {
                "role": "scout",
                "mission": "sweep the northern sector",
                "sended_messages": {
                    "100": [{"type": "info", "message": "target at (3, 4)", "receiver": 2}]
                },
                "positions": {"90": [3, 4], "95": [5, 6]},
                "target_in_fov": {"95": [[8, 9]]},
                "local_strategy": {"80": "grid search"},
                "global_strategy": {},
                "mission_progress": {"120": "1 of 3 found"}
            },
            "2": {
                "role": "rescuer",
                "mission": "stand by at base",
                "sended_messages": {
                    "110": [{"type": "order", "message": "moving in", "receiver": 1}]
                },
                "positions": {"90": [0, 0]},
                "target_in_fov": {},
                "local_strategy": {},
                "global_strategy": {"0": "conserve battery"},
                "mission_progress": {}
            }
        }
    }"#;

    #[tokio::test]
    async fn export_loads_as_one_sample() {
        let store = memory_store().await;
        let export: ExportSample = serde_json::from_str(EXPORT).unwrap();
        let sample_id = store
            .ingest_export(&export, "hash-1", Path::new("fixtures/0001.json"))
            .await
            .unwrap();

        let agents = store.fetch_agents(sample_id).await.unwrap();
        assert_eq!(agents.len(), 2);
        assert_eq!(agents[0].agent_no, 1);
        assert_eq!(agents[1].role, "rescuer");

        // Scout sent one message to the rescuer and received one back.
        let messages = store.fetch_messages(sample_id, agents[0].id).await.unwrap();
        assert_eq!(messages.sent.len(), 1);
        assert_eq!(messages.received.len(), 1);
        assert_eq!(messages.sent[0].timestamp, 100);
        assert_eq!(messages.received[0].timestamp, 110);

        let positions = store.fetch_positions(sample_id, agents[0].id).await.unwrap();
        assert_eq!(positions.ego.len(), 2);
        assert_eq!(positions.targets.len(), 1);

        let counts = store.counts().await.unwrap();
        assert_eq!(counts.strategies, 2);
        assert_eq!(counts.mission_progress, 1);
    }

    #[tokio::test]
    async fn duplicate_hash_is_skipped() {
        let store = memory_store().await;
        let export: ExportSample = serde_json::from_str(EXPORT).unwrap();
        store
            .ingest_export(&export, "same-hash", Path::new("a.json"))
            .await
            .unwrap();
        assert!(store.find_sample_by_hash("same-hash").await.unwrap().is_some());
        assert!(store.find_sample_by_hash("other-hash").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn non_integer_tick_is_malformed() {
        let store = memory_store().await;
        let bad = r#"{
            "agents": {
                "1": {
                    "role": "scout",
                    "mission": "m",
                    "sended_messages": {},
                    "positions": {"not-a-tick": [1, 2]},
                    "target_in_fov": {},
                    "local_strategy": {},
                    "global_strategy": {},
                    "mission_progress": {}
                }
            }
        }"#;
        let export: ExportSample = serde_json::from_str(bad).unwrap();
        let err = store
            .ingest_export(&export, "h", Path::new("bad.json"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::MalformedExport { .. }));
    }
}
