//! Raw record types as fetched from the store.
//!
//! These are opaque to the pipeline except for the fields each converter
//! reads. Discriminants (`kind`, `scope`, `role`) stay as raw strings here;
//! mapping them onto the token vocabulary — and rejecting unknown values —
//! is the converters' job.

use serde::{Deserialize, Serialize};

/// One message row, joined with the counterpart agent to expose its number.
///
/// For a sent message `peer_agent_no` is the receiver; for a received
/// message it is the sender.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageRow {
    pub id: i64,
    pub timestamp: i64,
    pub peer_agent_no: i64,
    pub body: String,
    /// Raw discriminant, `order` or `info` in a healthy store.
    pub kind: String,
}

/// Messages for one (sample, agent) pair, split by direction.
#[derive(Debug, Clone, Default)]
pub struct FetchedMessages {
    pub sent: Vec<MessageRow>,
    pub received: Vec<MessageRow>,
}

/// One position fix.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionRow {
    pub id: i64,
    pub timestamp: i64,
    pub pos_x: i64,
    pub pos_y: i64,
    /// Raw discriminant, `agent` or `target` in a healthy store.
    pub kind: String,
}

/// Positions for one (sample, agent) pair: the agent's own track and the
/// targets it had in view.
#[derive(Debug, Clone, Default)]
pub struct FetchedPositions {
    pub ego: Vec<PositionRow>,
    pub targets: Vec<PositionRow>,
}

/// One strategy update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyRow {
    pub id: i64,
    pub timestamp: i64,
    pub text: String,
    /// Raw discriminant, `local` or `global` in a healthy store.
    pub scope: String,
}

/// Strategy updates for one (sample, agent) pair, split by scope.
#[derive(Debug, Clone, Default)]
pub struct FetchedStrategies {
    pub local: Vec<StrategyRow>,
    pub global: Vec<StrategyRow>,
}

/// One mission-progress note.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressRow {
    pub id: i64,
    pub timestamp: i64,
    pub progress: String,
}

/// One agent row — also the metadata source for that agent's timeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentRow {
    pub id: i64,
    pub sample_id: i64,
    pub agent_no: i64,
    /// Raw discriminant, `scout`, `rescuer`, or `scout_commander`.
    pub role: String,
    pub mission: String,
}

/// Per-table row counts, served by the CLI `status` command.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TableCounts {
    pub samples: i64,
    pub agents: i64,
    pub messages: i64,
    pub positions: i64,
    pub strategies: i64,
    pub mission_progress: i64,
}
