//! SQLite-backed store of raw mission records.
//!
//! Holds the heterogeneous, timestamped event records a multi-agent
//! simulation run produces: messages, position fixes, strategy updates,
//! mission-progress notes, and per-agent metadata. The dataset pipeline
//! reads through simple filtered lookups keyed by (sample, agent); records
//! are immutable for the duration of a run and carry no ordering guarantee —
//! the pipeline sorts explicitly.

pub mod ingest;
pub mod records;
pub mod sqlite;

pub use ingest::{ExportSample, IngestOutcome};
pub use records::{
    AgentRow, FetchedMessages, FetchedPositions, FetchedStrategies, MessageRow, PositionRow,
    ProgressRow, StrategyRow, TableCounts,
};
pub use sqlite::SqliteStore;
