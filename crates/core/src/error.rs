//! Error types for the missionloom domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant.

use thiserror::Error;

use crate::event::EventCategory;

/// The top-level error type for all missionloom operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Conversion errors ---
    #[error("Conversion error: {0}")]
    Convert(#[from] ConvertError),

    // --- Store errors ---
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    // --- Writer errors ---
    #[error("Write error: {0}")]
    Write(#[from] WriteError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

/// Errors raised while converting raw records into timeline events.
///
/// `UnknownVariant` is fatal for the (sample, agent) pair being processed:
/// it signals schema drift between the store and the token vocabulary and
/// must never be papered over with a default token.
#[derive(Debug, Clone, Error)]
pub enum ConvertError {
    #[error(
        "unknown {category} discriminant {value:?} in record {record_id}"
    )]
    UnknownVariant {
        category: EventCategory,
        record_id: i64,
        value: String,
    },

    #[error("unknown agent role {value:?} for agent {record_id}")]
    UnknownRole { record_id: i64, value: String },
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage error: {0}")]
    Storage(String),

    #[error("query failed: {0}")]
    QueryFailed(String),

    #[error("migration failed: {0}")]
    MigrationFailed(String),

    #[error("sample not found: {0}")]
    SampleNotFound(i64),

    #[error("malformed export file {path}: {reason}")]
    MalformedExport { path: String, reason: String },

    #[error("duplicate sample (hash {0} already ingested)")]
    DuplicateSample(String),
}

#[derive(Debug, Error)]
pub enum WriteError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization failed for {path}: {source}")]
    Serialize {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}
