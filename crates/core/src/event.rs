//! The canonical event model — atoms of a mission timeline.
//!
//! Every raw record the store holds (a message, a position fix, a strategy
//! update, a progress note, agent metadata) is converted into exactly one
//! [`TimelineEvent`] before any other pipeline stage sees it. By the time an
//! event exists, its text is fully tokenized: raw coordinate tuples and
//! role-plus-number agent references have already been rewritten to canonical
//! tokens by the vocabulary in [`crate::tokens`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The closed set of event categories the pipeline understands.
///
/// The set is exhaustive on purpose: converters and the splitter match on it
/// without a fallback arm, so extending the schema forces every dispatch
/// site to be revisited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventCategory {
    SentMessage,
    ReceivedMessage,
    Position,
    Strategy,
    MissionProgress,
    Metadata,
}

impl EventCategory {
    /// Stable snake_case name, used in config files and diagnostics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SentMessage => "sent_message",
            Self::ReceivedMessage => "received_message",
            Self::Position => "position",
            Self::Strategy => "strategy",
            Self::MissionProgress => "mission_progress",
            Self::Metadata => "metadata",
        }
    }

    /// All categories in canonical order.
    pub fn all() -> [EventCategory; 6] {
        [
            Self::SentMessage,
            Self::ReceivedMessage,
            Self::Position,
            Self::Strategy,
            Self::MissionProgress,
            Self::Metadata,
        ]
    }
}

impl fmt::Display for EventCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sent_message" => Ok(Self::SentMessage),
            "received_message" => Ok(Self::ReceivedMessage),
            "position" => Ok(Self::Position),
            "strategy" => Ok(Self::Strategy),
            "mission_progress" => Ok(Self::MissionProgress),
            "metadata" => Ok(Self::Metadata),
            other => Err(format!("unknown event category: {other}")),
        }
    }
}

/// The closed set of record sources a timeline can be assembled from.
///
/// One source may fan out into more than one event category: `Messages`
/// yields both sent and received events. The configured source order fixes
/// the concatenation order during assembly, which is what makes
/// timestamp-tied output reproducible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Messages,
    Positions,
    Strategies,
    MissionProgress,
    Metadata,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Messages => "messages",
            Self::Positions => "positions",
            Self::Strategies => "strategies",
            Self::MissionProgress => "mission_progress",
            Self::Metadata => "metadata",
        }
    }

    /// All sources in canonical assembly order.
    pub fn all() -> [SourceKind; 5] {
        [
            Self::Metadata,
            Self::Messages,
            Self::Positions,
            Self::Strategies,
            Self::MissionProgress,
        ]
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One canonical, tokenized, timestamped unit of mission activity.
///
/// Timestamps are simulation ticks and may repeat across events. An event is
/// immutable once constructed; the post-processor produces *new* events when
/// it prepends time tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineEvent {
    /// Simulation tick the event occurred at.
    pub timestamp: i64,

    /// Fully tokenized text for this event.
    pub formatted: String,

    /// Which source category produced the event.
    pub category: EventCategory,
}

impl TimelineEvent {
    pub fn new(timestamp: i64, formatted: impl Into<String>, category: EventCategory) -> Self {
        Self {
            timestamp,
            formatted: formatted.into(),
            category,
        }
    }
}

/// The ordered learning context selected for one target event.
///
/// Invariants (upheld by the window splitter, which is the only constructor):
/// `events` is non-empty, sorted ascending by timestamp (ties keep fetch
/// order), and every event satisfies `timestamp <= target.timestamp`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextWindow {
    pub events: Vec<TimelineEvent>,
    pub target: TimelineEvent,
}

impl ContextWindow {
    /// Earliest timestamp in the context.
    pub fn start_timestamp(&self) -> i64 {
        self.events.iter().map(|e| e.timestamp).min().unwrap_or(0)
    }

    /// Latest timestamp in the context.
    pub fn end_timestamp(&self) -> i64 {
        self.events.iter().map(|e| e.timestamp).max().unwrap_or(0)
    }
}

/// One flat (input, output) training example derived from a context window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingSample {
    /// Newline-joined formatted context events.
    pub learning_data: String,

    /// Formatted target event — the value the model learns to predict.
    pub target_data: String,

    /// Number of context events.
    pub rollout_length: usize,

    /// Earliest context timestamp.
    pub start_timestamp: i64,

    /// Latest context timestamp. `start <= end <= target` always holds;
    /// `end == target` only when same-tick learning events survived filtering.
    pub end_timestamp: i64,

    /// Timestamp of the target event.
    pub target_timestamp: i64,
}

/// Provenance record written alongside every training sample.
///
/// Created at write time, one-to-one with a [`TrainingSample`], never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleMetadata {
    /// Source sample row id in the store.
    pub sample_id: i64,

    /// Source agent row id in the store.
    pub agent_id: i64,

    /// Path the sample file was written to.
    pub path: String,

    /// Dataset/pipeline version that produced the sample.
    pub dataset_version: u32,

    pub rollout_length: usize,
    pub start_timestamp: i64,
    pub end_timestamp: i64,
    pub target_timestamp: i64,
}
