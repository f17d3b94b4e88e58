//! Timeline assembly: concatenate all configured sources for one agent.
//!
//! Cross-source order does not affect correctness — the post-processor
//! re-sorts — but it does fix the relative order of timestamp-tied events,
//! which is what keeps test fixtures and repeated builds byte-identical.

use crate::source;
use missionloom_core::error::Error;
use missionloom_core::event::{SourceKind, TimelineEvent};
use missionloom_store::SqliteStore;
use tracing::debug;

/// Runs the configured source processors in order and concatenates their
/// output into one unordered (but deterministically concatenated) multiset
/// of events for a single agent.
#[derive(Debug, Clone)]
pub struct TimelineAssembler {
    sources: Vec<SourceKind>,
}

impl TimelineAssembler {
    /// Assembler over an explicit, ordered source list.
    pub fn new(sources: Vec<SourceKind>) -> Self {
        Self { sources }
    }

    pub fn sources(&self) -> &[SourceKind] {
        &self.sources
    }

    /// Assemble the full event multiset for one (sample, agent) pair.
    ///
    /// Converter failures propagate unchanged; the (sample, agent) pass that
    /// hit them is the unit that aborts.
    pub async fn assemble(
        &self,
        store: &SqliteStore,
        sample_id: i64,
        agent_id: i64,
    ) -> Result<Vec<TimelineEvent>, Error> {
        let mut events = Vec::new();
        for &kind in &self.sources {
            let mut batch = source::process(kind, store, sample_id, agent_id).await?;
            debug!(
                source = %kind,
                count = batch.len(),
                "assembled source for sample {sample_id} agent {agent_id}"
            );
            events.append(&mut batch);
        }
        Ok(events)
    }
}

impl Default for TimelineAssembler {
    /// All five sources in canonical order.
    fn default() -> Self {
        Self::new(SourceKind::all().to_vec())
    }
}
