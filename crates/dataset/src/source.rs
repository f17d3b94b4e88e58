//! Source processors: fetch ∘ convert, one dispatch arm per source.
//!
//! A processor has no logic of its own — it pairs an extractor query with
//! the matching converter and propagates failures unchanged. Dispatch is an
//! exhaustive match over the closed [`SourceKind`] tagged union, so adding a
//! source category is a compile-time checklist rather than a new subclass.

use missionloom_core::error::Error;
use missionloom_core::event::{SourceKind, TimelineEvent};
use missionloom_store::SqliteStore;

/// Run one source for one (sample, agent) pair.
pub async fn process(
    kind: SourceKind,
    store: &SqliteStore,
    sample_id: i64,
    agent_id: i64,
) -> Result<Vec<TimelineEvent>, Error> {
    let events = match kind {
        SourceKind::Messages => {
            let fetched = store.fetch_messages(sample_id, agent_id).await?;
            crate::convert::convert_messages(&fetched)?
        }
        SourceKind::Positions => {
            let fetched = store.fetch_positions(sample_id, agent_id).await?;
            crate::convert::convert_positions(&fetched)?
        }
        SourceKind::Strategies => {
            let fetched = store.fetch_strategies(sample_id, agent_id).await?;
            crate::convert::convert_strategies(&fetched)?
        }
        SourceKind::MissionProgress => {
            let rows = store.fetch_progress(sample_id, agent_id).await?;
            crate::convert::convert_progress(&rows)
        }
        SourceKind::Metadata => match store.fetch_agent(agent_id).await? {
            Some(agent) => vec![crate::convert::convert_metadata(&agent)?],
            None => Vec::new(),
        },
    };
    Ok(events)
}
