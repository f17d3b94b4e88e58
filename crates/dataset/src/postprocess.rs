//! Post-processing: time-delta tokens for learning events.
//!
//! Separates target events from learning events, sorts the learning events
//! chronologically, and prepends each one with the bucketed token for its
//! distance to the previous learning event. Targets are never
//! time-tokenized — they are the value to predict, not context.
//!
//! This is a one-shot transform: running it on its own output would
//! double-prepend tokens, so the builder applies it exactly once per pass.

use missionloom_core::event::{EventCategory, TimelineEvent};
use missionloom_core::tokens;

/// Partition `events` around `target_category`, time-tokenize the learning
/// side, and return `learning ++ targets`.
///
/// Learning events come back sorted ascending by timestamp (stable — ties
/// keep assembly order) with `<T+n>`-style prefixes; the first learning
/// event always gets the zero-delta token. Targets keep their original
/// relative order and text.
pub fn apply_time_tokens(
    events: Vec<TimelineEvent>,
    target_category: EventCategory,
) -> Vec<TimelineEvent> {
    let (targets, mut learning): (Vec<_>, Vec<_>) = events
        .into_iter()
        .partition(|e| e.category == target_category);

    learning.sort_by_key(|e| e.timestamp);

    let mut previous = None;
    let mut out: Vec<TimelineEvent> = Vec::with_capacity(learning.len() + targets.len());
    for event in learning {
        let delta = match previous {
            Some(prev) => event.timestamp - prev,
            None => 0,
        };
        previous = Some(event.timestamp);
        let token = tokens::time_delta_token(delta);
        out.push(TimelineEvent::new(
            event.timestamp,
            format!("{token} {}", event.formatted),
            event.category,
        ));
    }
    out.extend(targets);
    out
}
