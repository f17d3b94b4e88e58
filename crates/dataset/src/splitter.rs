//! Window splitting: one (context, target) pair per usable target event.
//!
//! For every target event at tick `t`, the splitter selects the learning
//! events inside the lookback interval `[t - max_window_size, t]` — the
//! window is inclusive of the target tick — with an optional exclusion
//! filter for one category at exactly `t`. The filter exists to keep a
//! reply out of the context used to predict the message that triggered it.
//!
//! Boundary semantics are fixed: inclusive-of-target-tick with the
//! exclusion filter. There is deliberately no flag for a strictly-exclusive
//! variant.
//!
//! Complexity: one O(L log L) sort, then O(log L + k) per target.

use missionloom_core::event::{ContextWindow, EventCategory, TimelineEvent, TrainingSample};

/// Configuration and algorithm for the slicing window.
#[derive(Debug, Clone)]
pub struct WindowSplitter {
    /// Category to predict; everything else is context.
    pub target_category: EventCategory,
    /// Maximum lookback in ticks.
    pub max_window_size: i64,
    /// Category to drop from a context when it lands on the target's tick.
    pub exclude_at_target: Option<EventCategory>,
}

impl Default for WindowSplitter {
    fn default() -> Self {
        Self {
            target_category: EventCategory::SentMessage,
            max_window_size: 100,
            exclude_at_target: Some(EventCategory::ReceivedMessage),
        }
    }
}

/// Result of one split pass.
#[derive(Debug, Clone)]
pub struct SplitOutcome {
    /// Emitted windows, in target production order.
    pub windows: Vec<ContextWindow>,
    /// Targets dropped because their filtered context was empty. A skip is
    /// a diagnostic counter, never an error.
    pub skipped_targets: usize,
}

impl WindowSplitter {
    /// Split a post-processed timeline into context windows.
    ///
    /// Iterates targets in the order they were produced, so output order is
    /// stable and reproducible. Input events are only borrowed; emitted
    /// windows hold fresh clones.
    pub fn split(&self, events: &[TimelineEvent]) -> SplitOutcome {
        let mut learning: Vec<&TimelineEvent> = Vec::new();
        let mut targets: Vec<&TimelineEvent> = Vec::new();
        for event in events {
            if event.category == self.target_category {
                targets.push(event);
            } else {
                learning.push(event);
            }
        }
        learning.sort_by_key(|e| e.timestamp);
        let timestamps: Vec<i64> = learning.iter().map(|e| e.timestamp).collect();

        let mut windows = Vec::new();
        let mut skipped_targets = 0;
        for target in targets {
            let t = target.timestamp;
            let lower = (t - self.max_window_size).max(0);
            let i = timestamps.partition_point(|&ts| ts < lower);
            let j = timestamps.partition_point(|&ts| ts <= t);

            let context: Vec<TimelineEvent> = learning[i..j]
                .iter()
                .filter(|e| match self.exclude_at_target {
                    Some(excluded) => !(e.category == excluded && e.timestamp == t),
                    None => true,
                })
                .map(|e| (*e).clone())
                .collect();

            if context.is_empty() {
                skipped_targets += 1;
                continue;
            }
            windows.push(ContextWindow {
                events: context,
                target: target.clone(),
            });
        }

        SplitOutcome {
            windows,
            skipped_targets,
        }
    }

    /// Flatten emitted windows into training samples.
    pub fn into_samples(&self, windows: &[ContextWindow]) -> Vec<TrainingSample> {
        windows
            .iter()
            .map(|window| TrainingSample {
                learning_data: window
                    .events
                    .iter()
                    .map(|e| e.formatted.as_str())
                    .collect::<Vec<_>>()
                    .join("\n"),
                target_data: window.target.formatted.clone(),
                rollout_length: window.events.len(),
                start_timestamp: window.start_timestamp(),
                end_timestamp: window.end_timestamp(),
                target_timestamp: window.target.timestamp,
            })
            .collect()
    }
}
