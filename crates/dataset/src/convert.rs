//! Per-category converters: raw records → canonical timeline events.
//!
//! Converters are pure functions with one documented failure: a sub-type
//! discriminant that is not in the token vocabulary is a fatal
//! [`ConvertError::UnknownVariant`]. That case must never be defaulted —
//! it means the store and the vocabulary have drifted apart, and silently
//! guessing a token would poison the dataset.
//!
//! Message text is normalized (agent references, then coordinates) before
//! formatting, so no `TimelineEvent` ever carries a raw `(x, y)` tuple or a
//! `Scout 7`-style reference.

use missionloom_core::error::ConvertError;
use missionloom_core::event::{EventCategory, TimelineEvent};
use missionloom_core::tokens;
use missionloom_store::{
    AgentRow, FetchedMessages, FetchedPositions, FetchedStrategies, MessageRow, PositionRow,
    ProgressRow, StrategyRow,
};

/// Metadata events carry no tick of their own; they anchor the timeline once
/// per agent at tick zero.
const METADATA_TIMESTAMP: i64 = 0;

fn message_kind_token(
    row: &MessageRow,
    category: EventCategory,
) -> Result<&'static str, ConvertError> {
    match row.kind.as_str() {
        "order" => Ok(tokens::ORDER),
        "info" => Ok(tokens::INFO),
        other => Err(ConvertError::UnknownVariant {
            category,
            record_id: row.id,
            value: other.to_string(),
        }),
    }
}

/// Convert both message directions, sent first.
///
/// Sent: `<SND> <TO> AGENT#<receiver> <kind> <MESSAGE> <text>`.
/// Received: `<RCV> AGENT#<sender> <TOME> <kind> <MESSAGE> <text>`.
pub fn convert_messages(fetched: &FetchedMessages) -> Result<Vec<TimelineEvent>, ConvertError> {
    let mut events = Vec::with_capacity(fetched.sent.len() + fetched.received.len());
    for row in &fetched.sent {
        let kind = message_kind_token(row, EventCategory::SentMessage)?;
        let parts: [&str; 6] = [
            tokens::SENT,
            tokens::TO,
            &tokens::agent_token(row.peer_agent_no),
            kind,
            tokens::MESSAGE,
            &tokens::normalize_message(&row.body),
        ];
        let formatted = parts.join(" ");
        events.push(TimelineEvent::new(
            row.timestamp,
            formatted,
            EventCategory::SentMessage,
        ));
    }
    for row in &fetched.received {
        let kind = message_kind_token(row, EventCategory::ReceivedMessage)?;
        let parts: [&str; 6] = [
            tokens::RECEIVED,
            &tokens::agent_token(row.peer_agent_no),
            tokens::TO_ME,
            kind,
            tokens::MESSAGE,
            &tokens::normalize_message(&row.body),
        ];
        let formatted = parts.join(" ");
        events.push(TimelineEvent::new(
            row.timestamp,
            formatted,
            EventCategory::ReceivedMessage,
        ));
    }
    Ok(events)
}

fn convert_position(row: &PositionRow) -> Result<TimelineEvent, ConvertError> {
    let kind = match row.kind.as_str() {
        "agent" => tokens::EGO_POSITION,
        "target" => tokens::TARGET_POSITION,
        other => {
            return Err(ConvertError::UnknownVariant {
                category: EventCategory::Position,
                record_id: row.id,
                value: other.to_string(),
            });
        }
    };
    let formatted = format!("{kind} {} {}", row.pos_x, row.pos_y);
    Ok(TimelineEvent::new(
        row.timestamp,
        formatted,
        EventCategory::Position,
    ))
}

/// Convert both position tracks, ego first: `<EGO_POS|TRGT> <x> <y>`.
pub fn convert_positions(fetched: &FetchedPositions) -> Result<Vec<TimelineEvent>, ConvertError> {
    fetched
        .ego
        .iter()
        .chain(&fetched.targets)
        .map(convert_position)
        .collect()
}

fn convert_strategy(row: &StrategyRow) -> Result<TimelineEvent, ConvertError> {
    let scope = match row.scope.as_str() {
        "local" => tokens::LOCAL_STRATEGY,
        "global" => tokens::GLOBAL_STRATEGY,
        other => {
            return Err(ConvertError::UnknownVariant {
                category: EventCategory::Strategy,
                record_id: row.id,
                value: other.to_string(),
            });
        }
    };
    let formatted = format!("{scope} {}", row.text);
    Ok(TimelineEvent::new(
        row.timestamp,
        formatted,
        EventCategory::Strategy,
    ))
}

/// Convert both strategy scopes, local first: `<LOCAL_STG|GLOBAL_STG> <text>`.
pub fn convert_strategies(fetched: &FetchedStrategies) -> Result<Vec<TimelineEvent>, ConvertError> {
    fetched
        .local
        .iter()
        .chain(&fetched.global)
        .map(convert_strategy)
        .collect()
}

/// `<PRGS> <text>` — mission progress has no sub-type discriminant.
pub fn convert_progress(rows: &[ProgressRow]) -> Vec<TimelineEvent> {
    rows.iter()
        .map(|row| {
            TimelineEvent::new(
                row.timestamp,
                format!("{} {}", tokens::MISSION_PROGRESS, row.progress),
                EventCategory::MissionProgress,
            )
        })
        .collect()
}

/// One metadata anchor event per agent, pinned to tick 0.
///
/// `<START_META> <AGENT_NUM> <AGENT_TYPE> <role> <AGENT_NUM> <no> <MISSION> <mission> <END_META>`.
pub fn convert_metadata(agent: &AgentRow) -> Result<TimelineEvent, ConvertError> {
    let role = match agent.role.as_str() {
        "scout" => tokens::SCOUT,
        "rescuer" => tokens::RESCUER,
        "scout_commander" => tokens::COMMANDER,
        other => {
            return Err(ConvertError::UnknownRole {
                record_id: agent.id,
                value: other.to_string(),
            });
        }
    };
    let parts: [&str; 9] = [
        tokens::START_META,
        tokens::AGENT_NUM,
        tokens::AGENT_TYPE,
        role,
        tokens::AGENT_NUM,
        &agent.agent_no.to_string(),
        tokens::MISSION,
        &agent.mission,
        tokens::END_META,
    ];
    let formatted = parts.join(" ");
    Ok(TimelineEvent::new(
        METADATA_TIMESTAMP,
        formatted,
        EventCategory::Metadata,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(id: i64, kind: &str, body: &str) -> MessageRow {
        MessageRow {
            id,
            timestamp: 100,
            peer_agent_no: 2,
            body: body.into(),
            kind: kind.into(),
        }
    }

    #[test]
    fn sent_message_contract() {
        let fetched = FetchedMessages {
            sent: vec![message(1, "info", "target spotted at (8, 90)")],
            received: vec![],
        };
        let events = convert_messages(&fetched).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(
            events[0].formatted,
            "<SND> <TO> AGENT#2 <INFO> <MESSAGE> target spotted at <POS> 8 90"
        );
        assert_eq!(events[0].category, EventCategory::SentMessage);
        assert_eq!(events[0].timestamp, 100);
    }

    #[test]
    fn received_message_contract() {
        let fetched = FetchedMessages {
            sent: vec![],
            received: vec![message(7, "order", "Rescuer 2 move in")],
        };
        let events = convert_messages(&fetched).unwrap();
        assert_eq!(
            events[0].formatted,
            "<RCV> AGENT#2 <TOME> <ORDER> <MESSAGE> AGENT#2 move in"
        );
        assert_eq!(events[0].category, EventCategory::ReceivedMessage);
    }

    #[test]
    fn unknown_message_kind_is_fatal() {
        let fetched = FetchedMessages {
            sent: vec![message(9, "broadcast", "hello")],
            received: vec![],
        };
        let err = convert_messages(&fetched).unwrap_err();
        match err {
            ConvertError::UnknownVariant {
                category,
                record_id,
                value,
            } => {
                assert_eq!(category, EventCategory::SentMessage);
                assert_eq!(record_id, 9);
                assert_eq!(value, "broadcast");
            }
            other => panic!("expected UnknownVariant, got {other:?}"),
        }
    }

    #[test]
    fn position_contract() {
        let fetched = FetchedPositions {
            ego: vec![PositionRow {
                id: 1,
                timestamp: 90,
                pos_x: 3,
                pos_y: 4,
                kind: "agent".into(),
            }],
            targets: vec![PositionRow {
                id: 2,
                timestamp: 95,
                pos_x: 8,
                pos_y: 9,
                kind: "target".into(),
            }],
        };
        let events = convert_positions(&fetched).unwrap();
        assert_eq!(events[0].formatted, "<EGO_POS> 3 4");
        assert_eq!(events[1].formatted, "<TRGT> 8 9");
    }

    #[test]
    fn unknown_position_kind_is_fatal() {
        let fetched = FetchedPositions {
            ego: vec![PositionRow {
                id: 5,
                timestamp: 0,
                pos_x: 0,
                pos_y: 0,
                kind: "base".into(),
            }],
            targets: vec![],
        };
        assert!(matches!(
            convert_positions(&fetched),
            Err(ConvertError::UnknownVariant { record_id: 5, .. })
        ));
    }

    #[test]
    fn strategy_contract() {
        let fetched = FetchedStrategies {
            local: vec![StrategyRow {
                id: 1,
                timestamp: 80,
                text: "grid search".into(),
                scope: "local".into(),
            }],
            global: vec![StrategyRow {
                id: 2,
                timestamp: 85,
                text: "conserve battery".into(),
                scope: "global".into(),
            }],
        };
        let events = convert_strategies(&fetched).unwrap();
        assert_eq!(events[0].formatted, "<LOCAL_STG> grid search");
        assert_eq!(events[1].formatted, "<GLOBAL_STG> conserve battery");
    }

    #[test]
    fn progress_contract() {
        let events = convert_progress(&[ProgressRow {
            id: 1,
            timestamp: 120,
            progress: "1 of 3 found".into(),
        }]);
        assert_eq!(events[0].formatted, "<PRGS> 1 of 3 found");
        assert_eq!(events[0].category, EventCategory::MissionProgress);
    }

    #[test]
    fn metadata_anchors_at_tick_zero() {
        let agent = AgentRow {
            id: 1,
            sample_id: 1,
            agent_no: 7,
            role: "scout".into(),
            mission: "sweep the northern sector".into(),
        };
        let event = convert_metadata(&agent).unwrap();
        assert_eq!(event.timestamp, 0);
        assert_eq!(
            event.formatted,
            "<START_META> <AGENT_NUM> <AGENT_TYPE> <SCOUT> <AGENT_NUM> 7 \
             <MISSION> sweep the northern sector <END_META>"
        );
    }

    #[test]
    fn unknown_role_is_fatal() {
        let agent = AgentRow {
            id: 3,
            sample_id: 1,
            agent_no: 1,
            role: "medic".into(),
            mission: "m".into(),
        };
        assert!(matches!(
            convert_metadata(&agent),
            Err(ConvertError::UnknownRole { record_id: 3, .. })
        ));
    }
}
