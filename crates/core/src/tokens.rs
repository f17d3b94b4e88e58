//! The token vocabulary — marker tokens, time bucketing, text normalizers.
//!
//! Every converter formats events exclusively out of this closed set, so the
//! full vocabulary can be exported to extend a tokenizer. The normalizers are
//! total functions: unmatched text passes through unchanged, there is no
//! failure path here.

use regex::Regex;
use std::sync::LazyLock;

// ── Marker tokens ─────────────────────────────────────────────────────────

pub const SENT: &str = "<SND>";
pub const RECEIVED: &str = "<RCV>";
pub const TO: &str = "<TO>";
pub const TO_ME: &str = "<TOME>";
pub const MESSAGE: &str = "<MESSAGE>";
pub const ORDER: &str = "<ORDER>";
pub const INFO: &str = "<INFO>";
pub const POSITION: &str = "<POS>";
pub const EGO_POSITION: &str = "<EGO_POS>";
pub const TARGET_POSITION: &str = "<TRGT>";
pub const LOCAL_STRATEGY: &str = "<LOCAL_STG>";
pub const GLOBAL_STRATEGY: &str = "<GLOBAL_STG>";
pub const MISSION_PROGRESS: &str = "<PRGS>";
pub const SCOUT: &str = "<SCOUT>";
pub const RESCUER: &str = "<RESCUER>";
pub const COMMANDER: &str = "<COMMANDER>";
pub const START_META: &str = "<START_META>";
pub const END_META: &str = "<END_META>";
pub const AGENT_NUM: &str = "<AGENT_NUM>";
pub const AGENT_TYPE: &str = "<AGENT_TYPE>";
pub const MISSION: &str = "<MISSION>";

/// Catch-all time token for deltas of 51 ticks or more.
pub const LONG: &str = "<LONG>";

/// Time-bucket boundary table, ascending. A delta `n` maps to the token of
/// the smallest boundary `b` with `n <= b`; 0..=5 therefore map exactly.
const TIME_BUCKETS: &[(i64, &str)] = &[
    (0, "<T+0>"),
    (1, "<T+1>"),
    (2, "<T+2>"),
    (3, "<T+3>"),
    (4, "<T+4>"),
    (5, "<T+5>"),
    (10, "<T+10>"),
    (20, "<T+20>"),
    (30, "<T+30>"),
    (40, "<T+40>"),
    (50, "<T+50>"),
];

/// Canonical agent-id token, e.g. `AGENT#7`.
pub fn agent_token(agent_no: i64) -> String {
    format!("AGENT#{agent_no}")
}

/// Map a non-negative time delta to its bucket token.
///
/// Total over all `delta >= 0`: every input has exactly one output, and the
/// bucket width is monotone in the input. Negative deltas cannot occur after
/// sorting; they are clamped to the zero bucket rather than panicking.
pub fn time_delta_token(delta: i64) -> &'static str {
    for &(boundary, token) in TIME_BUCKETS {
        if delta <= boundary {
            return token;
        }
    }
    LONG
}

/// The full enumerable vocabulary, marker tokens first, then time tokens.
pub fn all_tokens() -> Vec<&'static str> {
    let mut tokens = vec![
        SENT,
        RECEIVED,
        TO,
        TO_ME,
        MESSAGE,
        ORDER,
        INFO,
        POSITION,
        EGO_POSITION,
        TARGET_POSITION,
        LOCAL_STRATEGY,
        GLOBAL_STRATEGY,
        MISSION_PROGRESS,
        SCOUT,
        RESCUER,
        COMMANDER,
        START_META,
        END_META,
        AGENT_NUM,
        AGENT_TYPE,
        MISSION,
    ];
    tokens.extend(TIME_BUCKETS.iter().map(|&(_, t)| t));
    tokens.push(LONG);
    tokens
}

// ── Text normalizers ──────────────────────────────────────────────────────

static AGENT_REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:Scout|Rescuer|Commander)\s+(\d+)\b").expect("agent reference pattern")
});

static COORDINATE_PAIR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\((\d+),\s*(\d+)\)").expect("coordinate pattern"));

/// Rewrite every `<RoleWord> <number>` reference to the canonical agent token.
///
/// ```
/// use missionloom_core::tokens::agent_reference_to_token;
/// assert_eq!(agent_reference_to_token("Scout 10 move"), "AGENT#10 move");
/// ```
///
/// Embedded newlines are collapsed to spaces first so a reference split
/// across lines in a free-text message is still caught. Unmatched text is
/// untouched.
pub fn agent_reference_to_token(text: &str) -> String {
    let flat = text.replace('\n', " ");
    AGENT_REFERENCE.replace_all(&flat, "AGENT#$1").trim().to_string()
}

/// Rewrite every parenthesized integer pair `(x, y)` to `<POS> x y`.
///
/// ```
/// use missionloom_core::tokens::coordinate_to_token;
/// assert_eq!(coordinate_to_token("(8, 90)"), "<POS> 8 90");
/// ```
pub fn coordinate_to_token(text: &str) -> String {
    COORDINATE_PAIR
        .replace_all(text, format!("{POSITION} $1 $2"))
        .trim()
        .to_string()
}

/// Full message normalization: agent references, then coordinates.
pub fn normalize_message(text: &str) -> String {
    coordinate_to_token(&agent_reference_to_token(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_buckets_zero_to_five() {
        assert_eq!(time_delta_token(0), "<T+0>");
        assert_eq!(time_delta_token(1), "<T+1>");
        assert_eq!(time_delta_token(5), "<T+5>");
    }

    #[test]
    fn intermediate_deltas_round_up_to_boundary() {
        assert_eq!(time_delta_token(6), "<T+10>");
        assert_eq!(time_delta_token(10), "<T+10>");
        assert_eq!(time_delta_token(11), "<T+20>");
        assert_eq!(time_delta_token(37), "<T+40>");
        assert_eq!(time_delta_token(50), "<T+50>");
    }

    #[test]
    fn long_deltas_hit_the_catch_all() {
        assert_eq!(time_delta_token(51), LONG);
        assert_eq!(time_delta_token(10_000), LONG);
    }

    #[test]
    fn bucket_width_is_monotone() {
        // Totality + monotonicity over a dense range: the boundary a delta
        // maps to never decreases as the delta grows.
        let boundary_of = |d: i64| {
            TIME_BUCKETS
                .iter()
                .find(|&&(b, _)| d <= b)
                .map(|&(b, _)| b)
                .unwrap_or(i64::MAX)
        };
        let mut prev = -1;
        for delta in 0..200 {
            let token = time_delta_token(delta);
            assert!(!token.is_empty());
            let b = boundary_of(delta);
            assert!(b >= prev);
            prev = b;
        }
    }

    #[test]
    fn agent_reference_rewritten() {
        assert_eq!(agent_reference_to_token("Scout 10 move"), "AGENT#10 move");
        assert_eq!(
            agent_reference_to_token("Rescuer 2 hold position"),
            "AGENT#2 hold position"
        );
    }

    #[test]
    fn multiple_references_rewritten_independently() {
        let text = "Scout 10 sweep north.\nRescuer 2 hold until Scout confirms.";
        let out = agent_reference_to_token(text);
        assert_eq!(out, "AGENT#10 sweep north. AGENT#2 hold until Scout confirms.");
    }

    #[test]
    fn bare_role_word_is_untouched() {
        assert_eq!(
            agent_reference_to_token("wait for the Scout to report"),
            "wait for the Scout to report"
        );
    }

    #[test]
    fn coordinates_rewritten() {
        assert_eq!(coordinate_to_token("(8, 90)"), "<POS> 8 90");
        assert_eq!(
            coordinate_to_token("look at the (8, 90)"),
            "look at the <POS> 8 90"
        );
    }

    #[test]
    fn non_coordinate_parentheses_untouched() {
        assert_eq!(
            coordinate_to_token("regroup (as planned) at (3,4)"),
            "regroup (as planned) at <POS> 3 4"
        );
    }

    #[test]
    fn normalize_applies_both_passes() {
        assert_eq!(
            normalize_message("Scout 7 check (12, 34)"),
            "AGENT#7 check <POS> 12 34"
        );
    }

    #[test]
    fn vocabulary_is_closed_and_unique() {
        let tokens = all_tokens();
        let mut sorted = tokens.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), tokens.len());
        assert!(tokens.contains(&"<T+0>"));
        assert!(tokens.contains(&LONG));
    }
}
