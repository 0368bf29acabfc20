use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use tm_merge::{MergeOutcome, Selection};

/// Payload-free discriminant of a [`SessionEvent`], used for transitions.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    Compared,
    Merged,
    Cleared,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Compared => "compared",
            EventType::Merged => "merged",
            EventType::Cleared => "cleared",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventKind {
    Compared {
        run_id: Uuid,
        additions: usize,
        removals: usize,
        similarity: f64,
    },
    Merged {
        selection: Selection,
        outcome: MergeOutcome,
    },
    Cleared,
}

impl EventKind {
    pub fn event_type(&self) -> EventType {
        match self {
            EventKind::Compared { .. } => EventType::Compared,
            EventKind::Merged { .. } => EventType::Merged,
            EventKind::Cleared => EventType::Cleared,
        }
    }
}

/// One entry of a session's in-memory audit log.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionEvent {
    /// 1-based, gap-free within a session.
    pub seq: u64,
    pub kind: EventKind,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use tm_core::Side;
    use tm_merge::SkipReason;

    #[test]
    fn event_type_follows_kind() {
        assert_eq!(EventKind::Cleared.event_type(), EventType::Cleared);
        let merged = EventKind::Merged {
            selection: Selection::word(Side::Left, 1),
            outcome: MergeOutcome::Skipped {
                reason: SkipReason::OutOfBounds,
            },
        };
        assert_eq!(merged.event_type(), EventType::Merged);
        assert_eq!(merged.event_type().as_str(), "merged");
    }

    #[test]
    fn event_json_is_tagged() {
        let event = SessionEvent {
            seq: 3,
            kind: EventKind::Cleared,
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(&event).expect("serialize");
        assert_eq!(json["seq"], 3);
        assert_eq!(json["kind"]["type"], "cleared");
        let back: SessionEvent = serde_json::from_value(json).expect("deserialize");
        assert_eq!(back, event);
    }
}
