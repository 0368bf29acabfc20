use tm_core::TmError;

use crate::event::EventType;
use crate::state::SessionState;

/// Validate that `event` is a legal transition from `current` and return the
/// resulting `SessionState`.  Returns `Err(InvalidTransition)` when the
/// combination is not permitted.
pub fn validate_transition(
    current: SessionState,
    event: EventType,
) -> Result<SessionState, TmError> {
    let next = match (current, event) {
        // A new comparison replaces whatever came before.
        (_, EventType::Compared) => SessionState::Compared,
        (SessionState::Compared, EventType::Merged) => SessionState::Compared,
        (_, EventType::Cleared) => SessionState::Empty,

        (state, ev) => {
            return Err(TmError::InvalidTransition(format!(
                "event '{}' is not permitted in state '{}'",
                ev.as_str(),
                state.as_str()
            )));
        }
    };
    Ok(next)
}

/// Return the set of events that are legally applicable to `state`.
pub fn legal_transitions(state: SessionState) -> Vec<EventType> {
    match state {
        SessionState::Empty => vec![EventType::Compared, EventType::Cleared],
        SessionState::Compared => vec![EventType::Compared, EventType::Merged, EventType::Cleared],
    }
}

/// Reject missing comparison inputs before the engine runs.
pub fn validate_inputs(left: &str, right: &str) -> Result<(), TmError> {
    for (name, text) in [("left", left), ("right", right)] {
        if text.trim().is_empty() {
            return Err(TmError::InvalidInput(format!("{name} text is empty")));
        }
    }
    Ok(())
}
