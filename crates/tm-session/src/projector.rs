use tm_core::TmError;

use crate::event::SessionEvent;
use crate::state::SessionState;
use crate::validator::validate_transition;

/// Replay `events` (sorted by `seq`) on top of `initial` and return the
/// resulting state.
///
/// Returns `Err` if any event in the sequence would cause an illegal
/// state transition.
pub fn project_state(
    initial: SessionState,
    events: &[SessionEvent],
) -> Result<SessionState, TmError> {
    let mut sorted: Vec<&SessionEvent> = events.iter().collect();
    sorted.sort_by_key(|e| e.seq);
    sorted
        .into_iter()
        .try_fold(initial, |state, event| validate_transition(state, event.kind.event_type()))
}
