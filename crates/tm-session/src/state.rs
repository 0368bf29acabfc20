use serde::{Deserialize, Serialize};

use tm_core::TmError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionState {
    /// No comparison has been run, or the last one was cleared.
    #[default]
    Empty,
    /// A comparison result is held and accepts merges.
    Compared,
}

impl SessionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::Empty => "EMPTY",
            SessionState::Compared => "COMPARED",
        }
    }

    pub fn from_str(s: &str) -> Result<Self, TmError> {
        match s {
            "EMPTY" => Ok(SessionState::Empty),
            "COMPARED" => Ok(SessionState::Compared),
            other => Err(TmError::InvalidInput(format!("unknown session state: {other}"))),
        }
    }
}
