//! Caller-owned comparison session.
//!
//! A [`ComparisonSession`] holds one exclusively owned [`ComparisonResult`]
//! and serializes every mutation through `&mut self`. All state transitions
//! go through [`validate_transition`] and are recorded in the event log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use tm_compare::explain::{explain_chunks, ChangeExplanation};
use tm_compare::{
    semantic_similarity, CompareConfig, CompareEngine, ComparisonResult, SimilarityOracle,
};
use tm_core::{Result, Side, TmError};
use tm_merge::{MergeEngine, MergeOutcome, MergePreview, Selection};

use crate::event::{EventKind, EventType, SessionEvent};
use crate::projector::project_state;
use crate::state::SessionState;
use crate::validator::{validate_inputs, validate_transition};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonSession {
    pub id: Uuid,
    pub state: SessionState,
    pub left_text: String,
    pub right_text: String,
    pub result: Option<ComparisonResult>,
    /// Holistic similarity from the oracle, or its Jaccard fallback.
    pub semantic_similarity: Option<f64>,
    pub events: Vec<SessionEvent>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip)]
    engine: CompareEngine,
    #[serde(skip)]
    merger: MergeEngine,
}

impl ComparisonSession {
    pub fn new() -> Self {
        Self::with_config(CompareConfig::default())
    }

    pub fn with_config(config: CompareConfig) -> Self {
        let now = Utc::now();
        ComparisonSession {
            id: Uuid::new_v4(),
            state: SessionState::Empty,
            left_text: String::new(),
            right_text: String::new(),
            result: None,
            semantic_similarity: None,
            events: Vec::new(),
            created_at: now,
            updated_at: now,
            engine: CompareEngine::new(config),
            merger: MergeEngine::new(),
        }
    }

    pub fn config(&self) -> &CompareConfig {
        self.engine.config()
    }

    /// Compare `left` against `right`, replacing any previous result.
    ///
    /// Both texts must contain something other than whitespace. The oracle
    /// is optional; its failures fall back to word-set Jaccard.
    pub fn compare(
        &mut self,
        left: &str,
        right: &str,
        oracle: Option<&dyn SimilarityOracle>,
    ) -> Result<&ComparisonResult> {
        validate_inputs(left, right)?;
        let next = validate_transition(self.state, EventType::Compared)?;

        let result = self.engine.compare(left, right);
        let semantic = semantic_similarity(oracle, left, right);

        info!(
            session_id = %self.id,
            run_id = %result.run_id,
            additions = result.additions,
            removals = result.removals,
            similarity = result.similarity,
            semantic_similarity = semantic,
            "session compared"
        );

        let kind = EventKind::Compared {
            run_id: result.run_id,
            additions: result.additions,
            removals: result.removals,
            similarity: result.similarity,
        };
        self.left_text = left.to_string();
        self.right_text = right.to_string();
        self.semantic_similarity = Some(semantic);
        self.record(kind, next);
        let stored: &ComparisonResult = self.result.insert(result);
        Ok(stored)
    }

    /// Apply `selection` to the held result.
    ///
    /// A stale selection is not an error: it is logged and reported as
    /// `MergeOutcome::Skipped`.
    pub fn merge(&mut self, selection: &Selection) -> Result<MergeOutcome> {
        let next = validate_transition(self.state, EventType::Merged)?;
        let result = self.result.as_mut().ok_or_else(|| {
            TmError::InvalidTransition(format!("session {} holds no comparison", self.id))
        })?;

        let outcome = self.merger.merge(result, selection);
        debug!(session_id = %self.id, ?selection, ?outcome, "session merge");

        self.record(
            EventKind::Merged {
                selection: *selection,
                outcome: outcome.clone(),
            },
            next,
        );
        Ok(outcome)
    }

    /// Describe what `selection` would do without applying it.
    pub fn preview(&self, selection: &Selection) -> Result<MergePreview> {
        let result = self.require_result()?;
        self.merger.preview(result, selection).map_err(|reason| {
            TmError::InvalidInput(format!("selection {selection:?} cannot merge: {reason:?}"))
        })
    }

    /// Drop the texts and the result.
    pub fn clear(&mut self) -> Result<()> {
        let next = validate_transition(self.state, EventType::Cleared)?;
        self.left_text.clear();
        self.right_text.clear();
        self.result = None;
        self.semantic_similarity = None;
        self.record(EventKind::Cleared, next);
        info!(session_id = %self.id, "session cleared");
        Ok(())
    }

    pub fn result(&self) -> Option<&ComparisonResult> {
        self.result.as_ref()
    }

    /// Current merged text of `side`, if a comparison is held.
    pub fn merged_text(&self, side: Side) -> Option<String> {
        self.result.as_ref().map(|r| r.text(side))
    }

    /// Labels for every retained chunk; empty when nothing is compared.
    pub fn explanations(&self) -> Vec<ChangeExplanation> {
        self.result
            .as_ref()
            .map(|r| explain_chunks(&r.chunks, &self.config().tables))
            .unwrap_or_default()
    }

    /// Replay the event log from `Empty`. Always equals `state` for a
    /// session driven through its own methods.
    pub fn replayed_state(&self) -> Result<SessionState> {
        project_state(SessionState::Empty, &self.events)
    }

    fn require_result(&self) -> Result<&ComparisonResult> {
        self.result.as_ref().ok_or_else(|| {
            TmError::InvalidTransition(format!("session {} holds no comparison", self.id))
        })
    }

    fn record(&mut self, kind: EventKind, next: SessionState) {
        let now = Utc::now();
        self.events.push(SessionEvent {
            seq: self.events.len() as u64 + 1,
            kind,
            created_at: now,
        });
        self.state = next;
        self.updated_at = now;
    }
}

impl Default for ComparisonSession {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
