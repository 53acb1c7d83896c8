//! What a run hands back besides the [`SpinResult`].

use postspin_gate::GateResult;
use postspin_schema::SpinResult;
use serde::{Deserialize, Serialize};

use super::state::{DraftState, SpinState, StateSnapshot, Termination};

/// The packaged result plus everything needed to audit how it was reached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpinOutcome {
    pub run_id: String,
    pub result: SpinResult,
    /// Every transition in order; the last entry is `done` or `failed`.
    pub history: Vec<StateSnapshot>,
    /// Gate evaluation of the final draft; absent when the run failed.
    pub gates: Option<GateResult>,
    /// Best-ranked draft seen, whichever adoption policy was used.
    pub best: Option<DraftState>,
}

impl SpinOutcome {
    /// How the humanization loop ended, if the run got that far.
    #[must_use]
    pub fn termination(&self) -> Option<Termination> {
        self.history.iter().rev().find_map(|s| match s.state {
            SpinState::Done(t) => Some(t),
            _ => None,
        })
    }

    #[must_use]
    pub fn revision_count(&self) -> usize {
        self.history
            .iter()
            .filter(|s| matches!(s.state, SpinState::Revising(_)))
            .count()
    }

    #[must_use]
    pub fn final_state(&self) -> Option<&SpinState> {
        self.history.last().map(|s| &s.state)
    }
}
