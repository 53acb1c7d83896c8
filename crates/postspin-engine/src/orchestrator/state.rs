//! Explicit run states and the immutable snapshots recorded at each transition.

use postspin_schema::{Draft, FinalPost, Revision};
use postspin_utils::types::StageId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why the humanization loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    /// The last stage declared the text ready, or no revision was needed.
    Accepted,
    /// The iteration budget ran out before the text was declared ready.
    Exhausted,
}

/// Where a spin run is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "detail", rename_all = "snake_case")]
pub enum SpinState {
    Analyzing,
    Angling,
    Writing,
    /// Running humanization pass `n` (1-based).
    Revising(u32),
    Done(Termination),
    Failed(String),
}

impl SpinState {
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done(_) | Self::Failed(_))
    }
}

impl fmt::Display for SpinState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Analyzing => write!(f, "analyzing"),
            Self::Angling => write!(f, "angling"),
            Self::Writing => write!(f, "writing"),
            Self::Revising(n) => write!(f, "revising({n})"),
            Self::Done(Termination::Accepted) => write!(f, "done(accepted)"),
            Self::Done(Termination::Exhausted) => write!(f, "done(exhausted)"),
            Self::Failed(reason) => write!(f, "failed({reason})"),
        }
    }
}

/// The effective draft at one point of the run.
///
/// The writer produces the first one; each revision produces a new value and the
/// previous one is left untouched in the history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftState {
    pub content: String,
    pub hashtags: Vec<String>,
    pub authenticity_score: f64,
    pub originality_score: f64,
    pub predicted_engagement: f64,
    pub ai_patterns: Vec<String>,
    pub weaknesses: Vec<String>,
    pub needs_revision: bool,
    /// Readiness as declared by the stage that produced this text.
    pub ready_signal: bool,
    pub produced_by: StageId,
    /// Writer + humanizer calls made when this state was produced.
    pub iteration: u32,
}

impl DraftState {
    #[must_use]
    pub fn from_draft(draft: &Draft, iteration: u32) -> Self {
        Self {
            content: draft.draft_content.clone(),
            hashtags: draft.hashtags.clone(),
            authenticity_score: draft.authenticity_score,
            originality_score: draft.originality_score,
            predicted_engagement: draft.predicted_engagement,
            ai_patterns: draft.ai_patterns_detected.clone(),
            weaknesses: draft.weaknesses.clone(),
            needs_revision: draft.needs_revision,
            ready_signal: !draft.needs_revision,
            produced_by: StageId::Writer,
            iteration,
        }
    }

    /// The state after a revision. Hashtags and predicted engagement carry over from
    /// the writer; pattern and weakness lists are cleared.
    #[must_use]
    pub fn revised(&self, revision: Revision, iteration: u32) -> Self {
        Self {
            content: revision.revised_content,
            hashtags: self.hashtags.clone(),
            authenticity_score: revision.final_authenticity_score,
            originality_score: revision.final_originality_score,
            predicted_engagement: self.predicted_engagement,
            ai_patterns: Vec::new(),
            weaknesses: Vec::new(),
            needs_revision: !revision.ready_to_publish,
            ready_signal: revision.ready_to_publish,
            produced_by: StageId::Humanizer,
            iteration,
        }
    }

    /// Whether another humanization pass is wanted.
    #[must_use]
    pub fn needs_humanization(&self, min_authenticity: f64) -> bool {
        self.needs_revision || self.authenticity_score < min_authenticity
    }

    /// Higher authenticity wins, then higher originality; a full tie goes to `self`
    /// so the later of two equal drafts is kept.
    #[must_use]
    pub fn at_least_as_good_as(&self, other: &DraftState) -> bool {
        match self.authenticity_score.total_cmp(&other.authenticity_score) {
            std::cmp::Ordering::Greater => true,
            std::cmp::Ordering::Less => false,
            std::cmp::Ordering::Equal => {
                self.originality_score.total_cmp(&other.originality_score)
                    != std::cmp::Ordering::Less
            }
        }
    }

    #[must_use]
    pub fn to_final_post(&self) -> FinalPost {
        FinalPost {
            content: self.content.clone(),
            hashtags: self.hashtags.clone(),
            authenticity_score: self.authenticity_score,
            originality_score: self.originality_score,
            predicted_engagement: self.predicted_engagement,
        }
    }
}

/// One recorded transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateSnapshot {
    /// Position in the run's history, starting at 0.
    pub sequence: u32,
    #[serde(flatten)]
    pub state: SpinState,
    /// Milliseconds since the run started.
    pub elapsed_ms: u64,
    /// The effective draft when the transition happened, once one exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub draft: Option<DraftState>,
}
