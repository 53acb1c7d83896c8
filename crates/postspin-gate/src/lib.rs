//! Quality gates applied to the final draft of a spin run.
//!
//! Two gates decide the published flags: the AI check (the last stage declared the
//! text ready) and the plagiarism check (originality at or above the threshold). A
//! third, advisory condition looks for author- or company-specific names that
//! leaked into the output; it is reported but never fails the run.

pub mod lexical;
pub mod policy;
pub mod types;

pub use policy::{GateInput, GatePolicy, AI_CHECK, LEXICAL_LEAK_CHECK, PLAGIARISM_CHECK};
pub use types::{GateCondition, GateResult};
