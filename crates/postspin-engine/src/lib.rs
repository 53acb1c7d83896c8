//! The spin pipeline.
//!
//! [`SpinOrchestrator`] sequences the four stages (analyzer, angle generator, writer,
//! humanizer) over a [`StructuredGenerator`], owns the bounded humanization loop and
//! packages the [`SpinResult`](postspin_schema::SpinResult). Every state transition is
//! recorded as an immutable [`StateSnapshot`].

pub mod batch;
pub mod generator;
pub mod orchestrator;
pub mod stage;
pub mod stages;

pub use batch::{BatchRunner, DEFAULT_CONCURRENCY};
pub use generator::{GeneratorSettings, StructuredGenerator};
pub use orchestrator::{
    DraftState, SpinOrchestrator, SpinOutcome, SpinState, StateSnapshot, Termination, run_id_for,
};
pub use stage::Stage;
