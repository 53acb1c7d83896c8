//! Data contracts for a spin run.
//!
//! Inputs ([`SpinRequest`]), the structured output of each model stage ([`Analysis`],
//! [`AngleSet`], [`Draft`], [`Revision`]) and the final [`SpinResult`]. Stage outputs
//! implement [`StageOutput`], which carries the JSON shape shown to the model and the
//! validation applied to what comes back.

pub mod analysis;
pub mod angle;
pub mod draft;
pub mod extract;
pub mod request;
pub mod result;
pub mod validation;

pub use analysis::{Analysis, CtaType, HookType, StructureType};
pub use angle::{Angle, AngleSet};
pub use draft::{Draft, Revision};
pub use extract::{extract_json_object, parse_stage_output};
pub use request::{CompanyProfile, SourcePost, SpinOptions, SpinRequest, TargetAudience, Tone};
pub use result::{FinalPost, SpinResult};
pub use validation::StageOutput;
