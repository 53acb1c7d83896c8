//! The spin orchestrator: stage sequencing, the humanization loop and result packaging.
//!
//! A run moves through `Analyzing → Angling → Writing → Revising(n)* → Done | Failed`.
//! Each transition is appended to the run history as an immutable [`StateSnapshot`].
//! Any stage failure ends the run at the orchestrator boundary; the returned
//! [`SpinResult`] then has `success == false` and keeps the fields produced so far.

mod outcome;
mod state;

pub use outcome::SpinOutcome;
pub use state::{DraftState, SpinState, StateSnapshot, Termination};

use std::sync::Arc;
use std::time::Instant;

use postspin_config::{AdoptionPolicy, Config, SpinThresholds};
use postspin_gate::lexical::forbidden_terms;
use postspin_gate::{AI_CHECK, GateInput, GatePolicy, GateResult, PLAGIARISM_CHECK};
use postspin_llm::LlmBackend;
use postspin_schema::{Analysis, SpinRequest, SpinResult, Tone};
use postspin_utils::error::SpinError;
use postspin_utils::redaction::redact_error_message;
use tracing::{error, info, warn};

use crate::generator::{GeneratorSettings, StructuredGenerator};
use crate::stages::{AnalyzerStage, AngleStage, HumanizerStage, WriterStage};

/// Short identifier for one run: the first 12 hex characters of a BLAKE3 hash over
/// the post, author, company and the current time.
#[must_use]
pub fn run_id_for(request: &SpinRequest) -> String {
    let now = chrono::Utc::now();
    let nanos = now
        .timestamp_nanos_opt()
        .unwrap_or_else(|| now.timestamp_micros().saturating_mul(1000));

    let mut hasher = blake3::Hasher::new();
    hasher.update(request.original_post.content.as_bytes());
    hasher.update(b"\0");
    hasher.update(request.original_post.author_name.as_bytes());
    hasher.update(b"\0");
    hasher.update(request.company_profile.company_name.as_bytes());
    hasher.update(&nanos.to_le_bytes());
    let hex = hasher.finalize().to_hex();
    hex.as_str()[..12].to_string()
}

/// Runs spin requests against one generator with fixed thresholds.
#[derive(Clone)]
pub struct SpinOrchestrator {
    generator: StructuredGenerator,
    thresholds: SpinThresholds,
    default_tone: Tone,
}

impl SpinOrchestrator {
    /// The writer pass always counts as one iteration, so a budget below 1 is raised
    /// to 1.
    #[must_use]
    pub fn new(generator: StructuredGenerator, mut thresholds: SpinThresholds) -> Self {
        if thresholds.max_humanization_iterations == 0 {
            warn!("max_humanization_iterations of 0 raised to 1");
            thresholds.max_humanization_iterations = 1;
        }
        Self {
            generator,
            thresholds,
            default_tone: Tone::default(),
        }
    }

    /// Build from configuration: per-stage settings, thresholds and default tone.
    #[must_use]
    pub fn from_config(config: &Config, backend: Arc<dyn LlmBackend>) -> Self {
        let generator = StructuredGenerator::new(backend, GeneratorSettings::from_config(config));
        Self::new(generator, config.thresholds()).with_default_tone(config.default_tone())
    }

    /// Tone used when a request does not set one.
    #[must_use]
    pub fn with_default_tone(mut self, tone: Tone) -> Self {
        self.default_tone = tone;
        self
    }

    #[must_use]
    pub fn thresholds(&self) -> &SpinThresholds {
        &self.thresholds
    }

    /// Run and keep only the packaged result.
    pub async fn spin(&self, request: &SpinRequest) -> SpinResult {
        self.run(request).await.result
    }

    /// Run one request to completion. Never returns an error; failures are reported
    /// through `result.success` and the last history entry.
    pub async fn run(&self, request: &SpinRequest) -> SpinOutcome {
        let run_id = run_id_for(request);
        let t = &self.thresholds;
        info!(
            run_id = %run_id,
            author = %request.original_post.author_name,
            company = %request.company_profile.company_name,
            max_iterations = t.max_humanization_iterations,
            min_authenticity = t.min_authenticity_score,
            min_originality = t.min_originality_score,
            adoption = %t.adoption,
            "Starting spin run"
        );

        let mut run = RunState::new();
        match self.execute(&run_id, request, &mut run).await {
            Ok(completed) => {
                info!(
                    run_id = %run_id,
                    iterations = run.iterations,
                    termination = ?completed.termination,
                    passed_ai_check = completed.gates.passed(AI_CHECK),
                    passed_plagiarism_check = completed.gates.passed(PLAGIARISM_CHECK),
                    "Spin run complete"
                );
                run.finish(run_id, completed)
            }
            Err(err) => {
                let message = redact_error_message(&err.to_string());
                error!(
                    run_id = %run_id,
                    stage = %err.stage(),
                    kind = %err.kind(),
                    iterations = run.iterations,
                    error = %message,
                    "Spin run failed"
                );
                run.fail(run_id, message)
            }
        }
    }

    async fn execute(
        &self,
        run_id: &str,
        request: &SpinRequest,
        run: &mut RunState,
    ) -> Result<Completed, SpinError> {
        let post = &request.original_post;
        let profile = &request.company_profile;
        let options = &request.spin_options;

        run.enter(SpinState::Analyzing, None);
        let analysis = self.generator.run(run_id, &AnalyzerStage { post }).await?;
        info!(
            run_id = %run_id,
            hook = %analysis.hook_type,
            structure = %analysis.structure_type,
            theme = %analysis.universal_theme,
            adaptability = analysis.adaptability_score,
            "Analysis complete"
        );
        run.analysis = Some(analysis.clone());

        run.enter(SpinState::Angling, None);
        let angles = self
            .generator
            .run(
                run_id,
                &AngleStage {
                    analysis: &analysis,
                    profile,
                    preference: options.angle_preference(),
                },
            )
            .await?;
        run.angles_generated = angles.angles.len();
        let angle = angles
            .recommended()
            .cloned()
            .ok_or(SpinError::InvalidSelection {
                index: angles.recommended_angle_index,
                count: angles.angles.len(),
            })?;
        info!(
            run_id = %run_id,
            generated = angles.angles.len(),
            selected = %angle.angle_name,
            originality = angle.originality_score,
            relevance = angle.relevance_to_company,
            "Angle selected"
        );
        run.selected_angle = Some(angle.angle_name.clone());

        run.enter(SpinState::Writing, None);
        let draft = self
            .generator
            .run(
                run_id,
                &WriterStage {
                    analysis: &analysis,
                    angle: &angle,
                    profile,
                    options,
                    tone: options.tone_or(self.default_tone),
                },
            )
            .await?;
        run.iterations = 1;
        let mut current = DraftState::from_draft(&draft, run.iterations);
        info!(
            run_id = %run_id,
            authenticity = current.authenticity_score,
            originality = current.originality_score,
            ai_patterns = current.ai_patterns.len(),
            needs_revision = current.needs_revision,
            "Draft written"
        );
        run.best = Some(current.clone());

        let min_authenticity = self.thresholds.min_authenticity_score;
        let termination = loop {
            if !current.needs_humanization(min_authenticity) {
                break Termination::Accepted;
            }
            if run.iterations >= self.thresholds.max_humanization_iterations {
                break Termination::Exhausted;
            }

            let pass = run.iterations;
            run.enter(SpinState::Revising(pass), Some(&current));
            let revision = self
                .generator
                .run(
                    run_id,
                    &HumanizerStage {
                        draft: &current,
                        min_authenticity,
                    },
                )
                .await?;
            run.iterations += 1;
            info!(
                run_id = %run_id,
                pass,
                changes = revision.changes_made.len(),
                authenticity = revision.final_authenticity_score,
                ready_to_publish = revision.ready_to_publish,
                "Revision complete"
            );

            current = current.revised(revision, run.iterations);
            run.consider_best(&current);
            if current.ready_signal {
                break Termination::Accepted;
            }
        };

        let final_draft = match self.thresholds.adoption {
            AdoptionPolicy::Latest => current,
            AdoptionPolicy::Best => run.best.clone().unwrap_or(current),
        };
        info!(
            run_id = %run_id,
            termination = ?termination,
            adopted_iteration = final_draft.iteration,
            "Humanization loop finished"
        );

        let gates = self.evaluate_gates(run_id, post.author_name.as_str(), &analysis, &final_draft);
        run.enter(SpinState::Done(termination), Some(&final_draft));

        Ok(Completed {
            final_draft,
            termination,
            gates,
        })
    }

    fn evaluate_gates(
        &self,
        run_id: &str,
        author: &str,
        analysis: &Analysis,
        final_draft: &DraftState,
    ) -> GateResult {
        let forbidden = forbidden_terms(author, &analysis.company_specific_elements);
        let texts = [
            ("universal_theme", analysis.universal_theme.as_str()),
            ("final_post", final_draft.content.as_str()),
        ];
        let gates = GatePolicy::new(self.thresholds.min_originality_score).evaluate(&GateInput {
            ready_signal: final_draft.ready_signal,
            originality_score: final_draft.originality_score,
            texts: &texts,
            forbidden_terms: &forbidden,
        });
        for advisory in &gates.advisories {
            warn!(run_id = %run_id, finding = %advisory, "Possible source leak");
        }
        gates
    }
}

struct Completed {
    final_draft: DraftState,
    termination: Termination,
    gates: GateResult,
}

/// Everything a run has accumulated so far, kept outside `execute` so a failure can
/// still report it.
struct RunState {
    started: Instant,
    history: Vec<StateSnapshot>,
    analysis: Option<Analysis>,
    angles_generated: usize,
    selected_angle: Option<String>,
    iterations: u32,
    best: Option<DraftState>,
}

impl RunState {
    fn new() -> Self {
        Self {
            started: Instant::now(),
            history: Vec::new(),
            analysis: None,
            angles_generated: 0,
            selected_angle: None,
            iterations: 0,
            best: None,
        }
    }

    fn enter(&mut self, state: SpinState, draft: Option<&DraftState>) {
        let sequence = u32::try_from(self.history.len()).unwrap_or(u32::MAX);
        let elapsed_ms = u64::try_from(self.started.elapsed().as_millis()).unwrap_or(u64::MAX);
        self.history.push(StateSnapshot {
            sequence,
            state,
            elapsed_ms,
            draft: draft.cloned(),
        });
    }

    fn consider_best(&mut self, candidate: &DraftState) {
        let better = self
            .best
            .as_ref()
            .is_none_or(|best| candidate.at_least_as_good_as(best));
        if better {
            self.best = Some(candidate.clone());
        }
    }

    fn finish(self, run_id: String, completed: Completed) -> SpinOutcome {
        let result = SpinResult {
            success: true,
            analysis: self.analysis,
            angles_generated: self.angles_generated,
            selected_angle: self.selected_angle,
            final_post: Some(completed.final_draft.to_final_post()),
            passed_ai_check: completed.gates.passed(AI_CHECK),
            passed_plagiarism_check: completed.gates.passed(PLAGIARISM_CHECK),
            iterations_count: self.iterations,
            error: None,
        };
        SpinOutcome {
            run_id,
            result,
            history: self.history,
            gates: Some(completed.gates),
            best: self.best,
        }
    }

    fn fail(mut self, run_id: String, message: String) -> SpinOutcome {
        self.enter(SpinState::Failed(message.clone()), None);
        let result = SpinResult {
            analysis: self.analysis,
            angles_generated: self.angles_generated,
            selected_angle: self.selected_angle,
            iterations_count: self.iterations,
            ..SpinResult::failed(message)
        };
        SpinOutcome {
            run_id,
            result,
            history: self.history,
            gates: None,
            best: self.best,
        }
    }
}
