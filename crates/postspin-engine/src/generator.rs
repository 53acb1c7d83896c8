//! Structured generation: instruction + target shape in, validated value out.
//!
//! This is the only place the engine touches an [`LlmBackend`]. Each call is bounded by
//! the stage timeout, and the reply is parsed and validated against the stage's output
//! type before it reaches the orchestrator.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use postspin_config::Config;
use postspin_llm::{LlmBackend, LlmInvocation, Message};
use postspin_schema::{StageOutput, parse_stage_output};
use postspin_utils::error::SpinError;
use postspin_utils::logging::{log_stage_complete, log_stage_error, log_stage_start, stage_span};
use postspin_utils::types::StageId;
use serde_json::json;
use tracing::{Instrument, debug};

use crate::stage::Stage;

/// Model, timeout and temperature used for one stage.
#[derive(Debug, Clone, PartialEq)]
pub struct StageSettings {
    /// Empty lets the backend use its configured default.
    pub model: String,
    pub timeout: Duration,
    pub temperature: Option<f32>,
}

impl Default for StageSettings {
    fn default() -> Self {
        Self {
            model: String::new(),
            timeout: Duration::from_secs(postspin_config::config::DEFAULT_STAGE_TIMEOUT_SECS),
            temperature: None,
        }
    }
}

/// Per-stage call settings resolved from configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeneratorSettings {
    stages: HashMap<StageId, StageSettings>,
}

impl GeneratorSettings {
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        let stages = StageId::ALL
            .into_iter()
            .map(|stage| {
                let settings = StageSettings {
                    model: config.model_for_stage(stage).unwrap_or_default(),
                    timeout: config.timeout_for_stage(stage),
                    temperature: config.temperature_for_stage(stage),
                };
                (stage, settings)
            })
            .collect();
        Self { stages }
    }

    /// Same timeout for every stage; used by tests and callers without a config file.
    #[must_use]
    pub fn with_timeout(timeout: Duration) -> Self {
        let stages = StageId::ALL
            .into_iter()
            .map(|stage| {
                let settings = StageSettings {
                    timeout,
                    ..StageSettings::default()
                };
                (stage, settings)
            })
            .collect();
        Self { stages }
    }

    #[must_use]
    pub fn for_stage(&self, stage: StageId) -> StageSettings {
        self.stages.get(&stage).cloned().unwrap_or_default()
    }
}

/// Wraps a backend and turns stage instructions into validated stage outputs.
#[derive(Clone)]
pub struct StructuredGenerator {
    backend: Arc<dyn LlmBackend>,
    settings: GeneratorSettings,
}

impl StructuredGenerator {
    #[must_use]
    pub fn new(backend: Arc<dyn LlmBackend>, settings: GeneratorSettings) -> Self {
        Self { backend, settings }
    }

    #[must_use]
    pub fn settings(&self) -> &GeneratorSettings {
        &self.settings
    }

    /// Run a stage through the backend.
    ///
    /// # Errors
    ///
    /// See [`StructuredGenerator::generate`].
    pub async fn run<S: Stage>(&self, run_id: &str, stage: &S) -> Result<S::Output, SpinError> {
        self.generate::<S::Output>(run_id, stage.id(), stage.system_prompt(), &stage.instruction())
            .await
    }

    /// Ask the backend for a value of shape `T` and validate it.
    ///
    /// # Errors
    ///
    /// - [`SpinError::StageTimeout`] when the stage timeout elapses first.
    /// - [`SpinError::Service`] when the backend fails.
    /// - [`SpinError::SchemaValidation`] when the reply has no JSON object, does not
    ///   deserialize into `T`, or breaks one of `T`'s rules.
    pub async fn generate<T: StageOutput>(
        &self,
        run_id: &str,
        stage: StageId,
        system: &str,
        instruction: &str,
    ) -> Result<T, SpinError> {
        let settings = self.settings.for_stage(stage);
        let invocation = build_invocation(run_id, stage, &settings, system, instruction, T::SHAPE);

        let span = stage_span(run_id, stage);
        async {
            log_stage_start(run_id, stage, display_model(&settings.model));
            let started = Instant::now();

            let result = self.call::<T>(stage, &settings, invocation).await;
            let elapsed = started.elapsed().as_millis();
            match &result {
                Ok(_) => log_stage_complete(run_id, stage, elapsed),
                Err(err) => log_stage_error(run_id, stage, err.kind(), &err.to_string(), elapsed),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn call<T: StageOutput>(
        &self,
        stage: StageId,
        settings: &StageSettings,
        invocation: LlmInvocation,
    ) -> Result<T, SpinError> {
        let reply = tokio::time::timeout(settings.timeout, self.backend.invoke(invocation))
            .await
            .map_err(|_| SpinError::StageTimeout {
                stage,
                duration: settings.timeout,
            })?
            .map_err(|source| SpinError::Service { stage, source })?;

        debug!(
            stage = %stage,
            provider = %reply.provider,
            model = %reply.model_used,
            tokens_input = ?reply.tokens_input,
            tokens_output = ?reply.tokens_output,
            "Stage reply received"
        );

        parse_stage_output::<T>(&reply.raw_response)
            .map_err(|issues| SpinError::SchemaValidation { stage, issues })
    }
}

fn display_model(model: &str) -> &str {
    if model.is_empty() { "(provider default)" } else { model }
}

fn build_invocation(
    run_id: &str,
    stage: StageId,
    settings: &StageSettings,
    system: &str,
    instruction: &str,
    shape: &str,
) -> LlmInvocation {
    let user = format!(
        "{}\n\nRespond with a single JSON object and nothing else, in this shape:\n{shape}",
        instruction.trim()
    );
    let messages = vec![Message::system(system.trim()), Message::user(user)];

    let mut invocation =
        LlmInvocation::new(run_id, stage, settings.model.clone(), settings.timeout, messages)
            .with_metadata("json_mode", json!(true));
    if let Some(temperature) = settings.temperature {
        invocation = invocation.with_metadata("temperature", json!(temperature));
    }
    invocation
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use postspin_llm::{LlmError, LlmResult, ReplayBackend, Role};
    use postspin_schema::Revision;
    use postspin_utils::error::SpinErrorKind;

    const REVISION: &str = r#"{
        "revised_content": "Shorter, plainer, mine.",
        "changes_made": ["cut the opener"],
        "final_authenticity_score": 88,
        "final_originality_score": 75,
        "ready_to_publish": true
    }"#;

    fn generator(backend: ReplayBackend) -> StructuredGenerator {
        StructuredGenerator::new(
            Arc::new(backend),
            GeneratorSettings::with_timeout(Duration::from_secs(5)),
        )
    }

    #[tokio::test]
    async fn valid_reply_is_parsed_and_validated() {
        let backend = ReplayBackend::from_script([(StageId::Humanizer, [REVISION])]);
        let revision: Revision = generator(backend.clone())
            .generate("run-1", StageId::Humanizer, "system", "rewrite this")
            .await
            .unwrap();
        assert!(revision.ready_to_publish);

        let calls = backend.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].run_id, "run-1");
        assert!(calls[0].prompt.starts_with("rewrite this"));
        assert!(calls[0].prompt.contains("\"ready_to_publish\""));
    }

    #[tokio::test]
    async fn fenced_reply_with_prose_is_accepted() {
        let raw = format!("Here you go:\n```json\n{REVISION}\n```\nHope it helps.");
        let backend = ReplayBackend::from_script([(StageId::Humanizer, [raw])]);
        let result: Result<Revision, _> = generator(backend)
            .generate("run-1", StageId::Humanizer, "system", "rewrite")
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn malformed_reply_is_a_schema_failure() {
        let backend = ReplayBackend::from_script([(StageId::Humanizer, ["I could not do it."])]);
        let err = generator(backend)
            .generate::<Revision>("run-1", StageId::Humanizer, "system", "rewrite")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), SpinErrorKind::SchemaValidation);
        assert_eq!(err.stage(), StageId::Humanizer);
    }

    #[tokio::test]
    async fn backend_error_is_a_service_failure() {
        let err = generator(ReplayBackend::new())
            .generate::<Revision>("run-1", StageId::Humanizer, "system", "rewrite")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SpinError::Service {
                stage: StageId::Humanizer,
                source: LlmError::Misconfiguration(_)
            }
        ));
    }

    struct Stalled;

    #[async_trait]
    impl LlmBackend for Stalled {
        async fn invoke(&self, _inv: LlmInvocation) -> Result<LlmResult, LlmError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(LlmResult::new("{}", "stalled", "none"))
        }
    }

    #[tokio::test]
    async fn stalled_backend_times_out() {
        let generator = StructuredGenerator::new(
            Arc::new(Stalled),
            GeneratorSettings::with_timeout(Duration::from_millis(50)),
        );
        let err = generator
            .generate::<Revision>("run-1", StageId::Writer, "system", "write")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SpinError::StageTimeout { stage: StageId::Writer, duration } if duration == Duration::from_millis(50)
        ));
        assert_eq!(err.kind(), SpinErrorKind::Timeout);
    }

    #[test]
    fn invocation_carries_system_prompt_shape_and_temperature() {
        let settings = StageSettings {
            model: "gpt-4o".to_string(),
            timeout: Duration::from_secs(60),
            temperature: Some(0.7),
        };
        let inv = build_invocation("run-1", StageId::Writer, &settings, " be human ", "write", "{}");
        assert_eq!(inv.system_prompt(), Some("be human"));
        assert_eq!(inv.messages[1].role, Role::User);
        assert!(inv.messages[1].content.ends_with("in this shape:\n{}"));
        assert_eq!(inv.model, "gpt-4o");
        assert_eq!(inv.metadata.get("json_mode"), Some(&json!(true)));
        assert!(inv.metadata.contains_key("temperature"));
    }

    #[test]
    fn settings_follow_config_overrides() {
        let mut config = Config::default();
        config.defaults.model = Some("base".to_string());
        config.stages.writer = Some(postspin_config::StageConfig {
            model: Some("writer-model".to_string()),
            timeout: Some(300),
            temperature: Some(0.9),
        });
        let settings = GeneratorSettings::from_config(&config);
        assert_eq!(settings.for_stage(StageId::Writer).model, "writer-model");
        assert_eq!(
            settings.for_stage(StageId::Writer).timeout,
            Duration::from_secs(300)
        );
        assert_eq!(settings.for_stage(StageId::Analyzer).model, "base");
        assert_eq!(settings.for_stage(StageId::Analyzer).temperature, None);
    }
}
