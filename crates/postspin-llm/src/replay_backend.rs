//! Offline provider that answers from a script of canned responses.
//!
//! A script is a JSON object keyed by stage name. Each value is a list of responses
//! served in order; strings are returned verbatim, any other JSON value is returned
//! serialized. Once a stage's list is drained its last response keeps being served.
//!
//! ```json
//! {
//!   "analyzer": [{ "hook_type": "question", "...": "..." }],
//!   "humanizer": ["{\"revised_content\": \"...\"}", { "revised_content": "..." }]
//! }
//! ```

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;

use postspin_utils::error::LlmError;
use postspin_utils::types::StageId;

use crate::types::{LlmBackend, LlmInvocation, LlmResult, Role};

/// One call observed by the replay backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub run_id: String,
    pub stage: StageId,
    pub model: String,
    /// Concatenated user messages of the call.
    pub prompt: String,
}

#[derive(Debug, Default)]
struct ReplayState {
    queues: HashMap<StageId, VecDeque<String>>,
    last_served: HashMap<StageId, String>,
    calls: Vec<RecordedCall>,
}

/// Scripted backend. Clones share the same script and call log.
#[derive(Debug, Clone, Default)]
pub struct ReplayBackend {
    state: Arc<Mutex<ReplayState>>,
}

impl ReplayBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `(stage, responses)` pairs.
    #[must_use]
    pub fn from_script<I, R>(script: I) -> Self
    where
        I: IntoIterator<Item = (StageId, R)>,
        R: IntoIterator,
        R::Item: Into<String>,
    {
        let backend = Self::new();
        for (stage, responses) in script {
            for response in responses {
                backend.push(stage, response);
            }
        }
        backend
    }

    /// Load a script file.
    ///
    /// # Errors
    ///
    /// Returns `LlmError::Misconfiguration` if the file cannot be read, is not a JSON
    /// object, names an unknown stage, or a stage's value is not an array.
    pub fn from_file(path: &Path) -> Result<Self, LlmError> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            LlmError::Misconfiguration(format!(
                "cannot read replay script {}: {e}",
                path.display()
            ))
        })?;
        Self::from_json(&text).map_err(|msg| {
            LlmError::Misconfiguration(format!("replay script {}: {msg}", path.display()))
        })
    }

    fn from_json(text: &str) -> Result<Self, String> {
        let value: serde_json::Value =
            serde_json::from_str(text).map_err(|e| format!("invalid JSON: {e}"))?;
        let object = value
            .as_object()
            .ok_or_else(|| "top level must be an object keyed by stage".to_string())?;

        let backend = Self::new();
        for (key, responses) in object {
            let stage = StageId::parse(key).ok_or_else(|| format!("unknown stage '{key}'"))?;
            let responses = responses
                .as_array()
                .ok_or_else(|| format!("'{key}' must be an array of responses"))?;
            for response in responses {
                let raw = match response {
                    serde_json::Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                backend.push(stage, raw);
            }
        }
        Ok(backend)
    }

    /// Append a response for `stage`.
    pub fn push(&self, stage: StageId, response: impl Into<String>) {
        self.lock()
            .queues
            .entry(stage)
            .or_default()
            .push_back(response.into());
    }

    /// Every call served so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.lock().calls.clone()
    }

    #[must_use]
    pub fn call_count(&self, stage: StageId) -> usize {
        self.lock().calls.iter().filter(|c| c.stage == stage).count()
    }

    fn lock(&self) -> MutexGuard<'_, ReplayState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl LlmBackend for ReplayBackend {
    async fn invoke(&self, inv: LlmInvocation) -> Result<LlmResult, LlmError> {
        let mut state = self.lock();

        let next = state.queues.get_mut(&inv.stage).and_then(VecDeque::pop_front);
        let response = match next {
            Some(response) => {
                state.last_served.insert(inv.stage, response.clone());
                response
            }
            None => state.last_served.get(&inv.stage).cloned().ok_or_else(|| {
                LlmError::Misconfiguration(format!(
                    "replay script has no responses for stage '{}'",
                    inv.stage
                ))
            })?,
        };

        let prompt = inv
            .messages
            .iter()
            .filter(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        state.calls.push(RecordedCall {
            run_id: inv.run_id.clone(),
            stage: inv.stage,
            model: inv.model.clone(),
            prompt,
        });

        debug!(stage = %inv.stage, bytes = response.len(), "Serving replayed response");
        let model = if inv.model.is_empty() {
            "replay".to_string()
        } else {
            inv.model
        };
        Ok(LlmResult::new(response, "replay", model))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Message;
    use std::time::Duration;

    fn call(stage: StageId) -> LlmInvocation {
        LlmInvocation::new(
            "run-7",
            stage,
            "",
            Duration::from_secs(1),
            vec![Message::system("s"), Message::user("prompt body")],
        )
    }

    #[tokio::test]
    async fn serves_in_order_then_repeats_last() {
        let backend = ReplayBackend::from_script([(
            StageId::Humanizer,
            vec!["first".to_string(), "second".to_string()],
        )]);

        let mut served = Vec::new();
        for _ in 0..3 {
            served.push(backend.invoke(call(StageId::Humanizer)).await.unwrap().raw_response);
        }
        assert_eq!(served, ["first", "second", "second"]);
        assert_eq!(backend.call_count(StageId::Humanizer), 3);
        assert_eq!(backend.calls()[0].prompt, "prompt body");
    }

    #[tokio::test]
    async fn unscripted_stage_is_misconfiguration() {
        let backend = ReplayBackend::new();
        let err = backend.invoke(call(StageId::Writer)).await.unwrap_err();
        assert!(matches!(err, LlmError::Misconfiguration(ref m) if m.contains("writer")));
    }

    #[tokio::test]
    async fn json_script_accepts_objects_and_strings() {
        let backend = ReplayBackend::from_json(
            r#"{"analyzer": [{"k": 1}], "angle-generator": ["raw text"]}"#,
        )
        .unwrap();
        let analyzer = backend.invoke(call(StageId::Analyzer)).await.unwrap();
        assert_eq!(analyzer.raw_response, r#"{"k":1}"#);
        let angles = backend.invoke(call(StageId::AngleGenerator)).await.unwrap();
        assert_eq!(angles.raw_response, "raw text");
    }

    #[test]
    fn bad_scripts_are_rejected() {
        assert!(ReplayBackend::from_json("[]").is_err());
        assert!(ReplayBackend::from_json(r#"{"editor": []}"#).is_err());
        assert!(ReplayBackend::from_json(r#"{"writer": "x"}"#).is_err());
    }

    #[test]
    fn missing_file_is_misconfiguration() {
        let err = ReplayBackend::from_file(Path::new("/nonexistent/replay.json")).unwrap_err();
        assert!(matches!(err, LlmError::Misconfiguration(_)));
    }
}
