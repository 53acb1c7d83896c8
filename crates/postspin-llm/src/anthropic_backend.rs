//! Anthropic Messages API backend.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use postspin_config::Config;
use postspin_utils::error::LlmError;

use crate::http_client::HttpClient;
use crate::settings::HttpProviderSettings;
use crate::types::{HttpParams, LlmBackend, LlmInvocation, LlmResult, Message, Role};

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Clone)]
pub(crate) struct AnthropicBackend {
    client: HttpClient,
    base_url: String,
    api_key: String,
    default_model: String,
    default_params: HttpParams,
}

impl AnthropicBackend {
    pub fn new(
        api_key: String,
        base_url: Option<String>,
        default_model: String,
        default_params: HttpParams,
    ) -> Result<Self, LlmError> {
        Ok(Self {
            client: HttpClient::new()?,
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            api_key,
            default_model,
            default_params,
        })
    }

    /// # Errors
    ///
    /// Returns `LlmError::Misconfiguration` if the key variable is unset or no model is
    /// configured in `[llm.anthropic]` or `[defaults]`.
    pub fn new_from_config(config: &Config) -> Result<Self, LlmError> {
        let settings =
            HttpProviderSettings::from_config(config, "anthropic", "ANTHROPIC_API_KEY", None)?;
        Self::new(
            settings.api_key,
            settings.base_url,
            settings.default_model,
            settings.params,
        )
    }

    /// Split out system messages, which Anthropic takes as a top-level field.
    fn convert_messages(messages: &[Message]) -> (Option<String>, Vec<AnthropicMessage>) {
        let mut system_prompt: Option<String> = None;
        let mut conversation = Vec::new();

        for msg in messages {
            match msg.role {
                Role::System => match system_prompt.as_mut() {
                    Some(existing) => {
                        existing.push_str("\n\n");
                        existing.push_str(&msg.content);
                    }
                    None => system_prompt = Some(msg.content.clone()),
                },
                Role::User | Role::Assistant => conversation.push(AnthropicMessage {
                    role: msg.role.as_str(),
                    content: msg.content.clone(),
                }),
            }
        }

        (system_prompt, conversation)
    }
}

#[async_trait]
impl LlmBackend for AnthropicBackend {
    async fn invoke(&self, inv: LlmInvocation) -> Result<LlmResult, LlmError> {
        let (model, params) = self.default_params.resolve(&self.default_model, &inv);

        debug!(
            provider = "anthropic",
            stage = %inv.stage,
            model = %model,
            max_tokens = params.max_tokens,
            temperature = params.temperature,
            timeout_secs = inv.timeout.as_secs(),
            "Invoking Anthropic backend"
        );

        let (system, messages) = Self::convert_messages(&inv.messages);
        let request_body = AnthropicRequest {
            model: model.clone(),
            messages,
            max_tokens: params.max_tokens,
            temperature: params.temperature,
            system,
        };

        let request = self
            .client
            .post(&self.base_url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&request_body);

        let response = self
            .client
            .execute_with_retry(request, inv.timeout, "anthropic")
            .await?;

        let response_body: AnthropicResponse = response.json().await.map_err(|e| {
            LlmError::Transport(format!("Failed to parse Anthropic response: {e}"))
        })?;

        let content: String = response_body
            .content
            .iter()
            .filter(|block| block.content_type == "text")
            .filter_map(|block| block.text.as_deref())
            .collect();

        if content.is_empty() {
            return Err(LlmError::Transport(
                "Anthropic response missing text content".to_string(),
            ));
        }

        let mut result = LlmResult::new(content, "anthropic", model);
        if let Some(usage) = response_body.usage {
            result = result.with_tokens(usage.input_tokens, usage.output_tokens);
        }
        if let Some(reason) = response_body.stop_reason {
            result = result.with_extension("stop_reason", serde_json::Value::String(reason));
        }

        debug!(
            provider = "anthropic",
            tokens_input = ?result.tokens_input,
            tokens_output = ?result.tokens_output,
            "Anthropic invocation completed"
        );
        Ok(result)
    }
}

#[derive(Debug, Clone, Serialize)]
struct AnthropicMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Clone, Serialize)]
struct AnthropicRequest {
    model: String,
    messages: Vec<AnthropicMessage>,
    max_tokens: u32,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct AnthropicResponse {
    content: Vec<ContentBlock>,
    usage: Option<Usage>,
    stop_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    content_type: String,
    text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct Usage {
    input_tokens: u64,
    output_tokens: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn convert_messages_separates_system() {
        let messages = vec![
            Message::system("rules"),
            Message::system("more rules"),
            Message::user("analyze this"),
        ];
        let (system, conversation) = AnthropicBackend::convert_messages(&messages);
        assert_eq!(system.as_deref(), Some("rules\n\nmore rules"));
        assert_eq!(conversation.len(), 1);
        assert_eq!(conversation[0].role, "user");
    }

    #[test]
    fn request_omits_missing_system() {
        let body = AnthropicRequest {
            model: "m".into(),
            messages: vec![],
            max_tokens: 10,
            temperature: 0.1,
            system: None,
        };
        let value = serde_json::to_value(body).unwrap();
        assert!(value.get("system").is_none());
    }

    #[test]
    fn response_text_blocks_parse() {
        let parsed: AnthropicResponse = serde_json::from_value(json!({
            "content": [
                { "type": "text", "text": "{\"ok\":" },
                { "type": "tool_use", "id": "x" },
                { "type": "text", "text": "true}" }
            ],
            "usage": { "input_tokens": 40, "output_tokens": 9 },
            "stop_reason": "end_turn"
        }))
        .unwrap();
        let text: String = parsed
            .content
            .iter()
            .filter(|b| b.content_type == "text")
            .filter_map(|b| b.text.as_deref())
            .collect();
        assert_eq!(text, "{\"ok\":true}");
    }
}
