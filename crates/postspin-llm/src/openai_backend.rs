//! Backend for OpenAI-style `chat/completions` endpoints.
//!
//! Serves both the `openai` and `openrouter` providers; they differ only in endpoint,
//! key variable and a couple of attribution headers.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use postspin_config::Config;
use postspin_utils::error::LlmError;

use crate::http_client::HttpClient;
use crate::settings::HttpProviderSettings;
use crate::types::{HttpParams, LlmBackend, LlmInvocation, LlmResult, Message};

const OPENAI_URL: &str = "https://api.openai.com/v1/chat/completions";
const OPENROUTER_URL: &str = "https://openrouter.ai/api/v1/chat/completions";
const OPENAI_DEFAULT_MODEL: &str = "gpt-4o-mini";
const APP_TITLE: &str = "postspin";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Flavor {
    OpenAi,
    OpenRouter,
}

impl Flavor {
    fn provider_name(self) -> &'static str {
        match self {
            Flavor::OpenAi => "openai",
            Flavor::OpenRouter => "openrouter",
        }
    }

    fn default_url(self) -> &'static str {
        match self {
            Flavor::OpenAi => OPENAI_URL,
            Flavor::OpenRouter => OPENROUTER_URL,
        }
    }

    fn default_key_env(self) -> &'static str {
        match self {
            Flavor::OpenAi => "OPENAI_API_KEY",
            Flavor::OpenRouter => "OPENROUTER_API_KEY",
        }
    }
}

#[derive(Clone)]
pub(crate) struct OpenAiCompatibleBackend {
    flavor: Flavor,
    client: HttpClient,
    base_url: String,
    api_key: String,
    default_model: String,
    default_params: HttpParams,
    json_mode: bool,
}

impl OpenAiCompatibleBackend {
    pub fn new(
        flavor: Flavor,
        api_key: String,
        base_url: Option<String>,
        default_model: String,
        default_params: HttpParams,
    ) -> Result<Self, LlmError> {
        Ok(Self {
            flavor,
            client: HttpClient::new()?,
            base_url: base_url.unwrap_or_else(|| flavor.default_url().to_string()),
            api_key,
            default_model,
            default_params,
            json_mode: false,
        })
    }

    /// # Errors
    ///
    /// Returns `LlmError::Misconfiguration` if the API key variable is unset, no model
    /// is configured (OpenRouter has no default), or the HTTP client cannot be built.
    pub fn new_from_config(flavor: Flavor, config: &Config) -> Result<Self, LlmError> {
        let fallback_model = match flavor {
            Flavor::OpenAi => Some(OPENAI_DEFAULT_MODEL),
            Flavor::OpenRouter => None,
        };
        let settings = HttpProviderSettings::from_config(
            config,
            flavor.provider_name(),
            flavor.default_key_env(),
            fallback_model,
        )?;
        let mut backend = Self::new(
            flavor,
            settings.api_key,
            settings.base_url,
            settings.default_model,
            settings.params,
        )?;
        backend.json_mode = settings.json_mode;
        Ok(backend)
    }

    fn build_body(&self, inv: &LlmInvocation) -> ChatRequest {
        let (model, params) = self.default_params.resolve(&self.default_model, inv);
        let json_mode = inv
            .metadata
            .get("json_mode")
            .and_then(serde_json::Value::as_bool)
            .unwrap_or(self.json_mode);
        ChatRequest {
            model,
            messages: convert_messages(&inv.messages),
            max_tokens: params.max_tokens,
            temperature: params.temperature,
            stream: false,
            response_format: json_mode.then(|| ResponseFormat {
                kind: "json_object",
            }),
        }
    }
}

fn convert_messages(messages: &[Message]) -> Vec<ChatMessage> {
    messages
        .iter()
        .map(|msg| ChatMessage {
            role: msg.role.as_str(),
            content: msg.content.clone(),
        })
        .collect()
}

#[async_trait]
impl LlmBackend for OpenAiCompatibleBackend {
    async fn invoke(&self, inv: LlmInvocation) -> Result<LlmResult, LlmError> {
        let provider = self.flavor.provider_name();
        let body = self.build_body(&inv);
        let model = body.model.clone();

        debug!(
            provider,
            stage = %inv.stage,
            model = %model,
            max_tokens = body.max_tokens,
            temperature = body.temperature,
            json_mode = body.response_format.is_some(),
            timeout_secs = inv.timeout.as_secs(),
            "Invoking chat completions backend"
        );

        let mut request = self
            .client
            .post(&self.base_url)
            .bearer_auth(&self.api_key)
            .header("Content-Type", "application/json");
        if self.flavor == Flavor::OpenRouter {
            request = request.header("X-Title", APP_TITLE);
        }
        let request = request.json(&body);

        let response = self
            .client
            .execute_with_retry(request, inv.timeout, provider)
            .await?;

        let response_body: ChatResponse = response.json().await.map_err(|e| {
            LlmError::Transport(format!("Failed to parse {provider} response: {e}"))
        })?;

        let content = response_body
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|c| !c.is_empty())
            .ok_or_else(|| {
                LlmError::Transport(format!("{provider} response missing choices[0] content"))
            })?;

        let mut result = LlmResult::new(content, provider, model);
        if let Some(usage) = response_body.usage {
            result = result.with_tokens(usage.prompt_tokens, usage.completion_tokens);
        }

        debug!(
            provider,
            tokens_input = ?result.tokens_input,
            tokens_output = ?result.tokens_output,
            "Chat completions invocation completed"
        );
        Ok(result)
    }
}

#[derive(Debug, Clone, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Clone, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Clone, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Clone, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Clone, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct Usage {
    prompt_tokens: u64,
    completion_tokens: u64,
}
