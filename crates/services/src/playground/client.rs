use std::env;

use academy_core::model::ModelParameters;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::MessagesError;

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com/v1";
const DEFAULT_MODEL: &str = "claude-3-sonnet-20240229";
const DEFAULT_MODEL_MAX_TOKENS: u32 = 4096;
const DEFAULT_API_VERSION: &str = "2023-06-01";
const NON_TEXT_RESPONSE: &str = "Non-text response received";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlaygroundConfig {
    pub base_url: String,
    pub model: String,
    pub model_max_tokens: u32,
    pub api_version: String,
}

impl Default for PlaygroundConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            model: DEFAULT_MODEL.into(),
            model_max_tokens: DEFAULT_MODEL_MAX_TOKENS,
            api_version: DEFAULT_API_VERSION.into(),
        }
    }
}

impl PlaygroundConfig {
    /// Defaults, overridden by `ACADEMY_API_BASE_URL` and `ACADEMY_MODEL`
    /// when set and non-blank.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let base_url = non_blank_var("ACADEMY_API_BASE_URL").unwrap_or(defaults.base_url);
        let model = non_blank_var("ACADEMY_MODEL").unwrap_or(defaults.model);
        Self {
            base_url,
            model,
            ..defaults
        }
    }
}

fn non_blank_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

/// One user turn sent to the model.
#[derive(Clone, Debug, PartialEq)]
pub struct CompletionRequest {
    pub base_url: String,
    pub model: String,
    pub system: Option<String>,
    pub prompt: String,
    pub parameters: ModelParameters,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompletionResponse {
    pub text: String,
    pub input_tokens: u64,
    pub output_tokens: u64,
}

/// Transport to a messages-style model API.
#[async_trait]
pub trait MessagesClient: Send + Sync {
    /// Send one request with the caller's key.
    ///
    /// # Errors
    ///
    /// Returns `MessagesError` when the request fails, the API answers with a
    /// non-success status, or the body has no content.
    async fn complete(
        &self,
        api_key: &str,
        request: &CompletionRequest,
    ) -> Result<CompletionResponse, MessagesError>;
}

/// `MessagesClient` over the Anthropic HTTP API.
#[derive(Clone)]
pub struct AnthropicClient {
    client: Client,
    api_version: String,
}

impl AnthropicClient {
    #[must_use]
    pub fn new(api_version: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_version: api_version.into(),
        }
    }
}

impl Default for AnthropicClient {
    fn default() -> Self {
        Self::new(DEFAULT_API_VERSION)
    }
}

#[async_trait]
impl MessagesClient for AnthropicClient {
    async fn complete(
        &self,
        api_key: &str,
        request: &CompletionRequest,
    ) -> Result<CompletionResponse, MessagesError> {
        let url = format!("{}/messages", request.base_url.trim_end_matches('/'));
        let payload = MessagesRequest {
            model: &request.model,
            max_tokens: request.parameters.max_tokens,
            temperature: request.parameters.temperature,
            top_p: request.parameters.top_p,
            top_k: request.parameters.top_k,
            stop_sequences: &request.parameters.stop_sequences,
            system: request.system.as_deref().filter(|s| !s.is_empty()),
            messages: vec![Message {
                role: "user",
                content: &request.prompt,
            }],
        };

        let response = self
            .client
            .post(url)
            .header("x-api-key", api_key)
            .header("anthropic-version", &self.api_version)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ErrorResponse>()
                .await
                .map(|body| body.error.message)
                .unwrap_or_else(|_| status.to_string());
            return Err(MessagesError::HttpStatus { status, message });
        }

        let body: MessagesResponse = response.json().await?;
        let first = body
            .content
            .into_iter()
            .next()
            .ok_or(MessagesError::EmptyResponse)?;
        let text = match first {
            ContentBlock::Text { text } => text,
            ContentBlock::Other => NON_TEXT_RESPONSE.to_owned(),
        };

        Ok(CompletionResponse {
            text,
            input_tokens: body.usage.input_tokens,
            output_tokens: body.usage.output_tokens,
        })
    }
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_k: Option<u32>,
    #[serde(skip_serializing_if = "no_stop_sequences")]
    stop_sequences: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    messages: Vec<Message<'a>>,
}

fn no_stop_sequences(stops: &&[String]) -> bool {
    stops.is_empty()
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
    #[serde(default)]
    usage: Usage,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    Text {
        text: String,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Default, Deserialize)]
struct Usage {
    #[serde(default)]
    input_tokens: u64,
    #[serde(default)]
    output_tokens: u64,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}
