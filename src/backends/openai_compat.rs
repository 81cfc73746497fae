//! Client for OpenAI-compatible chat completion servers.
//!
//! Targets any server exposing `/v1/chat/completions`, such as a local
//! `llama-server` instance hosting a vision model.

use std::sync::Arc;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::chat::{ChatMessage, ChatProvider, ChatResponse, ChatRole, ImageMime, MessageType, Usage};
use crate::error::BenchError;

/// Configuration for an OpenAI-compatible server client.
#[derive(Debug)]
pub struct OpenAiCompatConfig {
    /// Base URL of the server, e.g. `http://127.0.0.1:8080`.
    pub server_url: String,
    /// Model name/alias exposed by the server.
    pub model: String,
    /// Sampling temperature, always sent.
    pub temperature: f32,
    /// Maximum tokens to generate, always sent.
    pub max_tokens: u32,
    /// Request timeout in seconds. `None` means no timeout.
    pub timeout_seconds: Option<u64>,
}

/// Client for an OpenAI-compatible chat completions endpoint.
///
/// The client uses `Arc` internally for configuration, making cloning cheap.
#[derive(Debug, Clone)]
pub struct OpenAiCompat {
    /// Shared configuration wrapped in Arc for cheap cloning.
    pub config: Arc<OpenAiCompatConfig>,
    /// HTTP client for making requests.
    pub client: Client,
}

#[derive(Serialize, Debug)]
struct ChatCompletionRequest {
    model: String,
    temperature: f32,
    max_tokens: u32,
    messages: Vec<ChatCompletionMessage>,
}

#[derive(Serialize, Debug)]
struct ChatCompletionMessage {
    role: &'static str,
    content: MessageContent,
}

#[derive(Serialize, Debug)]
#[serde(untagged)]
enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Serialize, Debug)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart {
    ImageUrl { image_url: ImageUrlPart },
    Text { text: String },
}

#[derive(Serialize, Debug)]
struct ImageUrlPart {
    url: String,
}

#[derive(Deserialize, Debug)]
pub struct ChatCompletionResponse {
    choices: Vec<ChatCompletionChoice>,
    usage: Option<Usage>,
}

#[derive(Deserialize, Debug)]
struct ChatCompletionChoice {
    message: ChatCompletionMsg,
}

#[derive(Deserialize, Debug)]
struct ChatCompletionMsg {
    content: Option<String>,
}

impl ChatResponse for ChatCompletionResponse {
    fn text(&self) -> Option<String> {
        self.choices
            .first()
            .and_then(|c| c.message.content.as_deref())
            .map(|content| content.trim().to_string())
    }

    fn usage(&self) -> Option<Usage> {
        self.usage.clone()
    }
}

impl OpenAiCompat {
    /// Creates a new client for the given server.
    pub fn new(
        server_url: impl Into<String>,
        model: impl Into<String>,
        temperature: f32,
        max_tokens: u32,
        timeout_seconds: Option<u64>,
    ) -> Self {
        let mut builder = Client::builder();
        if let Some(sec) = timeout_seconds {
            builder = builder.timeout(std::time::Duration::from_secs(sec));
        }
        Self::with_client(
            builder.build().expect("Failed to build reqwest Client"),
            server_url,
            model,
            temperature,
            max_tokens,
            timeout_seconds,
        )
    }

    /// Creates a new client with a custom HTTP client.
    pub fn with_client(
        client: Client,
        server_url: impl Into<String>,
        model: impl Into<String>,
        temperature: f32,
        max_tokens: u32,
        timeout_seconds: Option<u64>,
    ) -> Self {
        Self {
            config: Arc::new(OpenAiCompatConfig {
                server_url: server_url.into(),
                model: model.into(),
                temperature,
                max_tokens,
                timeout_seconds,
            }),
            client,
        }
    }

    pub fn server_url(&self) -> &str {
        &self.config.server_url
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1/chat/completions",
            self.config.server_url.trim_end_matches('/')
        )
    }
}

fn map_message(message: &ChatMessage) -> ChatCompletionMessage {
    let role = match message.role {
        ChatRole::User => "user",
        ChatRole::Assistant => "assistant",
    };
    let content = match &message.message_type {
        MessageType::Text => MessageContent::Text(message.content.clone()),
        MessageType::ImageURL(url) => image_parts(url.clone(), &message.content),
        MessageType::Image((mime, bytes)) => {
            image_parts(image_data_url(mime, bytes), &message.content)
        }
    };
    ChatCompletionMessage { role, content }
}

/// An image part followed by the question text, the order the wire format expects.
fn image_parts(url: String, text: &str) -> MessageContent {
    MessageContent::Parts(vec![
        ContentPart::ImageUrl {
            image_url: ImageUrlPart { url },
        },
        ContentPart::Text {
            text: text.to_string(),
        },
    ])
}

fn image_data_url(mime: &ImageMime, bytes: &[u8]) -> String {
    let encoded = STANDARD.encode(bytes);
    format!("data:{};base64,{}", mime.mime_type(), encoded)
}

#[async_trait]
impl ChatProvider for OpenAiCompat {
    /// Sends one chat completion request to the server.
    ///
    /// A non-success HTTP status or an undecodable body is an error; there
    /// are no retries.
    async fn chat(&self, messages: &[ChatMessage]) -> Result<Box<dyn ChatResponse>, BenchError> {
        let body = ChatCompletionRequest {
            model: self.config.model.clone(),
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
            messages: messages.iter().map(map_message).collect(),
        };

        if log::log_enabled!(log::Level::Trace) {
            if let Ok(json) = serde_json::to_string(&body) {
                log::trace!("chat completion request payload: {}", json);
            }
        }

        let resp = self.client.post(self.endpoint()).json(&body).send().await?;

        log::debug!("chat completion HTTP status: {}", resp.status());

        let resp = resp.error_for_status()?;
        let raw = resp.text().await?;

        let json_resp: ChatCompletionResponse =
            serde_json::from_str(&raw).map_err(|e| BenchError::ResponseFormatError {
                message: format!("Failed to decode chat completion: {e}"),
                raw_response: raw.clone(),
            })?;

        Ok(Box::new(json_resp))
    }
}
