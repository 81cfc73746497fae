use async_trait::async_trait;

use crate::error::BenchError;

use super::message::ChatMessage;
use super::usage::Usage;

/// A chat completion returned by a provider.
pub trait ChatResponse: std::fmt::Debug + Send + Sync {
    /// The answer text, trimmed of surrounding whitespace. `None` when the
    /// response carried no message content.
    fn text(&self) -> Option<String>;

    /// Token usage reported by the server, if any.
    fn usage(&self) -> Option<Usage> {
        None
    }
}

/// Trait for backends that answer chat-style requests.
#[async_trait]
pub trait ChatProvider: Sync + Send {
    /// Sends a chat request and returns the provider's response.
    async fn chat(&self, messages: &[ChatMessage]) -> Result<Box<dyn ChatResponse>, BenchError>;
}
