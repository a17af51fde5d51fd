use std::fmt;

use async_trait::async_trait;
use tokio::sync::mpsc::{self, Sender};

use super::types::{StreamChunk, Thinking};

/// Errors that can occur during provider operations.
#[derive(Debug)]
pub enum ProviderError {
    /// Provider misconfigured (missing API key, bad URL). Not retryable.
    Config(String),
    /// Network-level failure (timeout, DNS, connection refused). Retryable.
    Network(String),
    /// API returned an error response. Retryable if status >= 500 or 429.
    Api { status: u16, message: String },
    /// Failed to parse the provider's response. Not retryable.
    Parse(String),
    /// The mpsc channel was closed (consumer stopped listening). Not retryable.
    ChannelClosed,
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderError::Config(msg) => write!(f, "config error: {msg}"),
            ProviderError::Network(msg) => write!(f, "network error: {msg}"),
            ProviderError::Api { status, message } => {
                write!(f, "API error (HTTP {status}): {message}")
            }
            ProviderError::Parse(msg) => write!(f, "parse error: {msg}"),
            ProviderError::ChannelClosed => write!(f, "channel closed"),
        }
    }
}

impl std::error::Error for ProviderError {}

/// A single-prompt generation request.
#[derive(Debug, Clone, Copy)]
pub struct TextRequest<'a> {
    pub prompt: &'a str,
    pub model: &'a str,
    pub thinking: Thinking,
    /// Ask the backend to answer with a JSON document.
    pub json_response: bool,
}

#[async_trait]
pub trait GenerativeBackend: Send + Sync {
    /// Returns the name of the provider.
    fn name(&self) -> &str;

    /// False when a credential the backend needs is missing.
    fn is_configured(&self) -> bool {
        true
    }

    /// Streams the response to `request`, sending chunks to the provided channel
    /// in the order the backend produces them.
    async fn stream_text(
        &self,
        request: TextRequest<'_>,
        sender: Sender<StreamChunk>,
    ) -> Result<(), ProviderError>;

    /// Generates the whole response at once.
    ///
    /// The default collects `stream_text`; backends with a dedicated
    /// non-streaming endpoint override it.
    async fn generate(&self, request: TextRequest<'_>) -> Result<String, ProviderError> {
        let (tx, mut rx) = mpsc::channel(64);
        let collect = async move {
            let mut text = String::new();
            while let Some(chunk) = rx.recv().await {
                if let StreamChunk::Content(part) = chunk {
                    text.push_str(&part);
                }
            }
            text
        };
        let (result, text) = tokio::join!(self.stream_text(request, tx), collect);
        result?;
        Ok(text)
    }
}
