//! OpenRouter provider implementation using the Responses API.
//!
//! This module uses OpenAI Responses API terminology:
//! - "input" (array of messages, here always a single user prompt)
//! - SSE events: response.output_text.delta, response.completed

use async_trait::async_trait;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::Sender;

use crate::inference::sse::LineBuffer;
use crate::inference::{GenerativeBackend, ProviderError, StreamChunk, TextRequest, Thinking};

pub const DEFAULT_OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";

// ============================================================================
// OpenRouter Responses API Types
// ============================================================================

#[derive(Serialize, Debug, Clone)]
#[serde(tag = "type")]
enum InputItem {
    #[serde(rename = "message")]
    Message { role: &'static str, content: String },
}

/// Configuration for reasoning tokens
#[derive(Serialize, Debug)]
struct Reasoning {
    #[serde(skip_serializing_if = "Option::is_none")]
    effort: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    enabled: Option<bool>,
}

#[derive(Serialize, Debug)]
struct TextFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

#[derive(Serialize, Debug)]
struct TextOptions {
    format: TextFormat,
}

/// The request body for the Responses API
#[derive(Serialize, Debug)]
struct ResponsesRequest {
    model: String,
    input: Vec<InputItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stream: Option<bool>,
    reasoning: Reasoning,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<TextOptions>,
}

/// Generic SSE event wrapper to extract the type field
/// OpenRouter embeds the event type inside the JSON, not in SSE event: lines
#[derive(Deserialize, Debug)]
struct SseEvent {
    #[serde(rename = "type")]
    event_type: String,
    #[serde(default)]
    delta: String,
}

// ============================================================================
// Translation Layer
// ============================================================================

fn thinking_to_reasoning(thinking: Thinking) -> Reasoning {
    match thinking {
        Thinking::Enabled => Reasoning {
            effort: None,
            enabled: Some(true),
        },
        Thinking::Disabled => Reasoning {
            effort: Some("none"),
            enabled: None,
        },
    }
}

fn build_request(request: &TextRequest<'_>) -> ResponsesRequest {
    ResponsesRequest {
        model: request.model.to_string(),
        input: vec![InputItem::Message {
            role: "user",
            content: request.prompt.to_string(),
        }],
        stream: Some(true),
        reasoning: thinking_to_reasoning(request.thinking),
        text: request.json_response.then_some(TextOptions {
            format: TextFormat {
                format_type: "json_object",
            },
        }),
    }
}

// ============================================================================
// Provider Implementation
// ============================================================================

/// OpenRouter API provider using Responses API
pub struct OpenRouterProvider {
    api_key: Option<String>,
    base_url: String,
    client: reqwest::Client,
}

impl OpenRouterProvider {
    /// Creates a new OpenRouter provider.
    ///
    /// # Arguments
    /// * `api_key` - OpenRouter API key
    /// * `base_url` - Optional custom base URL (defaults to OpenRouter's API)
    pub fn new(api_key: Option<String>, base_url: Option<String>) -> Self {
        Self {
            api_key,
            base_url: base_url.unwrap_or_else(|| DEFAULT_OPENROUTER_BASE_URL.to_string()),
            client: reqwest::Client::new(),
        }
    }

    /// Sends a request to the Responses endpoint and returns the response.
    async fn send_request(
        &self,
        request: &ResponsesRequest,
    ) -> Result<reqwest::Response, ProviderError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| ProviderError::Config("OPENROUTER_API_KEY is not configured".to_string()))?;

        let json_body = serde_json::to_string(request)
            .map_err(|e| ProviderError::Parse(format!("Request serialization failed: {e}")))?;
        debug!("Raw OpenRouter Request: {}", json_body);

        let response = self
            .client
            .post(format!("{}/responses", self.base_url))
            .header("Authorization", format!("Bearer {}", api_key))
            .header("Content-Type", "application/json")
            .body(json_body)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        debug!("OpenRouter response status: {}", response.status());

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let err_body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            warn!("OpenRouter API error: {} - {}", status, err_body);
            return Err(ProviderError::Api {
                status,
                message: err_body,
            });
        }

        Ok(response)
    }
}

#[async_trait]
impl GenerativeBackend for OpenRouterProvider {
    fn name(&self) -> &str {
        "openrouter"
    }

    fn is_configured(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.is_empty())
    }

    async fn stream_text(
        &self,
        request: TextRequest<'_>,
        sender: Sender<StreamChunk>,
    ) -> Result<(), ProviderError> {
        let responses_request = build_request(&request);

        info!(
            "OpenRouter Responses API request: model={}, thinking={:?}, json={}",
            request.model, request.thinking, request.json_response
        );

        let mut response = self.send_request(&responses_request).await?;

        // Process the SSE stream with typed events
        let mut buffer = LineBuffer::new();
        let mut current_event_type: Option<String> = None;
        let mut total_content_len = 0usize;
        let mut chunk_count = 0usize;

        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?
        {
            buffer.push(&chunk);

            // Process complete lines from buffer
            while let Some(line) = buffer.next_line() {
                if let Some(event_type) = line.strip_prefix("event: ") {
                    current_event_type = Some(event_type.to_string());
                    continue;
                }

                let Some(data) = line.strip_prefix("data: ") else {
                    continue;
                };
                if data == "[DONE]" {
                    debug!("Received [DONE] marker");
                    continue;
                }

                let parsed = serde_json::from_str::<SseEvent>(data).ok();
                let event_type = current_event_type
                    .take()
                    .or_else(|| parsed.as_ref().map(|e| e.event_type.clone()));

                match event_type.as_deref() {
                    Some("response.output_text.delta") => {
                        if let Some(event) = parsed
                            && !event.delta.is_empty()
                        {
                            chunk_count += 1;
                            total_content_len += event.delta.len();
                            debug!(
                                "Sending Content chunk (len={}, total={})",
                                event.delta.len(),
                                total_content_len
                            );
                            if sender.send(StreamChunk::Content(event.delta)).await.is_err() {
                                warn!("Content chunk send failed: receiver dropped");
                                return Err(ProviderError::ChannelClosed);
                            }
                        }
                    }
                    Some("response.failed") | Some("error") => {
                        warn!("OpenRouter stream failure: {}", data);
                        return Err(ProviderError::Api {
                            status: 500,
                            message: data.to_string(),
                        });
                    }
                    Some("response.completed") => {
                        info!(
                            "Stream complete: {} chunks, {} content bytes",
                            chunk_count, total_content_len
                        );
                        if sender.send(StreamChunk::Completed).await.is_err() {
                            warn!("Completed send failed: receiver dropped");
                            return Err(ProviderError::ChannelClosed);
                        }
                        return Ok(());
                    }
                    Some(other) => {
                        // response.created, response.in_progress, reasoning deltas, ...
                        debug!("Ignoring event type '{}': {} bytes", other, data.len());
                    }
                    None => {
                        debug!("Could not parse event type from data: {}", data);
                    }
                }
            }
        }

        info!(
            "Stream ended: {} chunks processed, {} total content bytes",
            chunk_count, total_content_len
        );
        Ok(())
    }
}
