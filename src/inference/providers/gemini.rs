//! Gemini provider using the Generative Language REST API.
//!
//! - Streaming: `POST {base}/models/{model}:streamGenerateContent?alt=sse`,
//!   every SSE `data:` line carries a full `GenerateContentResponse` whose
//!   candidate parts hold the next text fragment.
//! - One-shot: `POST {base}/models/{model}:generateContent`.

use async_trait::async_trait;
use futures::StreamExt;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::Sender;

use crate::inference::sse::LineBuffer;
use crate::inference::{GenerativeBackend, ProviderError, StreamChunk, TextRequest, Thinking};

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

// ============================================================================
// Gemini API Types
// ============================================================================

#[derive(Serialize, Debug)]
struct Part {
    text: String,
}

#[derive(Serialize, Debug)]
struct Content {
    role: &'static str,
    parts: Vec<Part>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct ThinkingConfig {
    thinking_budget: u32,
}

#[derive(Serialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    thinking_config: Option<ThinkingConfig>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Deserialize, Debug, Default)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
    /// Reasoning summaries are flagged and never part of the answer.
    #[serde(default)]
    thought: bool,
}

#[derive(Deserialize, Debug, Default)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize, Debug)]
struct Candidate {
    #[serde(default)]
    content: Option<ResponseContent>,
}

#[derive(Deserialize, Debug)]
struct ApiErrorBody {
    #[serde(default)]
    code: u16,
    #[serde(default)]
    message: String,
}

#[derive(Deserialize, Debug)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    error: Option<ApiErrorBody>,
}

impl GenerateContentResponse {
    /// Concatenates the answer text of the first candidate.
    fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter(|p| !p.thought)
                    .filter_map(|p| p.text.as_deref())
                    .collect()
            })
            .unwrap_or_default()
    }
}

// ============================================================================
// Translation Layer
// ============================================================================

fn build_request(request: &TextRequest<'_>) -> GenerateContentRequest {
    GenerateContentRequest {
        contents: vec![Content {
            role: "user",
            parts: vec![Part {
                text: request.prompt.to_string(),
            }],
        }],
        generation_config: GenerationConfig {
            response_mime_type: request.json_response.then_some("application/json"),
            thinking_config: match request.thinking {
                Thinking::Disabled => Some(ThinkingConfig { thinking_budget: 0 }),
                Thinking::Enabled => None,
            },
        },
    }
}

// ============================================================================
// Provider Implementation
// ============================================================================

pub struct GeminiProvider {
    api_key: Option<String>,
    base_url: String,
    client: reqwest::Client,
}

impl GeminiProvider {
    /// Creates a new Gemini provider.
    ///
    /// # Arguments
    /// * `api_key` - Gemini API key; requests fail with `ProviderError::Config` without one
    /// * `base_url` - Optional custom base URL (defaults to the public v1beta endpoint)
    pub fn new(api_key: Option<String>, base_url: Option<String>) -> Self {
        Self {
            api_key,
            base_url: base_url.unwrap_or_else(|| DEFAULT_GEMINI_BASE_URL.to_string()),
            client: reqwest::Client::new(),
        }
    }

    async fn send_request(
        &self,
        model: &str,
        method: &str,
        body: &GenerateContentRequest,
    ) -> Result<reqwest::Response, ProviderError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| ProviderError::Config("API_KEY is not configured".to_string()))?;

        let url = format!("{}/models/{}:{}", self.base_url, model, method);
        let mut builder = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(body);
        if method == "streamGenerateContent" {
            builder = builder.query(&[("alt", "sse")]);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        debug!("Gemini response status: {}", response.status());

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let err_body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            warn!("Gemini API error: {} - {}", status, err_body);
            return Err(ProviderError::Api {
                status,
                message: err_body,
            });
        }

        Ok(response)
    }
}

#[async_trait]
impl GenerativeBackend for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    fn is_configured(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.is_empty())
    }

    async fn stream_text(
        &self,
        request: TextRequest<'_>,
        sender: Sender<StreamChunk>,
    ) -> Result<(), ProviderError> {
        info!(
            "Gemini stream request: model={}, prompt_len={}, thinking={:?}",
            request.model,
            request.prompt.len(),
            request.thinking
        );
        let body = build_request(&request);
        let response = self
            .send_request(request.model, "streamGenerateContent", &body)
            .await?;

        let mut stream = response.bytes_stream();
        let mut buffer = LineBuffer::new();
        let mut chunk_count = 0usize;
        let mut total_content_len = 0usize;

        while let Some(bytes) = stream.next().await {
            let bytes = bytes.map_err(|e| ProviderError::Network(e.to_string()))?;
            buffer.push(&bytes);

            // Process complete lines from buffer
            while let Some(line) = buffer.next_line() {
                let Some(data) = line.strip_prefix("data:") else {
                    continue;
                };
                let data = data.trim();
                if data.is_empty() {
                    continue;
                }

                let event: GenerateContentResponse = serde_json::from_str(data)
                    .map_err(|e| ProviderError::Parse(format!("bad stream event: {e}")))?;
                if let Some(err) = event.error {
                    warn!("Gemini stream error: {} - {}", err.code, err.message);
                    return Err(ProviderError::Api {
                        status: err.code,
                        message: err.message,
                    });
                }

                let text = event.text();
                if text.is_empty() {
                    continue;
                }
                chunk_count += 1;
                total_content_len += text.len();
                debug!(
                    "Sending Content chunk (len={}, total={})",
                    text.len(),
                    total_content_len
                );
                if sender.send(StreamChunk::Content(text)).await.is_err() {
                    warn!("Content chunk send failed: receiver dropped");
                    return Err(ProviderError::ChannelClosed);
                }
            }
        }

        info!(
            "Stream complete: {} chunks, {} content bytes",
            chunk_count, total_content_len
        );
        if sender.send(StreamChunk::Completed).await.is_err() {
            warn!("Completed send failed: receiver dropped");
            return Err(ProviderError::ChannelClosed);
        }
        Ok(())
    }

    async fn generate(&self, request: TextRequest<'_>) -> Result<String, ProviderError> {
        info!(
            "Gemini generate request: model={}, json={}, thinking={:?}",
            request.model, request.json_response, request.thinking
        );
        let body = build_request(&request);
        let response = self
            .send_request(request.model, "generateContent", &body)
            .await?;

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;
        if let Some(err) = parsed.error {
            return Err(ProviderError::Api {
                status: err.code,
                message: err.message,
            });
        }
        Ok(parsed.text())
    }
}
