//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;
use tokio::sync::mpsc::Sender;

use crate::core::state::App;
use crate::inference::{
    GenerationSettings, GenerativeBackend, ProviderError, StreamChunk, TextRequest, Thinking,
};

pub fn test_settings() -> GenerationSettings {
    GenerationSettings {
        text_model: "text-model".to_string(),
        art_model: "art-model".to_string(),
        art_thinking: false,
        art_text: false,
        art_retries: 1,
    }
}

/// A backend that replays canned answers and records what it was asked.
#[derive(Default)]
pub struct ScriptedBackend {
    chunks: Vec<String>,
    stream_error: Mutex<Option<ProviderError>>,
    /// When set, the stream stops after `.0` chunks until `.1` is notified.
    pause: Option<(usize, Arc<Notify>)>,
    generate_script: Mutex<VecDeque<Result<String, ProviderError>>>,
    generate_gate: Option<Arc<Notify>>,
    unconfigured: bool,
    prompts: Mutex<Vec<String>>,
    last_flags: Mutex<Option<(bool, Thinking)>>,
    generate_calls: Mutex<usize>,
}

impl ScriptedBackend {
    pub fn streaming(chunks: &[&str]) -> Self {
        Self {
            chunks: chunks.iter().map(|c| c.to_string()).collect(),
            ..Default::default()
        }
    }

    pub fn stream_failure(error: ProviderError) -> Self {
        Self {
            stream_error: Mutex::new(Some(error)),
            ..Default::default()
        }
    }

    pub fn unconfigured(mut self) -> Self {
        self.unconfigured = true;
        self
    }

    pub fn paused_after(mut self, sent: usize, gate: Arc<Notify>) -> Self {
        self.pause = Some((sent, gate));
        self
    }

    pub fn with_generate(self, script: Vec<Result<String, ProviderError>>) -> Self {
        *self.generate_script.lock().unwrap() = script.into();
        self
    }

    /// `generate` waits for `gate` before answering.
    pub fn gated_generate(mut self, gate: Arc<Notify>) -> Self {
        self.generate_gate = Some(gate);
        self
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn generate_calls(&self) -> usize {
        *self.generate_calls.lock().unwrap()
    }

    /// `(json_response, thinking)` of the most recent request.
    pub fn last_request_flags(&self) -> Option<(bool, Thinking)> {
        *self.last_flags.lock().unwrap()
    }

    fn record(&self, request: &TextRequest<'_>) {
        self.prompts.lock().unwrap().push(request.prompt.to_string());
        *self.last_flags.lock().unwrap() = Some((request.json_response, request.thinking));
    }
}

#[async_trait]
impl GenerativeBackend for ScriptedBackend {
    fn name(&self) -> &str {
        "scripted"
    }

    fn is_configured(&self) -> bool {
        !self.unconfigured
    }

    async fn stream_text(
        &self,
        request: TextRequest<'_>,
        sender: Sender<StreamChunk>,
    ) -> Result<(), ProviderError> {
        self.record(&request);
        let scripted_error = self.stream_error.lock().unwrap().take();
        if let Some(error) = scripted_error {
            return Err(error);
        }
        for (i, chunk) in self.chunks.iter().enumerate() {
            if let Some((after, gate)) = &self.pause
                && i == *after
            {
                gate.notified().await;
            }
            sender
                .send(StreamChunk::Content(chunk.clone()))
                .await
                .map_err(|_| ProviderError::ChannelClosed)?;
        }
        sender
            .send(StreamChunk::Completed)
            .await
            .map_err(|_| ProviderError::ChannelClosed)
    }

    async fn generate(&self, request: TextRequest<'_>) -> Result<String, ProviderError> {
        self.record(&request);
        *self.generate_calls.lock().unwrap() += 1;
        if let Some(gate) = &self.generate_gate {
            gate.notified().await;
        }
        let next = self.generate_script.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Err(ProviderError::Network("script exhausted".to_string())))
    }
}

/// Creates a test App with a default history and a scripted backend.
pub fn test_app() -> App {
    App::new(
        crate::core::history::HistoryState::default(),
        Arc::new(ScriptedBackend::default()),
        test_settings(),
    )
}
