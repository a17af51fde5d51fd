use serde::{Deserialize, Serialize};

/// Text-art for a topic, as shown above the definition.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct AsciiArtData {
    pub art: String,
    /// Blocky rendering of the topic name. Only requested when
    /// `GenerationSettings::art_text` is on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// Whether the model may spend tokens reasoning before it answers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Thinking {
    /// Lowest latency: no reasoning budget.
    #[default]
    Disabled,
    /// Let the backend decide.
    Enabled,
}

impl Thinking {
    pub fn from_flag(enabled: bool) -> Self {
        if enabled {
            Thinking::Enabled
        } else {
            Thinking::Disabled
        }
    }
}

/// Represents a chunk of streamed content from the model.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamChunk {
    Content(String),
    /// The backend closed the stream normally.
    Completed,
}

/// Everything the fetchers need to know about how to talk to the backend.
/// Built once from the resolved config and handed to each fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationSettings {
    pub text_model: String,
    pub art_model: String,
    /// Allow reasoning for art generation (slower, usually better).
    pub art_thinking: bool,
    /// Ask for a blocky text rendering alongside the art.
    pub art_text: bool,
    /// Extra art attempts after the first one fails.
    pub art_retries: u8,
}

impl GenerationSettings {
    pub fn art_attempts(&self) -> u32 {
        u32::from(self.art_retries) + 1
    }
}
