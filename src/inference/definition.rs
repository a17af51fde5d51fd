//! Streams an encyclopedia-style definition for a topic.
//!
//! Failures are reported in-band first: the stream yields a single
//! `"Error: ..."` fragment before the function returns the error, so a
//! consumer that only looks at fragments still sees what went wrong.

use log::{error, info};
use tokio::sync::mpsc::Sender;

use crate::inference::prompts::definition_prompt;
use crate::inference::{
    GenerationSettings, GenerativeBackend, ProviderError, StreamChunk, TextRequest, Thinking,
};

/// Fragments starting with this are failure reports, not content.
pub const ERROR_PREFIX: &str = "Error:";

pub const MISSING_KEY_MESSAGE: &str =
    "Error: API_KEY is not configured. Please check your environment variables to continue.";

pub async fn stream_definition(
    backend: &dyn GenerativeBackend,
    settings: &GenerationSettings,
    topic: &str,
    sender: Sender<StreamChunk>,
) -> Result<(), ProviderError> {
    if !backend.is_configured() {
        error!("{} backend has no API key configured", backend.name());
        // A closed receiver means nobody is listening any more; nothing to report to.
        let _ = sender
            .send(StreamChunk::Content(MISSING_KEY_MESSAGE.to_string()))
            .await;
        return Ok(());
    }

    let prompt = definition_prompt(topic);
    let request = TextRequest {
        prompt: &prompt,
        model: &settings.text_model,
        thinking: Thinking::Disabled,
        json_response: false,
    };

    info!("Streaming definition for {:?} from {}", topic, backend.name());
    match backend.stream_text(request, sender.clone()).await {
        Ok(()) => Ok(()),
        Err(ProviderError::ChannelClosed) => Err(ProviderError::ChannelClosed),
        Err(e) => {
            error!("Error streaming definition for {:?}: {}", topic, e);
            let _ = sender
                .send(StreamChunk::Content(format!(
                    "{ERROR_PREFIX} Could not generate content for \"{topic}\". {e}"
                )))
                .await;
            Err(e)
        }
    }
}
