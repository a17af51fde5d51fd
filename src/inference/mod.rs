pub mod art;
pub mod definition;
pub mod prompts;
pub mod provider;
pub mod providers;
pub mod sse;
pub mod types;

pub use provider::{GenerativeBackend, ProviderError, TextRequest};
pub use providers::{GeminiProvider, OpenRouterProvider};
pub use types::{AsciiArtData, GenerationSettings, StreamChunk, Thinking};
