mod gemini;
mod openrouter;

pub use gemini::{DEFAULT_GEMINI_BASE_URL, GeminiProvider};
pub use openrouter::{DEFAULT_OPENROUTER_BASE_URL, OpenRouterProvider};
