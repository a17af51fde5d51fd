//! infiwiki library exports for testing

use clap::ValueEnum;

pub mod core;
pub mod inference;
pub mod tui;

#[cfg(test)]
pub mod test_support;

#[derive(Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum Provider {
    #[default]
    Gemini,
    #[value(name = "openrouter")]
    OpenRouter,
}

impl Provider {
    /// Config-file / env spelling of the provider.
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Gemini => "gemini",
            Provider::OpenRouter => "openrouter",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "gemini" => Some(Provider::Gemini),
            "openrouter" => Some(Provider::OpenRouter),
            _ => None,
        }
    }
}
