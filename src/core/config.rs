//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.infiwiki/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::Provider;
use crate::core::history::DEFAULT_TOPIC;
use crate::core::store::default_history_path;
use crate::inference::GenerationSettings;
use crate::inference::providers::{DEFAULT_GEMINI_BASE_URL, DEFAULT_OPENROUTER_BASE_URL};

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct InfiwikiConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub gemini: BackendConfig,
    #[serde(default)]
    pub openrouter: BackendConfig,
    #[serde(default)]
    pub art: ArtConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct GeneralConfig {
    pub default_provider: Option<String>,
    pub default_topic: Option<String>,
    pub history_file: Option<PathBuf>,
}

/// Credentials and models for one backend.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct BackendConfig {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub text_model: Option<String>,
    pub art_model: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ArtConfig {
    pub thinking: Option<bool>,
    pub include_text: Option<bool>,
    pub retries: Option<u8>,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_GEMINI_TEXT_MODEL: &str = "gemini-2.5-flash-lite";
pub const DEFAULT_GEMINI_ART_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_OPENROUTER_TEXT_MODEL: &str = "google/gemini-2.5-flash-lite";
pub const DEFAULT_OPENROUTER_ART_MODEL: &str = "google/gemini-2.5-flash";
pub const DEFAULT_ART_RETRIES: u8 = 1;

// ============================================================================
// Resolved Config (concrete values)
// ============================================================================

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub provider: Provider,
    pub default_topic: String,
    pub history_path: PathBuf,
    /// `None` leaves the backend unconfigured; fetches then report the
    /// missing key instead of calling out.
    pub api_key: Option<String>,
    pub base_url: String,
    pub generation: GenerationSettings,
}

/// Values taken from the command line. `None` means the flag was not given.
#[derive(Debug, Default)]
pub struct CliOverrides<'a> {
    pub provider: Option<&'a str>,
    pub history_file: Option<PathBuf>,
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Loading
// ============================================================================

/// Returns the path to `~/.infiwiki/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".infiwiki").join("config.toml"))
}

/// Load config from `~/.infiwiki/config.toml`.
///
/// If the file doesn't exist, generates a commented-out default and
/// returns `InfiwikiConfig::default()`. If it exists but is malformed,
/// returns `ConfigError::Parse`.
pub fn load_config() -> Result<InfiwikiConfig, ConfigError> {
    let path = match config_path() {
        Some(p) => p,
        None => {
            warn!("Could not determine home directory, using default config");
            return Ok(InfiwikiConfig::default());
        }
    };

    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(&path);
        return Ok(InfiwikiConfig::default());
    }

    load_config_from(&path)
}

fn load_config_from(path: &Path) -> Result<InfiwikiConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: InfiwikiConfig = toml::from_str(&contents).map_err(ConfigError::Parse)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", config);
    Ok(config)
}

fn generate_default_config(path: &Path) {
    let default_content = r#"# infiwiki configuration
# All settings are optional. Defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [general]
# default_provider = "gemini"        # "gemini" or "openrouter"
# default_topic = "Hypertext"        # First topic when there is no history
# history_file = "/path/to/history.json"

# [gemini]
# api_key = "..."                    # Or set GEMINI_API_KEY (or API_KEY)
# base_url = "https://generativelanguage.googleapis.com/v1beta"
# text_model = "gemini-2.5-flash-lite"
# art_model = "gemini-2.5-flash"

# [openrouter]
# api_key = "sk-or-..."              # Or set OPENROUTER_API_KEY
# base_url = "https://openrouter.ai/api/v1"
# text_model = "google/gemini-2.5-flash-lite"
# art_model = "google/gemini-2.5-flash"

# [art]
# thinking = false                   # Let the model reason before drawing
# include_text = false               # Ask for a block-letter title as well
# retries = 1                        # Extra attempts after a bad answer
"#;

    if let Some(parent) = path.parent()
        && let Err(e) = fs::create_dir_all(parent)
    {
        warn!("Failed to create config directory: {}", e);
        return;
    }
    if let Err(e) = fs::write(path, default_content) {
        warn!("Failed to write default config: {}", e);
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
pub fn resolve(config: &InfiwikiConfig, cli: &CliOverrides<'_>) -> ResolvedConfig {
    resolve_with(config, cli, |key| std::env::var(key).ok())
}

/// Same as [`resolve`], reading environment variables through `env`.
pub fn resolve_with(
    config: &InfiwikiConfig,
    cli: &CliOverrides<'_>,
    env: impl Fn(&str) -> Option<String>,
) -> ResolvedConfig {
    // Provider: CLI → env → config → default
    let provider_name = cli
        .provider
        .map(str::to_string)
        .or_else(|| env("INFIWIKI_PROVIDER"))
        .or_else(|| config.general.default_provider.clone());
    let provider = match provider_name {
        Some(name) => Provider::from_name(&name).unwrap_or_else(|| {
            warn!("Unknown provider {:?}, falling back to gemini", name);
            Provider::default()
        }),
        None => Provider::default(),
    };

    let (section, key_vars, base_url_var, default_base_url, default_text, default_art) =
        match provider {
            Provider::Gemini => (
                &config.gemini,
                &["GEMINI_API_KEY", "API_KEY"][..],
                "GEMINI_BASE_URL",
                DEFAULT_GEMINI_BASE_URL,
                DEFAULT_GEMINI_TEXT_MODEL,
                DEFAULT_GEMINI_ART_MODEL,
            ),
            Provider::OpenRouter => (
                &config.openrouter,
                &["OPENROUTER_API_KEY"][..],
                "OPENROUTER_BASE_URL",
                DEFAULT_OPENROUTER_BASE_URL,
                DEFAULT_OPENROUTER_TEXT_MODEL,
                DEFAULT_OPENROUTER_ART_MODEL,
            ),
        };

    // API key: env → config. Blank values count as missing.
    let api_key = key_vars
        .iter()
        .find_map(|var| env(var).filter(|key| !key.trim().is_empty()))
        .or_else(|| section.api_key.clone().filter(|key| !key.trim().is_empty()));

    // Base URL: env → config → default
    let base_url = env(base_url_var)
        .or_else(|| section.base_url.clone())
        .unwrap_or_else(|| default_base_url.to_string());

    // Models: env → config → default
    let text_model = env("INFIWIKI_TEXT_MODEL")
        .or_else(|| section.text_model.clone())
        .unwrap_or_else(|| default_text.to_string());
    let art_model = env("INFIWIKI_ART_MODEL")
        .or_else(|| section.art_model.clone())
        .unwrap_or_else(|| default_art.to_string());

    // History file: CLI → config → ~/.infiwiki/history.json → ./history.json
    let history_path = cli
        .history_file
        .clone()
        .or_else(|| config.general.history_file.clone())
        .or_else(default_history_path)
        .unwrap_or_else(|| PathBuf::from("history.json"));

    let default_topic = config
        .general
        .default_topic
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or(DEFAULT_TOPIC)
        .to_string();

    ResolvedConfig {
        provider,
        default_topic,
        history_path,
        api_key,
        base_url,
        generation: GenerationSettings {
            text_model,
            art_model,
            art_thinking: config.art.thinking.unwrap_or(false),
            art_text: config.art.include_text.unwrap_or(false),
            art_retries: config.art.retries.unwrap_or(DEFAULT_ART_RETRIES),
        },
    }
}
