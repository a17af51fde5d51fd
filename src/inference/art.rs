//! Text-art generation for a topic.
//!
//! The backend is asked for a JSON object, but what comes back is only
//! trusted after it has been checked: an optional Markdown code fence is
//! stripped, the payload must look like an object, and it must carry a
//! non-empty string `art` field.

use std::fmt;

use log::{debug, error, info, warn};
use serde_json::Value;

use crate::inference::prompts::art_prompt;
use crate::inference::{
    AsciiArtData, GenerationSettings, GenerativeBackend, ProviderError, TextRequest, Thinking,
};

#[derive(Debug)]
pub enum ArtError {
    /// The backend call itself failed.
    Backend(ProviderError),
    /// The backend answered, but not with a usable art object.
    MalformedResponse(String),
    /// Every attempt failed; carries the last failure.
    Exhausted { attempts: u32, last: Box<ArtError> },
}

impl fmt::Display for ArtError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArtError::Backend(e) => write!(f, "{e}"),
            ArtError::MalformedResponse(msg) => write!(f, "malformed art response: {msg}"),
            ArtError::Exhausted { attempts, last } => {
                write!(f, "Could not generate ASCII art after {attempts} attempts: {last}")
            }
        }
    }
}

impl std::error::Error for ArtError {}

/// Removes one surrounding ```` ``` ```` / ```` ```json ```` fence, if present.
pub fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(inner) = rest.strip_suffix("```") else {
        return trimmed;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    let inner = inner.trim();
    if inner.is_empty() { trimmed } else { inner }
}

/// Validates a raw backend answer into art.
///
/// `keep_text` controls whether a `text` field is carried over.
pub fn parse_art_response(raw: &str, keep_text: bool) -> Result<AsciiArtData, ArtError> {
    let json = strip_code_fence(raw);
    if !json.starts_with('{') || !json.ends_with('}') {
        return Err(ArtError::MalformedResponse(
            "response is not a valid JSON object".to_string(),
        ));
    }

    let value: Value = serde_json::from_str(json)
        .map_err(|e| ArtError::MalformedResponse(format!("invalid JSON: {e}")))?;
    let object = value
        .as_object()
        .ok_or_else(|| ArtError::MalformedResponse("expected a JSON object".to_string()))?;

    let art = match object.get("art") {
        Some(Value::String(art)) if !art.trim().is_empty() => art.clone(),
        _ => {
            return Err(ArtError::MalformedResponse(
                "invalid or empty ASCII art in response".to_string(),
            ));
        }
    };

    let text = if keep_text {
        object
            .get("text")
            .and_then(Value::as_str)
            .filter(|t| !t.trim().is_empty())
            .map(str::to_string)
    } else {
        None
    };

    Ok(AsciiArtData { art, text })
}

/// Asks the backend for art, retrying up to `settings.art_retries` times.
pub async fn generate_ascii_art(
    backend: &dyn GenerativeBackend,
    settings: &GenerationSettings,
    topic: &str,
) -> Result<AsciiArtData, ArtError> {
    if !backend.is_configured() {
        return Err(ArtError::Backend(ProviderError::Config(
            "API_KEY is not configured.".to_string(),
        )));
    }

    let prompt = art_prompt(topic, settings.art_text);
    let request = TextRequest {
        prompt: &prompt,
        model: &settings.art_model,
        thinking: Thinking::from_flag(settings.art_thinking),
        json_response: true,
    };

    let attempts = settings.art_attempts();
    let mut last_error = None;
    for attempt in 1..=attempts {
        let outcome = match backend.generate(request).await {
            Ok(raw) => {
                debug!("Attempt {}/{} - raw art response: {}", attempt, attempts, raw);
                parse_art_response(&raw, settings.art_text)
            }
            Err(e) => Err(ArtError::Backend(e)),
        };

        match outcome {
            Ok(art) => {
                info!("Generated art for {:?} on attempt {}", topic, attempt);
                return Ok(art);
            }
            Err(e) => {
                warn!("Attempt {}/{} failed: {}", attempt, attempts, e);
                last_error = Some(e);
            }
        }
    }

    error!("All retry attempts failed for ASCII art generation");
    let last = last_error
        .unwrap_or_else(|| ArtError::MalformedResponse("no attempts were made".to_string()));
    Err(ArtError::Exhausted {
        attempts,
        last: Box::new(last),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{ScriptedBackend, test_settings};

    #[test]
    fn test_fenced_json_is_unwrapped() {
        let raw = "```json\n{\"art\": \"X\"}\n```";
        let parsed = parse_art_response(raw, false).unwrap();
        assert_eq!(
            parsed,
            AsciiArtData {
                art: "X".to_string(),
                text: None
            }
        );
    }

    #[test]
    fn test_bare_fence_is_unwrapped() {
        assert_eq!(strip_code_fence("```\n{\"art\":\"X\"}\n```"), "{\"art\":\"X\"}");
        assert_eq!(strip_code_fence("  {\"art\":\"X\"}  "), "{\"art\":\"X\"}");
    }

    #[test]
    fn test_multiline_art_survives() {
        let raw = r#"{"art": "  ▲\n ███\n█████"}"#;
        let parsed = parse_art_response(raw, false).unwrap();
        assert_eq!(parsed.art.lines().count(), 3);
    }

    #[test]
    fn test_non_object_is_malformed() {
        for raw in ["[\"art\"]", "art: X", "", "```\n```", "\"{}\""] {
            assert!(
                matches!(parse_art_response(raw, false), Err(ArtError::MalformedResponse(_))),
                "{raw:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_invalid_json_inside_braces_is_malformed() {
        assert!(matches!(
            parse_art_response("{art: X}", false),
            Err(ArtError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_missing_empty_or_non_string_art_is_malformed() {
        for raw in [r#"{"text":"X"}"#, r#"{"art":"   "}"#, r#"{"art":42}"#, r#"{"art":null}"#] {
            assert!(
                matches!(parse_art_response(raw, false), Err(ArtError::MalformedResponse(_))),
                "{raw:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_text_only_kept_when_enabled() {
        let raw = r#"{"art":"X","text":"█▀█"}"#;
        assert_eq!(parse_art_response(raw, false).unwrap().text, None);
        assert_eq!(parse_art_response(raw, true).unwrap().text.as_deref(), Some("█▀█"));
    }

    #[tokio::test]
    async fn test_first_attempt_success() {
        let backend = ScriptedBackend::default().with_generate(vec![Ok("{\"art\":\"★\"}".to_string())]);
        let art = generate_ascii_art(&backend, &test_settings(), "Star").await.unwrap();
        assert_eq!(art.art, "★");
        assert_eq!(backend.generate_calls(), 1);
    }

    #[tokio::test]
    async fn test_retries_once_after_malformed_response() {
        let backend = ScriptedBackend::default().with_generate(vec![
            Ok("not json at all".to_string()),
            Ok("```json\n{\"art\":\"○\"}\n```".to_string()),
        ]);
        let art = generate_ascii_art(&backend, &test_settings(), "Orb").await.unwrap();
        assert_eq!(art.art, "○");
        assert_eq!(backend.generate_calls(), 2);
    }

    #[tokio::test]
    async fn test_exhausted_after_retry_budget() {
        let backend = ScriptedBackend::default().with_generate(vec![
            Err(ProviderError::Api {
                status: 503,
                message: "overloaded".to_string(),
            }),
            Ok("{\"art\":\"\"}".to_string()),
            Ok("{\"art\":\"never reached\"}".to_string()),
        ]);
        let err = generate_ascii_art(&backend, &test_settings(), "Void").await.unwrap_err();
        match err {
            ArtError::Exhausted { attempts, last } => {
                assert_eq!(attempts, 2);
                assert!(matches!(*last, ArtError::MalformedResponse(_)));
            }
            other => panic!("expected Exhausted, got {other:?}"),
        }
        assert_eq!(backend.generate_calls(), 2);
    }

    #[tokio::test]
    async fn test_zero_retry_budget_means_single_attempt() {
        let backend = ScriptedBackend::default().with_generate(vec![
            Ok("nope".to_string()),
            Ok("{\"art\":\"X\"}".to_string()),
        ]);
        let mut settings = test_settings();
        settings.art_retries = 0;
        assert!(generate_ascii_art(&backend, &settings, "X").await.is_err());
        assert_eq!(backend.generate_calls(), 1);
    }

    #[tokio::test]
    async fn test_unconfigured_backend_fails_without_calling() {
        let backend = ScriptedBackend::default().unconfigured();
        let err = generate_ascii_art(&backend, &test_settings(), "X").await.unwrap_err();
        assert!(matches!(err, ArtError::Backend(ProviderError::Config(_))));
        assert_eq!(backend.generate_calls(), 0);
    }

    #[tokio::test]
    async fn test_request_asks_for_json() {
        let backend = ScriptedBackend::default().with_generate(vec![Ok("{\"art\":\"X\"}".to_string())]);
        generate_ascii_art(&backend, &test_settings(), "Helix").await.unwrap();
        let prompts = backend.prompts();
        assert!(prompts[0].starts_with("For \"Helix\""));
        assert_eq!(backend.last_request_flags(), Some((true, Thinking::Disabled)));
    }
}
