use std::sync::mpsc as std_mpsc;
use std::sync::Arc;

use infiwiki::core::action::Action;
use infiwiki::core::lifecycle::{FetchLifecycle, run_art, run_definition};
use infiwiki::inference::art::{ArtError, generate_ascii_art};
use infiwiki::inference::{
    AsciiArtData, GeminiProvider, GenerationSettings, GenerativeBackend, OpenRouterProvider,
    ProviderError, StreamChunk, TextRequest, Thinking,
};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::time::{Duration, sleep};
use tokio_test::{assert_err, assert_ok};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_partial_json, header, method, path, query_param},
};

// ============================================================================
// Helper Functions
// ============================================================================

const STREAM_PATH: &str = "/models/test-model:streamGenerateContent";
const GENERATE_PATH: &str = "/models/art-model:generateContent";

fn settings(art_retries: u8) -> GenerationSettings {
    GenerationSettings {
        text_model: "test-model".to_string(),
        art_model: "art-model".to_string(),
        art_thinking: false,
        art_text: false,
        art_retries,
    }
}

fn text_request(json_response: bool) -> TextRequest<'static> {
    TextRequest {
        prompt: "Hello",
        model: "test-model",
        thinking: Thinking::Disabled,
        json_response,
    }
}

/// Wraps text in a one-candidate Gemini response.
fn gemini_body(text: &str) -> String {
    serde_json::json!({
        "candidates": [{ "content": { "parts": [{ "text": text }] } }]
    })
    .to_string()
}

/// Collects content fragments, noting whether the stream completed
async fn collect_chunks(mut receiver: mpsc::Receiver<StreamChunk>) -> (Vec<String>, bool) {
    let mut content = Vec::new();
    let mut completed = false;

    while let Some(chunk) = receiver.recv().await {
        match chunk {
            StreamChunk::Content(s) => content.push(s),
            StreamChunk::Completed => completed = true,
        }
    }

    (content, completed)
}

/// Serves one SSE response as separate chunked-encoding pieces, pausing
/// between them so the client sees each piece as its own network read.
/// Returns the base URL.
async fn serve_in_pieces(pieces: Vec<Vec<u8>>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();

        // Read the request head, then the body it announces
        let mut request = Vec::new();
        let mut buf = [0u8; 4096];
        let head_end = loop {
            let n = socket.read(&mut buf).await.unwrap();
            request.extend_from_slice(&buf[..n]);
            if let Some(pos) = request.windows(4).position(|w| w == b"\r\n\r\n") {
                break pos + 4;
            }
        };
        let head = String::from_utf8_lossy(&request[..head_end]).to_lowercase();
        let content_length = head
            .lines()
            .find_map(|l| l.strip_prefix("content-length:"))
            .and_then(|v| v.trim().parse::<usize>().ok())
            .unwrap_or(0);
        while request.len() < head_end + content_length {
            let n = socket.read(&mut buf).await.unwrap();
            request.extend_from_slice(&buf[..n]);
        }

        socket
            .write_all(
                b"HTTP/1.1 200 OK\r\nContent-Type: text/event-stream\r\n\
                  Transfer-Encoding: chunked\r\nConnection: close\r\n\r\n",
            )
            .await
            .unwrap();
        for piece in pieces {
            let mut frame = format!("{:x}\r\n", piece.len()).into_bytes();
            frame.extend_from_slice(&piece);
            frame.extend_from_slice(b"\r\n");
            socket.write_all(&frame).await.unwrap();
            socket.flush().await.unwrap();
            sleep(Duration::from_millis(100)).await;
        }
        socket.write_all(b"0\r\n\r\n").await.unwrap();
        socket.flush().await.unwrap();
    });

    format!("http://{addr}")
}

/// Splits `body` right after the first byte of the first multi-byte character.
fn split_inside_character(body: &str) -> Vec<Vec<u8>> {
    let bytes = body.as_bytes();
    let split = bytes.iter().position(|b| *b >= 0xC0).unwrap() + 1;
    vec![bytes[..split].to_vec(), bytes[split..].to_vec()]
}

// ============================================================================
// Gemini Provider Tests
// ============================================================================

#[tokio::test]
async fn test_gemini_streams_fragments_in_order() {
    let mock_server = MockServer::start().await;

    let sse_response = format!(
        "data: {}\n\ndata: {}\n\n",
        gemini_body("Linked "),
        gemini_body("text.")
    );

    Mock::given(method("POST"))
        .and(path(STREAM_PATH))
        .and(query_param("alt", "sse"))
        .and(header("x-goog-api-key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_string(sse_response))
        .mount(&mock_server)
        .await;

    let provider = GeminiProvider::new(Some("test-key".to_string()), Some(mock_server.uri()));

    let (tx, rx) = mpsc::channel(100);
    let result = provider.stream_text(text_request(false), tx).await;
    assert_ok!(result);

    let (content, completed) = collect_chunks(rx).await;
    assert_eq!(content, vec!["Linked ", "text."]);
    assert!(completed);
}

#[tokio::test]
async fn test_gemini_skips_thought_parts() {
    let mock_server = MockServer::start().await;

    let event = serde_json::json!({
        "candidates": [{ "content": { "parts": [
            { "text": "pondering", "thought": true },
            { "text": "Answer" }
        ] } }]
    });
    let sse_response = format!("data: {event}\n\n");

    Mock::given(method("POST"))
        .and(path(STREAM_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string(sse_response))
        .mount(&mock_server)
        .await;

    let provider = GeminiProvider::new(Some("test-key".to_string()), Some(mock_server.uri()));

    let (tx, rx) = mpsc::channel(100);
    assert_ok!(provider.stream_text(text_request(false), tx).await);

    let (content, _) = collect_chunks(rx).await;
    assert_eq!(content, vec!["Answer"]);
}

#[tokio::test]
async fn test_gemini_keeps_characters_split_across_network_reads() {
    let body = format!("data: {}\n\n", gemini_body("Café “noir”"));
    let base_url = serve_in_pieces(split_inside_character(&body)).await;

    let provider = GeminiProvider::new(Some("test-key".to_string()), Some(base_url));

    let (tx, rx) = mpsc::channel(100);
    assert_ok!(provider.stream_text(text_request(false), tx).await);

    let (content, completed) = collect_chunks(rx).await;
    assert_eq!(content, vec!["Café “noir”"]);
    assert!(completed);
}

#[tokio::test]
async fn test_gemini_api_error_response() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(STREAM_PATH))
        .respond_with(ResponseTemplate::new(429).set_body_string("quota exceeded"))
        .mount(&mock_server)
        .await;

    let provider = GeminiProvider::new(Some("test-key".to_string()), Some(mock_server.uri()));

    let (tx, _rx) = mpsc::channel(100);
    let result = provider.stream_text(text_request(false), tx).await;

    assert!(matches!(result, Err(ProviderError::Api { status: 429, .. })));
}

#[tokio::test]
async fn test_gemini_without_key_never_calls_the_api() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let provider = GeminiProvider::new(None, Some(mock_server.uri()));
    assert!(!provider.is_configured());

    let (tx, _rx) = mpsc::channel(100);
    let result = provider.stream_text(text_request(false), tx).await;
    assert!(matches!(result, Err(ProviderError::Config(_))));
}

#[tokio::test]
async fn test_gemini_generate_requests_json() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/models/test-model:generateContent"))
        .and(body_partial_json(serde_json::json!({
            "generationConfig": {
                "responseMimeType": "application/json",
                "thinkingConfig": { "thinkingBudget": 0 }
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_string(gemini_body("{\"art\":\"*\"}")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let provider = GeminiProvider::new(Some("test-key".to_string()), Some(mock_server.uri()));
    let text = assert_ok!(provider.generate(text_request(true)).await);
    assert_eq!(text, "{\"art\":\"*\"}");
}

// ============================================================================
// OpenRouter Provider Tests
// ============================================================================

#[tokio::test]
async fn test_openrouter_successful_streaming() {
    let mock_server = MockServer::start().await;

    let sse_response = "\
event: response.created
data: {\"type\":\"response.created\"}

event: response.output_text.delta
data: {\"type\":\"response.output_text.delta\",\"delta\":\"Hello\"}

event: response.output_text.delta
data: {\"type\":\"response.output_text.delta\",\"delta\":\" world\"}

event: response.completed
data: {\"type\":\"response.completed\"}
";

    Mock::given(method("POST"))
        .and(path("/responses"))
        .and(header("Authorization", "Bearer test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_string(sse_response))
        .mount(&mock_server)
        .await;

    let provider = OpenRouterProvider::new(Some("test-key".to_string()), Some(mock_server.uri()));

    let (tx, rx) = mpsc::channel(100);
    assert_ok!(provider.stream_text(text_request(false), tx).await);

    let (content, completed) = collect_chunks(rx).await;
    assert_eq!(content, vec!["Hello", " world"]);
    assert!(completed);
}

#[tokio::test]
async fn test_openrouter_keeps_characters_split_across_network_reads() {
    let body = "\
event: response.output_text.delta
data: {\"type\":\"response.output_text.delta\",\"delta\":\"Señor Ñandú\"}

event: response.completed
data: {\"type\":\"response.completed\"}
";
    let base_url = serve_in_pieces(split_inside_character(body)).await;

    let provider = OpenRouterProvider::new(Some("test-key".to_string()), Some(base_url));

    let (tx, rx) = mpsc::channel(100);
    assert_ok!(provider.stream_text(text_request(false), tx).await);

    let (content, _) = collect_chunks(rx).await;
    assert_eq!(content, vec!["Señor Ñandú"]);
}

#[tokio::test]
async fn test_openrouter_api_error_response() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/responses"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized"))
        .mount(&mock_server)
        .await;

    let provider =
        OpenRouterProvider::new(Some("invalid-key".to_string()), Some(mock_server.uri()));

    let (tx, _rx) = mpsc::channel(100);
    let result = provider.stream_text(text_request(false), tx).await;

    assert!(matches!(result, Err(ProviderError::Api { status: 401, .. })));
}

#[tokio::test]
async fn test_openrouter_channel_closed_error() {
    let mock_server = MockServer::start().await;

    let sse_response = "\
event: response.output_text.delta
data: {\"type\":\"response.output_text.delta\",\"delta\":\"Hello\"}
";

    Mock::given(method("POST"))
        .and(path("/responses"))
        .respond_with(ResponseTemplate::new(200).set_body_string(sse_response))
        .mount(&mock_server)
        .await;

    let provider = OpenRouterProvider::new(Some("test-key".to_string()), Some(mock_server.uri()));

    let (tx, rx) = mpsc::channel(1);
    // Drop receiver immediately to simulate channel closed
    drop(rx);

    let result = provider.stream_text(text_request(false), tx).await;
    assert!(matches!(result, Err(ProviderError::ChannelClosed)));
}

// ============================================================================
// Art Generation Tests
// ============================================================================

#[tokio::test]
async fn test_art_accepts_fenced_json() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(gemini_body("```json\n{\"art\": \"/\\\\\\n\\\\/\"}\n```")),
        )
        .mount(&mock_server)
        .await;

    let provider = GeminiProvider::new(Some("test-key".to_string()), Some(mock_server.uri()));
    let art = assert_ok!(generate_ascii_art(&provider, &settings(0), "Diamond").await);
    assert_eq!(
        art,
        AsciiArtData {
            art: "/\\\n\\/".to_string(),
            text: None
        }
    );
}

#[tokio::test]
async fn test_art_retries_after_malformed_answer() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string(gemini_body("not json")))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string(gemini_body("{\"art\":\"~~\"}")))
        .mount(&mock_server)
        .await;

    let provider = GeminiProvider::new(Some("test-key".to_string()), Some(mock_server.uri()));
    let art = assert_ok!(generate_ascii_art(&provider, &settings(1), "Waves").await);
    assert_eq!(art.art, "~~");
}

#[tokio::test]
async fn test_art_gives_up_after_retry_budget() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
        .expect(3)
        .mount(&mock_server)
        .await;

    let provider = GeminiProvider::new(Some("test-key".to_string()), Some(mock_server.uri()));
    let error = assert_err!(generate_ascii_art(&provider, &settings(2), "Storm").await);
    assert!(matches!(error, ArtError::Exhausted { attempts: 3, .. }));
}

// ============================================================================
// Fetch Lifecycle Against a Live Backend
// ============================================================================

#[tokio::test]
async fn test_definition_fetch_reports_chunks_then_done() {
    let mock_server = MockServer::start().await;

    let sse_response = format!(
        "data: {}\n\ndata: {}\n\n",
        gemini_body("Flux is "),
        gemini_body("change.")
    );
    Mock::given(method("POST"))
        .and(path(STREAM_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string(sse_response))
        .mount(&mock_server)
        .await;

    let backend: Arc<dyn GenerativeBackend> = Arc::new(GeminiProvider::new(
        Some("test-key".to_string()),
        Some(mock_server.uri()),
    ));
    let lifecycle = FetchLifecycle::new(7, "Flux".to_string());
    let (tx, rx) = std_mpsc::channel();

    run_definition(backend, settings(0), lifecycle.ticket(), tx).await;

    let actions: Vec<Action> = rx.try_iter().collect();
    assert_eq!(
        actions,
        vec![
            Action::DefinitionChunk { generation: 7, text: "Flux is ".to_string() },
            Action::DefinitionChunk { generation: 7, text: "change.".to_string() },
            Action::DefinitionDone { generation: 7 },
        ]
    );
}

#[tokio::test]
async fn test_definition_fetch_surfaces_api_failure() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(STREAM_PATH))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&mock_server)
        .await;

    let backend: Arc<dyn GenerativeBackend> = Arc::new(GeminiProvider::new(
        Some("test-key".to_string()),
        Some(mock_server.uri()),
    ));
    let lifecycle = FetchLifecycle::new(1, "Flux".to_string());
    let (tx, rx) = std_mpsc::channel();

    run_definition(backend, settings(0), lifecycle.ticket(), tx).await;

    let actions: Vec<Action> = rx.try_iter().collect();
    match actions.as_slice() {
        [Action::DefinitionFailed { generation: 1, message }] => {
            assert!(message.starts_with("Error:"));
            assert!(message.contains("\"Flux\""));
        }
        other => panic!("unexpected actions: {other:?}"),
    }
}

#[tokio::test]
async fn test_art_fetch_reports_failure_after_retries() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string(gemini_body("[]")))
        .expect(2)
        .mount(&mock_server)
        .await;

    let backend: Arc<dyn GenerativeBackend> = Arc::new(GeminiProvider::new(
        Some("test-key".to_string()),
        Some(mock_server.uri()),
    ));
    let lifecycle = FetchLifecycle::new(3, "Storm".to_string());
    let (tx, rx) = std_mpsc::channel();

    run_art(backend, settings(1), lifecycle.ticket(), tx).await;

    let actions: Vec<Action> = rx.try_iter().collect();
    assert_eq!(actions, vec![Action::ArtFailed { generation: 3 }]);
}
