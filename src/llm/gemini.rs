//! Google Gemini REST adapter

use super::error::{AiError, ErrorKind};
use super::normalize::normalize_response;
use super::prompt::{build_prompt_with_window, MAX_CONTEXT_MESSAGES};
use super::{CancelSignal, DeltaCallback, FinishReason, GenerationRequest, GenerationResult, LlmAdapter};
use crate::domain::Config;
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

const STREAM_CHUNK_TIMEOUT: Duration = Duration::from_secs(60);
const CANCEL_POLL_INTERVAL: Duration = Duration::from_millis(200);
/// Upper bound on a whole streamed answer; idle gaps are bounded separately.
const STREAM_TOTAL_TIMEOUT: Duration = Duration::from_secs(600);

pub struct GeminiAdapter {
    client: reqwest::Client,
    api_base: String,
    api_key: String,
    model: String,
    max_output_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    generation_config: GeminiGenerationConfig,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    role: &'static str,
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize)]
struct GeminiPart {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    max_output_tokens: u32,
    temperature: f32,
}

impl GeminiAdapter {
    pub fn new(config: &Config) -> Result<Self, AiError> {
        let api_key = config
            .gemini_api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| AiError::new(ErrorKind::Auth, "GEMINI_API_KEY is not set"))?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| AiError::new(ErrorKind::Unknown, format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_base: config.gemini_api_base.trim_end_matches('/').to_string(),
            api_key,
            model: config.model.clone(),
            max_output_tokens: config.max_output_tokens,
            temperature: config.temperature,
        })
    }

    fn body(&self, request: &GenerationRequest) -> GeminiRequest {
        let window = request.history_window.unwrap_or(MAX_CONTEXT_MESSAGES);
        let prompt = build_prompt_with_window(&request.messages, request.context.as_deref(), window);
        GeminiRequest {
            contents: vec![GeminiContent { role: "user", parts: vec![GeminiPart { text: prompt }] }],
            generation_config: GeminiGenerationConfig {
                max_output_tokens: request.max_tokens.unwrap_or(self.max_output_tokens),
                temperature: request.temperature.unwrap_or(self.temperature),
            },
        }
    }

    fn url(&self, request: &GenerationRequest, method: &str) -> String {
        let model = request.model.as_deref().unwrap_or(&self.model);
        format!("{}/{}:{}", self.api_base, model, method)
    }

    async fn post(
        &self,
        url: &str,
        body: &GeminiRequest,
        timeout: Option<Duration>,
    ) -> Result<reqwest::Response, AiError> {
        tracing::debug!("POST {}", url);
        let mut builder = self.client.post(url).header("x-goog-api-key", &self.api_key).json(body);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let response = builder.send().await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(AiError::from_status(status.as_u16(), &text));
        }
        Ok(response)
    }
}

#[async_trait]
impl LlmAdapter for GeminiAdapter {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResult, AiError> {
        let url = self.url(request, "generateContent");
        let response = self.post(&url, &self.body(request), None).await?;
        let raw: serde_json::Value = response.json().await?;
        Ok(normalize_response(raw))
    }

    async fn stream(
        &self,
        request: &GenerationRequest,
        on_delta: DeltaCallback<'_>,
        cancel: &CancelSignal,
    ) -> Result<GenerationResult, AiError> {
        use futures::StreamExt;
        use tokio::time::timeout;

        let url = format!("{}?alt=sse", self.url(request, "streamGenerateContent"));
        let response = self.post(&url, &self.body(request), Some(STREAM_TOTAL_TIMEOUT)).await?;

        let mut stream = response.bytes_stream();
        let mut buffer: Vec<u8> = Vec::new();
        let mut sse = SseState::default();
        let mut last_activity = std::time::Instant::now();

        loop {
            if cancel.is_cancelled() {
                tracing::debug!("Gemini stream cancelled after {} bytes", sse.text.len());
                sse.interrupted = true;
                break;
            }
            if last_activity.elapsed() >= STREAM_CHUNK_TIMEOUT {
                return Err(AiError::new(
                    ErrorKind::Network,
                    format!("stream timeout: no data for {} seconds", STREAM_CHUNK_TIMEOUT.as_secs()),
                ));
            }

            let chunk = match timeout(CANCEL_POLL_INTERVAL, stream.next()).await {
                Ok(Some(chunk)) => chunk?,
                Ok(None) => break,
                Err(_) => continue,
            };
            last_activity = std::time::Instant::now();
            buffer.extend_from_slice(&chunk);

            // decode complete lines only
            while let Some(newline) = buffer.iter().position(|&b| b == b'\n') {
                let line: Vec<u8> = buffer.drain(..=newline).collect();
                sse.handle_line(&line, on_delta);
            }
        }

        if !sse.interrupted && !buffer.is_empty() {
            sse.handle_line(&buffer, on_delta);
        }

        Ok(sse.finish())
    }
}

/// Accumulated state of one `alt=sse` response.
struct SseState {
    text: String,
    finish_reason: FinishReason,
    tokens_used: Option<u32>,
    last_raw: serde_json::Value,
    interrupted: bool,
}

impl Default for SseState {
    fn default() -> Self {
        Self {
            text: String::new(),
            finish_reason: FinishReason::Stop,
            tokens_used: None,
            last_raw: serde_json::Value::Null,
            interrupted: false,
        }
    }
}

impl SseState {
    fn handle_line(&mut self, line: &[u8], on_delta: DeltaCallback<'_>) {
        let line = String::from_utf8_lossy(line);
        let Some(data) = line.trim().strip_prefix("data:") else {
            return;
        };
        let Ok(value) = serde_json::from_str::<serde_json::Value>(data.trim()) else {
            tracing::debug!("Skipping unparsable stream line: {}", data);
            return;
        };

        let piece = normalize_response(value);
        if !piece.text.is_empty() {
            on_delta(&piece.text);
            self.text.push_str(&piece.text);
        }
        if piece.raw.pointer("/candidates/0/finishReason").is_some() {
            self.finish_reason = piece.finish_reason;
        }
        if piece.tokens_used.is_some() {
            self.tokens_used = piece.tokens_used;
        }
        self.last_raw = piece.raw;
    }

    fn finish(self) -> GenerationResult {
        GenerationResult {
            text: self.text,
            finish_reason: self.finish_reason,
            tokens_used: self.tokens_used,
            raw: self.last_raw,
            interrupted: self.interrupted,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ChatMessage;
    use serde_json::json;
    use std::sync::Mutex;
    use wiremock::matchers::{body_partial_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn adapter(server: &MockServer) -> GeminiAdapter {
        let config = Config {
            gemini_api_base: server.uri(),
            gemini_api_key: Some("test-key-123".to_string()),
            ..Config::default()
        };
        GeminiAdapter::new(&config).unwrap()
    }

    fn request(text: &str) -> GenerationRequest {
        GenerationRequest { messages: vec![ChatMessage::user(text)], ..Default::default() }
    }

    #[test]
    fn missing_api_key_is_auth_error() {
        let err = GeminiAdapter::new(&Config::default()).err().unwrap();
        assert_eq!(err.kind, ErrorKind::Auth);
    }

    #[tokio::test]
    async fn generate_posts_prompt_with_key_header() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/gemini-1.5-flash:generateContent"))
            .and(header("x-goog-api-key", "test-key-123"))
            .and(body_partial_json(json!({"generationConfig": {"maxOutputTokens": 1024}})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{"content": {"parts": [{"text": "Hi there"}]}, "finishReason": "STOP"}],
                "usageMetadata": {"totalTokenCount": 7}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let result = adapter(&server).generate(&request("hello")).await.unwrap();
        assert_eq!(result.text, "Hi there");
        assert_eq!(result.tokens_used, Some(7));
    }

    #[tokio::test]
    async fn http_errors_are_classified() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("quota"))
            .mount(&server)
            .await;

        let err = adapter(&server).generate(&request("hello")).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::RateLimit);
        assert_eq!(err.status, Some(429));
    }

    #[tokio::test]
    async fn stream_parses_sse_data_lines() {
        let server = MockServer::start().await;
        let body = concat!(
            "data: {\"candidates\":[{\"content\":{\"parts\":[{\"text\":\"Hel\"}]}}]}\r\n\r\n",
            "data: {\"candidates\":[{\"content\":{\"parts\":[{\"text\":\"lo\"}]},\"finishReason\":\"STOP\"}],",
            "\"usageMetadata\":{\"totalTokenCount\":3}}\r\n\r\n",
        );
        Mock::given(method("POST"))
            .and(path("/gemini-1.5-flash:streamGenerateContent"))
            .and(query_param("alt", "sse"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
            .mount(&server)
            .await;

        let deltas = Mutex::new(Vec::new());
        let on_delta = |d: &str| deltas.lock().unwrap().push(d.to_string());
        let result = adapter(&server)
            .stream(&request("hello"), &on_delta, &CancelSignal::new())
            .await
            .unwrap();

        assert_eq!(*deltas.lock().unwrap(), vec!["Hel", "lo"]);
        assert_eq!(result.text, "Hello");
        assert_eq!(result.finish_reason, FinishReason::Stop);
        assert_eq!(result.tokens_used, Some(3));
    }

    #[tokio::test]
    async fn cancelled_stream_emits_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                "data: {\"candidates\":[{\"content\":{\"parts\":[{\"text\":\"x\"}]}}]}\n\n",
                "text/event-stream",
            ))
            .mount(&server)
            .await;

        let cancel = CancelSignal::new();
        cancel.cancel();
        let on_delta = |_: &str| panic!("no delta expected");
        let result = adapter(&server).stream(&request("hello"), &on_delta, &cancel).await.unwrap();
        assert_eq!(result.text, "");
        assert!(result.interrupted);
    }

    #[tokio::test]
    async fn stream_keeps_final_line_without_newline() {
        let server = MockServer::start().await;
        let body = concat!(
            "data: {\"candidates\":[{\"content\":{\"parts\":[{\"text\":\"Hel\"}]}}]}\n\n",
            "data: {\"candidates\":[{\"content\":{\"parts\":[{\"text\":\"lo\"}]},\"finishReason\":\"MAX_TOKENS\"}]}",
        );
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
            .mount(&server)
            .await;

        let on_delta = |_: &str| {};
        let result = adapter(&server)
            .stream(&request("hello"), &on_delta, &CancelSignal::new())
            .await
            .unwrap();
        assert_eq!(result.text, "Hello");
        assert_eq!(result.finish_reason, FinishReason::Length);
        assert!(!result.interrupted);
    }

    #[tokio::test]
    async fn stream_decodes_characters_split_across_chunks() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let event = "data: {\"candidates\":[{\"content\":{\"parts\":[{\"text\":\"café\"}]}}]}\n\n";
        let bytes = event.as_bytes();
        // split between the two bytes of 'é'
        let split = event.find('é').unwrap() + 1;

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (first, second) = (bytes[..split].to_vec(), bytes[split..].to_vec());
        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 4096];
            let body_len = loop {
                let n = socket.read(&mut buf).await.unwrap();
                assert!(n > 0, "client closed before sending headers");
                request.extend_from_slice(&buf[..n]);
                if let Some(end) = request.windows(4).position(|w| w == b"\r\n\r\n") {
                    let head = String::from_utf8_lossy(&request[..end]).to_ascii_lowercase();
                    let length = head
                        .lines()
                        .find_map(|l| l.strip_prefix("content-length:"))
                        .and_then(|v| v.trim().parse::<usize>().ok())
                        .unwrap_or(0);
                    break end + 4 + length;
                }
            };
            while request.len() < body_len {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            let head = "HTTP/1.1 200 OK\r\ncontent-type: text/event-stream\r\n\
                        transfer-encoding: chunked\r\nconnection: close\r\n\r\n";
            socket.write_all(head.as_bytes()).await.unwrap();
            for part in [first, second] {
                socket.write_all(format!("{:x}\r\n", part.len()).as_bytes()).await.unwrap();
                socket.write_all(&part).await.unwrap();
                socket.write_all(b"\r\n").await.unwrap();
                socket.flush().await.unwrap();
                tokio::time::sleep(Duration::from_millis(50)).await;
            }
            socket.write_all(b"0\r\n\r\n").await.unwrap();
            socket.flush().await.unwrap();
        });

        let config = Config {
            gemini_api_base: format!("http://{addr}"),
            gemini_api_key: Some("test-key-123".to_string()),
            ..Config::default()
        };
        let deltas = Mutex::new(Vec::new());
        let on_delta = |d: &str| deltas.lock().unwrap().push(d.to_string());
        let result = GeminiAdapter::new(&config)
            .unwrap()
            .stream(&request("hello"), &on_delta, &CancelSignal::new())
            .await
            .unwrap();
        server.await.unwrap();

        assert_eq!(result.text, "café");
        assert_eq!(*deltas.lock().unwrap(), vec!["café"]);
    }

    #[tokio::test]
    async fn body_renders_request_history_window() {
        let server = MockServer::start().await;
        let messages: Vec<ChatMessage> = (0..30).map(|i| ChatMessage::user(format!("m{i}"))).collect();
        let mut req = GenerationRequest { messages, ..Default::default() };

        let prompt = |req: &GenerationRequest| adapter(&server).body(req).contents[0].parts[0].text.clone();
        let count = |p: &str| p.lines().filter(|l| l.starts_with("USER: m")).count();

        assert_eq!(count(&prompt(&req)), MAX_CONTEXT_MESSAGES);
        req.history_window = Some(50);
        let full = prompt(&req);
        assert_eq!(count(&full), 30);
        assert!(full.contains("USER: m0"));
    }
}
