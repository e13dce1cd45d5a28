use std::env;
use std::fmt;
use std::time::Duration;

use reqwest::StatusCode;

use crate::conversation::Conversation;
use crate::error::ChatError;
use crate::retry::RetryPolicy;
use crate::types::{first_completion, ApiError, ChatOutcome, ChatRequest};

pub const API_KEY_ENV: &str = "OPENAI_API_KEY";
pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

pub const ASSISTANT_PROMPT: &str = "You are a helpful assistant.";
pub const ANALYST_PROMPT: &str = "You are a helpful time-management analyst.";
pub const PRODUCTIVITY_PROMPT: &str = "You are a helpful productivity AI assistant.";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub endpoint: String,
    pub model: String,
    pub timeout: Duration,
    pub retry: RetryPolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            retry: RetryPolicy::default(),
        }
    }
}

impl ClientConfig {
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

/// Chat-completions client with bounded retry on rate limiting.
///
/// Holds no per-call state: every call owns its attempt counter and jitter draws,
/// so clones can be used concurrently.
#[derive(Clone)]
pub struct ChatClient {
    http: reqwest::Client,
    api_key: String,
    config: ClientConfig,
}

impl fmt::Debug for ChatClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatClient")
            .field("api_key", &"<redacted>")
            .field("config", &self.config)
            .finish()
    }
}

impl ChatClient {
    /// Build a client with the bearer credential from `OPENAI_API_KEY`.
    pub fn from_env(config: ClientConfig) -> Result<Self, ChatError> {
        let api_key = env::var(API_KEY_ENV).map_err(|_| ChatError::MissingCredential)?;
        Self::new(api_key, config)
    }

    pub fn new(api_key: impl Into<String>, config: ClientConfig) -> Result<Self, ChatError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(ChatError::MissingCredential);
        }
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(ChatError::Client)?;
        Ok(Self {
            http,
            api_key,
            config,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Send one system + user exchange, retrying generic 429s with backoff.
    pub async fn chat_completion(&self, system_prompt: &str, user_prompt: &str) -> ChatOutcome {
        let request = ChatRequest::new(&self.config.model, system_prompt, user_prompt);
        let policy = self.config.retry;
        let mut attempt: u32 = 1;

        loop {
            let (status, raw) = match self.send(&request).await {
                Ok(response) => response,
                Err(err) => {
                    tracing::warn!(attempt, error = %err, "chat request failed");
                    return ChatOutcome::Failed {
                        code: "transport".to_string(),
                        message: err.to_string(),
                    };
                }
            };

            if status.is_success() {
                tracing::debug!(attempt, "chat request succeeded");
                return match first_completion(&raw) {
                    Some(content) => ChatOutcome::Reply(content),
                    None => ChatOutcome::Failed {
                        code: status.as_u16().to_string(),
                        message: "response did not include choices[0].message.content"
                            .to_string(),
                    },
                };
            }

            let api_error = ApiError::parse(&raw);

            if status == StatusCode::TOO_MANY_REQUESTS {
                if let Some(err) = api_error.as_ref().filter(|e| e.is_quota_exhausted()) {
                    tracing::warn!(attempt, "chat quota exhausted");
                    return ChatOutcome::QuotaExhausted {
                        message: err.message.clone().unwrap_or_else(|| raw.clone()),
                    };
                }

                if policy.allows_retry_after(attempt) {
                    let delay = policy.delay_for_attempt(attempt);
                    tracing::warn!(
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        "chat request rate limited, backing off"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                    continue;
                }
            }

            tracing::warn!(attempt, status = status.as_u16(), "chat request rejected");
            let (code, message) = match api_error {
                Some(ApiError { code, message }) => (code, message),
                None => (None, None),
            };
            return ChatOutcome::Failed {
                code: code.unwrap_or_else(|| status.as_u16().to_string()),
                message: message.unwrap_or(raw),
            };
        }
    }

    /// Free-form question under the generic assistant prompt.
    pub async fn chat(&self, user_prompt: &str) -> ChatOutcome {
        self.chat_completion(ASSISTANT_PROMPT, user_prompt).await
    }

    /// Send the whole conversation as one prompt and record a successful reply in it.
    pub async fn continue_conversation(&self, conversation: &mut Conversation) -> ChatOutcome {
        let outcome = self.chat(&conversation.render_prompt()).await;
        if let ChatOutcome::Reply(text) = &outcome {
            conversation.push_assistant(text.clone());
        }
        outcome
    }

    async fn send(&self, request: &ChatRequest) -> Result<(StatusCode, String), reqwest::Error> {
        let response = self
            .http
            .post(&self.config.endpoint)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await?;
        let status = response.status();
        let raw = response.text().await?;
        Ok((status, raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::time::Instant;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fast_retry() -> RetryPolicy {
        RetryPolicy::default()
            .with_base_delay_ms(10)
            .with_max_delay_ms(40)
            .with_jitter_ms(0)
    }

    fn client_for(server: &MockServer) -> ChatClient {
        let config = ClientConfig::default()
            .with_endpoint(format!("{}/v1/chat/completions", server.uri()))
            .with_timeout(Duration::from_secs(5))
            .with_retry(fast_retry());
        ChatClient::new("test-key", config).unwrap()
    }

    fn completion(content: &str) -> serde_json::Value {
        json!({
            "id": "chatcmpl-1",
            "object": "chat.completion",
            "choices": [
                { "index": 0, "message": { "role": "assistant", "content": content } }
            ]
        })
    }

    #[tokio::test]
    async fn posts_two_messages_with_bearer_credential() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer test-key"))
            .and(body_json(json!({
                "model": "gpt-3.5-turbo",
                "messages": [
                    { "role": "system", "content": "You are terse." },
                    { "role": "user", "content": "Plan my week" }
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion("Sure.")))
            .expect(1)
            .mount(&server)
            .await;

        let outcome = client_for(&server)
            .chat_completion("You are terse.", "Plan my week")
            .await;
        assert_eq!(outcome, ChatOutcome::Reply("Sure.".into()));
    }

    #[tokio::test]
    async fn quota_exhaustion_is_never_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_json(json!({
                "error": { "code": "insufficient_quota", "message": "You exceeded your current quota" }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let outcome = client_for(&server).chat("hello").await;
        assert_eq!(
            outcome,
            ChatOutcome::QuotaExhausted {
                message: "You exceeded your current quota".into()
            }
        );
        assert_eq!(
            outcome.render(),
            "[Quota Error]: You exceeded your current quota"
        );
    }

    #[tokio::test]
    async fn rate_limit_exhausts_five_attempts_then_fails() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_json(json!({
                "error": { "code": "rate_limit_exceeded", "message": "Slow down" }
            })))
            .expect(5)
            .mount(&server)
            .await;

        let started = Instant::now();
        let outcome = client_for(&server).chat("hello").await;
        let elapsed = started.elapsed();

        assert_eq!(
            outcome,
            ChatOutcome::Failed {
                code: "rate_limit_exceeded".into(),
                message: "Slow down".into()
            }
        );
        // 10 + 20 + 40 + 40 ms of backoff between the five requests.
        assert!(elapsed >= Duration::from_millis(110), "{elapsed:?}");
    }

    #[tokio::test]
    async fn unstructured_429_reports_status_and_raw_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("Too Many Requests"))
            .expect(5)
            .mount(&server)
            .await;

        let outcome = client_for(&server).chat("hello").await;
        assert_eq!(outcome.render(), "[Error 429]: Too Many Requests");
    }

    #[tokio::test]
    async fn recovers_after_transient_rate_limit() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("busy"))
            .up_to_n_times(2)
            .expect(2)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion("Rebalanced.")))
            .expect(1)
            .mount(&server)
            .await;

        let outcome = client_for(&server).chat("hello").await;
        assert_eq!(outcome.reply(), Some("Rebalanced."));
    }

    #[tokio::test]
    async fn other_errors_are_terminal_on_first_attempt() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "error": { "code": "invalid_api_key", "message": "Incorrect API key provided" }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let outcome = client_for(&server).chat("hello").await;
        assert_eq!(
            outcome.render(),
            "[Error invalid_api_key]: Incorrect API key provided"
        );
    }

    #[tokio::test]
    async fn server_error_without_envelope_uses_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
            .expect(1)
            .mount(&server)
            .await;

        let outcome = client_for(&server).chat("hello").await;
        assert_eq!(
            outcome,
            ChatOutcome::Failed {
                code: "502".into(),
                message: "Bad Gateway".into()
            }
        );
    }

    #[tokio::test]
    async fn success_without_choices_is_a_failure_value() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
            .mount(&server)
            .await;

        let outcome = client_for(&server).chat("hello").await;
        assert!(matches!(outcome, ChatOutcome::Failed { ref code, .. } if code == "200"));
    }

    #[tokio::test]
    async fn transport_failures_are_reported_not_raised() {
        let config = ClientConfig::default()
            .with_endpoint("http://127.0.0.1:9/v1/chat/completions")
            .with_timeout(Duration::from_secs(2))
            .with_retry(fast_retry());
        let client = ChatClient::new("test-key", config).unwrap();

        let outcome = client.chat("hello").await;
        assert!(matches!(outcome, ChatOutcome::Failed { ref code, .. } if code == "transport"));
    }

    #[tokio::test]
    async fn concurrent_calls_keep_independent_retry_state() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("busy"))
            .expect(10)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let (first, second) = tokio::join!(client.chat("a"), client.chat("b"));
        assert_eq!(first.render(), "[Error 429]: busy");
        assert_eq!(second.render(), "[Error 429]: busy");
    }

    #[tokio::test]
    async fn conversation_records_successful_replies() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion("Move gym to mornings.")))
            .mount(&server)
            .await;

        let mut conversation = Conversation::new("You are a helpful productivity AI assistant.");
        conversation.push_user("Total tasks/events: 3");
        let outcome = client_for(&server)
            .continue_conversation(&mut conversation)
            .await;

        assert!(outcome.is_reply());
        assert!(conversation
            .render_prompt()
            .contains("[Assistant]: Move gym to mornings."));
    }

    #[test]
    fn blank_credential_is_rejected_up_front() {
        let err = ChatClient::new("  ", ClientConfig::default()).unwrap_err();
        assert!(matches!(err, ChatError::MissingCredential));
        assert_eq!(
            err.to_string(),
            "Please set the OPENAI_API_KEY environment variable."
        );
    }

    #[test]
    fn debug_output_hides_the_credential() {
        let client = ChatClient::new("sk-secret", ClientConfig::default()).unwrap();
        let rendered = format!("{client:?}");
        assert!(!rendered.contains("sk-secret"));
    }
}
