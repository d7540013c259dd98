//! LLM client for chat-completion endpoints.
//!
//! Speaks the OpenAI-compatible wire format (Groq by default). Every call
//! yields a tagged [`LlmResult`]; nothing is reported through the answer text.

use crate::config::LlmConfig;
use crate::retry::RetryPolicy;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// User-Agent string identifying this client
const USER_AGENT: &str = concat!("bid-analyser/", env!("CARGO_PKG_VERSION"));

const SYSTEM_PROMPT: &str =
    "You are a helpful assistant that answers questions based on document content.";

/// Outcome of a single completion.
pub type LlmResult = Result<String, LlmError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LlmError {
    #[error("API key not configured: set {0}")]
    MissingApiKey(String),
    #[error("no document context supplied")]
    EmptyContext,
    #[error("rate limited by API: {body}")]
    RateLimited { body: String },
    #[error("authorization rejected ({status}): {body}")]
    Unauthorized { status: u16, body: String },
    #[error("API error ({status}): {body}")]
    Http { status: u16, body: String },
    #[error("malformed response: {0}")]
    MalformedResponse(String),
    #[error("request failed: {0}")]
    Transport(String),
}

/// Coarse classification of an [`LlmError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Input,
    RateLimit,
    Auth,
    Http,
    MalformedResponse,
    Transport,
}

impl LlmError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LlmError::MissingApiKey(_) => ErrorKind::Configuration,
            LlmError::EmptyContext => ErrorKind::Input,
            LlmError::RateLimited { .. } => ErrorKind::RateLimit,
            LlmError::Unauthorized { .. } => ErrorKind::Auth,
            LlmError::Http { .. } => ErrorKind::Http,
            LlmError::MalformedResponse(_) => ErrorKind::MalformedResponse,
            LlmError::Transport(_) => ErrorKind::Transport,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Configuration => "configuration-error",
            ErrorKind::Input => "input-error",
            ErrorKind::RateLimit => "rate-limit",
            ErrorKind::Auth => "auth-error",
            ErrorKind::Http => "http-error",
            ErrorKind::MalformedResponse => "malformed-response",
            ErrorKind::Transport => "transport-error",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum TransportError {
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("{0}")]
    Other(String),
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    fn new(role: &str, content: impl Into<String>) -> Self {
        Self {
            role: role.to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Option<Vec<ChatChoice>>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

/// Status and body of one HTTP exchange.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Sends one chat request and returns the raw response.
pub trait Transport {
    fn send(
        &self,
        request: &ChatRequest,
        api_key: &str,
    ) -> impl Future<Output = Result<RawResponse, TransportError>> + Send;
}

/// reqwest-backed transport with a fixed per-request timeout.
pub struct HttpTransport {
    client: Client,
    url: String,
}

impl HttpTransport {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

impl Transport for HttpTransport {
    async fn send(
        &self,
        request: &ChatRequest,
        api_key: &str,
    ) -> Result<RawResponse, TransportError> {
        let response = self
            .client
            .post(&self.url)
            .bearer_auth(api_key)
            .json(request)
            .send()
            .await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(RawResponse { status, body })
    }
}

/// Chat-completion client with bounded retries.
pub struct LlmClient<T = HttpTransport> {
    transport: T,
    api_key: Option<String>,
    api_key_env: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
    policy: RetryPolicy,
}

impl LlmClient<HttpTransport> {
    /// Build a client that talks to the configured endpoint over HTTP
    pub fn from_config(config: &LlmConfig) -> Result<Self, TransportError> {
        let transport = HttpTransport::new(&config.api_url, config.timeout())?;
        Ok(Self::with_transport(transport, config))
    }
}

impl<T: Transport> LlmClient<T> {
    pub fn with_transport(transport: T, config: &LlmConfig) -> Self {
        Self {
            transport,
            api_key: config.api_key.clone(),
            api_key_env: config.api_key_env.clone(),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            policy: RetryPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Ask `prompt` against a document `context`.
    pub async fn complete(&self, prompt: &str, context: &str, max_retries: u32) -> LlmResult {
        if context.trim().is_empty() {
            // Credential problems still win so the user sees the actionable error.
            self.api_key()?;
            return Err(LlmError::EmptyContext);
        }
        let user = format!("Document:\n{}\n\nQuestion: {}", context, prompt);
        self.execute(user, max_retries).await
    }

    /// Send a prompt that carries everything it needs, with no document context.
    pub async fn complete_standalone(&self, prompt: &str, max_retries: u32) -> LlmResult {
        self.execute(prompt.to_string(), max_retries).await
    }

    fn api_key(&self) -> Result<&str, LlmError> {
        self.api_key
            .as_deref()
            .ok_or_else(|| LlmError::MissingApiKey(self.api_key_env.clone()))
    }

    fn build_request(&self, user: String) -> ChatRequest {
        ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage::new("system", SYSTEM_PROMPT),
                ChatMessage::new("user", user),
            ],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }

    async fn execute(&self, user: String, max_retries: u32) -> LlmResult {
        let api_key = self.api_key()?;
        let request = self.build_request(user);
        let attempts = max_retries.max(1);

        let mut attempt = 1;
        loop {
            let error = match self.transport.send(&request, api_key).await {
                Ok(response) => match interpret(response) {
                    Ok(text) => {
                        debug!(attempt, chars = text.len(), "completion succeeded");
                        return Ok(text);
                    }
                    Err(e) => e,
                },
                Err(e) => LlmError::Transport(e.to_string()),
            };

            let delay = match self.policy.delay_after(attempt, &error) {
                Some(delay) if attempt < attempts => delay,
                _ => {
                    warn!(attempt, kind = %error.kind(), "LLM call failed: {}", error);
                    return Err(error);
                }
            };

            warn!(
                attempt,
                kind = %error.kind(),
                "LLM call failed, retrying in {:?}: {}",
                delay,
                error
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }
}

/// Map a raw HTTP exchange to a completion or a typed failure.
fn interpret(response: RawResponse) -> LlmResult {
    match response.status {
        200..=299 => {}
        429 => {
            return Err(LlmError::RateLimited {
                body: response.body,
            })
        }
        401 | 403 => {
            return Err(LlmError::Unauthorized {
                status: response.status,
                body: response.body,
            })
        }
        status => {
            return Err(LlmError::Http {
                status,
                body: response.body,
            })
        }
    }

    let parsed: ChatResponse = serde_json::from_str(&response.body)
        .map_err(|e| LlmError::MalformedResponse(e.to_string()))?;

    if let Some(error) = parsed.error {
        return Err(LlmError::MalformedResponse(format!(
            "API error: {}",
            error.message
        )));
    }

    parsed
        .choices
        .and_then(|choices| choices.into_iter().next())
        .and_then(|choice| choice.message.content)
        .filter(|content| !content.trim().is_empty())
        .ok_or_else(|| LlmError::MalformedResponse("empty or missing choices[0].message.content".into()))
}
