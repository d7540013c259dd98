//! In-memory transports for exercising the pipeline without a network.

use crate::agent::{ChatRequest, RawResponse, Transport, TransportError};
use std::collections::VecDeque;
use std::sync::Mutex;
use tokio::time::Instant;

/// Body of a successful completion returning `content`.
pub fn completion(content: &str) -> RawResponse {
    let body = serde_json::json!({
        "choices": [{"message": {"role": "assistant", "content": content}}]
    });
    RawResponse::new(200, body.to_string())
}

/// Replays a fixed sequence of responses, one per call.
pub struct ScriptedTransport {
    script: Mutex<VecDeque<Result<RawResponse, TransportError>>>,
    requests: Mutex<Vec<ChatRequest>>,
    sent_at: Mutex<Vec<Instant>>,
}

impl ScriptedTransport {
    pub fn new(script: Vec<Result<RawResponse, TransportError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            requests: Mutex::new(Vec::new()),
            sent_at: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Clock reading at each call, in call order.
    pub fn sent_at(&self) -> Vec<Instant> {
        self.sent_at.lock().unwrap().clone()
    }

    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Text of the user message of every request, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.requests()
            .into_iter()
            .map(|request| {
                request
                    .messages
                    .last()
                    .map(|m| m.content.clone())
                    .unwrap_or_default()
            })
            .collect()
    }
}

impl Transport for ScriptedTransport {
    async fn send(
        &self,
        request: &ChatRequest,
        _api_key: &str,
    ) -> Result<RawResponse, TransportError> {
        self.sent_at.lock().unwrap().push(Instant::now());
        self.requests.lock().unwrap().push(request.clone());
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Other("script exhausted".into())))
    }
}
