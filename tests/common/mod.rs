#![allow(dead_code)]
use lenorefin_client::http::{ApiRequest, Transport};
use lenorefin_client::{ApiError, Session, SessionOptions};
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Transport double: answers from a queue of canned responses and records
/// every request it sees. An empty queue answers `{}`.
#[derive(Clone, Default)]
pub struct RecordingTransport {
    responses: Arc<Mutex<VecDeque<Result<Value, ApiError>>>>,
    calls: Arc<Mutex<Vec<ApiRequest>>>,
}

impl RecordingTransport {
    pub fn with_responses(responses: Vec<Result<Value, ApiError>>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::from(responses))),
            ..Default::default()
        }
    }

    pub async fn push(&self, response: Result<Value, ApiError>) {
        self.responses.lock().await.push_back(response);
    }

    pub async fn calls(&self) -> Vec<ApiRequest> {
        self.calls.lock().await.clone()
    }

    /// Recorded requests, ignoring audit log posts.
    pub async fn api_calls(&self) -> Vec<ApiRequest> {
        self.calls()
            .await
            .into_iter()
            .filter(|c| c.path != lenorefin_client::audit::LOG_ENTRY_PATH)
            .collect()
    }

    pub async fn count(&self, path: &str) -> usize {
        self.calls().await.iter().filter(|c| c.path == path).count()
    }
}

#[async_trait::async_trait]
impl Transport for RecordingTransport {
    async fn send(&self, request: ApiRequest) -> Result<Value, ApiError> {
        self.calls.lock().await.push(request);
        let mut guard = self.responses.lock().await;
        guard.pop_front().unwrap_or_else(|| Ok(json!({})))
    }
}

pub fn session(transport: &RecordingTransport) -> Session {
    session_with(transport, SessionOptions::default())
}

pub fn session_with(transport: &RecordingTransport, options: SessionOptions) -> Session {
    Session::new(Arc::new(transport.clone()), options)
}

pub fn status(code: u16, body: &str) -> ApiError {
    ApiError::Response {
        status: code,
        headers: vec![],
        body: body.to_string(),
    }
}
