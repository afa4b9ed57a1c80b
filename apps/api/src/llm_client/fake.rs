//! In-memory inference fake (testing only).
//!
//! `ScriptedInference` answers calls from a queue of scripted replies and
//! records every request, so tests can assert on call counts and payloads.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use super::{InferenceClient, InferenceRequest, LlmError};

#[derive(Debug, Clone)]
pub enum Reply {
    Text(String),
    /// Endpoint error; `None` means no message was supplied.
    Remote(Option<String>),
    /// Response without a usable content block.
    Empty,
    /// Sleep first, then answer with the inner reply.
    Delayed(Duration, Box<Reply>),
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Reply::Text(text.into())
    }
}

#[derive(Debug, Default)]
pub struct ScriptedInference {
    replies: Mutex<VecDeque<Reply>>,
    requests: Mutex<Vec<InferenceRequest>>,
    calls: AtomicUsize,
}

impl ScriptedInference {
    pub fn new(replies: Vec<Reply>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            ..Self::default()
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<InferenceRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl InferenceClient for ScriptedInference {
    async fn send(&self, request: InferenceRequest) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request);

        let mut reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Reply::Remote(Some("no scripted reply".to_string())));

        loop {
            match reply {
                Reply::Text(text) => return Ok(text),
                Reply::Remote(message) => return Err(LlmError::Api { status: 500, message }),
                Reply::Empty => return Err(LlmError::EmptyContent),
                Reply::Delayed(delay, inner) => {
                    tokio::time::sleep(delay).await;
                    reply = *inner;
                }
            }
        }
    }
}
