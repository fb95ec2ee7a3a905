//! Mock transport for testing.
//!
//! Configurable stand-in for the ProviderTransport port so pipeline tests
//! run without real provider calls.
//!
//! # Features
//!
//! - Scripted replies and failures, queued per model
//! - Simulated latency for timeout and cancellation testing
//! - Call tracking for verifying fallback order
//!
//! # Example
//!
//! ```ignore
//! let transport = MockTransport::new(ProviderKind::Gemini)
//!     .with_failure("gemini-2.5-flash", ProviderFailure::quota_exhausted("429"))
//!     .with_reply("gemini-2.0-flash", "Pull the lever by the gate.");
//! ```

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::sleep;

use crate::domain::{Citation, ProviderKind};
use crate::ports::{ProviderFailure, ProviderTransport, RawReply, TransportRequest};

/// A scripted reply for one call.
#[derive(Debug, Clone)]
pub enum MockReply {
    Success {
        text: String,
        citations: Vec<Citation>,
    },
    Failure(ProviderFailure),
}

/// One recorded call. The credential is deliberately not recorded.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub model: String,
    pub user_prompt: String,
    pub grounding: bool,
}

/// Mock transport with per-model reply scripts.
///
/// Each model has its own queue, consumed in order; when a model's queue
/// runs dry the transport answers with the default reply text.
#[derive(Debug, Clone)]
pub struct MockTransport {
    kind: ProviderKind,
    scripts: Arc<Mutex<HashMap<String, VecDeque<MockReply>>>>,
    default_text: String,
    delay: Duration,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl MockTransport {
    pub fn new(kind: ProviderKind) -> Self {
        Self {
            kind,
            scripts: Arc::new(Mutex::new(HashMap::new())),
            default_text: "Mock guide reply with enough detail to pass the length check."
                .to_string(),
            delay: Duration::ZERO,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Queues a plain successful reply for a model.
    pub fn with_reply(self, model: impl Into<String>, text: impl Into<String>) -> Self {
        self.push(
            model,
            MockReply::Success {
                text: text.into(),
                citations: Vec::new(),
            },
        )
    }

    /// Queues a successful reply carrying citations.
    pub fn with_cited_reply(
        self,
        model: impl Into<String>,
        text: impl Into<String>,
        urls: &[&str],
    ) -> Self {
        self.push(
            model,
            MockReply::Success {
                text: text.into(),
                citations: urls.iter().map(|u| Citation::new(*u)).collect(),
            },
        )
    }

    /// Queues a failure for a model.
    pub fn with_failure(self, model: impl Into<String>, failure: ProviderFailure) -> Self {
        self.push(model, MockReply::Failure(failure))
    }

    /// Sets the text returned when a model's script queue is empty.
    pub fn with_default_reply(mut self, text: impl Into<String>) -> Self {
        self.default_text = text.into();
        self
    }

    /// Sets simulated latency per call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    fn push(self, model: impl Into<String>, reply: MockReply) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .entry(model.into())
            .or_default()
            .push_back(reply);
        self
    }

    fn next_reply(&self, model: &str) -> MockReply {
        self.scripts
            .lock()
            .unwrap()
            .get_mut(model)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| MockReply::Success {
                text: self.default_text.clone(),
                citations: Vec::new(),
            })
    }

    /// Returns the number of calls made to this transport.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Returns all recorded calls in order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Returns the models called, in call order.
    pub fn models_called(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|call| call.model.clone())
            .collect()
    }

    /// Clears the call history.
    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }
}

#[async_trait]
impl ProviderTransport for MockTransport {
    fn kind(&self) -> ProviderKind {
        self.kind
    }

    async fn generate(&self, request: TransportRequest) -> Result<RawReply, ProviderFailure> {
        self.calls.lock().unwrap().push(RecordedCall {
            model: request.model.clone(),
            user_prompt: request.user_prompt.clone(),
            grounding: request.grounding,
        });

        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }

        match self.next_reply(&request.model) {
            MockReply::Success { text, citations } => Ok(RawReply { text, citations }),
            MockReply::Failure(failure) => Err(failure),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::Secret;

    fn request(model: &str) -> TransportRequest {
        TransportRequest {
            model: model.to_string(),
            system_prompt: "system".to_string(),
            user_prompt: "user".to_string(),
            grounding: true,
            credential: Secret::new("key".to_string()),
        }
    }

    #[tokio::test]
    async fn test_scripted_replies_consumed_per_model() {
        let transport = MockTransport::new(ProviderKind::Gemini)
            .with_failure("m1", ProviderFailure::quota_exhausted("429"))
            .with_reply("m1", "second answer")
            .with_reply("m2", "other model");

        let first = transport.generate(request("m1")).await;
        assert!(matches!(first, Err(ProviderFailure::QuotaExhausted { .. })));

        let second = transport.generate(request("m1")).await.unwrap();
        assert_eq!(second.text, "second answer");

        let other = transport.generate(request("m2")).await.unwrap();
        assert_eq!(other.text, "other model");
    }

    #[tokio::test]
    async fn test_default_reply_after_script_runs_dry() {
        let transport =
            MockTransport::new(ProviderKind::OpenAi).with_default_reply("always this answer");

        let reply = transport.generate(request("any-model")).await.unwrap();
        assert_eq!(reply.text, "always this answer");

        let again = transport.generate(request("any-model")).await.unwrap();
        assert_eq!(again.text, "always this answer");
    }

    #[tokio::test]
    async fn test_calls_recorded_in_order() {
        let transport = MockTransport::new(ProviderKind::Gemini);

        transport.generate(request("m1")).await.unwrap();
        transport.generate(request("m2")).await.unwrap();

        assert_eq!(transport.call_count(), 2);
        assert_eq!(transport.models_called(), vec!["m1", "m2"]);
        assert!(transport.calls()[0].grounding);
    }

    #[tokio::test]
    async fn test_cited_reply_carries_citations() {
        let transport = MockTransport::new(ProviderKind::Gemini).with_cited_reply(
            "m1",
            "answer",
            &["https://a.example", "https://b.example"],
        );

        let reply = transport.generate(request("m1")).await.unwrap();
        assert_eq!(reply.citations.len(), 2);
    }
}
