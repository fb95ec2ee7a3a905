//! Request execution: exactly one provider call per chain entry.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::debug;

use crate::domain::{ChainEntry, GenerationResult, PromptBundle, ProviderKind};
use crate::ports::{CredentialStore, ProviderFailure, ProviderTransport, TransportRequest};

/// Transport lookup table, one transport per provider kind.
#[derive(Clone, Default)]
pub struct TransportRegistry {
    transports: HashMap<ProviderKind, Arc<dyn ProviderTransport>>,
}

impl TransportRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a transport under its own kind, replacing any previous one.
    pub fn with_transport(mut self, transport: Arc<dyn ProviderTransport>) -> Self {
        self.transports.insert(transport.kind(), transport);
        self
    }

    pub fn get(&self, kind: ProviderKind) -> Option<Arc<dyn ProviderTransport>> {
        self.transports.get(&kind).cloned()
    }

    pub fn len(&self) -> usize {
        self.transports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transports.is_empty()
    }
}

/// Executes a single generation attempt against one chain entry.
///
/// Resolves the entry's credential, dispatches one transport call under the
/// per-request timeout, and normalizes the reply. No retries happen here;
/// whether and where to try again is the orchestrator's decision.
pub struct RequestExecutor {
    transports: TransportRegistry,
    credentials: Arc<dyn CredentialStore>,
    request_timeout: Duration,
    grounding: bool,
}

impl RequestExecutor {
    pub fn new(transports: TransportRegistry, credentials: Arc<dyn CredentialStore>) -> Self {
        Self {
            transports,
            credentials,
            request_timeout: Duration::from_secs(30),
            grounding: true,
        }
    }

    /// Sets the per-call timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Enables or disables search grounding on supporting transports.
    pub fn with_grounding(mut self, grounding: bool) -> Self {
        self.grounding = grounding;
        self
    }

    /// Performs one generation call for a chain entry.
    ///
    /// Timeouts classify as transient network failures; a reply whose text
    /// is empty after trimming classifies as malformed.
    pub async fn execute(
        &self,
        entry: &ChainEntry,
        prompt: &PromptBundle,
    ) -> Result<GenerationResult, ProviderFailure> {
        let transport = self.transports.get(entry.provider()).ok_or_else(|| {
            ProviderFailure::provider_unavailable(format!(
                "no transport registered for {}",
                entry.provider()
            ))
        })?;

        let credential = self
            .credentials
            .lookup(entry.credential())
            .await
            .ok_or_else(|| {
                ProviderFailure::invalid_credential(format!(
                    "no credential configured under '{}'",
                    entry.credential()
                ))
            })?;

        let request = TransportRequest {
            model: entry.model().to_string(),
            system_prompt: prompt.system_prompt().to_string(),
            user_prompt: prompt.user_prompt().to_string(),
            grounding: self.grounding,
            credential,
        };

        debug!(provider = %entry.provider(), model = entry.model(), "dispatching generation call");

        let reply = match timeout(self.request_timeout, transport.generate(request)).await {
            Ok(result) => result?,
            Err(_) => {
                return Err(ProviderFailure::transient_network(format!(
                    "no reply within {}s",
                    self.request_timeout.as_secs()
                )));
            }
        };

        let text = reply.text.trim();
        if text.is_empty() {
            return Err(ProviderFailure::malformed_response(
                "provider returned empty text",
            ));
        }

        Ok(GenerationResult::new(text, reply.citations, entry.clone()))
    }
}
