//! Pipeline runner: accepts requests, spawns runs, hands back handles.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::adapters::{
    AnthropicConfig, AnthropicTransport, GeminiConfig, GeminiTransport, InMemoryCredentialStore,
    OpenAiConfig, OpenAiTransport,
};
use crate::config::{EngineConfig, ValidationError};
use crate::domain::{
    Evaluator, GuideRequest, PromptBundle, ProviderChain, ProviderKind, RunId, Timestamp,
};
use crate::ports::CredentialStore;

use super::candidates::CandidateGenerator;
use super::events::{EngineError, EventSink, RunEvent, RunOutcome};
use super::executor::{RequestExecutor, TransportRegistry};
use super::fallback::{ChainOutcome, FallbackOrchestrator};

/// Handle to one in-flight pipeline run.
///
/// Streams the run's events and owns its cancellation token. Unconsumed
/// events are buffered; dropping the handle abandons the stream but does
/// not stop the run. Cancellation is always explicit via [`Self::cancel`].
pub struct RunHandle {
    run_id: RunId,
    events: mpsc::UnboundedReceiver<RunEvent>,
    cancel: CancellationToken,
}

impl RunHandle {
    pub fn run_id(&self) -> RunId {
        self.run_id
    }

    /// Receives the next event, or `None` once the stream has ended.
    pub async fn next_event(&mut self) -> Option<RunEvent> {
        self.events.recv().await
    }

    /// Requests cancellation. Idempotent, and safe to call at any point,
    /// including after the run has already finished.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Drains remaining events and returns how the run ended.
    ///
    /// Returns `None` only if the run task disappeared without a terminal
    /// event, which does not happen in normal operation.
    pub async fn wait(mut self) -> Option<RunOutcome> {
        while let Some(event) = self.events.recv().await {
            match event {
                RunEvent::Completed { outcome, .. } => {
                    return Some(RunOutcome::Completed(outcome))
                }
                RunEvent::Failed { error, .. } => return Some(RunOutcome::Failed(error)),
                RunEvent::Cancelled { .. } => return Some(RunOutcome::Cancelled),
                _ => {}
            }
        }
        None
    }
}

/// The guide-generation engine: chain, transports, and evaluator wired
/// together behind a submit-and-watch API.
///
/// `submit` is cheap and non-blocking. Every call spawns an independent
/// run; concurrent runs share nothing but the (immutable) wiring, so one
/// run's failure or cancellation never affects another.
pub struct GuideEngine {
    chain: Arc<ProviderChain>,
    generator: Arc<CandidateGenerator>,
    evaluator: Arc<Evaluator>,
    run_timeout: Duration,
}

impl GuideEngine {
    /// Wires an engine from explicit parts.
    pub fn new(
        chain: ProviderChain,
        transports: TransportRegistry,
        credentials: Arc<dyn CredentialStore>,
        config: &EngineConfig,
    ) -> Self {
        let executor = RequestExecutor::new(transports, credentials)
            .with_request_timeout(config.pipeline.request_timeout())
            .with_grounding(config.pipeline.grounding);
        let generator = CandidateGenerator::new(
            FallbackOrchestrator::new(executor),
            config.pipeline.candidates,
            config.pipeline.concurrency_limit(),
        );

        Self {
            chain: Arc::new(chain),
            generator: Arc::new(generator),
            evaluator: Arc::new(Evaluator::new(config.scoring.clone())),
            run_timeout: config.pipeline.run_timeout(),
        }
    }

    /// Builds a fully wired engine from configuration: the real transport
    /// for every supported provider, credentials from provider settings,
    /// and the chain in configured order.
    ///
    /// # Errors
    ///
    /// Returns a validation error when the configuration is unusable, for
    /// instance when no provider has a credential.
    pub fn from_config(config: &EngineConfig) -> Result<Self, ValidationError> {
        config.validate()?;
        let chain = config.providers.provider_chain()?;

        let transports = TransportRegistry::new()
            .with_transport(Arc::new(GeminiTransport::new(GeminiConfig::default())))
            .with_transport(Arc::new(OpenAiTransport::new(OpenAiConfig::default())))
            .with_transport(Arc::new(AnthropicTransport::new(AnthropicConfig::default())));

        let mut store = InMemoryCredentialStore::new();
        for kind in ProviderKind::ALL {
            if let Some(key) = config.providers.api_key(kind) {
                store = store.with_credential(kind.as_str(), key);
            }
        }

        Ok(Self::new(chain, transports, Arc::new(store), config))
    }

    /// The chain this engine walks.
    pub fn chain(&self) -> &ProviderChain {
        &self.chain
    }

    /// Starts a pipeline run for a request and returns its handle.
    pub fn submit(&self, request: GuideRequest) -> RunHandle {
        let run_id = RunId::new();
        let (sink, events) = EventSink::channel();
        let cancel = CancellationToken::new();

        let task = PipelineTask {
            run_id,
            chain: Arc::clone(&self.chain),
            generator: Arc::clone(&self.generator),
            evaluator: Arc::clone(&self.evaluator),
            run_timeout: self.run_timeout,
            request,
            sink,
            cancel: cancel.clone(),
        };
        tokio::spawn(task.run());

        RunHandle {
            run_id,
            events,
            cancel,
        }
    }
}

/// One spawned run, owning everything it needs.
struct PipelineTask {
    run_id: RunId,
    chain: Arc<ProviderChain>,
    generator: Arc<CandidateGenerator>,
    evaluator: Arc<Evaluator>,
    run_timeout: Duration,
    request: GuideRequest,
    sink: EventSink,
    cancel: CancellationToken,
}

impl PipelineTask {
    async fn run(self) {
        if self.chain.is_empty() {
            warn!(run_id = %self.run_id, "rejecting run: provider chain is empty");
            self.sink.emit(RunEvent::Failed {
                error: EngineError::EmptyChain,
                at: Timestamp::now(),
            });
            return;
        }

        info!(
            run_id = %self.run_id,
            game = self.request.game_title(),
            candidates = self.generator.count(),
            "starting guide generation run"
        );
        self.sink.emit(RunEvent::Started {
            run_id: self.run_id,
            at: Timestamp::now(),
        });

        let prompt = PromptBundle::from_request(&self.request);
        let timeout_secs = self.run_timeout.as_secs();

        let work = async {
            let outcomes = self
                .generator
                .generate(&self.chain, &prompt, &self.sink, &self.cancel)
                .await;

            // Cancellation observed here discards every gathered result.
            if self.cancel.is_cancelled() {
                return None;
            }

            let results: Vec<_> = outcomes
                .into_iter()
                .filter_map(ChainOutcome::into_result)
                .collect();
            self.sink.emit(RunEvent::Evaluating {
                gathered: results.len(),
            });

            Some(self.evaluator.evaluate(&results))
        };

        match timeout(self.run_timeout, work).await {
            Ok(Some(outcome)) => {
                info!(run_id = %self.run_id, reliable = outcome.is_guide(), "run completed");
                self.sink.emit(RunEvent::Completed {
                    outcome,
                    at: Timestamp::now(),
                });
            }
            Ok(None) => {
                info!(run_id = %self.run_id, "run cancelled");
                self.sink.emit(RunEvent::Cancelled {
                    at: Timestamp::now(),
                });
            }
            Err(_) => {
                warn!(run_id = %self.run_id, timeout_secs, "run timed out");
                self.sink.emit(RunEvent::Failed {
                    error: EngineError::RunTimeout { timeout_secs },
                    at: Timestamp::now(),
                });
            }
        }
    }
}
