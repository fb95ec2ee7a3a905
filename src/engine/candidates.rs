//! Candidate generation: independent fallback walks, bounded concurrency.

use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;

use crate::domain::{PromptBundle, ProviderChain};

use super::events::{EventSink, RunEvent};
use super::fallback::{ChainOutcome, FallbackOrchestrator};

/// Runs several independent fallback walks over the same chain and gathers
/// their outcomes.
///
/// Every candidate starts at the top of the chain with the same prompt; a
/// semaphore bounds how many walks run at once. Outcomes come back in
/// candidate-slot order, not completion order, so downstream evaluation is
/// insensitive to timing.
pub struct CandidateGenerator {
    orchestrator: Arc<FallbackOrchestrator>,
    count: usize,
    concurrency: usize,
}

impl CandidateGenerator {
    /// Creates a generator for `count` candidates with at most
    /// `concurrency` walks in flight. Both are clamped to at least one.
    pub fn new(orchestrator: FallbackOrchestrator, count: usize, concurrency: usize) -> Self {
        let count = count.max(1);
        Self {
            orchestrator: Arc::new(orchestrator),
            count,
            concurrency: concurrency.clamp(1, count),
        }
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// Gathers candidates without progress events or cancellation.
    pub async fn generate_candidates(
        &self,
        chain: &ProviderChain,
        prompt: &PromptBundle,
    ) -> Vec<ChainOutcome> {
        let (events, _rx) = EventSink::channel();
        self.generate(chain, prompt, &events, &CancellationToken::new())
            .await
    }

    /// Gathers candidates for one run, reporting per-candidate progress.
    ///
    /// Cancellation is observed before each walk starts; walks already in
    /// flight run to their next check and their outcomes are discarded by
    /// the caller.
    pub(crate) async fn generate(
        &self,
        chain: &ProviderChain,
        prompt: &PromptBundle,
        events: &EventSink,
        cancel: &CancellationToken,
    ) -> Vec<ChainOutcome> {
        let semaphore = Arc::new(Semaphore::new(self.concurrency));

        let walks = (0..self.count).map(|slot| {
            let semaphore = Arc::clone(&semaphore);
            let orchestrator = Arc::clone(&self.orchestrator);
            async move {
                // The semaphore is never closed, so this only fails if the
                // runtime is tearing down.
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    return ChainOutcome::Exhausted { attempts: 0 };
                };
                if cancel.is_cancelled() {
                    return ChainOutcome::Exhausted { attempts: 0 };
                }

                let outcome = orchestrator.run(chain, prompt, slot, events, cancel).await;
                if !cancel.is_cancelled() {
                    events.emit(RunEvent::CandidateFinished {
                        candidate: slot,
                        succeeded: outcome.is_success(),
                    });
                }
                outcome
            }
        });

        futures::future::join_all(walks).await
    }
}
