//! Fallback orchestration: one candidate's walk down the provider chain.

use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::domain::{ChainEntry, GenerationResult, PromptBundle, ProviderChain};

use super::events::{EventSink, RunEvent};
use super::executor::RequestExecutor;

/// Outcome of one walk down the fallback chain.
#[derive(Debug, Clone)]
pub enum ChainOutcome {
    /// Some entry produced a usable result.
    Succeeded(GenerationResult),
    /// Every reachable entry failed.
    Exhausted { attempts: usize },
}

impl ChainOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded(_))
    }

    pub fn into_result(self) -> Option<GenerationResult> {
        match self {
            Self::Succeeded(result) => Some(result),
            Self::Exhausted { .. } => None,
        }
    }
}

/// Walks the chain in order until an entry succeeds or the chain runs out.
///
/// The failure classification decides the step size: an invalid credential
/// skips forward to the next entry holding a different credential, since
/// retrying the same rejected credential cannot succeed; every other
/// classification advances by one. The walk never revisits an entry.
pub struct FallbackOrchestrator {
    executor: RequestExecutor,
}

impl FallbackOrchestrator {
    pub fn new(executor: RequestExecutor) -> Self {
        Self { executor }
    }

    /// Walks the chain once, without progress events or cancellation.
    pub async fn execute_chain(
        &self,
        chain: &ProviderChain,
        prompt: &PromptBundle,
    ) -> ChainOutcome {
        let (events, _rx) = EventSink::channel();
        self.run(chain, prompt, 0, &events, &CancellationToken::new())
            .await
    }

    /// Walks the chain for one candidate slot, reporting progress.
    ///
    /// Checks for cancellation before each attempt; a cancelled walk stops
    /// where it is and reports exhaustion, which the caller discards.
    pub(crate) async fn run(
        &self,
        chain: &ProviderChain,
        prompt: &PromptBundle,
        candidate: usize,
        events: &EventSink,
        cancel: &CancellationToken,
    ) -> ChainOutcome {
        let entries = chain.entries();
        let mut attempts = 0;
        let mut index = 0;

        while index < entries.len() {
            if cancel.is_cancelled() {
                return ChainOutcome::Exhausted { attempts };
            }

            let entry = &entries[index];
            events.emit(RunEvent::TryingEntry {
                candidate,
                index: entry.index(),
                provider: entry.provider(),
                model: entry.model().to_string(),
            });
            attempts += 1;

            match self.executor.execute(entry, prompt).await {
                Ok(result) => return ChainOutcome::Succeeded(result),
                Err(failure) => {
                    warn!(
                        candidate,
                        entry = %entry,
                        classification = failure.classification(),
                        "chain entry failed: {failure}"
                    );
                    events.emit(RunEvent::EntryFailed {
                        candidate,
                        index: entry.index(),
                        provider: entry.provider(),
                        model: entry.model().to_string(),
                        classification: failure.classification().to_string(),
                        reason: failure.to_string(),
                    });

                    index = if failure.is_credential() {
                        next_differing_credential(entries, index)
                    } else {
                        index + 1
                    };
                }
            }
        }

        ChainOutcome::Exhausted { attempts }
    }
}

/// First position after `index` whose credential differs from the entry
/// that just failed; `entries.len()` when none remains.
fn next_differing_credential(entries: &[ChainEntry], index: usize) -> usize {
    let failing = entries[index].credential();
    entries[index + 1..]
        .iter()
        .position(|entry| entry.credential() != failing)
        .map(|offset| index + 1 + offset)
        .unwrap_or(entries.len())
}
