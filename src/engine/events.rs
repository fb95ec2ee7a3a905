//! Run events and terminal outcomes.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::mpsc;

use crate::domain::{PipelineOutcome, ProviderKind, RunId, Timestamp};

/// Fatal pipeline errors that end a run without an outcome.
#[derive(Debug, Clone, Error, PartialEq, Serialize, Deserialize)]
#[serde(tag = "error", rename_all = "snake_case")]
pub enum EngineError {
    /// The flattened provider chain had no entries.
    #[error("provider chain is empty; configure at least one provider")]
    EmptyChain,

    /// The run exceeded its wall-clock budget.
    #[error("run timed out after {timeout_secs}s")]
    RunTimeout { timeout_secs: u64 },
}

impl EngineError {
    /// Stable snake_case label for events and logs.
    pub fn classification(&self) -> &'static str {
        match self {
            Self::EmptyChain => "configuration_error",
            Self::RunTimeout { .. } => "transient_network",
        }
    }
}

/// Progress and terminal events for one pipeline run.
///
/// Every run's stream ends with exactly one terminal event: `Completed`,
/// `Failed`, or `Cancelled`. Progress events may be dropped by a consumer
/// without affecting the run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RunEvent {
    /// The run was accepted and work began.
    Started { run_id: RunId, at: Timestamp },

    /// A candidate is about to try one chain entry.
    TryingEntry {
        candidate: usize,
        index: usize,
        provider: ProviderKind,
        model: String,
    },

    /// A chain entry failed; the candidate moves on per the classification.
    EntryFailed {
        candidate: usize,
        index: usize,
        provider: ProviderKind,
        model: String,
        classification: String,
        reason: String,
    },

    /// A candidate finished its walk down the chain.
    CandidateFinished { candidate: usize, succeeded: bool },

    /// All candidates are in; scoring begins.
    Evaluating { gathered: usize },

    /// Terminal: the pipeline produced an outcome.
    Completed { outcome: PipelineOutcome, at: Timestamp },

    /// Terminal: the pipeline could not produce an outcome.
    Failed { error: EngineError, at: Timestamp },

    /// Terminal: cancellation was observed; any in-flight results were
    /// discarded.
    Cancelled { at: Timestamp },
}

impl RunEvent {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Completed { .. } | Self::Failed { .. } | Self::Cancelled { .. }
        )
    }
}

/// How a finished run ended, distilled from its terminal event.
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    Completed(PipelineOutcome),
    Failed(EngineError),
    Cancelled,
}

/// Sending half of a run's event stream.
///
/// Sends never block, and sending after the receiver is gone is a no-op: a
/// consumer that stopped listening must not stall the pipeline.
#[derive(Clone)]
pub(crate) struct EventSink {
    tx: mpsc::UnboundedSender<RunEvent>,
}

impl EventSink {
    pub(crate) fn channel() -> (Self, mpsc::UnboundedReceiver<RunEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub(crate) fn emit(&self, event: RunEvent) {
        let _ = self.tx.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_events() {
        assert!(RunEvent::Cancelled {
            at: Timestamp::now()
        }
        .is_terminal());
        assert!(RunEvent::Completed {
            outcome: PipelineOutcome::NoReliableHint,
            at: Timestamp::now(),
        }
        .is_terminal());
        assert!(RunEvent::Failed {
            error: EngineError::EmptyChain,
            at: Timestamp::now(),
        }
        .is_terminal());
        assert!(!RunEvent::Evaluating { gathered: 2 }.is_terminal());
        assert!(!RunEvent::CandidateFinished {
            candidate: 0,
            succeeded: true,
        }
        .is_terminal());
    }

    #[test]
    fn test_engine_error_classification() {
        assert_eq!(EngineError::EmptyChain.classification(), "configuration_error");
        assert_eq!(
            EngineError::RunTimeout { timeout_secs: 180 }.classification(),
            "transient_network"
        );
    }

    #[test]
    fn test_event_serialization_tag() {
        let event = RunEvent::Evaluating { gathered: 3 };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "evaluating");
        assert_eq!(json["gathered"], 3);
    }

    #[tokio::test]
    async fn test_emit_after_receiver_dropped_is_noop() {
        let (sink, rx) = EventSink::channel();
        drop(rx);
        sink.emit(RunEvent::Evaluating { gathered: 0 });
    }
}
