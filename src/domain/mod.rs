//! Domain layer: the vocabulary and pure logic of guide generation.
//!
//! # Module Organization
//!
//! - `request` - What the player asked for ([`GuideRequest`], [`OutputStyle`])
//! - `prompt` - Prompt assembly shared by every candidate in a run
//! - `chain` - Provider fallback chain and its flattened entries
//! - `outcome` - Generated results, citations, and terminal outcomes
//! - `evaluator` - Deterministic candidate scoring and winner selection
//!
//! Everything here is synchronous and free of I/O; the engine layer drives
//! it from async tasks.

mod chain;
mod errors;
mod evaluator;
mod outcome;
mod prompt;
mod request;
mod time;

pub use chain::{ChainEntry, CredentialRef, ProviderChain, ProviderKind, ProviderSpec};
pub use errors::ValidationError;
pub use evaluator::{Evaluator, ScoreFactor, ScoredCandidate, ScoringConfig};
pub use outcome::{Citation, GenerationResult, PipelineOutcome, RunId};
pub use prompt::PromptBundle;
pub use request::{GuideRequest, OutputStyle};
pub use time::Timestamp;
