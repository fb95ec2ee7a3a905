//! Orchestration of guide-generation runs.
//!
//! The engine walks the provider chain with per-entry fallback, generates
//! several candidate replies in parallel, and scores them into a single
//! outcome. Each submitted request becomes an isolated run that reports
//! progress through an event stream.

mod candidates;
mod events;
mod executor;
mod fallback;
mod runner;

pub use candidates::CandidateGenerator;
pub use events::{EngineError, RunEvent, RunOutcome};
pub use executor::{RequestExecutor, TransportRegistry};
pub use fallback::{ChainOutcome, FallbackOrchestrator};
pub use runner::{GuideEngine, RunHandle};
