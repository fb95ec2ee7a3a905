//! Adapters - Implementations of port interfaces.
//!
//! ## Provider Transports
//!
//! - `GeminiTransport` - Google Generative Language API, with search grounding
//! - `OpenAiTransport` - OpenAI Chat Completions API
//! - `AnthropicTransport` - Anthropic Messages API
//! - `MockTransport` - Scripted transport for testing
//!
//! ## Credential Stores
//!
//! - `InMemoryCredentialStore` - Map-backed store built at startup

mod anthropic;
mod credentials;
mod gemini;
mod mock;
mod openai;

pub use anthropic::{AnthropicConfig, AnthropicTransport};
pub use credentials::InMemoryCredentialStore;
pub use gemini::{GeminiConfig, GeminiTransport};
pub use mock::{MockReply, MockTransport, RecordedCall};
pub use openai::{OpenAiConfig, OpenAiTransport};
