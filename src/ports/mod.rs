//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the engine and the outside world. Adapters implement these ports.
//!
//! - `ProviderTransport` - One generation call to one AI vendor
//! - `CredentialStore` - Resolving credential references to secret values

mod credentials;
mod transport;

pub use credentials::CredentialStore;
pub use transport::{ProviderFailure, ProviderTransport, RawReply, TransportRequest};
