//! Credential store port.

use async_trait::async_trait;
use secrecy::Secret;

use crate::domain::CredentialRef;

/// Port for resolving credential references to secret values.
///
/// The pipeline resolves a credential once per provider call and drops the
/// value with that call; nothing above this port holds or logs secrets.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Returns the credential for a reference, or `None` when nothing is
    /// configured under it.
    async fn lookup(&self, reference: &CredentialRef) -> Option<Secret<String>>;
}
