//! In-memory credential store.

use async_trait::async_trait;
use secrecy::Secret;
use std::collections::HashMap;

use crate::domain::CredentialRef;
use crate::ports::CredentialStore;

/// Credential store backed by a map built at startup.
///
/// Values are wrapped in `Secret` on insertion and only ever exposed inside
/// a transport call. Blank values are treated as not configured.
#[derive(Default)]
pub struct InMemoryCredentialStore {
    credentials: HashMap<String, Secret<String>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a credential under a reference. Blank values are ignored.
    pub fn with_credential(
        mut self,
        reference: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        let value = value.into();
        if !value.is_empty() {
            self.credentials.insert(reference.into(), Secret::new(value));
        }
        self
    }

    pub fn len(&self) -> usize {
        self.credentials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.credentials.is_empty()
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn lookup(&self, reference: &CredentialRef) -> Option<Secret<String>> {
        self.credentials.get(reference.as_str()).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[tokio::test]
    async fn test_lookup_returns_configured_value() {
        let store = InMemoryCredentialStore::new().with_credential("gemini", "g-key");

        let secret = store.lookup(&CredentialRef::new("gemini")).await.unwrap();
        assert_eq!(secret.expose_secret(), "g-key");
    }

    #[tokio::test]
    async fn test_lookup_unknown_reference_is_none() {
        let store = InMemoryCredentialStore::new();
        assert!(store.lookup(&CredentialRef::new("openai")).await.is_none());
    }

    #[tokio::test]
    async fn test_blank_values_not_stored() {
        let store = InMemoryCredentialStore::new().with_credential("gemini", "");
        assert!(store.is_empty());
        assert!(store.lookup(&CredentialRef::new("gemini")).await.is_none());
    }
}
