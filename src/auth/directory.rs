//! Credential verification.

use std::collections::HashMap;

use async_trait::async_trait;

/// Resolves username/password pairs to a canonical identity.
///
/// Implementations own credential storage; the relay only ever asks the
/// single pass/fail question and never learns *why* a pair failed.
#[async_trait]
pub trait UserDirectory: Send + Sync + std::fmt::Debug {
    /// Return the canonical identity for the pair, or `None` on mismatch.
    ///
    /// Unknown user and wrong password are indistinguishable to callers.
    async fn verify_credentials(&self, username: &str, password: &str) -> Option<String>;
}

/// In-memory directory seeded from configuration.
///
/// Stands in for a real user table during development and tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryDirectory {
    users: HashMap<String, String>,
}

impl MemoryDirectory {
    /// Create an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a user, replacing any previous password for the same name.
    #[must_use]
    pub fn with_user(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.users.insert(username.into(), password.into());
        self
    }
}

#[async_trait]
impl UserDirectory for MemoryDirectory {
    async fn verify_credentials(&self, username: &str, password: &str) -> Option<String> {
        match self.users.get(username) {
            Some(stored) if stored == password => Some(username.to_string()),
            _ => None,
        }
    }
}
