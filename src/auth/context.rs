//! Bearer-token session context shared with API collaborators.

use crate::auth::store::{CredentialStore, StoreError};
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Default)]
struct Inner {
    token: Option<String>,
    store: Option<CredentialStore>,
}

/// Holds the bearer token for the signed-in user.
///
/// Created once at startup and cloned into every component that talks to the
/// API. Clones share the same token.
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    inner: Arc<Mutex<Inner>>,
}

impl SessionContext {
    /// Context backed by `store`, seeded with whatever token it holds.
    pub fn load(store: CredentialStore) -> Result<Self, StoreError> {
        let token = store.load()?;
        Ok(Self {
            inner: Arc::new(Mutex::new(Inner {
                token,
                store: Some(store),
            })),
        })
    }

    /// Context that never touches disk.
    pub fn in_memory(token: Option<String>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner { token, store: None })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn token(&self) -> Option<String> {
        self.lock().token.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.lock().token.is_some()
    }

    /// Install a freshly issued token and persist it.
    pub fn sign_in(&self, token: String) -> Result<(), StoreError> {
        let mut inner = self.lock();
        if let Some(store) = &inner.store {
            store.save(&token)?;
        }
        inner.token = Some(token);
        Ok(())
    }

    /// Drop the token from memory and storage.
    ///
    /// Returns `true` only for the call that actually removed a token, so
    /// concurrent 401 replies evict exactly once.
    pub fn evict(&self) -> bool {
        let mut inner = self.lock();
        Self::clear(&mut inner)
    }

    /// Evict `rejected` only if it is still the current token. A late 401
    /// for a request sent under an earlier sign-in leaves the new token alone.
    pub fn evict_token(&self, rejected: &str) -> bool {
        let mut inner = self.lock();
        if inner.token.as_deref() != Some(rejected) {
            tracing::debug!("ignoring rejection of a superseded token");
            return false;
        }
        Self::clear(&mut inner)
    }

    fn clear(inner: &mut Inner) -> bool {
        if inner.token.take().is_none() {
            return false;
        }
        if let Some(store) = &inner.store {
            if let Err(e) = store.clear() {
                tracing::warn!(error = %e, "failed to remove stored credential");
            }
        }
        tracing::info!("bearer token evicted");
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evict_clears_once() {
        let ctx = SessionContext::in_memory(Some("tok".into()));
        let clone = ctx.clone();
        assert!(clone.is_authenticated());
        assert!(ctx.evict());
        assert!(!clone.evict());
        assert!(!ctx.is_authenticated());
    }

    #[test]
    fn stale_rejection_keeps_newer_token() {
        let ctx = SessionContext::in_memory(Some("old".into()));
        ctx.evict();
        ctx.sign_in("new".into()).unwrap();

        assert!(!ctx.evict_token("old"));
        assert_eq!(ctx.token().as_deref(), Some("new"));

        assert!(ctx.evict_token("new"));
        assert!(!ctx.is_authenticated());
    }

    #[test]
    fn sign_in_persists_and_evict_removes() {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::new(dir.path().join("credentials.toml"));
        let ctx = SessionContext::load(store.clone()).unwrap();
        assert_eq!(ctx.token(), None);

        ctx.sign_in("jwt-1".into()).unwrap();
        assert_eq!(store.load().unwrap().as_deref(), Some("jwt-1"));

        let reloaded = SessionContext::load(store.clone()).unwrap();
        assert_eq!(reloaded.token().as_deref(), Some("jwt-1"));

        assert!(reloaded.evict());
        assert_eq!(store.load().unwrap(), None);
    }
}
