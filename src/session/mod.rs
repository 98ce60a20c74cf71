//! Auth session store.
//!
//! Holds the current access token (and the refresh cookie needed to renew
//! it) for one API session. Every mutation writes through to a
//! [`SessionStorage`] so the session survives process restarts. The store is
//! a cheap-clone handle passed explicitly to the HTTP client and resource
//! functions; only the sign-in, refresh and logout flows mutate it.

pub mod claims;
pub mod storage;

use std::sync::{Arc, RwLock};

use chrono::Utc;

pub use claims::TokenClaims;
pub use storage::{FileStorage, MemoryStorage, PersistedSession, SessionStorage};

#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    state: RwLock<PersistedSession>,
    storage: Arc<dyn SessionStorage>,
}

impl SessionStore {
    /// Initialise from storage; unreadable storage starts an empty session
    pub fn open(storage: Arc<dyn SessionStorage>) -> Self {
        let state = match storage.load() {
            Ok(Some(session)) => session,
            Ok(None) => PersistedSession::default(),
            Err(e) => {
                tracing::warn!("Ignoring unreadable session storage: {}", e);
                PersistedSession::default()
            }
        };

        Self {
            inner: Arc::new(SessionInner {
                state: RwLock::new(state),
                storage,
            }),
        }
    }

    /// Session backed by memory only
    pub fn in_memory() -> Self {
        Self::open(Arc::new(MemoryStorage::new()))
    }

    pub fn access_token(&self) -> Option<String> {
        self.read(|s| s.access_token.clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.read(|s| s.access_token.is_some())
    }

    /// Replace the access token; `None` removes it
    pub fn set_access_token(&self, token: Option<String>) {
        let token = token.filter(|t| !t.is_empty());
        self.update(|s| s.access_token = token);
    }

    pub fn refresh_cookies(&self) -> Vec<String> {
        self.read(|s| s.refresh_cookies.clone())
    }

    pub fn set_refresh_cookies(&self, cookies: Vec<String>) {
        if self.read(|s| s.refresh_cookies == cookies) {
            return;
        }
        self.update(|s| s.refresh_cookies = cookies);
    }

    /// Drop the token and refresh cookies from memory and storage
    pub fn clear(&self) {
        {
            let mut state = self.inner.state.write().unwrap_or_else(|e| e.into_inner());
            *state = PersistedSession::default();
        }
        if let Err(e) = self.inner.storage.remove() {
            tracing::warn!("Failed to remove persisted session: {}", e);
        }
    }

    /// Unverified claims of the current token, if it is a JWT
    pub fn claims(&self) -> Option<TokenClaims> {
        self.access_token().as_deref().and_then(claims::decode_unverified)
    }

    pub fn snapshot(&self) -> PersistedSession {
        self.read(|s| s.clone())
    }

    fn read<T>(&self, f: impl FnOnce(&PersistedSession) -> T) -> T {
        let state = self.inner.state.read().unwrap_or_else(|e| e.into_inner());
        f(&state)
    }

    fn update(&self, f: impl FnOnce(&mut PersistedSession)) {
        let snapshot = {
            let mut state = self.inner.state.write().unwrap_or_else(|e| e.into_inner());
            f(&mut state);
            state.saved_at = Some(Utc::now());
            state.clone()
        };

        let result = if snapshot.is_empty() {
            self.inner.storage.remove()
        } else {
            self.inner.storage.save(&snapshot)
        };
        if let Err(e) = result {
            tracing::warn!("Failed to persist session: {}", e);
        }
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}
