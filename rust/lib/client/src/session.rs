//! Explicit session context.
//!
//! The bearer credential lives in a `Session` value that is handed to
//! every request-issuing operation. It is initialised after login (or when
//! a persisted token is loaded) and torn down on logout or when the server
//! rejects it.

use std::sync::{PoisonError, RwLock};

use crate::{ApiError, TokenSource};

#[derive(Debug, Default)]
pub struct Session {
    token: RwLock<Option<String>>,
}

impl Session {
    /// An empty, unauthenticated session.
    pub fn new() -> Self {
        Self::default()
    }

    /// A session initialised from a persisted token. Empty tokens yield an
    /// inactive session.
    pub fn with_token(token: impl Into<String>) -> Self {
        let session = Self::new();
        session.init(token);
        session
    }

    /// Install a credential.
    pub fn init(&self, token: impl Into<String>) {
        let token = token.into();
        let mut guard = self.token.write().unwrap_or_else(PoisonError::into_inner);
        *guard = (!token.is_empty()).then_some(token);
    }

    /// Drop the credential. Returns whether a credential was present.
    pub fn teardown(&self) -> bool {
        let mut guard = self.token.write().unwrap_or_else(PoisonError::into_inner);
        guard.take().is_some()
    }

    pub fn is_active(&self) -> bool {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Current credential, if any.
    pub fn bearer(&self) -> Option<String> {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait::async_trait]
impl TokenSource for Session {
    async fn token(&self) -> Result<Option<String>, ApiError> {
        match self.bearer() {
            Some(token) => Ok(Some(token)),
            None => Err(ApiError::Auth("no active session".into())),
        }
    }
}
