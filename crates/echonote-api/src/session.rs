//! Explicit session context.
//!
//! The session is never read ambiently inside a handler: each handler takes a
//! [`Session`] argument, resolved here from the request's bearer token against
//! the [`SessionStore`]. The authentication collaborator that mints tokens is
//! external to this service.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use axum::{extract::FromRequestParts, http::request::Parts};
use tracing::warn;

use echonote_core::{defaults, UserIdentity};

use crate::{ApiError, AppState};

/// Token-to-identity registry.
#[derive(Clone, Default)]
pub struct SessionStore {
    tokens: Arc<RwLock<HashMap<String, UserIdentity>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from `SESSION_TOKENS`: comma-separated `token:user_id:name` triples.
    pub fn from_env() -> Self {
        match std::env::var(defaults::ENV_SESSION_TOKENS) {
            Ok(raw) => Self::from_entries(&raw),
            Err(_) => Self::new(),
        }
    }

    /// Parse a comma-separated list of `token:user_id:name` triples.
    /// Malformed entries are skipped with a warning.
    pub fn from_entries(raw: &str) -> Self {
        let store = Self::new();
        for entry in raw.split(',').filter(|e| !e.trim().is_empty()) {
            let mut parts = entry.trim().splitn(3, ':');
            match (parts.next(), parts.next(), parts.next()) {
                (Some(token), Some(id), Some(name)) => {
                    store.insert(token, UserIdentity {
                        id: id.to_string(),
                        name: name.to_string(),
                    });
                }
                _ => warn!(
                    subsystem = "api",
                    component = "session",
                    "Skipping malformed SESSION_TOKENS entry"
                ),
            }
        }
        store
    }

    pub fn insert(&self, token: &str, user: UserIdentity) {
        self.tokens
            .write()
            .unwrap()
            .insert(token.to_string(), user);
    }

    pub fn resolve(&self, token: &str) -> Option<UserIdentity> {
        self.tokens.read().unwrap().get(token).cloned()
    }
}

/// A validated session, passed explicitly into every handler.
#[derive(Debug, Clone)]
pub struct Session {
    pub user: UserIdentity,
}

impl Session {
    pub fn user_id(&self) -> &str {
        &self.user.id
    }
}

#[async_trait]
impl FromRequestParts<AppState> for Session {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .ok_or_else(|| ApiError::Unauthorized("Unauthorized".to_string()))?;

        let user = state
            .sessions
            .resolve(token)
            .ok_or_else(|| ApiError::Unauthorized("Unauthorized".to_string()))?;

        Ok(Session { user })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_resolves_inserted_tokens() {
        let store = SessionStore::new();
        store.insert(
            "tok-1",
            UserIdentity {
                id: "user-a".into(),
                name: "Ada".into(),
            },
        );

        let user = store.resolve("tok-1").unwrap();
        assert_eq!(user.id, "user-a");
        assert!(store.resolve("tok-2").is_none());
    }

    #[test]
    fn test_from_entries_parses_triples() {
        let store = SessionStore::from_entries("alpha:user-a:Ada, beta:user-b:Brin,malformed");
        assert_eq!(store.resolve("alpha").unwrap().name, "Ada");
        assert_eq!(store.resolve("beta").unwrap().id, "user-b");
        assert!(store.resolve("malformed").is_none());
    }

    #[test]
    fn test_from_entries_tolerates_empty_input() {
        let store = SessionStore::from_entries("");
        assert!(store.resolve("anything").is_none());
    }
}
