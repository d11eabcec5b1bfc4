//! Session authentication.
//!
//! Identity federation happens outside this server; by the time a request
//! arrives it carries `Authorization: Bearer <session token>`, and a
//! [`SessionResolver`] maps that token to an [`AuthUser`].

use std::collections::HashMap;

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header;
use axum::http::request::Parts;
use uuid::Uuid;

use quill_core::{AuthUser, Error, Result};

use crate::error::ApiError;
use crate::state::AppState;

/// Maps session tokens to users.
#[async_trait]
pub trait SessionResolver: Send + Sync {
    /// The user behind `token`, or `None` for an unknown or expired session.
    async fn resolve(&self, token: &str) -> Option<AuthUser>;
}

/// Fixed token table, configured through `QUILL_SESSIONS`.
#[derive(Debug, Clone, Default)]
pub struct StaticSessions {
    tokens: HashMap<String, Uuid>,
}

impl StaticSessions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `token=user-uuid` pairs separated by commas.
    ///
    /// ```
    /// use quill_api::auth::StaticSessions;
    ///
    /// let sessions = StaticSessions::parse(
    ///     "alice-token=0192d5d8-7a4c-7d4e-9f00-1234567890ab, bob-token=0192d5d8-7a4c-7d4e-9f00-ba0987654321",
    /// ).unwrap();
    /// assert_eq!(sessions.len(), 2);
    /// ```
    pub fn parse(table: &str) -> Result<Self> {
        let mut sessions = Self::new();
        for entry in table.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let (token, user) = entry.split_once('=').ok_or_else(|| {
                Error::Config(format!("Session entry '{}' is not token=user-id", entry))
            })?;
            let token = token.trim();
            if token.is_empty() {
                return Err(Error::Config("Session token must not be empty".to_string()));
            }
            let user_id = user.trim().parse::<Uuid>().map_err(|e| {
                Error::Config(format!("Invalid user id for session '{}': {}", token, e))
            })?;
            sessions.tokens.insert(token.to_string(), user_id);
        }
        Ok(sessions)
    }

    /// Add one session.
    pub fn with_token(mut self, token: impl Into<String>, user_id: Uuid) -> Self {
        self.tokens.insert(token.into(), user_id);
        self
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

#[async_trait]
impl SessionResolver for StaticSessions {
    async fn resolve(&self, token: &str) -> Option<AuthUser> {
        self.tokens.get(token).copied().map(AuthUser::new)
    }
}

/// Extract the bearer token from an `Authorization` header value.
pub fn bearer_token(value: &str) -> Option<&str> {
    let token = value.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then_some(token)
}

/// Extractor that requires an authenticated user.
///
/// Rejects with [`ApiError::Unauthenticated`], which redirects to the login page.
#[derive(Debug, Clone, Copy)]
pub struct RequireUser(pub AuthUser);

#[axum::async_trait]
impl FromRequestParts<AppState> for RequireUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> std::result::Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(bearer_token)
            .ok_or(ApiError::Unauthenticated)?;

        match state.sessions.resolve(token).await {
            Some(user) => Ok(RequireUser(user)),
            None => {
                tracing::debug!("Rejected unknown session token");
                Err(ApiError::Unauthenticated)
            }
        }
    }
}
