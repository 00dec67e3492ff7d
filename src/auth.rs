use axum::{
    extract::{FromRef, FromRequestParts, Query},
    http::request::Parts,
};
use serde::Deserialize;
use std::collections::HashSet;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

use crate::{config::AppConfig, error::ApiError};

/// AuthState
///
/// The set of opaque admin tokens currently considered valid. Owned by the
/// application state rather than living in a process global so tests can run
/// multiple isolated instances side by side.
///
/// This is a deliberately minimal, demo-grade mechanism: tokens never expire,
/// live in plaintext memory, travel as a query parameter, and die with the
/// process. Hardening any of that is explicitly out of scope.
#[derive(Clone, Default)]
pub struct AuthState {
    tokens: Arc<RwLock<HashSet<String>>>,
}

impl AuthState {
    pub fn new() -> Self {
        Self::default()
    }

    /// login
    ///
    /// Checks the supplied credentials against the two configured static
    /// values. On a match, mints a fresh opaque token, records it in the
    /// valid set, and returns it. On a mismatch, returns `None`.
    pub fn login(&self, username: &str, password: &str, config: &AppConfig) -> Option<String> {
        if username != config.admin_username || password != config.admin_password {
            return None;
        }

        // 128 random bits rendered as 32 hex chars; unguessable, carries no claims.
        let token = Uuid::new_v4().simple().to_string();
        self.tokens
            .write()
            .expect("token set lock poisoned")
            .insert(token.clone());
        Some(token)
    }

    pub fn is_valid(&self, token: &str) -> bool {
        self.tokens
            .read()
            .expect("token set lock poisoned")
            .contains(token)
    }
}

#[derive(Debug, Deserialize)]
struct TokenQuery {
    token: Option<String>,
}

/// AdminToken
///
/// Resolved proof that a request carried a live admin token. This is the one
/// and only place admin access is enforced: the admin router applies it once
/// as a middleware layer, so individual handlers never re-validate the token.
#[derive(Debug, Clone)]
pub struct AdminToken(pub String);

impl<S> FromRequestParts<S> for AdminToken
where
    S: Send + Sync,
    AuthState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth = AuthState::from_ref(state);

        let Query(query) = Query::<TokenQuery>::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::Unauthorized("Unauthorized"))?;

        let token = query
            .token
            .ok_or(ApiError::Unauthorized("Unauthorized"))?;

        if auth.is_valid(&token) {
            Ok(AdminToken(token))
        } else {
            Err(ApiError::Unauthorized("Unauthorized"))
        }
    }
}
