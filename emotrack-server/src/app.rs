//! Shared state and router assembly

use std::sync::Arc;

use axum::middleware::from_fn_with_state;
use axum::routing::{delete, get, post};
use axum::Router;
use tower::ServiceBuilder;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;

use emotrack_auth::{AccessGate, AuthConfig, AuthError, SessionResolver, TokenCodec};

use crate::handlers;
use crate::middleware::{access_gate, handle_panic};
use crate::password;
use crate::store::{InMemoryUserStore, UserStore};

/// Everything a handler needs; cheap to clone
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthConfig>,
    pub codec: Arc<TokenCodec>,
    pub gate: Arc<AccessGate>,
    pub users: Arc<dyn UserStore>,
    /// Verified against when a login names an unknown email
    pub unknown_account_hash: Arc<str>,
}

impl AppState {
    /// Wire codec, resolver and gate from one configuration.
    ///
    /// Fails when the configuration cannot sign tokens or the placeholder
    /// password hash cannot be computed.
    pub fn new(auth: AuthConfig, users: Arc<dyn UserStore>) -> emotrack_auth::Result<Self> {
        let codec = Arc::new(TokenCodec::new(&auth)?);
        let gate = AccessGate::new(&auth, SessionResolver::new(codec.clone()));
        let unknown_account_hash = password::unknown_account_hash()
            .map_err(|e| AuthError::Internal(format!("placeholder password hash: {e}")))?;

        Ok(Self {
            auth: Arc::new(auth),
            codec,
            gate: Arc::new(gate),
            users,
            unknown_account_hash: Arc::from(unknown_account_hash),
        })
    }

    pub fn in_memory(auth: AuthConfig) -> emotrack_auth::Result<Self> {
        Self::new(auth, Arc::new(InMemoryUserStore::new()))
    }
}

/// Full application router with the access gate in front of every route
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/auth/register", post(handlers::register))
        .route("/api/auth/login", post(handlers::login))
        .route("/api/auth/logout", post(handlers::logout))
        .route("/api/auth/me", get(handlers::me))
        .route("/api/user", get(handlers::profile))
        .route("/api/user/delete", delete(handlers::delete_account))
        .fallback(handlers::not_found)
        .layer(from_fn_with_state(state.clone(), access_gate))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CatchPanicLayer::custom(handle_panic)),
        )
        .with_state(state)
}
