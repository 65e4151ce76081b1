//! SessionResolver: request credentials to a verified identity
//!
//! Two credential locations are consulted in order: the `Authorization:
//! Bearer` header, then the `session` cookie. A valid header wins outright.
//! A cookie that is present but unusable (tampered, malformed, expired, or
//! carrying an identity that fails normalization) is reported back as stale so
//! the caller can tell the client to delete it.

use std::sync::Arc;

use chrono::Utc;
use tracing::debug;

use crate::cookie;
use crate::error::{AuthError, Result};

use super::codec::TokenCodec;
use super::types::Identity;

/// Credential material lifted off an inbound request
#[derive(Debug, Clone, Copy, Default)]
pub struct Credentials<'a> {
    /// Raw `Authorization` header value
    pub authorization: Option<&'a str>,
    /// Raw `Cookie` header value
    pub cookie_header: Option<&'a str>,
}

impl<'a> Credentials<'a> {
    pub fn new(authorization: Option<&'a str>, cookie_header: Option<&'a str>) -> Self {
        Self { authorization, cookie_header }
    }

    /// Token from an `Authorization: Bearer <token>` header, if any
    pub fn bearer_token(&self) -> Option<&'a str> {
        let value = self.authorization?.trim();
        let (scheme, token) = value.split_once(' ')?;
        if !scheme.eq_ignore_ascii_case("bearer") {
            return None;
        }
        let token = token.trim();
        (!token.is_empty()).then_some(token)
    }

    /// Value of the `session` cookie, if any
    pub fn session_cookie(&self) -> Option<&'a str> {
        cookie::find_cookie(self.cookie_header?, cookie::SESSION_COOKIE)
    }
}

/// Outcome of resolving a request's credentials
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Resolution {
    pub identity: Option<Identity>,
    /// The session cookie was present but unusable and should be cleared
    pub stale_credential: bool,
}

impl Resolution {
    pub fn authenticated(identity: Identity) -> Self {
        Self { identity: Some(identity), stale_credential: false }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn stale() -> Self {
        Self { identity: None, stale_credential: true }
    }

    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }
}

/// Resolves credentials against a shared [`TokenCodec`]
#[derive(Debug, Clone)]
pub struct SessionResolver {
    codec: Arc<TokenCodec>,
}

impl SessionResolver {
    pub fn new(codec: Arc<TokenCodec>) -> Self {
        Self { codec }
    }

    pub fn codec(&self) -> &Arc<TokenCodec> {
        &self.codec
    }

    /// Resolve against the current wall clock
    pub fn resolve(&self, credentials: &Credentials<'_>) -> Resolution {
        self.resolve_at(credentials, Utc::now().timestamp())
    }

    /// Resolve as of `now` (Unix seconds)
    pub fn resolve_at(&self, credentials: &Credentials<'_>, now: i64) -> Resolution {
        if let Some(token) = credentials.bearer_token() {
            match self.authenticate_at(token, now) {
                Ok(identity) => return Resolution::authenticated(identity),
                Err(e) => debug!(reason = %e, "Bearer credential rejected, falling back to cookie"),
            }
        }

        let Some(token) = credentials.session_cookie() else {
            return Resolution::anonymous();
        };

        match self.authenticate_at(token, now) {
            Ok(identity) => Resolution::authenticated(identity),
            Err(e) if e.is_stale() => {
                debug!(reason = %e, "Session cookie rejected");
                Resolution::stale()
            }
            Err(_) => Resolution::anonymous(),
        }
    }

    /// Verify one token: signature, expiry, then identity normalization
    pub fn authenticate_at(&self, token: &str, now: i64) -> Result<Identity> {
        let claims = self.codec.verify(token)?;
        if now >= claims.exp {
            return Err(AuthError::ExpiredCredential);
        }
        Identity::from_claims(claims)
    }
}
