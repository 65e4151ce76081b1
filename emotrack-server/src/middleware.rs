//! HTTP adapter for the access gate
//!
//! [`access_gate`] runs in front of every route. It lifts the credential
//! headers off the request, asks the [`AccessGate`](emotrack_auth::AccessGate)
//! for a decision, and turns that decision into a forwarded request (with the
//! identity in the request extensions) or a rejection.

use std::any::Any;

use axum::async_trait;
use axum::extract::{FromRequestParts, Request, State};
use axum::http::header::{AUTHORIZATION, CACHE_CONTROL, COOKIE, SET_COOKIE};
use axum::http::request::Parts;
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;

use emotrack_auth::cookie::CLEARED_SESSION_COOKIE;
use emotrack_auth::{Credentials, GateDecision, Identity};

use crate::app::AppState;
use crate::error::ApiError;

/// `Cache-Control` for anything served to an authenticated identity
pub const NO_STORE: &str = "no-store, max-age=0";

/// Gate every request before it reaches a handler
pub async fn access_gate(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let decision = {
        let headers = request.headers();
        let authorization = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok());
        let cookies = joined_cookies(headers);
        let credentials = Credentials::new(authorization, cookies.as_deref());
        state.gate.evaluate(request.uri().path(), &credentials)
    };

    match decision {
        GateDecision::Bypass | GateDecision::Public => next.run(request).await,
        GateDecision::Authenticated(identity) => {
            request.extensions_mut().insert(identity);
            let mut response = next.run(request).await;
            response
                .headers_mut()
                .insert(CACHE_CONTROL, HeaderValue::from_static(NO_STORE));
            response
        }
        GateDecision::Unauthorized { clear_cookie } => {
            let response = (
                StatusCode::UNAUTHORIZED,
                Json(serde_json::json!({ "error": "Unauthorized" })),
            )
                .into_response();
            with_cleared_cookie(response, clear_cookie)
        }
        GateDecision::RedirectToLogin { location, clear_cookie } => {
            with_cleared_cookie(Redirect::temporary(&location).into_response(), clear_cookie)
        }
    }
}

/// All `Cookie` headers as one `;`-separated string (HTTP/2 may split them)
fn joined_cookies(headers: &HeaderMap) -> Option<String> {
    let parts: Vec<&str> = headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .collect();
    (!parts.is_empty()).then(|| parts.join("; "))
}

fn with_cleared_cookie(mut response: Response, clear: bool) -> Response {
    if clear {
        response
            .headers_mut()
            .append(SET_COOKIE, HeaderValue::from_static(CLEARED_SESSION_COOKIE));
    }
    response
}

/// Identity attached by [`access_gate`].
///
/// Rejects with 401 when the gate did not authenticate the request, so a
/// handler mounted on a path the gate treats as public cannot run without one.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Identity);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Identity>()
            .cloned()
            .map(CurrentUser)
            .ok_or(ApiError::Unauthorized)
    }
}

/// Panics anywhere below the panic layer become a generic 500
pub fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    tracing::error!(panic = %detail, "Request handler panicked");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({ "error": "Internal server error" })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_joined_cookies() {
        let mut headers = HeaderMap::new();
        assert_eq!(joined_cookies(&headers), None);

        headers.append(COOKIE, HeaderValue::from_static("theme=dark"));
        headers.append(COOKIE, HeaderValue::from_static("session=tok"));
        assert_eq!(joined_cookies(&headers).as_deref(), Some("theme=dark; session=tok"));
    }

    #[test]
    fn test_cleared_cookie_only_when_asked() {
        let response = with_cleared_cookie(StatusCode::OK.into_response(), false);
        assert!(response.headers().get(SET_COOKIE).is_none());

        let response = with_cleared_cookie(StatusCode::OK.into_response(), true);
        assert_eq!(
            response.headers().get(SET_COOKIE).unwrap(),
            CLEARED_SESSION_COOKIE
        );
    }

    #[test]
    fn test_panic_response_is_generic() {
        let response = handle_panic(Box::new("boom"));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
