//! Request handlers for account and session endpoints
//!
//! Login and registration mint a token and hand it out twice: as the
//! `session` cookie and in the JSON body for clients that prefer the
//! `Authorization` header.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::header::{CACHE_CONTROL, SET_COOKIE};
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};

use emotrack_auth::cookie::{self, CLEARED_SESSION_COOKIE};
use emotrack_auth::{IssuedToken, Role};

use crate::app::AppState;
use crate::error::{ApiError, ApiResult};
use crate::middleware::{CurrentUser, NO_STORE};
use crate::password::{self, MIN_PASSWORD_LEN};
use crate::store::{NewUser, UserRecord};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> ApiResult<Response> {
    let Json(req) = payload?;

    if req.name.is_empty() || req.email.is_empty() || req.password.is_empty() {
        return Err(ApiError::BadRequest(
            "Name, email, and password are required".into(),
        ));
    }
    if !is_valid_email(&req.email) {
        return Err(ApiError::BadRequest("Invalid email format".into()));
    }
    if req.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ApiError::BadRequest(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters long"
        )));
    }
    let role = match req.role.as_deref() {
        None => Role::default(),
        Some(r) => Role::parse(r).ok_or_else(|| ApiError::BadRequest("Invalid role".into()))?,
    };
    if state.users.find_by_email(&req.email).await.is_some() {
        return Err(ApiError::BadRequest("Email already registered".into()));
    }

    let password_hash = password::hash_password(req.password).await?;
    let user = state
        .users
        .insert(NewUser {
            name: Some(req.name),
            email: req.email,
            password_hash,
            role,
        })
        .await?;

    let issued = state.codec.issue(&user.subject())?;
    info!(user_id = user.id, role = %user.role, "User registered");

    let body = json!({
        "success": true,
        "user": user.profile(),
        "token": issued.token,
    });
    session_response(&state, StatusCode::CREATED, &issued, body)
}

pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Response> {
    let Json(req) = payload?;

    if req.email.is_empty() || req.password.is_empty() {
        return Err(ApiError::BadRequest("Email and password are required".into()));
    }

    let Some(user) = state.users.find_by_email(&req.email).await else {
        // Same Argon2 work as a wrong password for a real account
        password::verify_password(req.password, state.unknown_account_hash.to_string()).await?;
        debug!("Login for unknown email");
        return Err(ApiError::InvalidCredentials);
    };
    if !password::verify_password(req.password, user.password_hash.clone()).await? {
        debug!(user_id = user.id, "Login with wrong password");
        return Err(ApiError::InvalidCredentials);
    }

    let issued = state.codec.issue(&user.subject())?;
    info!(user_id = user.id, "Login successful");

    let body = json!({
        "success": true,
        "user": login_view(&user),
        "token": issued.token,
    });
    session_response(&state, StatusCode::OK, &issued, body)
}

/// Clears the client's cookie. Tokens are stateless, so a copy held
/// elsewhere keeps working until it expires.
pub async fn logout() -> Response {
    (
        StatusCode::OK,
        [
            (SET_COOKIE, HeaderValue::from_static(CLEARED_SESSION_COOKIE)),
            (CACHE_CONTROL, HeaderValue::from_static(NO_STORE)),
        ],
        Json(json!({ "success": true })),
    )
        .into_response()
}

pub async fn me(CurrentUser(identity): CurrentUser) -> Json<serde_json::Value> {
    Json(json!({ "user": identity }))
}

pub async fn profile(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
) -> ApiResult<Json<serde_json::Value>> {
    let user = state
        .users
        .find_by_id(identity.id)
        .await
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;
    Ok(Json(json!({ "user": user.profile() })))
}

pub async fn delete_account(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
) -> ApiResult<Response> {
    if !state.users.delete(identity.id).await {
        return Err(ApiError::NotFound("User not found".into()));
    }
    info!(user_id = identity.id, "Account deleted");

    Ok((
        StatusCode::OK,
        [(SET_COOKIE, HeaderValue::from_static(CLEARED_SESSION_COOKIE))],
        Json(json!({ "success": true })),
    )
        .into_response())
}

pub async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

pub async fn not_found() -> ApiError {
    ApiError::NotFound("Not found".into())
}

fn login_view(user: &UserRecord) -> serde_json::Value {
    json!({
        "id": user.id,
        "email": user.email,
        "name": user.name,
        "role": user.role,
    })
}

fn session_response(
    state: &AppState,
    status: StatusCode,
    issued: &IssuedToken,
    body: serde_json::Value,
) -> ApiResult<Response> {
    let cookie = HeaderValue::from_str(&cookie::session_cookie(&issued.token, &state.auth))
        .map_err(|e| ApiError::Internal(format!("session cookie not a header value: {e}")))?;
    Ok((status, [(SET_COOKIE, cookie)], Json(body)).into_response())
}

/// `local@domain.tld` with no whitespace and a single `@`
fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    domain
        .char_indices()
        .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len())
}
