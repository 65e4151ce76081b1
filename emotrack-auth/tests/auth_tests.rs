//! Resolver and gate integration tests: issue, resolve, expire, tamper

use std::sync::Arc;

use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::json;

use emotrack_auth::auth::{Credentials, Role, SessionResolver, Subject, TokenCodec};
use emotrack_auth::config::AuthConfig;
use emotrack_auth::{AccessGate, GateDecision};

const SECRET: &str = "test-secret-jwt-key-min-32-chars!!";
const NOW: i64 = 1_760_000_000;
const DAY: i64 = 24 * 60 * 60;

fn test_config() -> AuthConfig {
    AuthConfig::new(SECRET)
}

fn resolver() -> SessionResolver {
    SessionResolver::new(Arc::new(TokenCodec::new(&test_config()).unwrap()))
}

fn alice() -> Subject {
    Subject {
        id: 11,
        email: "alice@example.com".into(),
        name: Some("Alice".into()),
        role: Role::Facilitator,
    }
}

fn token_issued_at(resolver: &SessionResolver, issued_at: i64) -> String {
    resolver.codec().issue_at(&alice(), issued_at).unwrap().token
}

#[test]
fn test_fresh_token_resolves_from_cookie() {
    let r = resolver();
    let cookie = format!("session={}", token_issued_at(&r, NOW - DAY));

    let resolution = r.resolve_at(&Credentials::new(None, Some(&cookie)), NOW);
    let identity = resolution.identity.expect("identity");
    assert_eq!(identity.id, 11);
    assert_eq!(identity.email, "alice@example.com");
    assert_eq!(identity.role, Role::Facilitator);
    assert!(!resolution.stale_credential);
}

#[test]
fn test_fresh_token_resolves_from_header() {
    let r = resolver();
    let header = format!("Bearer {}", token_issued_at(&r, NOW));

    let resolution = r.resolve_at(&Credentials::new(Some(&header), None), NOW);
    assert_eq!(resolution.identity.map(|i| i.id), Some(11));
}

#[test]
fn test_token_valid_until_just_before_expiry() {
    let r = resolver();
    let cookie = format!("session={}", token_issued_at(&r, NOW - 7 * DAY + 1));

    let resolution = r.resolve_at(&Credentials::new(None, Some(&cookie)), NOW);
    assert!(resolution.is_authenticated());
}

#[test]
fn test_expired_cookie_is_stale() {
    let r = resolver();
    let cookie = format!("session={}", token_issued_at(&r, NOW - 7 * DAY));

    let resolution = r.resolve_at(&Credentials::new(None, Some(&cookie)), NOW);
    assert!(resolution.identity.is_none());
    assert!(resolution.stale_credential);
}

#[test]
fn test_tampered_cookie_is_stale() {
    let r = resolver();
    let token = token_issued_at(&r, NOW);
    let mut parts: Vec<String> = token.split('.').map(str::to_string).collect();
    // Swap the signature for one made with another secret
    let other = TokenCodec::new(&AuthConfig::new("another-secret")).unwrap();
    let forged = other.issue_at(&alice(), NOW).unwrap().token;
    parts[2] = forged.rsplit('.').next().unwrap().to_string();
    let cookie = format!("session={}", parts.join("."));

    let resolution = r.resolve_at(&Credentials::new(None, Some(&cookie)), NOW);
    assert!(resolution.identity.is_none());
    assert!(resolution.stale_credential);
}

#[test]
fn test_garbage_cookie_is_stale() {
    let r = resolver();
    let resolution = r.resolve_at(&Credentials::new(None, Some("session=invalid.token.here")), NOW);
    assert!(resolution.identity.is_none());
    assert!(resolution.stale_credential);
}

#[test]
fn test_no_credentials_is_not_stale() {
    let r = resolver();
    let resolution = r.resolve_at(&Credentials::default(), NOW);
    assert!(resolution.identity.is_none());
    assert!(!resolution.stale_credential);

    let resolution = r.resolve_at(&Credentials::new(None, Some("theme=dark")), NOW);
    assert!(!resolution.stale_credential);
}

#[test]
fn test_bad_header_without_cookie_is_not_stale() {
    let r = resolver();
    let resolution = r.resolve_at(&Credentials::new(Some("Bearer nope"), None), NOW);
    assert!(resolution.identity.is_none());
    assert!(!resolution.stale_credential);
}

#[test]
fn test_header_wins_over_bad_cookie() {
    let r = resolver();
    let header = format!("Bearer {}", token_issued_at(&r, NOW));
    let expired = format!("session={}", token_issued_at(&r, NOW - 30 * DAY));

    let resolution = r.resolve_at(&Credentials::new(Some(&header), Some(&expired)), NOW);
    assert_eq!(resolution.identity.map(|i| i.id), Some(11));
    assert!(!resolution.stale_credential);

    let resolution = r.resolve_at(
        &Credentials::new(Some(&header), Some("session=garbage")),
        NOW,
    );
    assert!(resolution.is_authenticated());
}

#[test]
fn test_bad_header_falls_back_to_cookie() {
    let r = resolver();
    let cookie = format!("session={}", token_issued_at(&r, NOW));

    let resolution = r.resolve_at(&Credentials::new(Some("Bearer garbage"), Some(&cookie)), NOW);
    assert_eq!(resolution.identity.map(|i| i.id), Some(11));
}

#[test]
fn test_last_duplicate_session_cookie_is_used() {
    let r = resolver();
    let cookies = format!("session=stale; session={}", token_issued_at(&r, NOW));

    let resolution = r.resolve_at(&Credentials::new(None, Some(&cookies)), NOW);
    assert_eq!(resolution.identity.map(|i| i.id), Some(11));
    assert!(!resolution.stale_credential);
}

/// Token signed with the shared secret but carrying hand-built claims
fn token_with_id(id: serde_json::Value) -> String {
    let claims = json!({
        "id": id,
        "email": "alice@example.com",
        "name": "Alice",
        "role": "Student",
        "iat": NOW,
        "exp": NOW + DAY,
    });
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap()
}

#[test]
fn test_numeric_string_id_is_normalized() {
    let r = resolver();
    let cookie = format!("session={}", token_with_id(json!("42")));

    let resolution = r.resolve_at(&Credentials::new(None, Some(&cookie)), NOW);
    assert_eq!(resolution.identity.map(|i| i.id), Some(42));
    assert!(!resolution.stale_credential);
}

#[test]
fn test_non_numeric_id_is_stale() {
    let r = resolver();
    for id in [json!("abc"), json!(null), json!(1.5)] {
        let cookie = format!("session={}", token_with_id(id));
        let resolution = r.resolve_at(&Credentials::new(None, Some(&cookie)), NOW);
        assert!(resolution.identity.is_none());
        assert!(resolution.stale_credential);
    }
}

#[test]
fn test_token_from_rotated_secret_is_rejected() {
    let old = resolver();
    let rotated = SessionResolver::new(Arc::new(
        TokenCodec::new(&AuthConfig::new("rotated-secret")).unwrap(),
    ));
    let cookie = format!("session={}", token_issued_at(&old, NOW));

    let resolution = rotated.resolve_at(&Credentials::new(None, Some(&cookie)), NOW);
    assert!(resolution.identity.is_none());
    assert!(resolution.stale_credential);
}

#[test]
fn test_gate_end_to_end_decisions() {
    let config = test_config();
    let r = resolver();
    let gate = AccessGate::new(&config, r.clone());

    // Scenario A: protected page without credentials
    assert_eq!(
        gate.evaluate_at("/dashboard", &Credentials::default(), NOW),
        GateDecision::RedirectToLogin {
            location: "/login?callbackUrl=/dashboard".into(),
            clear_cookie: false,
        }
    );

    // Scenario B: protected API without credentials
    assert_eq!(
        gate.evaluate_at("/api/sessions", &Credentials::default(), NOW),
        GateDecision::Unauthorized { clear_cookie: false }
    );

    // Expired cookie on a page: redirect and clear
    let expired = format!("session={}", token_issued_at(&r, NOW - 8 * DAY));
    let decision = gate.evaluate_at("/reports", &Credentials::new(None, Some(&expired)), NOW);
    assert!(matches!(decision, GateDecision::RedirectToLogin { clear_cookie: true, .. }));

    // Valid cookie
    let cookie = format!("session={}", token_issued_at(&r, NOW));
    let decision = gate.evaluate_at("/api/reports", &Credentials::new(None, Some(&cookie)), NOW);
    match decision {
        GateDecision::Authenticated(identity) => assert_eq!(identity.email, "alice@example.com"),
        other => panic!("unexpected decision {other:?}"),
    }
}

#[test]
fn test_gate_public_paths_skip_resolution() {
    let gate = AccessGate::new(&test_config(), resolver());
    // A garbage cookie on a public path is neither inspected nor cleared
    let creds = Credentials::new(None, Some("session=garbage"));
    assert_eq!(gate.evaluate_at("/login", &creds, NOW), GateDecision::Public);
    assert_eq!(gate.evaluate_at("/_next/static/app.js", &creds, NOW), GateDecision::Bypass);
}

#[test]
fn test_callback_is_encoded() {
    let gate = AccessGate::new(&test_config(), resolver());
    assert_eq!(
        gate.login_redirect("/sessions/a b"),
        "/login?callbackUrl=/sessions/a%20b"
    );
    assert_eq!(
        gate.login_redirect("/x&callbackUrl=evil"),
        "/login?callbackUrl=/x%26callbackUrl%3Devil"
    );
}

#[test]
fn test_custom_login_path() {
    let config = test_config().with_login_path("/signin");
    let gate = AccessGate::new(&config, resolver());
    assert_eq!(
        gate.evaluate_at("/timeline", &Credentials::default(), NOW),
        GateDecision::RedirectToLogin {
            location: "/signin?callbackUrl=/timeline".into(),
            clear_cookie: false,
        }
    );
}
