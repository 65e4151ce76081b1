//! # emotrack-auth
//!
//! Session authentication for the emotrack dashboard: signed identity tokens,
//! credential resolution from header or cookie, and the access gate every
//! request passes through.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────┐
//! │                AccessGate                 │
//! │  (ordered route table: bypass, public,    │
//! │   protected API, protected page)          │
//! ├───────────────────────────────────────────┤
//! │             SessionResolver               │
//! │  (Bearer header, then `session` cookie;   │
//! │   expiry, identity normalization)         │
//! ├───────────────────────────────────────────┤
//! │               TokenCodec                  │
//! │  (HS256 JWT, shared secret, 7-day exp)    │
//! └───────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use emotrack_auth::{AccessGate, AuthConfig, Credentials, GateDecision, Role, SessionResolver, Subject, TokenCodec};
//!
//! # fn main() -> emotrack_auth::Result<()> {
//! let config = AuthConfig::new("a-long-random-signing-secret");
//! let codec = Arc::new(TokenCodec::new(&config)?);
//! let gate = AccessGate::new(&config, SessionResolver::new(codec.clone()));
//!
//! let issued = codec.issue(&Subject {
//!     id: 1,
//!     email: "ana@example.com".into(),
//!     name: Some("Ana".into()),
//!     role: Role::Student,
//! })?;
//!
//! let header = format!("Bearer {}", issued.token);
//! let decision = gate.evaluate("/api/sessions", &Credentials::new(Some(&header), None));
//! assert!(matches!(decision, GateDecision::Authenticated(_)));
//!
//! let decision = gate.evaluate("/dashboard", &Credentials::default());
//! assert_eq!(
//!     decision,
//!     GateDecision::RedirectToLogin { location: "/login?callbackUrl=/dashboard".into(), clear_cookie: false },
//! );
//! # Ok(())
//! # }
//! ```
//!
//! Tokens are not revoked server-side. Logging out only removes the client's
//! cookie; a copied token keeps verifying until its natural expiry.

pub mod config;
pub mod error;
pub mod auth;
pub mod cookie;
pub mod gate;

// Re-exports for convenience
pub use config::AuthConfig;
pub use error::{AuthError, Result};
pub use auth::{Credentials, Identity, IssuedToken, Resolution, Role, SessionResolver, Subject, TokenClaims, TokenCodec};
pub use gate::{AccessGate, GateDecision, PathPattern, RouteClass, RouteTable};
