//! TokenCodec: HS256 identity tokens
//!
//! The codec owns the token format. It signs [`TokenClaims`] built from a
//! [`Subject`] and checks signature, shape and algorithm on the way back in.
//! Expiry is deliberately left to the caller, which compares `exp` against an
//! explicit clock (see [`SessionResolver`](super::SessionResolver)).

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use crate::config::AuthConfig;
use crate::error::{AuthError, Result};

use super::types::{Identity, Subject, TokenClaims};

/// A freshly minted token together with the identity it encodes
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub identity: Identity,
}

/// Signs and verifies identity tokens with a process-wide secret
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl_secs: i64,
}

impl TokenCodec {
    /// Build a codec from validated configuration.
    ///
    /// Fails only when the configuration cannot sign tokens at all.
    pub fn new(config: &AuthConfig) -> Result<Self> {
        config.validate()?;

        let secret = config.jwt_secret.as_bytes();
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            ttl_secs: config.token_ttl_secs(),
        })
    }

    /// Token lifetime in seconds
    pub fn ttl_secs(&self) -> i64 {
        self.ttl_secs
    }

    /// Mint a token valid from now for the configured lifetime
    pub fn issue(&self, subject: &Subject) -> Result<IssuedToken> {
        self.issue_at(subject, Utc::now().timestamp())
    }

    /// Mint a token as if issued at `issued_at` (Unix seconds)
    pub fn issue_at(&self, subject: &Subject, issued_at: i64) -> Result<IssuedToken> {
        let exp = issued_at + self.ttl_secs;
        let claims = TokenClaims::for_subject(subject, issued_at, exp);

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Internal(format!("token encoding failed: {e}")))?;

        Ok(IssuedToken {
            token,
            identity: Identity {
                id: subject.id,
                email: subject.email.clone(),
                name: subject.name.clone(),
                role: subject.role,
                expires_at: exp,
            },
        })
    }

    /// Check signature, algorithm and payload shape; return the raw claims.
    ///
    /// Does not reject expired tokens.
    pub fn verify(&self, token: &str) -> Result<TokenClaims> {
        if token.is_empty() {
            return Err(AuthError::MissingCredential);
        }
        let data = decode::<TokenClaims>(token, &self.decoding_key, &self.validation)?;
        Ok(data.claims)
    }
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("algorithm", &Algorithm::HS256)
            .field("ttl_secs", &self.ttl_secs)
            .finish_non_exhaustive()
    }
}
