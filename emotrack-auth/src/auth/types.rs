//! Auth domain types: Role, Subject, Identity, TokenClaims
//!
//! Serializable, cloneable, and cheap to pass around.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{AuthError, Result};

/// Participant roles in a tracked session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    #[default]
    Student,
    Facilitator,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Student => "Student",
            Self::Facilitator => "Facilitator",
        }
    }

    /// Strict parse; unknown roles are rejected rather than downgraded
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Student" => Some(Self::Student),
            "Facilitator" => Some(Self::Facilitator),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The identity fields a token is minted from (a user at login or registration)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    pub id: i64,
    pub email: String,
    pub name: Option<String>,
    pub role: Role,
}

/// Authenticated principal resolved from a request.
///
/// Constructed only from verified claims and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub id: i64,
    pub email: String,
    pub name: Option<String>,
    pub role: Role,
    /// Absolute expiry (Unix seconds)
    pub expires_at: i64,
}

impl Identity {
    /// Valid only while `now < expires_at`
    pub fn is_expired_at(&self, now: i64) -> bool {
        now >= self.expires_at
    }

    /// Identity fields without the expiry
    pub fn subject(&self) -> Subject {
        Subject {
            id: self.id,
            email: self.email.clone(),
            name: self.name.clone(),
            role: self.role,
        }
    }

    /// Normalize decoded claims into a typed identity.
    ///
    /// `id` may have been written as a number or a numeric string; anything
    /// else, or a missing email or role, makes the identity unusable.
    pub fn from_claims(claims: TokenClaims) -> Result<Self> {
        let id = normalize_id(&claims.id)?;

        let email = match claims.email {
            Value::String(s) if !s.trim().is_empty() => s,
            _ => return Err(AuthError::InvalidIdentity("missing email".into())),
        };

        let role = match &claims.role {
            Value::String(s) => Role::parse(s)
                .ok_or_else(|| AuthError::InvalidIdentity(format!("unknown role {s:?}")))?,
            _ => return Err(AuthError::InvalidIdentity("missing role".into())),
        };

        Ok(Self {
            id,
            email,
            name: claims.name,
            role,
            expires_at: claims.exp,
        })
    }
}

fn normalize_id(value: &Value) -> Result<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .ok_or_else(|| AuthError::InvalidIdentity(format!("non-integer id {n}"))),
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| AuthError::InvalidIdentity(format!("non-numeric id {s:?}"))),
        Value::Null => Err(AuthError::InvalidIdentity("missing id".into())),
        other => Err(AuthError::InvalidIdentity(format!("unsupported id {other}"))),
    }
}

/// JWT claims for session tokens.
///
/// Identity fields are kept loosely typed on decode so that normalization
/// happens in one place ([`Identity::from_claims`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenClaims {
    #[serde(default)]
    pub id: Value,
    #[serde(default)]
    pub email: Value,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub role: Value,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiry (Unix timestamp)
    pub exp: i64,
}

impl TokenClaims {
    pub fn for_subject(subject: &Subject, iat: i64, exp: i64) -> Self {
        Self {
            id: Value::from(subject.id),
            email: Value::from(subject.email.clone()),
            name: subject.name.clone(),
            role: Value::from(subject.role.as_str()),
            iat,
            exp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn claims(id: Value) -> TokenClaims {
        TokenClaims {
            id,
            email: json!("ana@example.com"),
            name: Some("Ana".into()),
            role: json!("Facilitator"),
            iat: 100,
            exp: 200,
        }
    }

    #[test]
    fn test_role_serialization() {
        let json = serde_json::to_string(&Role::Facilitator).unwrap();
        assert_eq!(json, "\"Facilitator\"");
        let parsed: Role = serde_json::from_str("\"Student\"").unwrap();
        assert_eq!(parsed, Role::Student);
        assert_eq!(Role::parse("admin"), None);
    }

    #[test]
    fn test_numeric_id() {
        let identity = Identity::from_claims(claims(json!(42))).unwrap();
        assert_eq!(identity.id, 42);
        assert_eq!(identity.role, Role::Facilitator);
        assert_eq!(identity.expires_at, 200);
    }

    #[test]
    fn test_numeric_string_id() {
        let identity = Identity::from_claims(claims(json!("17"))).unwrap();
        assert_eq!(identity.id, 17);
    }

    #[test]
    fn test_unusable_ids_rejected() {
        for id in [json!("abc"), json!("12abc"), json!(1.5), json!(null), json!(true), json!([1])] {
            let err = Identity::from_claims(claims(id.clone())).unwrap_err();
            assert!(matches!(err, AuthError::InvalidIdentity(_)), "id {id} accepted");
        }
    }

    #[test]
    fn test_missing_email_rejected() {
        let mut c = claims(json!(1));
        c.email = Value::Null;
        assert!(matches!(
            Identity::from_claims(c),
            Err(AuthError::InvalidIdentity(_))
        ));
    }

    #[test]
    fn test_unknown_role_rejected() {
        let mut c = claims(json!(1));
        c.role = json!("Admin");
        assert!(matches!(
            Identity::from_claims(c),
            Err(AuthError::InvalidIdentity(_))
        ));
    }

    #[test]
    fn test_missing_identity_fields_deserialize() {
        // Absent identity fields decode; normalization rejects them later
        let c: TokenClaims = serde_json::from_str(r#"{"iat":1,"exp":2}"#).unwrap();
        assert_eq!(c.id, Value::Null);
        assert!(Identity::from_claims(c).is_err());
    }

    #[test]
    fn test_expiry_boundary() {
        let identity = Identity::from_claims(claims(json!(1))).unwrap();
        assert!(!identity.is_expired_at(199));
        assert!(identity.is_expired_at(200));
    }

    #[test]
    fn test_identity_wire_shape() {
        let identity = Identity::from_claims(claims(json!(3))).unwrap();
        let v = serde_json::to_value(&identity).unwrap();
        assert_eq!(v["expiresAt"], json!(200));
        assert_eq!(v["role"], json!("Facilitator"));
    }
}
