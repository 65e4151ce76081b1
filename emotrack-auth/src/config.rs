//! Configuration for emotrack authentication

use crate::error::{AuthError, Result};

/// Environment variable holding the token signing secret
pub const ENV_JWT_SECRET: &str = "EMOTRACK_JWT_SECRET";

/// Environment variable naming the deployment (`production` enables `Secure` cookies)
pub const ENV_DEPLOYMENT: &str = "EMOTRACK_ENV";

/// Authentication configuration, loaded once at startup and never mutated
#[derive(Clone)]
pub struct AuthConfig {
    /// HMAC secret for token signing and verification
    pub jwt_secret: String,

    /// Token lifetime in days
    pub token_ttl_days: u32,

    /// Add the `Secure` attribute to session cookies (TLS deployments)
    pub secure_cookies: bool,

    /// Login entry point protected pages redirect to
    pub login_path: String,
}

impl AuthConfig {
    /// Create config with the given signing secret and sensible defaults
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            token_ttl_days: 7,
            secure_cookies: false,
            login_path: "/login".to_string(),
        }
    }

    /// Load from the process environment.
    ///
    /// A missing or empty `EMOTRACK_JWT_SECRET` is a configuration error; callers
    /// are expected to abort startup on it.
    pub fn from_env() -> Result<Self> {
        let secret = std::env::var(ENV_JWT_SECRET)
            .map_err(|_| AuthError::Config(format!("{ENV_JWT_SECRET} is not set")))?;
        let production = std::env::var(ENV_DEPLOYMENT)
            .map(|v| v.eq_ignore_ascii_case("production"))
            .unwrap_or(false);

        let config = Self::new(secret).with_secure_cookies(production);
        config.validate()?;
        Ok(config)
    }

    /// Override token lifetime
    pub fn with_token_ttl_days(mut self, days: u32) -> Self {
        self.token_ttl_days = days;
        self
    }

    /// Override the `Secure` cookie attribute
    pub fn with_secure_cookies(mut self, secure: bool) -> Self {
        self.secure_cookies = secure;
        self
    }

    /// Override the login entry point
    pub fn with_login_path(mut self, path: impl Into<String>) -> Self {
        self.login_path = path.into();
        self
    }

    /// Reject configurations that cannot sign tokens
    pub fn validate(&self) -> Result<()> {
        if self.jwt_secret.trim().is_empty() {
            return Err(AuthError::Config("signing secret is empty".into()));
        }
        if self.token_ttl_days == 0 {
            return Err(AuthError::Config("token lifetime must be at least one day".into()));
        }
        Ok(())
    }

    /// Token lifetime in seconds (also the cookie `Max-Age`)
    pub fn token_ttl_secs(&self) -> i64 {
        i64::from(self.token_ttl_days) * 24 * 60 * 60
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"<redacted>")
            .field("token_ttl_days", &self.token_ttl_days)
            .field("secure_cookies", &self.secure_cookies)
            .field("login_path", &self.login_path)
            .finish()
    }
}
