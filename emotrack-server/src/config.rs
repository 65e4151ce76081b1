//! Server configuration, read once from the environment at startup

use emotrack_auth::{AuthConfig, Result};

/// Environment variable for the listen address
pub const ENV_HOST: &str = "EMOTRACK_HOST";

/// Environment variable for the listen port (the common cloud convention)
pub const ENV_PORT: &str = "PORT";

const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub auth: AuthConfig,
}

impl ServerConfig {
    pub fn new(auth: AuthConfig) -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            auth,
        }
    }

    /// Load everything from the environment; a missing signing secret fails
    pub fn from_env() -> Result<Self> {
        let auth = AuthConfig::from_env()?;
        let mut config = Self::new(auth);

        if let Ok(host) = std::env::var(ENV_HOST) {
            if !host.trim().is_empty() {
                config.host = host;
            }
        }
        if let Some(port) = std::env::var(ENV_PORT).ok().and_then(|p| p.parse().ok()) {
            config.port = port;
        }
        Ok(config)
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
