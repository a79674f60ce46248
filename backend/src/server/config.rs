//! Server configuration read from the environment.

use std::env;

use actix_web::cookie::Key;
use tracing::warn;
use url::Url;

/// Configuration error raised at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A required environment variable is absent.
    #[error("missing required environment variable {name}")]
    MissingVar { name: &'static str },
    /// An environment variable carries an unusable value.
    #[error("invalid value for {name}: {message}")]
    InvalidVar { name: &'static str, message: String },
    /// The session key file could not be read.
    #[error("failed to read session key at {path}: {message}")]
    SessionKey { path: String, message: String },
}

/// Everything the server needs to start, resolved once at boot.
pub struct ServerConfig {
    /// Socket address the HTTP server binds, e.g. `0.0.0.0:8080`.
    pub bind_addr: String,
    /// PostgreSQL connection string.
    pub database_url: String,
    /// Signing/encryption key for the session cookie.
    pub session_key: Key,
    /// Whether the session cookie carries the `Secure` flag.
    pub cookie_secure: bool,
    /// Secret key authenticating against the payment processor.
    pub payment_secret_key: String,
    /// Public base URL the processor redirects back to.
    pub public_base_url: Url,
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    env::var(name).map_err(|_| ConfigError::MissingVar { name })
}

fn session_key() -> Result<Key, ConfigError> {
    let path =
        env::var("SESSION_KEY_FILE").unwrap_or_else(|_| "/var/run/secrets/session_key".to_owned());
    match std::fs::read(&path) {
        Ok(bytes) => Ok(Key::derive_from(&bytes)),
        Err(error) => {
            let allow_dev = env::var("SESSION_ALLOW_EPHEMERAL").ok().as_deref() == Some("1");
            if cfg!(debug_assertions) || allow_dev {
                warn!(path = %path, error = %error, "using temporary session key (dev only)");
                Ok(Key::generate())
            } else {
                Err(ConfigError::SessionKey {
                    path,
                    message: error.to_string(),
                })
            }
        }
    }
}

impl ServerConfig {
    /// Resolve the configuration from environment variables.
    ///
    /// Required: `DATABASE_URL`, `PAYMENT_SECRET_KEY`, `PUBLIC_BASE_URL`.
    /// Optional: `BIND_ADDR` (default `0.0.0.0:8080`), `SESSION_KEY_FILE`,
    /// `SESSION_ALLOW_EPHEMERAL`, `SESSION_COOKIE_SECURE`.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] naming the first missing or invalid
    /// variable.
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = required("DATABASE_URL")?;
        let payment_secret_key = required("PAYMENT_SECRET_KEY")?;
        let public_base_url = required("PUBLIC_BASE_URL").and_then(|raw| {
            Url::parse(&raw).map_err(|error| ConfigError::InvalidVar {
                name: "PUBLIC_BASE_URL",
                message: error.to_string(),
            })
        })?;

        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_owned());
        let cookie_secure = env::var("SESSION_COOKIE_SECURE")
            .map(|value| value != "0")
            .unwrap_or(true);

        Ok(Self {
            bind_addr,
            database_url,
            session_key: session_key()?,
            cookie_secure,
            payment_secret_key,
            public_base_url,
        })
    }
}
