//! Process configuration, loaded once at startup
//!
//! Signing-key material is decoded here, before the server binds: a
//! missing or undecodable secret would affect every subsequent issue and
//! verify call identically, so it aborts startup instead of surfacing as a
//! per-request error.

use anyhow::{Context, Result, bail};
use jsonwebtoken::{DecodingKey, EncodingKey};

use crate::auth::{TokenIssuer, TokenVerifier};

/// Signing configuration for the stateless credential layer.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Base64-encoded symmetric key material.
    pub secret: String,

    /// Token lifetime in milliseconds.
    pub token_ttl_ms: u64,
}

impl AuthConfig {
    /// One hour.
    pub const DEFAULT_TTL_MS: u64 = 3_600_000;

    pub fn new(secret: impl Into<String>, token_ttl_ms: u64) -> Self {
        Self {
            secret: secret.into(),
            token_ttl_ms,
        }
    }

    /// Load from `STOCKROOM_AUTH_SECRET` (required) and
    /// `STOCKROOM_TOKEN_TTL_MS` (optional, defaults to one hour).
    pub fn from_env() -> Result<Self> {
        let secret = std::env::var("STOCKROOM_AUTH_SECRET").context(
            "STOCKROOM_AUTH_SECRET is required (base64 key material; \
             generate one with: openssl rand -base64 32)",
        )?;

        let token_ttl_ms = match std::env::var("STOCKROOM_TOKEN_TTL_MS") {
            Ok(raw) => raw
                .parse()
                .context("STOCKROOM_TOKEN_TTL_MS must be an integer millisecond count")?,
            Err(_) => Self::DEFAULT_TTL_MS,
        };

        Ok(Self::new(secret, token_ttl_ms))
    }

    /// Build the issuing half. Fails on undecodable key material or a zero
    /// lifetime.
    pub fn issuer(&self) -> Result<TokenIssuer> {
        if self.token_ttl_ms == 0 {
            bail!("token lifetime must be nonzero");
        }
        let key = EncodingKey::from_base64_secret(&self.secret)
            .context("auth secret is not valid base64")?;
        Ok(TokenIssuer::new(key, self.token_ttl_ms))
    }

    /// Build the verifying half. Fails on undecodable key material.
    pub fn verifier(&self) -> Result<TokenVerifier> {
        let key = DecodingKey::from_base64_secret(&self.secret)
            .context("auth secret is not valid base64")?;
        Ok(TokenVerifier::new(key))
    }
}

/// Top-level application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Address the HTTP server binds to.
    pub listen_addr: String,

    /// MongoDB connection string.
    pub mongodb_uri: String,

    /// Database name.
    pub mongodb_db: String,

    pub auth: AuthConfig,
}

impl AppConfig {
    /// Load from environment variables, with local-development defaults for
    /// everything except the auth secret.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            listen_addr: env_or("STOCKROOM_LISTEN_ADDR", "0.0.0.0:8080"),
            mongodb_uri: env_or("STOCKROOM_MONGODB_URI", "mongodb://localhost:27017"),
            mongodb_db: env_or("STOCKROOM_MONGODB_DB", "stockroom"),
            auth: AuthConfig::from_env()?,
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_secret_builds_both_halves() {
        // "c2VjcmV0LWtleS1tYXRlcmlhbA" is base64 for "secret-key-material"
        let config = AuthConfig::new("c2VjcmV0LWtleS1tYXRlcmlhbA==", 1000);
        assert!(config.issuer().is_ok());
        assert!(config.verifier().is_ok());
    }

    #[test]
    fn test_invalid_base64_secret_fails() {
        let config = AuthConfig::new("!!! not base64 !!!", 1000);
        assert!(config.issuer().is_err());
        assert!(config.verifier().is_err());
    }

    #[test]
    fn test_zero_ttl_fails() {
        let config = AuthConfig::new("c2VjcmV0LWtleS1tYXRlcmlhbA==", 0);
        let err = config.issuer().unwrap_err();
        assert!(err.to_string().contains("nonzero"));
    }
}
