//! Runnable inventory API server.
//!
//! ```sh
//! export STOCKROOM_AUTH_SECRET=$(openssl rand -base64 32)
//! cargo run --example inventory_api
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use stockroom::auth::PasswordVerifier;
use stockroom::config::AppConfig;
use tracing_subscriber::EnvFilter;

/// Demo-only verifier: compares the supplied password directly against the
/// stored value. A real deployment injects its KDF here — hashing is
/// deliberately outside the service.
struct PlainComparison;

#[async_trait]
impl PasswordVerifier for PlainComparison {
    async fn verify(&self, supplied: &str, stored_hash: &str) -> bool {
        supplied == stored_hash
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env()?;
    stockroom::server::run(config, Arc::new(PlainComparison)).await
}
