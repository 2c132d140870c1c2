//! HTTP server wiring

pub mod handlers;
pub mod middleware;
pub mod router;

use std::sync::Arc;

use anyhow::{Context, Result};
use mongodb::Database;

use crate::auth::{PasswordVerifier, TokenIssuer, TokenVerifier};
use crate::config::AppConfig;

/// Shared state handed to every handler.
///
/// Everything here is cheap to clone and read-only after startup: the
/// database handle is a connection-pool reference and the token halves hold
/// only key material.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub issuer: TokenIssuer,
    pub verifier: TokenVerifier,
    pub passwords: Arc<dyn PasswordVerifier>,
}

/// Build state and serve until the listener closes.
///
/// Key material is decoded before the socket binds; a bad signing secret
/// aborts startup here rather than failing every later request.
pub async fn run(config: AppConfig, passwords: Arc<dyn PasswordVerifier>) -> Result<()> {
    let issuer = config.auth.issuer().context("auth configuration invalid")?;
    let verifier = config
        .auth
        .verifier()
        .context("auth configuration invalid")?;

    let client = mongodb::Client::with_uri_str(&config.mongodb_uri)
        .await
        .context("failed to initialize MongoDB client")?;
    let db = client.database(&config.mongodb_db);

    let state = AppState {
        db,
        issuer,
        verifier,
        passwords,
    };
    let app = router::api_router(state);

    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.listen_addr))?;
    tracing::info!(addr = %config.listen_addr, "listening");

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
