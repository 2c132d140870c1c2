//! Request authentication middleware

use axum::extract::{Request, State};
use axum::http::header;
use axum::middleware::Next;
use axum::response::Response;

use crate::auth::TokenVerifier;
use crate::core::error::ApiError;

/// Extract the bearer token from the Authorization header.
fn bearer_token(request: &Request) -> Option<String> {
    request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|auth| auth.strip_prefix("Bearer ").map(str::to_string))
}

/// Require a valid credential on every request passing through.
///
/// On success the verified [`Identity`](crate::auth::Identity) lands in the
/// request extensions for handlers to read. Any rejection — missing header,
/// tampered signature, expired token — becomes a 401; there is no fallback
/// to an anonymous identity.
pub async fn require_auth(
    State(verifier): State<TokenVerifier>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let path = request.uri().path().to_string();

    let token = bearer_token(&request)
        .ok_or_else(|| ApiError::unauthorized("missing bearer token", &path))?;

    match verifier.verify(&token).await {
        Ok(identity) => {
            request.extensions_mut().insert(identity);
            Ok(next.run(request).await)
        }
        Err(rejection) => {
            tracing::debug!(%rejection, "rejected credential");
            Err(ApiError::unauthorized(rejection.to_string(), &path))
        }
    }
}
