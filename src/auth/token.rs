//! Stateless token issuance and verification
//!
//! Credentials are HS256-signed JWTs carrying a subject, a role claim set
//! and millisecond-precision issue/expiry instants. The signing key is
//! process-wide configuration: built once at startup, cloned read-only into
//! every issuer/verifier handle, never rotated at runtime. Concurrent calls
//! share nothing mutable, so no locking is involved.
//!
//! Both signing and signature verification are CPU-bound; [`TokenIssuer`]
//! and [`TokenVerifier`] hop onto the blocking worker pool for that work so
//! a burst of logins never stalls unrelated requests on the async workers.
//!
//! Expiry note: the token lifetime is configured in milliseconds, but the
//! JWT library validates `exp` at second granularity with leeway. The
//! verifier therefore disables the library's expiry check and enforces the
//! millisecond deadline itself.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a presented token was rejected. Never partially valid: any rejection
/// means no identity at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TokenRejection {
    /// The signature does not match the payload.
    #[error("token signature does not match")]
    Tampered,

    /// The expiry instant has passed.
    #[error("token has expired")]
    Expired,

    /// The token is not structurally a valid credential.
    #[error("token is malformed")]
    Malformed,
}

/// Validated identity extracted from a verified token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub subject: String,
    pub roles: BTreeSet<String>,
}

/// Wire-format claims. `iat` and `exp` are Unix epoch milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Claims {
    sub: String,
    roles: BTreeSet<String>,
    iat: i64,
    exp: i64,
}

/// Issues signed, time-bounded credentials for already-authenticated
/// identities. Credential checking itself happens upstream.
#[derive(Clone)]
pub struct TokenIssuer {
    key: Arc<EncodingKey>,
    ttl_ms: i64,
}

impl TokenIssuer {
    pub fn new(key: EncodingKey, ttl_ms: u64) -> Self {
        Self {
            key: Arc::new(key),
            ttl_ms: ttl_ms as i64,
        }
    }

    /// Sign a credential for `subject` carrying `roles`, expiring after the
    /// configured lifetime.
    pub async fn issue(&self, subject: &str, roles: BTreeSet<String>) -> anyhow::Result<String> {
        let now = Utc::now().timestamp_millis();
        let claims = Claims {
            sub: subject.to_string(),
            roles,
            iat: now,
            exp: now + self.ttl_ms,
        };

        let key = Arc::clone(&self.key);
        let token =
            tokio::task::spawn_blocking(move || encode(&Header::new(Algorithm::HS256), &claims, &key))
                .await??;
        Ok(token)
    }

    /// Configured token lifetime in milliseconds.
    pub fn ttl_ms(&self) -> i64 {
        self.ttl_ms
    }
}

/// Validates signature and expiry, yielding the embedded identity.
#[derive(Clone)]
pub struct TokenVerifier {
    key: Arc<DecodingKey>,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(key: DecodingKey) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is enforced below from the millisecond `exp` claim.
        validation.validate_exp = false;
        validation.set_required_spec_claims::<&str>(&[]);

        Self {
            key: Arc::new(key),
            validation,
        }
    }

    /// Verify signature and expiry, returning the identity or a rejection.
    ///
    /// Expiry rejects even when the signature is valid. Idempotent and
    /// side-effect-free: the same token verifies to the same result unless
    /// the expiry instant passes between calls.
    pub async fn verify(&self, token: &str) -> Result<Identity, TokenRejection> {
        let claims = self.decode(token).await?;
        Ok(Identity {
            subject: claims.sub,
            roles: claims.roles,
        })
    }

    /// Extract only the subject, propagating any rejection.
    ///
    /// Same signature/structure/expiry checks as [`TokenVerifier::verify`],
    /// but fails loudly instead of answering yes/no — callers that want a
    /// boolean must take the full verify path, where failure detail is
    /// preserved for them to inspect.
    pub async fn extract_subject(&self, token: &str) -> Result<String, TokenRejection> {
        let claims = self.decode(token).await?;
        Ok(claims.sub)
    }

    async fn decode(&self, token: &str) -> Result<Claims, TokenRejection> {
        let key = Arc::clone(&self.key);
        let validation = self.validation.clone();
        let token = token.to_string();

        let decoded = tokio::task::spawn_blocking(move || {
            decode::<Claims>(&token, &key, &validation)
        })
        .await
        .map_err(|join_err| {
            tracing::error!(error = %join_err, "token verification task failed");
            TokenRejection::Malformed
        })?;

        let claims = match decoded {
            Ok(data) => data.claims,
            Err(err) => return Err(classify(err)),
        };

        if Utc::now().timestamp_millis() >= claims.exp {
            return Err(TokenRejection::Expired);
        }
        Ok(claims)
    }
}

fn classify(err: jsonwebtoken::errors::Error) -> TokenRejection {
    use jsonwebtoken::errors::ErrorKind;

    match err.kind() {
        ErrorKind::InvalidSignature => TokenRejection::Tampered,
        ErrorKind::ExpiredSignature => TokenRejection::Expired,
        _ => TokenRejection::Malformed,
    }
}
