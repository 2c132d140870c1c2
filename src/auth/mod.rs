//! Stateless authentication: token lifecycle and the identity boundary

pub mod token;

use async_trait::async_trait;

pub use token::{Identity, TokenIssuer, TokenRejection, TokenVerifier};

/// Checks a supplied password against the externally-hashed stored value.
///
/// Hashing happens outside this service; the user store only ever holds
/// hashes. Implementations wrap whatever KDF the deployment uses, which may
/// itself be slow or remote, hence the async contract.
#[async_trait]
pub trait PasswordVerifier: Send + Sync {
    async fn verify(&self, supplied: &str, stored_hash: &str) -> bool;
}
