//! Domain failures and their uniform HTTP translation
//!
//! Business-rule failures are a small closed set ([`DomainError`]); every
//! one of them crosses the HTTP boundary through the same rule
//! ([`translate`]) into one body shape ([`ErrorResponse`]). Not-found is
//! deliberately uniform across all entity kinds — product, brand, category,
//! provider, sale, stocktaking, user, role and permission all translate
//! identically.
//!
//! [`ApiError`] pairs a failure with the request path it occurred on and is
//! what handlers actually return; transport-level failures (storage faults,
//! rejected credentials, invalid payloads) reuse the same body shape so
//! clients parse exactly one error format.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use thiserror::Error;

/// Business-rule failures surfaced by services and handlers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// The requested document does not exist.
    #[error("{kind} with id '{key}' not found")]
    EntityNotFound { kind: String, key: String },

    /// A two-sided range was supplied with its lower bound above its upper
    /// bound.
    #[error("invalid range for field '{field}': lower bound exceeds upper bound")]
    InvalidRange { field: String },

    /// A field value could not be parsed in its expected format.
    #[error("invalid format for field '{field}'")]
    InvalidFormat { field: String },
}

impl DomainError {
    pub fn not_found(kind: impl Into<String>, key: impl Into<String>) -> Self {
        DomainError::EntityNotFound {
            kind: kind.into(),
            key: key.into(),
        }
    }

    pub fn invalid_range(field: impl Into<String>) -> Self {
        DomainError::InvalidRange {
            field: field.into(),
        }
    }

    pub fn invalid_format(field: impl Into<String>) -> Self {
        DomainError::InvalidFormat {
            field: field.into(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            DomainError::EntityNotFound { .. } => StatusCode::NOT_FOUND,
            DomainError::InvalidRange { .. } => StatusCode::BAD_REQUEST,
            DomainError::InvalidFormat { .. } => StatusCode::BAD_REQUEST,
        }
    }
}

/// Uniform error body returned by every failing endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub status: u16,
    pub message: String,
    pub errors: Option<Vec<String>>,
    pub timestamp: String,
    pub path: String,
}

/// Map a domain failure to the uniform error body.
///
/// The timestamp is rendered at translation time as RFC 3339 UTC with
/// seconds precision. Pure mapping: no logging, no retries, no state.
pub fn translate(error: &DomainError, path: &str) -> ErrorResponse {
    ErrorResponse {
        status: error.status_code().as_u16(),
        message: error.to_string(),
        errors: None,
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        path: path.to_string(),
    }
}

/// A failure paired with the request path, ready to become a response.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorResponse,
}

impl ApiError {
    /// A domain failure, translated through the uniform rule.
    pub fn domain(error: DomainError, path: &str) -> Self {
        Self {
            status: error.status_code(),
            body: translate(&error, path),
        }
    }

    /// Rejected credentials or missing/invalid token.
    pub fn unauthorized(message: impl Into<String>, path: &str) -> Self {
        Self::with_status(StatusCode::UNAUTHORIZED, message.into(), None, path)
    }

    /// Invalid inbound payload; `errors` carries the per-field messages.
    pub fn bad_request(message: impl Into<String>, errors: Vec<String>, path: &str) -> Self {
        let detail = if errors.is_empty() {
            None
        } else {
            Some(errors)
        };
        Self::with_status(StatusCode::BAD_REQUEST, message.into(), detail, path)
    }

    /// Storage or other infrastructure fault.
    pub fn internal(message: impl Into<String>, path: &str) -> Self {
        Self::with_status(
            StatusCode::INTERNAL_SERVER_ERROR,
            message.into(),
            None,
            path,
        )
    }

    fn with_status(
        status: StatusCode,
        message: String,
        errors: Option<Vec<String>>,
        path: &str,
    ) -> Self {
        Self {
            status,
            body: ErrorResponse {
                status: status.as_u16(),
                message,
                errors,
                timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
                path: path.to_string(),
            },
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    #[test]
    fn test_not_found_display_carries_kind_and_key() {
        let err = DomainError::not_found("Product", "123");
        assert!(err.to_string().contains("Product"));
        assert!(err.to_string().contains("123"));
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            DomainError::not_found("Sale", "s1").status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            DomainError::invalid_range("total").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            DomainError::invalid_format("sold_after").status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_translate_not_found() {
        let err = DomainError::not_found("Product", "123");
        let response = translate(&err, "/api/v1/products/123");

        assert_eq!(response.status, 404);
        assert!(response.message.contains("123"));
        assert!(response.errors.is_none());
        assert_eq!(response.path, "/api/v1/products/123");
    }

    #[test]
    fn test_translate_uniform_across_kinds() {
        for kind in [
            "Product",
            "Brand",
            "Category",
            "Provider",
            "Sale",
            "Stocktaking",
            "User",
            "Role",
            "Permission",
        ] {
            let response = translate(&DomainError::not_found(kind, "x"), "/api/v1/things/x");
            assert_eq!(response.status, 404);
            assert!(response.message.contains(kind));
            assert!(response.errors.is_none());
        }
    }

    #[test]
    fn test_translate_timestamp_is_rfc3339() {
        let response = translate(&DomainError::invalid_range("total"), "/api/v1/sales/search");
        DateTime::parse_from_rfc3339(&response.timestamp).expect("timestamp should parse");
    }

    #[test]
    fn test_api_error_statuses() {
        assert_eq!(
            ApiError::domain(DomainError::not_found("Role", "r"), "/api/v1/roles/r").status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::unauthorized("token has expired", "/api/v1/products").status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::internal("store unreachable", "/api/v1/products").status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_bad_request_carries_field_errors() {
        let err = ApiError::bad_request(
            "validation failed",
            vec!["name: must not be empty".to_string()],
            "/api/v1/products",
        );
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.body.errors.as_ref().map(Vec::len), Some(1));
    }
}
