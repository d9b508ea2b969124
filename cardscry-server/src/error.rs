//! API error handling module
//!
//! Provides a unified error type for all API endpoints with structured error variants.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use cardscry_core::ScryError;
use thiserror::Error;

/// API error type with structured variants for different error categories
#[derive(Debug, Error)]
pub enum ApiError {
    /// Bad request - client provided invalid input
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Request timeout - operation took too long
    #[error("Request timeout: {0}")]
    Timeout(String),

    /// Internal server error - unexpected server-side failure
    #[error("Internal error: {0}")]
    Internal(String),

    /// Service unavailable - required service is not configured or available
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Identification error - error from the fingerprinting library
    #[error("Identification error: {0}")]
    Scry(#[from] ScryError),
}

impl ApiError {
    /// Create a bad request error
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    /// Create an internal server error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Create a timeout error
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Timeout(message.into())
    }

    /// Create a service unavailable error
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::ServiceUnavailable(message.into())
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Timeout(_) => StatusCode::REQUEST_TIMEOUT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Scry(ref e) => match e {
                // Client-provided invalid input → 400
                ScryError::Decode(_)
                | ScryError::InvalidDimensions { .. }
                | ScryError::InvalidMode(_)
                | ScryError::InvalidHashLength(_) => StatusCode::BAD_REQUEST,

                // The image decoded but no card could be worked with → 422
                ScryError::Geometry(_) | ScryError::HashComputation => {
                    StatusCode::UNPROCESSABLE_ENTITY
                }

                // Catalog failures → 503
                ScryError::EmptyCatalog | ScryError::StoreUnavailable(_) => {
                    StatusCode::SERVICE_UNAVAILABLE
                }
            },
        }
    }

    /// Get the error code for programmatic error handling
    fn error_code(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "INVALID_INPUT",
            Self::Timeout(_) => "TIMEOUT",
            Self::Internal(_) => "INTERNAL_ERROR",
            Self::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
            Self::Scry(ref e) => match e {
                ScryError::Decode(_) => "DECODE_ERROR",
                ScryError::InvalidDimensions { .. } => "INVALID_DIMENSIONS",
                ScryError::InvalidMode(_) => "INVALID_MODE",
                ScryError::InvalidHashLength(_) => "INVALID_HASH_LENGTH",
                ScryError::Geometry(_) => "GEOMETRY_ERROR",
                ScryError::HashComputation => "DETECTION_FAILED",
                ScryError::EmptyCatalog => "CATALOG_EMPTY",
                ScryError::StoreUnavailable(_) => "CATALOG_UNAVAILABLE",
            },
        }
    }

    /// Get sanitized error message for client response
    fn client_message(&self) -> String {
        match self {
            // For identification errors, sanitize internal details
            Self::Scry(ref e) => match e {
                ScryError::Decode(_) => "Could not decode image data".to_string(),
                ScryError::InvalidDimensions { width, height } => {
                    format!("Image has invalid dimensions {}x{}", width, height)
                }
                ScryError::InvalidMode(mode) => {
                    format!("Unrecognized preprocess mode: '{}'", mode)
                }
                ScryError::InvalidHashLength(len) => {
                    format!("Invalid fingerprint length: {} bytes", len)
                }
                ScryError::Geometry(_) => "Card geometry could not be resolved".to_string(),
                ScryError::HashComputation => "No card detected in image".to_string(),
                ScryError::EmptyCatalog => "Card catalog is empty".to_string(),
                ScryError::StoreUnavailable(_) => "Card catalog unavailable".to_string(),
            },
            // For other errors, use the Display message
            _ => self.to_string(),
        }
    }

    /// Get the error category for logging
    fn error_category(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "bad_request",
            Self::Timeout(_) => "timeout",
            Self::Internal(_) => "internal",
            Self::ServiceUnavailable(_) => "service_unavailable",
            Self::Scry(_) => "scry",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let category = self.error_category();
        let code = self.error_code();
        let internal_message = self.to_string();
        let client_message = self.client_message();

        // Log based on severity, always including internal details
        match &self {
            Self::BadRequest(_) => {
                tracing::warn!(
                    status = %status,
                    category = category,
                    code = code,
                    error = %internal_message,
                    "Client error"
                );
            }
            Self::ServiceUnavailable(_) => {
                tracing::warn!(
                    status = %status,
                    category = category,
                    code = code,
                    error = %internal_message,
                    "Service unavailable"
                );
            }
            Self::Timeout(_) | Self::Internal(_) => {
                tracing::error!(
                    status = %status,
                    category = category,
                    code = code,
                    error = %internal_message,
                    "Server error"
                );
            }
            Self::Scry(e) => {
                // catalog failures are server-side, the rest is client input
                if status.is_server_error() {
                    tracing::error!(
                        status = %status,
                        category = category,
                        code = code,
                        error = %e,
                        "Identification error"
                    );
                } else {
                    tracing::warn!(
                        status = %status,
                        category = category,
                        code = code,
                        error = %e,
                        "Identification rejected"
                    );
                }
            }
        }

        // All error responses include a `code` field for programmatic error handling
        let body = serde_json::json!({
            "error": client_message,
            "code": code,
        });

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scry_error_status_mapping() {
        assert_eq!(
            ApiError::from(ScryError::HashComputation).status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ApiError::from(ScryError::EmptyCatalog).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ApiError::from(ScryError::StoreUnavailable("down".into())).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ApiError::from(ScryError::InvalidMode("gaussian".into())).status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_store_details_never_reach_clients() {
        let err = ApiError::from(ScryError::StoreUnavailable(
            "postgres://user:secret@db/cards refused".into(),
        ));
        assert_eq!(err.client_message(), "Card catalog unavailable");
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(
            ApiError::from(ScryError::HashComputation).error_code(),
            "DETECTION_FAILED"
        );
        assert_eq!(ApiError::bad_request("x").error_code(), "INVALID_INPUT");
    }
}
