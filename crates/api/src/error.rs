//! Unified error handling for the API.
//!
//! Every failure a handler can produce converges on [`ApiError`], which
//! renders the JSON envelope `{success:false, error, errors?}`. Internal
//! causes are logged server-side and never cross the HTTP boundary.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::auth::AuthError;
use crate::validate::ValidationErrors;

/// Message returned for any unexpected server-side failure.
const INTERNAL_ERROR_MESSAGE: &str = "Error interno del servidor";

/// Message returned for any missing, invalid, or expired credential.
const UNAUTHORIZED_MESSAGE: &str = "No autorizado";

/// Application-level error type for the API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Payload failed validation; carries the field-level error map.
    #[error("validation failed")]
    Validation(ValidationErrors),

    /// Request body could not be read as the expected JSON shape.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Duplicate identity or resource.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Missing, invalid, or expired credential. Deliberately carries no
    /// detail: absent, tampered, and expired tokens are indistinguishable
    /// to the caller, as are unknown emails and wrong passwords.
    #[error("unauthorized")]
    Unauthorized,

    /// Resource not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Database operation failed.
    #[error("database error: {0}")]
    Database(#[from] RepositoryError),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // Log server errors with Sentry
        if matches!(self, Self::Database(_) | Self::Internal(_)) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "API request error"
            );
        }

        let status = match &self {
            Self::Validation(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        // Don't expose internal error details to clients
        let body = match self {
            Self::Validation(errors) => {
                let message = errors
                    .first_message()
                    .unwrap_or("Datos invalidos")
                    .to_owned();
                json!({ "success": false, "error": message, "errors": errors })
            }
            Self::BadRequest(message) | Self::Conflict(message) | Self::NotFound(message) => {
                json!({ "success": false, "error": message })
            }
            Self::Unauthorized => json!({ "success": false, "error": UNAUTHORIZED_MESSAGE }),
            Self::Database(_) | Self::Internal(_) => {
                json!({ "success": false, "error": INTERNAL_ERROR_MESSAGE })
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(errors)
    }
}

impl From<AuthError> for ApiError {
    fn from(error: AuthError) -> Self {
        match error {
            AuthError::InvalidCredentials => Self::Unauthorized,
            AuthError::UserAlreadyExists => {
                Self::Conflict("Usuario ya existente en nuestra base de datos".to_owned())
            }
            AuthError::Repository(e) => Self::Database(e),
            AuthError::PasswordHash => Self::Internal("password hashing failed".to_owned()),
            AuthError::Token(e) => Self::Internal(format!("token signing failed: {e}")),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(error = %rejection, "rejected request body");
        Self::BadRequest("Datos invalidos".to_owned())
    }
}

/// JSON extractor whose rejection renders the API error envelope instead
/// of axum's plain-text default.
#[derive(Debug, Clone, Copy, axum::extract::FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct AppJson<T>(pub T);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::validate;

    fn get_status(err: ApiError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_api_error_display() {
        let err = ApiError::NotFound("Producto no encontrado".to_string());
        assert_eq!(err.to_string(), "not found: Producto no encontrado");

        let err = ApiError::Conflict("duplicate".to_string());
        assert_eq!(err.to_string(), "conflict: duplicate");
    }

    #[test]
    fn test_api_error_status_codes() {
        assert_eq!(
            get_status(ApiError::BadRequest("x".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(ApiError::Conflict("x".to_string())),
            StatusCode::CONFLICT
        );
        assert_eq!(get_status(ApiError::Unauthorized), StatusCode::UNAUTHORIZED);
        assert_eq!(
            get_status(ApiError::NotFound("x".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(ApiError::Internal("x".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_validation_error_maps_to_400() {
        let errors = validate::credentials(Some("bad"), Some("123")).unwrap_err();
        assert_eq!(
            get_status(ApiError::Validation(errors)),
            StatusCode::BAD_REQUEST
        );
    }

    #[tokio::test]
    async fn test_internal_error_body_is_generic() {
        let response = ApiError::Internal("connection pool exhausted".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["success"], json!(false));
        assert_eq!(body["error"], json!("Error interno del servidor"));
        assert!(!String::from_utf8_lossy(&bytes).contains("connection pool"));
    }

    #[tokio::test]
    async fn test_validation_error_body_has_flat_error_and_map() {
        let errors = validate::credentials(None, Some("123")).unwrap_err();
        let response = ApiError::Validation(errors).into_response();

        let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["success"], json!(false));
        assert!(body["error"].is_string());
        assert!(body["errors"]["email"].is_array());
        assert!(body["errors"]["password"].is_array());
    }

    #[test]
    fn test_auth_error_conversion() {
        assert!(matches!(
            ApiError::from(crate::services::auth::AuthError::InvalidCredentials),
            ApiError::Unauthorized
        ));
        assert!(matches!(
            ApiError::from(crate::services::auth::AuthError::UserAlreadyExists),
            ApiError::Conflict(_)
        ));
    }
}
