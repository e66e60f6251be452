use axum::{Json, extract::rejection::JsonRejection, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use thiserror::Error;
use validator::ValidationErrors;

use crate::{auth::AuthProviderError, dao::storage::StorageError};

/// Message shown when a form is submitted with empty required fields.
pub const MISSING_FIELDS_MESSAGE: &str = "please fill in all fields";

/// Errors that can occur in service layer operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Storage backend failed during a read, write or delete.
    #[error("storage unavailable")]
    Unavailable(#[source] StorageError),
    /// Application is running in degraded mode without storage.
    #[error("storage unavailable (degraded mode)")]
    Degraded,
    /// The authentication provider refused the credentials.
    #[error("{0}")]
    Auth(String),
    /// The authentication provider could not be reached or answered garbage.
    #[error("authentication provider unavailable")]
    AuthUnavailable(#[source] AuthProviderError),
    /// Required input is missing or malformed.
    #[error("invalid input: {0}")]
    Validation(String),
    /// No authenticated session.
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    /// Authenticated, but the role does not allow the operation.
    #[error("forbidden: {0}")]
    Forbidden(String),
    /// A match with this token already exists and overwrites are disabled.
    #[error("match `{0}` already exists")]
    DuplicateToken(String),
}

impl From<StorageError> for ServiceError {
    fn from(err: StorageError) -> Self {
        ServiceError::Unavailable(err)
    }
}

impl From<AuthProviderError> for ServiceError {
    fn from(err: AuthProviderError) -> Self {
        match err {
            AuthProviderError::Rejected { .. } => ServiceError::Auth(err.user_message()),
            AuthProviderError::Transport { .. } => ServiceError::AuthUnavailable(err),
        }
    }
}

impl From<ValidationErrors> for ServiceError {
    fn from(err: ValidationErrors) -> Self {
        // Presence is the only rule enforced on forms, so one message covers every field.
        let mut fields = err
            .field_errors()
            .keys()
            .map(|field| field.to_string())
            .collect::<Vec<_>>();
        fields.sort();
        ServiceError::Validation(format!("{MISSING_FIELDS_MESSAGE} ({})", fields.join(", ")))
    }
}

/// Application-level errors that are converted to HTTP responses.
#[derive(Debug, Error)]
pub enum AppError {
    /// Bad request with invalid input.
    #[error("bad request: {0}")]
    BadRequest(String),
    /// Unauthorized access attempt.
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    /// Authenticated caller lacking the required role.
    #[error("forbidden: {0}")]
    Forbidden(String),
    /// Conflict with current state.
    #[error("conflict: {0}")]
    Conflict(String),
    /// Service unavailable or degraded.
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Unavailable(source) => AppError::ServiceUnavailable(source.to_string()),
            ServiceError::Degraded => AppError::ServiceUnavailable("degraded mode".into()),
            ServiceError::Auth(message) => AppError::Unauthorized(message),
            ServiceError::AuthUnavailable(source) => {
                AppError::ServiceUnavailable(source.user_message())
            }
            ServiceError::Validation(message) => AppError::BadRequest(message),
            ServiceError::Unauthorized(message) => AppError::Unauthorized(message),
            ServiceError::Forbidden(message) => AppError::Forbidden(message),
            ServiceError::DuplicateToken(token) => {
                AppError::Conflict(format!("match `{token}` already exists"))
            }
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        };

        let payload = Json(ErrorBody {
            message: self.to_string(),
        });

        (status, payload).into_response()
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;

    #[test]
    fn provider_rejections_surface_the_parsed_message() {
        let err: ServiceError = AuthProviderError::Rejected {
            raw: r#"{"error":{"message":"INVALID_LOGIN_CREDENTIALS"}}"#.into(),
        }
        .into();
        assert_eq!(err.to_string(), "INVALID_LOGIN_CREDENTIALS");
    }

    #[test]
    fn unreachable_provider_is_unavailable_not_unauthorized() {
        let err: ServiceError = AuthProviderError::transport(
            "sending request",
            io::Error::new(io::ErrorKind::TimedOut, "timed out"),
        )
        .into();
        assert!(matches!(err, ServiceError::AuthUnavailable(_)));

        let response = AppError::from(err).into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn service_errors_map_to_expected_statuses() {
        let cases = [
            (ServiceError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (ServiceError::Auth("x".into()), StatusCode::UNAUTHORIZED),
            (ServiceError::Unauthorized("x".into()), StatusCode::UNAUTHORIZED),
            (ServiceError::Forbidden("x".into()), StatusCode::FORBIDDEN),
            (ServiceError::DuplicateToken("T1".into()), StatusCode::CONFLICT),
            (ServiceError::Degraded, StatusCode::SERVICE_UNAVAILABLE),
        ];

        for (err, expected) in cases {
            let response = AppError::from(err).into_response();
            assert_eq!(response.status(), expected);
        }
    }
}
