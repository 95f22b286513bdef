use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::shared::types::{ErrorResponse, FieldErrors};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Request-level validation failure, reported as 400
    #[error("Validation error: {0}")]
    Validation(String),

    /// Field-level validation failure, reported as 400 with per-field detail
    #[error("Invalid fields: {0:?}")]
    InvalidFields(FieldErrors),

    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Malformed request body (e.g. a missing multipart part)
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    /// Missing or wrong API key. Carries the header name the key is expected in.
    #[error("Unauthorized: {message}")]
    Unauthorized { message: String, header: String },
}

impl AppError {
    /// Single field error, in the same shape validator failures produce
    pub fn field(field: &str, message: impl Into<String>) -> Self {
        let mut errors = FieldErrors::new();
        errors.insert(field.to_string(), vec![message.into()]);
        AppError::InvalidFields(errors)
    }
}

/// Flatten validator failures into the field -> messages map
pub fn field_errors(errors: &validator::ValidationErrors) -> FieldErrors {
    let mut fields = FieldErrors::new();
    for (field, entries) in errors.field_errors() {
        let messages = entries
            .iter()
            .map(|e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Invalid value ({})", e.code))
            })
            .collect();
        fields.insert(field.to_string(), messages);
    }
    fields
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::InvalidFields(field_errors(&errors))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body, authenticate) = match self {
            AppError::Database(ref e) => {
                tracing::error!("Database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new("Database error occurred"),
                    None,
                )
            }
            AppError::Storage(ref e) => {
                tracing::error!("Storage error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new("Storage error occurred"),
                    None,
                )
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, ErrorResponse::new(msg), None),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, ErrorResponse::new(msg), None),
            AppError::InvalidFields(fields) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::with_fields(fields),
                None,
            ),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, ErrorResponse::new(msg), None),
            AppError::Parse(msg) => (StatusCode::BAD_REQUEST, ErrorResponse::new(msg), None),
            AppError::Internal(ref msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new("Internal server error"),
                    None,
                )
            }
            AppError::Unauthorized { message, header } => (
                StatusCode::UNAUTHORIZED,
                ErrorResponse::new(message),
                Some(header),
            ),
        };

        let mut response = (status, Json(body)).into_response();
        if let Some(value) = authenticate.and_then(|h| HeaderValue::from_str(&h).ok()) {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, value);
        }
        response
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Sample {
        #[validate(length(min = 1, message = "must not be empty"))]
        name: String,
    }

    #[test]
    fn test_validation_errors_become_field_map() {
        let sample = Sample {
            name: String::new(),
        };
        let err: AppError = sample.validate().unwrap_err().into();
        match err {
            AppError::InvalidFields(fields) => {
                assert_eq!(fields["name"], vec!["must not be empty".to_string()]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::Validation("x".into()).into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Parse("x".into()).into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::field("type", "bad").into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Internal("x".into()).into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_unauthorized_sets_authenticate_header() {
        let response = AppError::Unauthorized {
            message: "API KEY is not valid".into(),
            header: "X-API-KEY".into(),
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
            "X-API-KEY"
        );
    }
}
