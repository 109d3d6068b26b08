use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Database(String),
    Serialization(serde_json::Error),
    BadRequest(String),
    Internal(String),
    Configuration(String),
    /// A unique index rejected the write; carries the driver message
    UniqueViolation(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Database(e) => write!(f, "Database error: {}", e),
            AppError::Serialization(e) => write!(f, "Serialization error: {}", e),
            AppError::BadRequest(e) => write!(f, "Bad request: {}", e),
            AppError::Internal(e) => write!(f, "Internal error: {}", e),
            AppError::Configuration(e) => write!(f, "Configuration error: {}", e),
            AppError::UniqueViolation(e) => write!(f, "Unique constraint violated: {}", e),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Serialization(e) => Some(e),
            _ => None,
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                return AppError::UniqueViolation(db_err.message().to_string());
            }
        }
        AppError::Database(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err)
    }
}

pub type AppResult<T> = Result<T, AppError>;

/// Envelope used for every failure that is not a validation error
pub fn error_envelope(status: StatusCode, message: &str) -> (StatusCode, Json<serde_json::Value>) {
    (
        status,
        Json(json!({
            "success": false,
            "message": message
        })),
    )
}

impl AppError {
    pub fn to_response(&self) -> (StatusCode, Json<serde_json::Value>) {
        match self {
            AppError::BadRequest(e) => error_envelope(StatusCode::BAD_REQUEST, e),
            AppError::UniqueViolation(e) => {
                tracing::warn!("Unique constraint violation: {}", e);
                error_envelope(StatusCode::CONFLICT, "Resource already exists")
            }
            AppError::Database(_)
            | AppError::Serialization(_)
            | AppError::Internal(_)
            | AppError::Configuration(_) => {
                tracing::error!("{}", self);
                error_envelope(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.to_response().into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bad_request_response() {
        let (status, Json(body)) = AppError::BadRequest("Invalid id".to_string()).to_response();

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Invalid id");
    }

    #[test]
    fn test_internal_errors_hide_details() {
        let (status, Json(body)) =
            AppError::Database("connection refused".to_string()).to_response();

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], "Internal server error");
    }

    #[test]
    fn test_display() {
        let err = AppError::Configuration("missing url".to_string());
        assert_eq!(err.to_string(), "Configuration error: missing url");
    }
}
