use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;

/// Domain errors, mapped to HTTP statuses at the controller boundary.
/// Business-rule violations are 400, auth failures 401/403, everything
/// unexpected 500 with a generic body.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Already checked in for today")]
    AlreadyCheckedIn,

    #[error("No check-in record found for today")]
    NoCheckInRecord,

    #[error("Already checked out for today")]
    AlreadyCheckedOut,

    #[error("Email already in use")]
    EmailTaken,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("Access denied. Insufficient permissions.")]
    Forbidden,

    #[error("Internal server error")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("Internal server error")]
    Csv(#[from] csv::Error),

    #[error("Internal server error")]
    Internal,
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::AlreadyCheckedIn
            | ApiError::NoCheckInRecord
            | ApiError::AlreadyCheckedOut
            | ApiError::EmailTaken
            | ApiError::InvalidCredentials
            | ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::Database(_) | ApiError::Token(_) | ApiError::Csv(_) | ApiError::Internal => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            ApiError::Database(e) => tracing::error!(error = %e, "Database error"),
            ApiError::Token(e) => tracing::error!(error = %e, "Token error"),
            ApiError::Csv(e) => tracing::error!(error = %e, "CSV generation error"),
            _ => {}
        }
        HttpResponse::build(self.status_code()).json(json!({ "message": self.to_string() }))
    }
}
