//! Authentication errors

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

/// Custom error type for authentication errors
#[derive(Error, Debug)]
pub enum AuthError {
    /// A required field is missing or malformed
    #[error("{0}")]
    Validation(String),

    /// The name or email is already registered
    #[error("User already exists")]
    Conflict,

    /// Unknown user name or wrong password
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// No bearer token was presented
    #[error("Missing token")]
    MissingToken,

    /// The bearer token is malformed, badly signed or expired
    #[error("Invalid token")]
    InvalidToken(#[source] jsonwebtoken::errors::Error),

    /// The password could not be hashed or the stored hash is unreadable
    #[error("Password hashing failed: {0}")]
    Hashing(String),

    /// A token could not be signed
    #[error("Token signing failed: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),

    /// The credential store failed
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl AuthError {
    /// HTTP status this error maps to
    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::Validation(_) => StatusCode::BAD_REQUEST,
            AuthError::Conflict => StatusCode::CONFLICT,
            AuthError::InvalidCredentials | AuthError::MissingToken | AuthError::InvalidToken(_) => {
                StatusCode::UNAUTHORIZED
            }
            AuthError::Hashing(_) | AuthError::Signing(_) | AuthError::Database(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message safe to show the caller
    pub fn public_message(&self) -> String {
        match self.status() {
            StatusCode::INTERNAL_SERVER_ERROR => "Internal server error".to_string(),
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!("Authentication failure: {}", self);
        }

        let body = Json(serde_json::json!({
            "error": self.public_message(),
        }));

        (status, body).into_response()
    }
}
