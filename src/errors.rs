// src/errors.rs
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Why a tournament registration was refused.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationError {
    #[error("You are already registered for this tournament")]
    AlreadyRegistered,

    #[error("This tournament is full")]
    Full,

    #[error("Registration for this tournament is closed")]
    Closed,
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("MongoDB error: {0}")]
    MongoDB(#[from] mongodb::error::Error),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    Registration(#[from] RegistrationError),

    #[error("Authentication failed")]
    AuthError,

    #[error("Unauthorized access")]
    Forbidden,

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Invalid ObjectId: {0}")]
    InvalidObjectId(String),

    #[error("Duplicate entry: {0}")]
    DuplicateKey(String),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AppError::MongoDB(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Database error".to_string()),
            AppError::NotFound(what) => (StatusCode::NOT_FOUND, format!("{} not found", what)),
            AppError::Registration(reason) => {
                let status = match reason {
                    RegistrationError::AlreadyRegistered | RegistrationError::Full => StatusCode::CONFLICT,
                    RegistrationError::Closed => StatusCode::BAD_REQUEST,
                };
                (status, "Registration failed".to_string())
            }
            AppError::AuthError => (StatusCode::UNAUTHORIZED, "Authentication failed".to_string()),
            AppError::Forbidden => (StatusCode::FORBIDDEN, "Unauthorized access".to_string()),
            AppError::ValidationError(_) => (StatusCode::BAD_REQUEST, "Validation failed".to_string()),
            AppError::InvalidObjectId(_) => (StatusCode::BAD_REQUEST, "Invalid ID format".to_string()),
            AppError::DuplicateKey(_) => (StatusCode::CONFLICT, "Duplicate entry".to_string()),
            AppError::ConfigurationError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Configuration error".to_string()),
        };

        let body = Json(json!({
            "error": error_message,
            "message": self.to_string(),
            "success": false,
            "timestamp": chrono::Utc::now().to_rfc3339(),
        }));

        (status, body).into_response()
    }
}

impl From<mongodb::bson::ser::Error> for AppError {
    fn from(err: mongodb::bson::ser::Error) -> Self {
        AppError::ValidationError(format!("BSON serialization error: {}", err))
    }
}

impl From<mongodb::bson::oid::Error> for AppError {
    fn from(err: mongodb::bson::oid::Error) -> Self {
        AppError::InvalidObjectId(err.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::ValidationError(err.to_string())
    }
}

impl AppError {
    pub fn invalid_data(msg: impl Into<String>) -> Self {
        AppError::ValidationError(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
