use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use validator::ValidationErrors;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Malformed JSON body: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Missing header: {0}")]
    MissingHeader(&'static str),

    #[error("Geolocation lookup failed: {0}")]
    GeoLookup(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Unauthorized access")]
    Unauthorized(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Validation(err) => (StatusCode::BAD_REQUEST, err.to_string()).into_response(),
            AppError::Config(err) => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response(),
            AppError::InvalidJson(err) => (StatusCode::BAD_REQUEST, format!("Malformed JSON body: {}", err)).into_response(),
            AppError::MissingHeader(name) => (StatusCode::BAD_REQUEST, format!("Missing header: {}", name)).into_response(),
            AppError::GeoLookup(msg) => (StatusCode::BAD_GATEWAY, msg).into_response(),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg).into_response(),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg).into_response(),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg).into_response(),
        }
    }
}
