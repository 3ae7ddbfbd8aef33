use axum::{http::header, response::IntoResponse};
use prometheus::Encoder;

use crate::errors::AppError;

pub async fn metrics_handler() -> Result<impl IntoResponse, AppError> {
    let encoder = prometheus::TextEncoder::new();
    let mut buffer = vec![];
    encoder
        .encode(&prometheus::gather(), &mut buffer)
        .map_err(|e| AppError::Internal(e.to_string()))?;
    Ok(([(header::CONTENT_TYPE, encoder.format_type().to_string())], buffer))
}
