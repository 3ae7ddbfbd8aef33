use axum::http::{header, request::Parts, HeaderMap};
use serde_json::Value;
use url::form_urlencoded;

use crate::{errors::AppError, middleware::RequestContext, types::ParsedParameters};

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Merges query and form parameters (form wins on collisions). With neither
/// present the body is decoded as JSON; a non-object value comes back as
/// `{"data": value}`.
///
/// # Errors
/// [`AppError::InvalidJson`] when the fallback body is not valid JSON.
pub fn resolve_parameters(parts: &mut Parts, body: &[u8]) -> Result<ParsedParameters, AppError> {
    if let Some(params) = RequestContext::cached_parameters(&parts.extensions) {
        return Ok(params);
    }

    let mut params = ParsedParameters::new();
    if let Some(query) = parts.uri.query() {
        extend_urlencoded(&mut params, query.as_bytes());
    }
    if is_form(&parts.headers) {
        extend_urlencoded(&mut params, body);
    }

    if params.is_empty() && !body.is_empty() {
        params = match serde_json::from_slice::<Value>(body)? {
            Value::Object(map) => map,
            other => {
                let mut wrapped = ParsedParameters::new();
                wrapped.insert("data".to_string(), other);
                wrapped
            }
        };
    }

    RequestContext::of_mut(&mut parts.extensions).parameters = Some(params.clone());
    Ok(params)
}

// Repeated keys keep their last value.
fn extend_urlencoded(params: &mut ParsedParameters, input: &[u8]) {
    for (key, value) in form_urlencoded::parse(input) {
        params.insert(key.into_owned(), Value::String(value.into_owned()));
    }
}

fn is_form(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|ct| ct.trim().to_ascii_lowercase().starts_with(FORM_CONTENT_TYPE))
        .unwrap_or(false)
}
