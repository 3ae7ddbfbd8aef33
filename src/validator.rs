use once_cell::sync::Lazy;
use regex::Regex;
use validator::ValidationError;

use crate::middleware::auth::KNOWN_AUTHENTICATORS;

static MALICIOUS_URL_REGEX: Lazy<Regex> = Lazy::new(||
    Regex::new(r"(?i)^javascript:|^data:|<script|eval\(|onload=").unwrap()
);

pub fn validate_authentication_classes(classes: &Vec<String>) -> Result<(), ValidationError> {
    for class in classes {
        if !KNOWN_AUTHENTICATORS.contains(&class.as_str()) {
            let mut err = ValidationError::new("unknown_authenticator");
            err.add_param("value".into(), &class.to_string());
            return Err(err);
        }
    }
    Ok(())
}

pub fn validate_log_level(level: &str) -> Result<(), ValidationError> {
    if level.parse::<tracing::Level>().is_err() {
        let mut err = ValidationError::new("unknown_log_level");
        err.add_param("value".into(), &level);
        return Err(err);
    }
    Ok(())
}

pub fn validate_encoding_label(label: &str) -> Result<(), ValidationError> {
    if encoding_rs::Encoding::for_label(label.trim().as_bytes()).is_none() {
        let mut err = ValidationError::new("unknown_encoding");
        err.add_param("value".into(), &label);
        return Err(err);
    }
    Ok(())
}

pub fn validate_url(url: &str) -> Result<(), ValidationError> {
    if url.len() > 2048 {
        let mut err = ValidationError::new("url_too_long");
        err.add_param("max_length".into(), &2048);
        return Err(err);
    }
    if !url.starts_with("http://") && !url.starts_with("https://") {
        let mut err = ValidationError::new("invalid_url_scheme");
        err.add_param("url".into(), &url);
        return Err(err);
    }
    if MALICIOUS_URL_REGEX.is_match(url) || url::Url::parse(url).is_err() {
        let mut err = ValidationError::new("malformed_url");
        err.add_param("url".into(), &url);
        return Err(err);
    }
    Ok(())
}
