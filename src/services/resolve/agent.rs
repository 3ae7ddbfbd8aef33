use axum::http::{header, request::Parts};
use std::borrow::Cow;

use crate::{errors::AppError, services::ua_parser};

/// The `User-Agent` header. Non-UTF-8 bytes are replaced, not rejected.
///
/// # Errors
/// [`AppError::MissingHeader`] when absent.
pub fn user_agent(parts: &Parts) -> Result<Cow<'_, str>, AppError> {
    let value = parts
        .headers
        .get(header::USER_AGENT)
        .ok_or(AppError::MissingHeader("User-Agent"))?;
    Ok(String::from_utf8_lossy(value.as_bytes()))
}

/// Browser family and version, e.g. `"Chrome 120.0.6099.71"`.
///
/// # Errors
/// See [`user_agent`].
pub fn resolve_browser(parts: &Parts) -> Result<String, AppError> {
    Ok(ua_parser::parse_user_agent(&user_agent(parts)?).browser_display())
}

/// Operating system family and version, e.g. `"Windows 10"`.
///
/// # Errors
/// See [`user_agent`].
pub fn resolve_os(parts: &Parts) -> Result<String, AppError> {
    Ok(ua_parser::parse_user_agent(&user_agent(parts)?).os_display())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    const CHROME_WIN: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.6099.71 Safari/537.36";

    fn parts(ua: Option<&str>) -> Parts {
        let mut builder = axum::http::Request::builder().uri("/");
        if let Some(ua) = ua {
            builder = builder.header("user-agent", HeaderValue::from_bytes(ua.as_bytes()).unwrap());
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn test_browser_and_os() {
        let p = parts(Some(CHROME_WIN));
        assert_eq!(resolve_browser(&p).unwrap(), "Chrome 120.0.6099.71");
        assert_eq!(resolve_os(&p).unwrap(), "Windows 10");
    }

    #[test]
    fn test_missing_header_fails_loudly() {
        let p = parts(None);
        assert!(matches!(resolve_browser(&p), Err(AppError::MissingHeader("User-Agent"))));
        assert!(matches!(resolve_os(&p), Err(AppError::MissingHeader("User-Agent"))));
    }

    #[test]
    fn test_unrecognized_agent() {
        let p = parts(Some("curl/8.4.0"));
        assert_eq!(resolve_browser(&p).unwrap(), "Other");
        assert_eq!(resolve_os(&p).unwrap(), "Other");
    }

    #[test]
    fn test_non_ascii_agent_is_parsed() {
        let ua = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_1_2 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Mobile/15E148 MicroMessenger/8.0.44 微信";
        let p = parts(Some(ua));
        assert!(user_agent(&p).unwrap().ends_with("微信"));
        assert_eq!(resolve_os(&p).unwrap(), "iOS 17.1.2");
        assert_eq!(resolve_browser(&p).unwrap(), "Other");
    }
}
