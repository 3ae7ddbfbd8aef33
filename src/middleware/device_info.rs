use axum::{extract::Request, middleware::Next, response::Response};
use tracing::debug;

use crate::services::{resolve, ua_parser};

/// Resolves the client IP into the request context up front and traces the
/// client's device. A missing User-Agent is not an error here.
pub async fn device_info_middleware(req: Request, next: Next) -> Response {
    let (mut parts, body) = req.into_parts();
    let ip = resolve::resolve_ip(&mut parts);

    match resolve::user_agent(&parts) {
        Ok(ua) => {
            let info = ua_parser::parse_user_agent(&ua);
            debug!(
                %ip,
                browser = %info.browser_display(),
                os = %info.os_display(),
                device = %info.device_type,
                path = parts.uri.path(),
                "device info"
            );
        }
        Err(_) => debug!(%ip, path = parts.uri.path(), "device info without user agent"),
    }

    next.run(Request::from_parts(parts, body)).await
}
