use axum::{
    extract::{Path, Request, State},
    http::HeaderMap,
    Json,
};
use tracing::info;

use crate::{
    errors::AppError,
    handlers::AppState,
    services::resolve,
    types::{InspectionReport, PathArg},
};

/// Opts into the login location lookup. A header, so the request's own
/// query and body parameters are reported untouched.
pub const LOCATE_HEADER: &str = "x-inspect-locate";

fn wants_location(headers: &HeaderMap) -> bool {
    headers
        .get(LOCATE_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

/// Reports every resolved attribute of the incoming request.
#[axum::debug_handler]
pub async fn inspect_handler(
    State(state): State<AppState>,
    Path((_resource, id)): Path<(String, String)>,
    req: Request,
) -> Result<Json<InspectionReport>, AppError> {
    let (mut parts, body) = req.into_parts();
    let body = axum::body::to_bytes(body, state.config.body_limit_bytes)
        .await
        .map_err(|e| AppError::BadRequest(format!("Unreadable body: {}", e)))?;

    let user = resolve::resolve_user(&mut parts, &state.auth, false).await;
    let ip = resolve::resolve_ip(&mut parts);
    let parameters = resolve::resolve_parameters(&mut parts, &body)?;
    let path_template = resolve::resolve_path_template(&mut parts, &[PathArg::Str(id)], &[]);
    let canonical_path_template = resolve::resolve_canonical_path_template(&mut parts).await;
    let browser = resolve::resolve_browser(&parts)?;
    let os = resolve::resolve_os(&parts)?;
    let location = if wants_location(&parts.headers) {
        Some(resolve::resolve_login_location(&mut parts, &state.geo).await)
    } else {
        None
    };

    info!(%ip, path = %canonical_path_template, authenticated = user.is_authenticated(), "request inspected");

    Ok(Json(InspectionReport {
        user,
        ip,
        parameters,
        path_template,
        canonical_path_template,
        browser,
        os,
        location,
    }))
}
