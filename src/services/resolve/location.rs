use axum::http::request::Parts;

use super::resolve_ip;
use crate::services::geo_lookup::GeoLocator;

/// Best-effort login location for the request's client IP. Any failure,
/// including the lookup timeout, yields an empty string.
pub async fn resolve_login_location(parts: &mut Parts, locator: &GeoLocator) -> String {
    let ip = resolve_ip(parts);
    locator.locate(&ip).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::geo::GeoConfig;
    use axum::{extract::Query, routing::get, Router};
    use std::collections::HashMap;

    #[tokio::test]
    async fn test_looks_up_resolved_client_ip() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let echo = Router::new().route(
            "/ip.jsp",
            get(|Query(q): Query<HashMap<String, String>>| async move {
                format!("{}\r\nsomewhere", q.get("ip").cloned().unwrap_or_default())
            }),
        );
        tokio::spawn(async move {
            axum::serve(listener, echo).await.unwrap();
        });

        let config = GeoConfig {
            endpoint: format!("http://{}/ip.jsp", addr),
            encoding: "utf-8".into(),
            ..Default::default()
        };
        let client = reqwest::Client::builder().no_proxy().build().unwrap();
        let locator = GeoLocator::with_client(&config, client).unwrap();

        let (mut parts, _) = axum::http::Request::builder()
            .uri("/login")
            .header("x-forwarded-for", "1.1.1.1, 2.2.2.2")
            .body(())
            .unwrap()
            .into_parts();
        assert_eq!(resolve_login_location(&mut parts, &locator).await, "2.2.2.2somewhere");
    }
}
