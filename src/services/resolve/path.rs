use axum::{
    extract::{FromRequestParts, RawPathParams},
    http::request::Parts,
};
use percent_encoding::percent_decode_str;

use crate::{
    middleware::RequestContext,
    types::{PathArg, RouteMatch},
};

const ID_PLACEHOLDER: &str = "/{id}";

/// Heuristic path template: masks the first `/<value>` for each supplied
/// argument value, in order, with `/{id}`.
///
/// Strings are taken as-is, sequences are flattened one level and only the
/// values of maps are used. Keyed arguments contribute their values the same
/// way. Without any value the raw path is returned.
pub fn resolve_path_template(parts: &mut Parts, positional: &[PathArg], keyed: &[(String, PathArg)]) -> String {
    if let Some(path) = RequestContext::cached_path_template(&parts.extensions) {
        return path;
    }

    let values = collect_values(positional.iter().chain(keyed.iter().map(|(_, arg)| arg)));
    if values.is_empty() {
        return decoded_path(parts);
    }

    let mut path = decoded_path(parts);
    for value in values {
        path = path.replacen(&format!("/{}", value), ID_PLACEHOLDER, 1);
    }

    RequestContext::of_mut(&mut parts.extensions).path_template = Some(path.clone());
    path
}

fn collect_values<'a>(args: impl Iterator<Item = &'a PathArg>) -> Vec<&'a str> {
    let mut values = Vec::new();
    for arg in args.filter(|arg| !arg.is_empty()) {
        match arg {
            PathArg::Str(s) => values.push(s.as_str()),
            PathArg::Seq(items) => values.extend(items.iter().map(String::as_str)),
            PathArg::Map(pairs) => values.extend(pairs.iter().map(|(_, v)| v.as_str())),
        }
    }
    values.retain(|v| !v.is_empty());
    values
}

/// Exact path template from the router's own match.
///
/// Uses an explicit [`RouteMatch`] extension when present, otherwise the
/// path parameters axum matched for this request. Without either the raw
/// path is returned.
pub async fn resolve_canonical_path_template(parts: &mut Parts) -> String {
    if let Some(path) = RequestContext::cached_canonical_path_template(&parts.extensions) {
        return path;
    }

    let Some(route) = route_match(parts).await else {
        return decoded_path(parts);
    };
    let path = canonical_template(&decoded_path(parts), &route);

    RequestContext::of_mut(&mut parts.extensions).canonical_path_template = Some(path.clone());
    path
}

/// Replaces every `/<value>` with `/{id}` for positional arguments and
/// `/{<name>}` for named ones.
pub fn canonical_template(path: &str, route: &RouteMatch) -> String {
    let mut path = path.to_owned();
    for value in route.args.iter().filter(|v| !v.is_empty()) {
        path = path.replace(&format!("/{}", value), ID_PLACEHOLDER);
    }
    for (name, value) in route.kwargs.iter().filter(|(_, v)| !v.is_empty()) {
        path = path.replace(&format!("/{}", value), &format!("/{{{}}}", name));
    }
    path
}

// Route values arrive percent-decoded, so they are matched against the decoded path.
fn decoded_path(parts: &Parts) -> String {
    percent_decode_str(parts.uri.path()).decode_utf8_lossy().into_owned()
}

async fn route_match(parts: &mut Parts) -> Option<RouteMatch> {
    if let Some(route) = parts.extensions.get::<RouteMatch>() {
        return Some(route.clone());
    }
    let params = RawPathParams::from_request_parts(parts, &()).await.ok()?;
    Some(RouteMatch {
        args: Vec::new(),
        kwargs: params.iter().map(|(k, v)| (k.to_owned(), v.to_owned())).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, extract::Request, routing::get, Router};
    use tower::ServiceExt;

    fn parts(uri: &str) -> Parts {
        axum::http::Request::builder().uri(uri).body(()).unwrap().into_parts().0
    }

    #[test]
    fn test_positional_value_is_masked() {
        let mut p = parts("/api/42/items");
        assert_eq!(resolve_path_template(&mut p, &["42".into()], &[]), "/api/{id}/items");
    }

    #[test]
    fn test_no_values_returns_raw_path() {
        let mut p = parts("/api/42/items");
        assert_eq!(resolve_path_template(&mut p, &[], &[]), "/api/42/items");
        assert_eq!(resolve_path_template(&mut p, &[PathArg::Seq(vec![])], &[]), "/api/42/items");
    }

    #[test]
    fn test_nested_and_keyed_values() {
        let mut p = parts("/orgs/7/users/42/tags/x");
        let positional = [PathArg::Seq(vec!["7".into(), "42".into()])];
        let keyed = [("tag".to_string(), PathArg::Map(vec![("name".into(), "x".into())]))];
        assert_eq!(resolve_path_template(&mut p, &positional, &keyed), "/orgs/{id}/users/{id}/tags/{id}");
    }

    #[test]
    fn test_repeated_values_replace_cumulatively() {
        let mut p = parts("/a/1/b/1");
        assert_eq!(resolve_path_template(&mut p, &["1".into()], &[]), "/a/{id}/b/1");
        let mut p = parts("/a/1/b/1");
        assert_eq!(resolve_path_template(&mut p, &["1".into(), "1".into()], &[]), "/a/{id}/b/{id}");
    }

    #[test]
    fn test_heuristic_prefix_match_is_kept() {
        // Approximate by design: "/4" also matches the start of "/42".
        let mut p = parts("/api/42/4");
        assert_eq!(resolve_path_template(&mut p, &["4".into()], &[]), "/api/{id}2/4");
    }

    #[tokio::test]
    async fn test_canonical_from_route_match_extension() {
        let mut p = parts("/api/42/");
        p.extensions.insert(RouteMatch { args: vec![], kwargs: vec![("pk".into(), "42".into())] });
        assert_eq!(resolve_canonical_path_template(&mut p).await, "/api/{pk}/");
    }

    #[test]
    fn test_canonical_positional_and_named() {
        let route = RouteMatch {
            args: vec!["2024".into()],
            kwargs: vec![("slug".into(), "hello".into())],
        };
        assert_eq!(canonical_template("/posts/2024/hello", &route), "/posts/{id}/{slug}");
    }

    #[test]
    fn test_encoded_segments_are_masked() {
        let mut p = parts("/v1/inspect/orders/a%20b");
        assert_eq!(resolve_path_template(&mut p, &["a b".into()], &[]), "/v1/inspect/orders/{id}");

        let mut p = parts("/v1/inspect/%E8%AE%A2%E5%8D%95/7");
        assert_eq!(resolve_path_template(&mut p, &[], &[]), "/v1/inspect/订单/7");
    }

    #[tokio::test]
    async fn test_canonical_without_route_returns_path() {
        let mut p = parts("/plain/path");
        assert_eq!(resolve_canonical_path_template(&mut p).await, "/plain/path");
    }

    #[tokio::test]
    async fn test_canonical_from_axum_router() {
        async fn handler(req: Request) -> String {
            let (mut parts, _) = req.into_parts();
            resolve_canonical_path_template(&mut parts).await
        }

        let app = Router::new().route("/api/{pk}/", get(handler));
        let response = app
            .oneshot(axum::http::Request::builder().uri("/api/42/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        assert_eq!(&body[..], b"/api/{pk}/");
    }

    #[tokio::test]
    async fn test_canonical_masks_encoded_route_values() {
        async fn handler(req: Request) -> String {
            let (mut parts, _) = req.into_parts();
            resolve_canonical_path_template(&mut parts).await
        }

        let app = Router::new().route("/v1/inspect/{resource}/{id}", get(handler));
        let response = app
            .oneshot(
                axum::http::Request::builder()
                    .uri("/v1/inspect/%E8%AE%A2%E5%8D%95/a%20b")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let body = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        assert_eq!(&body[..], b"/v1/inspect/{resource}/{id}");
    }
}
