use axum::http::request::Parts;

use crate::{
    middleware::{auth::AuthChain, RequestContext},
    types::ResolvedUser,
};

/// Returns the request's user, authenticating through `chain` if needed.
///
/// The chain runs at most once per request; its outcome is memoized in the
/// request context. With `authenticate` set, a user found by the chain is
/// attached to the request. Never fails: with no authenticated user the
/// request's existing (unauthenticated) user is returned, or
/// [`ResolvedUser::Anonymous`].
pub async fn resolve_user(parts: &mut Parts, chain: &AuthChain, authenticate: bool) -> ResolvedUser {
    if let Some(user) = parts.extensions.get::<ResolvedUser>() {
        if user.is_authenticated() {
            return user.clone();
        }
    }

    let user = match RequestContext::cached_user(&parts.extensions) {
        Some(user) => user,
        None => {
            let user = match chain.authenticate(parts).await {
                Some((principal, _credential)) => ResolvedUser::Authenticated(principal),
                None => ResolvedUser::Anonymous,
            };
            RequestContext::of_mut(&mut parts.extensions).user = Some(user.clone());
            user
        }
    };

    if user.is_authenticated() {
        if authenticate {
            parts.extensions.insert(user.clone());
        }
        return user;
    }

    parts
        .extensions
        .get::<ResolvedUser>()
        .cloned()
        .unwrap_or(ResolvedUser::Anonymous)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        errors::AppError,
        middleware::auth::{ApiKeyAuthenticator, Authenticator},
        types::{Credential, Principal},
    };
    use async_trait::async_trait;
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    struct Broken;

    #[async_trait]
    impl Authenticator for Broken {
        fn name(&self) -> &'static str {
            "broken"
        }

        async fn authenticate(&self, _parts: &Parts) -> Result<Option<(Principal, Credential)>, AppError> {
            Err(AppError::Unauthorized("nope".into()))
        }
    }

    fn carol() -> Principal {
        Principal { id: "u-carol".into(), username: "carol".into(), email: "carol@example.com".into(), is_admin: false }
    }

    fn parts(api_key: Option<&str>) -> Parts {
        let mut builder = axum::http::Request::builder().uri("/api/things");
        if let Some(key) = api_key {
            builder = builder.header("x-api-key", key);
        }
        builder.body(()).unwrap().into_parts().0
    }

    fn chain() -> AuthChain {
        let keys = ApiKeyAuthenticator::new(&[]);
        keys.register("carol-key", carol());
        AuthChain::new(vec![Arc::new(Broken), Arc::new(keys)])
    }

    #[tokio::test]
    async fn test_anonymous_when_nothing_authenticates() {
        let mut p = parts(None);
        let chain = AuthChain::new(vec![Arc::new(Broken)]);
        assert_eq!(resolve_user(&mut p, &chain, true).await, ResolvedUser::Anonymous);
        assert!(p.extensions.get::<ResolvedUser>().is_none());
    }

    #[tokio::test]
    async fn test_first_success_is_attached() {
        let mut p = parts(Some("carol-key"));
        let user = resolve_user(&mut p, &chain(), true).await;
        assert_eq!(user, ResolvedUser::Authenticated(carol()));
        assert_eq!(p.extensions.get::<ResolvedUser>(), Some(&user));
    }

    #[tokio::test]
    async fn test_authenticate_flag_off_leaves_request_untouched() {
        let mut p = parts(Some("carol-key"));
        let user = resolve_user(&mut p, &chain(), false).await;
        assert!(user.is_authenticated());
        assert!(p.extensions.get::<ResolvedUser>().is_none());
    }

    #[tokio::test]
    async fn test_existing_user_short_circuits_chain() {
        let mut p = parts(None);
        p.extensions.insert(ResolvedUser::Authenticated(carol()));
        let empty = AuthChain::default();
        assert_eq!(resolve_user(&mut p, &empty, true).await, ResolvedUser::Authenticated(carol()));
    }

    struct Counting(Arc<AtomicUsize>);

    #[async_trait]
    impl Authenticator for Counting {
        fn name(&self) -> &'static str {
            "counting"
        }

        async fn authenticate(&self, _parts: &Parts) -> Result<Option<(Principal, Credential)>, AppError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Err(AppError::Unauthorized("rejected".into()))
        }
    }

    #[tokio::test]
    async fn test_chain_runs_once_per_request() {
        let calls = Arc::new(AtomicUsize::new(0));
        let chain = AuthChain::new(vec![Arc::new(Counting(calls.clone()))]);
        let mut p = parts(Some("whatever"));

        assert_eq!(resolve_user(&mut p, &chain, true).await, ResolvedUser::Anonymous);
        assert_eq!(resolve_user(&mut p, &chain, false).await, ResolvedUser::Anonymous);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_memoized_success_is_attached_later() {
        let mut p = parts(Some("carol-key"));
        let chain = chain();
        resolve_user(&mut p, &chain, false).await;
        assert!(p.extensions.get::<ResolvedUser>().is_none());

        let user = resolve_user(&mut p, &chain, true).await;
        assert_eq!(p.extensions.get::<ResolvedUser>(), Some(&user));
    }
}
