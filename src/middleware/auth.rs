use async_trait::async_trait;
use config::ConfigError;
use axum::{
    extract::{Request, State},
    http::{header, request::Parts},
    middleware::Next,
    response::Response,
};
use dashmap::DashMap;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use std::sync::Arc;
use tracing::debug;

use crate::{
    clock::Clock,
    config::security::{ApiKeyEntry, SecurityConfig},
    errors::AppError,
    handlers::AppState,
    services::{metrics, resolve},
    types::{AuthToken, Credential, Principal},
};

/// Names accepted in `security.authentication_classes`.
pub const KNOWN_AUTHENTICATORS: [&str; 2] = ["jwt", "api_key"];

pub const API_KEY_HEADER: &str = "X-API-Key";

/// One authentication mechanism.
///
/// `Ok(None)` means the request carries no credential this mechanism
/// understands; `Err` means it carried one that was rejected.
#[async_trait]
pub trait Authenticator: Send + Sync {
    fn name(&self) -> &'static str;

    async fn authenticate(&self, parts: &Parts) -> Result<Option<(Principal, Credential)>, AppError>;
}

pub struct JwtAuthenticator {
    key: DecodingKey,
    validation: Validation,
    clock: Arc<dyn Clock>,
}

impl JwtAuthenticator {
    pub fn new(secret: &str, clock: Arc<dyn Clock>) -> Self {
        // Expiry lives in `expires_at` and is checked against `clock`.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.required_spec_claims.clear();
        validation.validate_exp = false;
        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            clock,
        }
    }
}

#[async_trait]
impl Authenticator for JwtAuthenticator {
    fn name(&self) -> &'static str {
        "jwt"
    }

    async fn authenticate(&self, parts: &Parts) -> Result<Option<(Principal, Credential)>, AppError> {
        let Some(value) = parts.headers.get(header::AUTHORIZATION) else {
            return Ok(None);
        };
        let Some(token) = value.to_str().ok().and_then(|s| s.strip_prefix("Bearer ")) else {
            return Ok(None);
        };

        let claims = decode::<AuthToken>(token, &self.key, &self.validation)
            .map_err(|e| AppError::Unauthorized(format!("Invalid bearer token: {}", e)))?
            .claims;
        if self.clock.is_expired(&claims.expires_at) {
            return Err(AppError::Unauthorized("Bearer token expired".into()));
        }
        let id = claims
            .user_id
            .ok_or_else(|| AppError::Unauthorized("Bearer token has no user id".into()))?;

        let principal = Principal {
            id,
            username: claims.username,
            email: claims.email,
            is_admin: claims.is_admin,
        };
        Ok(Some((principal, Credential::Bearer(token.to_owned()))))
    }
}

pub struct ApiKeyAuthenticator {
    keys: DashMap<String, Principal>,
}

impl ApiKeyAuthenticator {
    pub fn new(entries: &[ApiKeyEntry]) -> Self {
        let keys = DashMap::with_capacity(entries.len());
        for entry in entries {
            keys.insert(entry.key.clone(), entry.principal.clone());
        }
        Self { keys }
    }

    pub fn register(&self, key: impl Into<String>, principal: Principal) {
        self.keys.insert(key.into(), principal);
    }
}

#[async_trait]
impl Authenticator for ApiKeyAuthenticator {
    fn name(&self) -> &'static str {
        "api_key"
    }

    async fn authenticate(&self, parts: &Parts) -> Result<Option<(Principal, Credential)>, AppError> {
        let Some(value) = parts.headers.get(API_KEY_HEADER) else {
            return Ok(None);
        };
        let key = value
            .to_str()
            .map_err(|_| AppError::Unauthorized("Invalid API key format".into()))?;
        let principal = self
            .keys
            .get(key)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| AppError::Unauthorized("Invalid API key".into()))?;
        Ok(Some((principal, Credential::ApiKey(key.to_owned()))))
    }
}

/// Authenticators tried in priority order. The first success wins and a
/// failing mechanism never stops the chain.
#[derive(Default)]
pub struct AuthChain {
    authenticators: Vec<Arc<dyn Authenticator>>,
}

impl AuthChain {
    pub fn new(authenticators: Vec<Arc<dyn Authenticator>>) -> Self {
        Self { authenticators }
    }

    /// # Errors
    /// Returns [`AppError::Config`] for a name outside [`KNOWN_AUTHENTICATORS`].
    pub fn from_config(config: &SecurityConfig, clock: Arc<dyn Clock>) -> Result<Self, AppError> {
        let mut authenticators: Vec<Arc<dyn Authenticator>> = Vec::with_capacity(config.authentication_classes.len());
        for class in &config.authentication_classes {
            match class.as_str() {
                "jwt" => authenticators.push(Arc::new(JwtAuthenticator::new(&config.jwt_secret, clock.clone()))),
                "api_key" => authenticators.push(Arc::new(ApiKeyAuthenticator::new(&config.api_keys))),
                other => {
                    return Err(AppError::Config(ConfigError::Message(format!(
                        "Unknown authentication class: {}",
                        other
                    ))))
                }
            }
        }
        Ok(Self { authenticators })
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.authenticators.iter().map(|a| a.name()).collect()
    }

    pub async fn authenticate(&self, parts: &Parts) -> Option<(Principal, Credential)> {
        for authenticator in &self.authenticators {
            match authenticator.authenticate(parts).await {
                Ok(Some(found)) => {
                    debug!(mechanism = authenticator.name(), user_id = %found.0.id, "request authenticated");
                    return Some(found);
                }
                Ok(None) => {}
                Err(e) => {
                    metrics::record_auth_failure(authenticator.name());
                    debug!(mechanism = authenticator.name(), error = %e, "authenticator failed, trying next");
                }
            }
        }
        None
    }
}

/// Attaches the resolved user to every request. Never rejects.
pub async fn auth_middleware(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Response {
    let (mut parts, body) = req.into_parts();
    resolve::resolve_user(&mut parts, &state.auth, true).await;
    next.run(Request::from_parts(parts, body)).await
}
