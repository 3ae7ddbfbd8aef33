pub mod inspect;
pub mod metrics;

use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::get,
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;

use crate::{
    clock::SystemClock,
    config::settings::Settings,
    errors::AppError,
    middleware::{auth::{auth_middleware, AuthChain}, device_info::device_info_middleware},
    services::geo_lookup::GeoLocator,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Settings>,
    pub auth: Arc<AuthChain>,
    pub geo: Arc<GeoLocator>,
}

impl AppState {
    /// # Errors
    /// Fails when the authenticator list or the geolocation client cannot be built.
    pub fn from_settings(settings: Settings) -> Result<Self, AppError> {
        let auth = AuthChain::from_config(&settings.security, Arc::new(SystemClock))?;
        let geo = GeoLocator::new(&settings.geo)?;
        Ok(Self {
            config: Arc::new(settings),
            auth: Arc::new(auth),
            geo: Arc::new(geo),
        })
    }
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route(
            "/v1/inspect/{resource}/{id}",
            get(inspect::inspect_handler).post(inspect::inspect_handler),
        )
        .route("/metrics", get(metrics::metrics_handler))
        .layer(
            ServiceBuilder::new()
                .layer(from_fn(device_info_middleware))
                .layer(from_fn_with_state(state.clone(), auth_middleware)),
        )
        .with_state(state)
}
