use encoding_rs::Encoding;
use std::time::{Duration, Instant};
use tokio::time;
use tracing::{debug, warn};
use url::Url;

use crate::{config::geo::GeoConfig, errors::AppError, services::metrics};

/// Client for the third-party IP location endpoint.
///
/// Every lookup is bounded by the configured timeout (request and body
/// together) and never fails: timeouts, transport errors, non-success
/// statuses and undecodable bodies all come back as an empty string.
pub struct GeoLocator {
    client: reqwest::Client,
    endpoint: Url,
    timeout: Duration,
    encoding: &'static Encoding,
}

impl GeoLocator {
    /// # Errors
    /// [`AppError::GeoLookup`] for an unusable endpoint, encoding label or HTTP client.
    pub fn new(config: &GeoConfig) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| AppError::GeoLookup(format!("Failed to build HTTP client: {}", e)))?;
        Self::with_client(config, client)
    }

    /// # Errors
    /// See [`GeoLocator::new`].
    pub fn with_client(config: &GeoConfig, client: reqwest::Client) -> Result<Self, AppError> {
        let endpoint = Url::parse(&config.endpoint)
            .map_err(|e| AppError::GeoLookup(format!("Invalid endpoint '{}': {}", config.endpoint, e)))?;
        let encoding = Encoding::for_label(config.encoding.trim().as_bytes())
            .ok_or_else(|| AppError::GeoLookup(format!("Unknown encoding '{}'", config.encoding)))?;
        Ok(Self {
            client,
            endpoint,
            timeout: Duration::from_millis(config.timeout_ms),
            encoding,
        })
    }

    pub fn lookup_url(&self, ip: &str) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut().append_pair("ip", ip);
        url
    }

    pub async fn locate(&self, ip: &str) -> String {
        let start = Instant::now();
        match time::timeout(self.timeout, self.fetch(ip)).await {
            Ok(Ok(location)) => {
                metrics::record_geo_lookup("ok", start);
                location
            }
            Ok(Err(e)) => {
                metrics::record_geo_lookup("error", start);
                warn!(%ip, error = %e, "login location lookup failed");
                String::new()
            }
            Err(_) => {
                metrics::record_geo_lookup("timeout", start);
                debug!(%ip, timeout_ms = self.timeout.as_millis() as u64, "login location lookup timed out");
                String::new()
            }
        }
    }

    async fn fetch(&self, ip: &str) -> Result<String, AppError> {
        let response = self
            .client
            .get(self.lookup_url(ip))
            .send()
            .await
            .map_err(|e| AppError::GeoLookup(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(AppError::GeoLookup(format!("endpoint returned {}", status)));
        }
        let body = response
            .bytes()
            .await
            .map_err(|e| AppError::GeoLookup(e.to_string()))?;

        let (text, _, had_errors) = self.encoding.decode(&body);
        if had_errors {
            return Err(AppError::GeoLookup(format!("response is not valid {}", self.encoding.name())));
        }
        Ok(strip_line_breaks(&text))
    }
}

fn strip_line_breaks(text: &str) -> String {
    text.replace(['\r', '\n'], "").trim().to_string()
}
