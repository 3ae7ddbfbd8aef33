use config::{Config, ConfigError, Environment};
use serde::{Deserialize, Serialize};
use std::env;
use validator::Validate;

use super::{geo::GeoConfig, security::SecurityConfig};
use crate::validator::validate_log_level;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Settings {
    pub environment: String,
    pub app_port: u16,
    /// `trace`, `debug`, `info`, `warn` or `error`.
    #[validate(custom(function = "validate_log_level"))]
    pub log_level: String,
    #[validate(range(min = 1024))]
    pub body_limit_bytes: usize,
    #[validate(nested)]
    pub security: SecurityConfig,
    #[validate(nested)]
    pub geo: GeoConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            app_port: 3000,
            log_level: "info".to_string(),
            body_limit_bytes: 2 * 1024 * 1024,
            security: SecurityConfig::default(),
            geo: GeoConfig::default(),
        }
    }
}

/// Loads settings from the environment on top of [`Settings::default`].
///
/// Nested keys use `__`, e.g. `GEO__TIMEOUT_MS=1500`, and
/// `SECURITY__AUTHENTICATION_CLASSES=api_key,jwt`.
pub fn load() -> Result<Settings, ConfigError> {
    let env = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());
    let env_file = match env.as_str() {
        "production" => ".env.production",
        _ => ".env.development",
    };

    dotenv::from_filename(env_file).ok();

    let config = Config::builder()
        .add_source(Config::try_from(&Settings::default())?)
        .add_source(
            Environment::default()
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("security.authentication_classes"),
        )
        .build()?;

    let settings = config
        .try_deserialize::<Settings>()
        .map_err(|e| ConfigError::Message(format!("Failed to deserialize settings: {}", e)))?;
    settings
        .validate()
        .map_err(|e| ConfigError::Message(format!("Invalid settings: {}", e)))?;
    Ok(settings)
}
