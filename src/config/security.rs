use serde::{Deserialize, Serialize};
use validator::Validate;
use crate::types::Principal;
use crate::validator::validate_authentication_classes;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiKeyEntry {
    pub key: String,
    pub principal: Principal,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SecurityConfig {
    #[validate(length(min = 32))]
    pub jwt_secret: String,
    /// Authenticators tried in order, e.g. `["jwt", "api_key"]`.
    #[validate(custom(function = "validate_authentication_classes"))]
    pub authentication_classes: Vec<String>,
    #[serde(default)]
    pub api_keys: Vec<ApiKeyEntry>,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "change-me-change-me-change-me-change-me".to_string(),
            authentication_classes: vec!["jwt".to_string(), "api_key".to_string()],
            api_keys: vec![],
        }
    }
}
