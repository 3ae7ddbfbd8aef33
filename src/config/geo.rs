use serde::{Deserialize, Serialize};
use validator::Validate;
use crate::validator::{validate_encoding_label, validate_url};

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct GeoConfig {
    #[validate(custom(function = "validate_url"))]
    pub endpoint: String,
    #[validate(range(min = 100, max = 60_000))]
    pub timeout_ms: u64,
    /// WHATWG label of the response text encoding.
    #[validate(custom(function = "validate_encoding_label"))]
    pub encoding: String,
}

impl Default for GeoConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://whois.pconline.com.cn/ip.jsp".to_string(),
            timeout_ms: 2_000,
            encoding: "gbk".to_string(),
        }
    }
}
