//! Upstream REST base URLs (§6 "Upstream REST APIs consumed").

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    pub gamma_base_url: String,
    pub clob_base_url: String,
    pub data_base_url: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            gamma_base_url: "https://gamma-api.polymarket.com".to_string(),
            clob_base_url: "https://clob.polymarket.com".to_string(),
            data_base_url: "https://data-api.polymarket.com".to_string(),
        }
    }
}
