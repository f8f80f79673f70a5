//! CLOB websocket consumer configuration (§4.E, §6).

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WebsocketConfig {
    pub enabled: bool,
    pub url: String,
    pub fallback_urls: Vec<String>,
    pub max_assets: usize,
    pub ping_interval_secs: u64,
    pub reconnect_base_delay_ms: u64,
    pub reconnect_max_delay_ms: u64,
}

impl Default for WebsocketConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            url: "wss://ws-subscriptions-clob.polymarket.com/ws/market".to_string(),
            fallback_urls: Vec::new(),
            max_assets: 400,
            ping_interval_secs: 10,
            reconnect_base_delay_ms: 500,
            reconnect_max_delay_ms: 30_000,
        }
    }
}
