//! HTTP client pool tuning (§4.A).

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub max_concurrent_requests: usize,
    pub request_timeout_secs: u64,
    pub max_retries: u32,
    pub backoff_base_ms: u64,
    pub backoff_max_ms: u64,
    pub throttle_backoff_ms: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            max_concurrent_requests: 10,
            request_timeout_secs: 10,
            max_retries: 3,
            backoff_base_ms: 200,
            backoff_max_ms: 10_000,
            throttle_backoff_ms: 2_000,
        }
    }
}
