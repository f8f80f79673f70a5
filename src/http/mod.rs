//! Rate-paced, retrying request executor against the REST upstreams (§4.A).
//!
//! No upstream-specific parsing lives here; callers pass a URL and query
//! parameters and get back parsed JSON or a typed [`Error`].

use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::time::Duration;

use parking_lot::RwLock;
use rand::Rng;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use tokio::sync::Semaphore;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::config::HttpConfig;
use crate::error::{Error, Result};

/// Counters exposed to the metrics collector (§6).
#[derive(Debug, Default)]
pub struct HttpPoolStats {
    pub requests_total: AtomicU64,
    pub errors_total: AtomicU64,
    pub throttled_total: AtomicU64,
    pub last_request_duration_ms: AtomicU64,
    pub last_request_at_unix: AtomicI64,
}

/// Bounded-concurrency, retrying HTTP executor shared across fetch jobs.
pub struct HttpPool {
    client: Client,
    semaphore: Semaphore,
    config: HttpConfig,
    /// Self-paced inter-request delay, widened on 429 and decayed on success.
    throttle_delay_ms: RwLock<u64>,
    stats: HttpPoolStats,
}

impl HttpPool {
    #[must_use]
    pub fn new(config: HttpConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .expect("reqwest client configuration is valid");
        let permits = config.max_concurrent_requests.max(1);
        Self {
            client,
            semaphore: Semaphore::new(permits),
            config,
            throttle_delay_ms: RwLock::new(0),
            stats: HttpPoolStats::default(),
        }
    }

    #[must_use]
    pub fn stats(&self) -> &HttpPoolStats {
        &self.stats
    }

    /// Issues a GET request and deserializes the JSON body.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .expect("semaphore is never closed");

        self.pace().await;

        let mut attempt: u32 = 0;
        let mut delay_ms = self.config.backoff_base_ms;

        loop {
            attempt += 1;
            let started = std::time::Instant::now();
            let result = self.client.get(url).query(query).send().await;
            let elapsed_ms = started.elapsed().as_millis() as u64;

            self.stats.requests_total.fetch_add(1, Ordering::Relaxed);
            self.stats.last_request_duration_ms.store(elapsed_ms, Ordering::Relaxed);
            self.stats.last_request_at_unix.store(now_unix(), Ordering::Relaxed);

            match result {
                Ok(response) if response.status() == StatusCode::TOO_MANY_REQUESTS => {
                    self.stats.throttled_total.fetch_add(1, Ordering::Relaxed);
                    self.widen_throttle();
                    warn!(url, attempt, "upstream throttled request (429)");
                    if attempt >= self.config.max_retries {
                        return Err(Error::Throttled);
                    }
                    sleep(Duration::from_millis(self.config.throttle_backoff_ms)).await;
                    continue;
                }
                Ok(response) if response.status().is_server_error() => {
                    self.stats.errors_total.fetch_add(1, Ordering::Relaxed);
                    let status = response.status();
                    if attempt >= self.config.max_retries {
                        let body = response.text().await.unwrap_or_default();
                        return Err(Error::Upstream { status: status.as_u16(), body });
                    }
                    warn!(url, attempt, %status, "retrying after server error");
                    self.backoff_sleep(&mut delay_ms).await;
                    continue;
                }
                Ok(response) if !response.status().is_success() => {
                    self.stats.errors_total.fetch_add(1, Ordering::Relaxed);
                    let status = response.status();
                    let body = response.text().await.unwrap_or_default();
                    return Err(Error::Upstream { status: status.as_u16(), body });
                }
                Ok(response) => {
                    self.decay_throttle();
                    debug!(url, attempt, elapsed_ms, "request succeeded");
                    return Ok(response.json::<T>().await?);
                }
                Err(err) => {
                    self.stats.errors_total.fetch_add(1, Ordering::Relaxed);
                    if attempt >= self.config.max_retries {
                        return Err(Error::Http(err));
                    }
                    warn!(url, attempt, error = %err, "retrying after transport error");
                    self.backoff_sleep(&mut delay_ms).await;
                }
            }
        }
    }

    /// Issues a POST request with a JSON body and deserializes the response.
    pub async fn post_json<B: serde::Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        url: &str,
        body: &B,
    ) -> Result<T> {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .expect("semaphore is never closed");

        self.pace().await;

        let mut attempt: u32 = 0;
        let mut delay_ms = self.config.backoff_base_ms;

        loop {
            attempt += 1;
            let result = self.client.post(url).json(body).send().await;
            self.stats.requests_total.fetch_add(1, Ordering::Relaxed);
            self.stats.last_request_at_unix.store(now_unix(), Ordering::Relaxed);

            match result {
                Ok(response) if response.status() == StatusCode::TOO_MANY_REQUESTS => {
                    self.stats.throttled_total.fetch_add(1, Ordering::Relaxed);
                    self.widen_throttle();
                    if attempt >= self.config.max_retries {
                        return Err(Error::Throttled);
                    }
                    sleep(Duration::from_millis(self.config.throttle_backoff_ms)).await;
                    continue;
                }
                Ok(response) if response.status().is_server_error() => {
                    self.stats.errors_total.fetch_add(1, Ordering::Relaxed);
                    if attempt >= self.config.max_retries {
                        let status = response.status();
                        let body = response.text().await.unwrap_or_default();
                        return Err(Error::Upstream { status: status.as_u16(), body });
                    }
                    self.backoff_sleep(&mut delay_ms).await;
                    continue;
                }
                Ok(response) if !response.status().is_success() => {
                    let status = response.status();
                    let body = response.text().await.unwrap_or_default();
                    return Err(Error::Upstream { status: status.as_u16(), body });
                }
                Ok(response) => {
                    self.decay_throttle();
                    return Ok(response.json::<T>().await?);
                }
                Err(err) => {
                    self.stats.errors_total.fetch_add(1, Ordering::Relaxed);
                    if attempt >= self.config.max_retries {
                        return Err(Error::Http(err));
                    }
                    self.backoff_sleep(&mut delay_ms).await;
                }
            }
        }
    }

    /// Waits out the current self-paced inter-request gap, if any.
    async fn pace(&self) {
        let delay = *self.throttle_delay_ms.read();
        if delay > 0 {
            sleep(Duration::from_millis(delay)).await;
        }
    }

    fn widen_throttle(&self) {
        let mut guard = self.throttle_delay_ms.write();
        let widened = if *guard == 0 {
            self.config.throttle_backoff_ms
        } else {
            (*guard * 2).min(self.config.backoff_max_ms)
        };
        *guard = widened;
    }

    fn decay_throttle(&self) {
        let mut guard = self.throttle_delay_ms.write();
        if *guard > 0 {
            *guard /= 2;
        }
    }

    async fn backoff_sleep(&self, delay_ms: &mut u64) {
        let jitter = rand::thread_rng().gen_range(0..=(*delay_ms / 4).max(1));
        sleep(Duration::from_millis(*delay_ms + jitter)).await;
        *delay_ms = (*delay_ms * 2).min(self.config.backoff_max_ms);
    }
}

fn now_unix() -> i64 {
    chrono::Utc::now().timestamp()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_pool_starts_with_zero_throttle_delay() {
        let pool = HttpPool::new(HttpConfig::default());
        assert_eq!(*pool.throttle_delay_ms.read(), 0);
    }

    #[test]
    fn widen_throttle_doubles_then_caps() {
        let pool = HttpPool::new(HttpConfig { backoff_max_ms: 1000, ..HttpConfig::default() });
        pool.widen_throttle();
        let first = *pool.throttle_delay_ms.read();
        pool.widen_throttle();
        let second = *pool.throttle_delay_ms.read();
        assert!(second >= first);
        for _ in 0..20 {
            pool.widen_throttle();
        }
        assert!(*pool.throttle_delay_ms.read() <= 1000);
    }

    #[test]
    fn decay_throttle_halves_delay() {
        let pool = HttpPool::new(HttpConfig::default());
        pool.widen_throttle();
        pool.widen_throttle();
        let before = *pool.throttle_delay_ms.read();
        pool.decay_throttle();
        assert!(*pool.throttle_delay_ms.read() < before);
    }
}
