//! REST client for the three upstreams (gamma, CLOB, data-api) consumed by
//! the fetch jobs (§6 "Upstream REST APIs consumed").

use std::sync::Arc;

use rust_decimal::Decimal;
use serde_json::Value;

use crate::config::UpstreamConfig;
use crate::error::Result;
use crate::http::HttpPool;
use crate::parse::gamma::RawMarket;
use crate::parse::open_interest::OpenInterestEntry;
use crate::parse::orderbook::RawBook;
use crate::parse::trades::RawTrade;

/// Thin wrapper translating upstream endpoint shapes into the raw-payload
/// types the parsers in `crate::parse` accept. Carries no retry/backoff
/// logic itself — that lives entirely in [`HttpPool`].
pub struct PolymarketRestClient {
    http: Arc<HttpPool>,
    upstream: UpstreamConfig,
}

impl PolymarketRestClient {
    #[must_use]
    pub fn new(http: Arc<HttpPool>, upstream: UpstreamConfig) -> Self {
        Self { http, upstream }
    }

    /// One page of the events/markets endpoint.
    pub async fn fetch_markets_page(&self, offset: u32, limit: u32) -> Result<Vec<RawMarket>> {
        let url = format!("{}/markets", self.upstream.gamma_base_url);
        let body: Vec<Value> = self
            .http
            .get_json(&url, &[("offset", offset.to_string()), ("limit", limit.to_string())])
            .await?;
        Ok(body.into_iter().map(RawMarket).collect())
    }

    /// One page of tag metadata.
    pub async fn fetch_tags(&self) -> Result<Vec<Value>> {
        let url = format!("{}/tags", self.upstream.gamma_base_url);
        self.http.get_json(&url, &[]).await
    }

    /// One page of the trades endpoint, already filtered to taker-only,
    /// cash-notional trades above `min_notional` (§6, §4.G pagination).
    pub async fn fetch_trades_page(
        &self,
        min_notional: Decimal,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<RawTrade>> {
        let url = format!("{}/trades", self.upstream.data_base_url);
        let body: Vec<Value> = self
            .http
            .get_json(
                &url,
                &[
                    ("takerOnly", "true".to_string()),
                    ("filterType", "CASH".to_string()),
                    ("filterAmount", min_notional.to_string()),
                    ("limit", limit.to_string()),
                    ("offset", offset.to_string()),
                ],
            )
            .await?;
        Ok(body.into_iter().map(RawTrade).collect())
    }

    /// Open interest for a batch of tracked markets.
    pub async fn fetch_open_interest(&self, condition_ids: &[String]) -> Result<Vec<OpenInterestEntry>> {
        let url = format!("{}/open-interest", self.upstream.data_base_url);
        let market_list = condition_ids.join(",");
        let body: Value = self.http.get_json(&url, &[("market", market_list)]).await?;
        Ok(crate::parse::open_interest::parse_open_interest(&body))
    }

    /// Full orderbook snapshot for one token.
    pub async fn fetch_orderbook(&self, token_id: &str) -> Result<Option<RawBook>> {
        let url = format!("{}/book", self.upstream.clob_base_url);
        let body: Value = self.http.get_json(&url, &[("token_id", token_id.to_string())]).await?;
        Ok(Some(RawBook(body)))
    }

    /// Positions for a tracked wallet.
    pub async fn fetch_positions(&self, wallet: &str) -> Result<Vec<Value>> {
        let url = format!("{}/positions", self.upstream.data_base_url);
        self.http.get_json(&url, &[("user", wallet.to_string())]).await
    }
}
