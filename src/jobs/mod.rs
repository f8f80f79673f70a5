//! Concrete fetch and processing jobs (§4.G), run by [`crate::scheduler`].
//!
//! Every job takes a shared [`JobContext`] and a cooperative cancellation
//! token the caller has already folded into the scheduler's own overlap
//! suppression — jobs here assume they run to completion once started and
//! simply return an error on failure; the scheduler records it.

pub mod alert_run;
pub mod gamma;
pub mod open_interest;
pub mod orderbooks;
pub mod positions;
pub mod signal_runs;
pub mod trades;
pub mod universe;

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use crate::alerts::{ChannelDriver, Rule};
use crate::cache::OrderbookCache;
use crate::config::AppConfig;
use crate::db::DbPool;
use crate::domain::TokenId;
use crate::exchange::polymarket::{PolymarketRestClient, WebsocketConsumer};

/// Shared, `Send + Sync` state every job closure captures by `Arc` clone.
pub struct JobContext {
    pub pool: DbPool,
    pub rest: Arc<PolymarketRestClient>,
    pub cache: Arc<OrderbookCache>,
    pub websocket: Arc<WebsocketConsumer>,
    /// Lock-free-read config snapshot (§5): readers clone the `Arc`, writers
    /// install a new one atomically.
    pub config: RwLock<Arc<AppConfig>>,
    pub last_trade_ts_seen: RwLock<DateTime<Utc>>,
    pub arb_cooldowns: RwLock<HashMap<String, DateTime<Utc>>>,
    pub tracked_universe: RwLock<Vec<TokenId>>,
    pub alert_channels: Vec<Box<dyn ChannelDriver>>,
    pub alert_rules: Vec<Rule>,
}

impl JobContext {
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        pool: DbPool,
        rest: Arc<PolymarketRestClient>,
        cache: Arc<OrderbookCache>,
        websocket: Arc<WebsocketConsumer>,
        config: Arc<AppConfig>,
        cold_start_lookback: chrono::Duration,
        alert_channels: Vec<Box<dyn ChannelDriver>>,
        alert_rules: Vec<Rule>,
    ) -> Self {
        Self {
            pool,
            rest,
            cache,
            websocket,
            config: RwLock::new(config),
            last_trade_ts_seen: RwLock::new(Utc::now() - cold_start_lookback),
            arb_cooldowns: RwLock::new(HashMap::new()),
            tracked_universe: RwLock::new(Vec::new()),
            alert_channels,
            alert_rules,
        }
    }

    #[must_use]
    pub fn config(&self) -> Arc<AppConfig> {
        self.config.read().clone()
    }
}
