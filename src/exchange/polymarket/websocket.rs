//! Market-channel websocket consumer (§4.E).
//!
//! State machine: `Disconnected -> Connecting -> Subscribing -> Live ->
//! (Disconnected | Draining)`. `Draining` is the only terminal state.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use parking_lot::RwLock;
use rand::Rng;
use rust_decimal::Decimal;
use tokio::sync::watch;
use tokio::time::sleep;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, error, info, warn};

use crate::cache::{OrderbookCache, PriceChange};
use crate::config::WebsocketConfig;
use crate::domain::{BookSide, OrderbookLatest, OrderbookMeta, PriceLevel, TokenId};
use crate::error::Result;
use crate::parse::orderbook::parse_orderbook_timestamp;

use super::messages::{SubscribeMessage, WsMessage};
use super::rest::PolymarketRestClient;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsumerState {
    Disconnected,
    Connecting,
    Subscribing,
    Live,
    Draining,
}

/// Long-lived task that owns the single logical connection to the market
/// channel. Separate from the tick-based scheduler (§5).
pub struct WebsocketConsumer {
    config: WebsocketConfig,
    cache: Arc<OrderbookCache>,
    rest: Arc<PolymarketRestClient>,
    subscribed: RwLock<HashSet<TokenId>>,
    /// Latest desired subscription list, fanned out to whichever connection
    /// is currently live so a universe change takes effect immediately
    /// instead of waiting for the next accidental reconnect (§4.E).
    universe: watch::Sender<Vec<TokenId>>,
    state: watch::Sender<ConsumerState>,
    reconnect_attempts: AtomicU64,
}

impl WebsocketConsumer {
    #[must_use]
    pub fn new(config: WebsocketConfig, cache: Arc<OrderbookCache>, rest: Arc<PolymarketRestClient>) -> Self {
        let (state, _) = watch::channel(ConsumerState::Disconnected);
        let (universe, _) = watch::channel(Vec::new());
        Self {
            config,
            cache,
            rest,
            subscribed: RwLock::new(HashSet::new()),
            universe,
            state,
            reconnect_attempts: AtomicU64::new(0),
        }
    }

    #[must_use]
    pub fn state(&self) -> ConsumerState {
        *self.state.borrow()
    }

    #[must_use]
    pub fn subscribed_count(&self) -> usize {
        self.subscribed.read().len()
    }

    /// Reconciles the set of subscribed tokens without disrupting
    /// unrelated subscriptions (§4.E): the new set is pushed to the live
    /// connection (if any), which resends a subscribe frame carrying the
    /// full updated token list on this same socket — the upstream protocol
    /// only exposes one subscribe message per channel (§6), so replacing the
    /// list in place is how "add new, drop removed" is expressed without a
    /// reconnect. Callers pass the current tracked universe.
    pub fn set_universe(&self, tokens: Vec<TokenId>) {
        let capped: HashSet<TokenId> = tokens.into_iter().take(self.config.max_assets).collect();
        let list: Vec<TokenId> = capped.iter().cloned().collect();
        *self.subscribed.write() = capped;
        let _ = self.universe.send(list);
    }

    /// Runs the consumer loop until `shutdown` fires, at which point it
    /// transitions to `Draining` and returns.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        loop {
            if *shutdown.borrow() {
                let _ = self.state.send(ConsumerState::Draining);
                info!("websocket consumer draining on shutdown signal");
                return;
            }

            let _ = self.state.send(ConsumerState::Connecting);
            match self.connect_and_run(&mut shutdown).await {
                Ok(()) => {
                    info!("websocket consumer loop exited cleanly");
                }
                Err(err) => {
                    warn!(error = %err, "websocket connection lost, reconnecting");
                }
            }

            if *shutdown.borrow() {
                let _ = self.state.send(ConsumerState::Draining);
                return;
            }

            let _ = self.state.send(ConsumerState::Disconnected);
            self.backoff_sleep().await;
        }
    }

    async fn connect_and_run(&self, shutdown: &mut watch::Receiver<bool>) -> Result<()> {
        let url = &self.config.url;
        let (ws_stream, _) = tokio_tungstenite::connect_async(url).await?;
        self.reconnect_attempts.store(0, Ordering::Relaxed);

        let _ = self.state.send(ConsumerState::Subscribing);
        let (mut write, mut read) = ws_stream.split();

        let tokens: Vec<String> = self.subscribed.read().iter().map(|t| t.as_str().to_string()).collect();
        if !tokens.is_empty() {
            let subscribe = SubscribeMessage::market(tokens.clone());
            let payload = serde_json::to_string(&subscribe)?;
            write.send(Message::Text(payload)).await?;
        }

        self.force_snapshot_refresh(&tokens).await;

        let _ = self.state.send(ConsumerState::Live);
        let mut ping_interval = tokio::time::interval(Duration::from_secs(self.config.ping_interval_secs));
        let mut universe_rx = self.universe.subscribe();

        loop {
            tokio::select! {
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        return Ok(());
                    }
                }
                _ = ping_interval.tick() => {
                    if write.send(Message::Ping(Vec::new())).await.is_err() {
                        return Ok(());
                    }
                }
                changed = universe_rx.changed() => {
                    if changed.is_err() {
                        continue;
                    }
                    let tokens: Vec<String> = universe_rx.borrow().iter().map(|t| t.as_str().to_string()).collect();
                    let subscribe = SubscribeMessage::market(tokens);
                    let payload = serde_json::to_string(&subscribe)?;
                    if write.send(Message::Text(payload)).await.is_err() {
                        return Ok(());
                    }
                }
                msg = read.next() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => self.handle_text(&text),
                        Some(Ok(Message::Close(_))) | None => return Ok(()),
                        Some(Ok(_)) => {}
                        Some(Err(err)) => return Err(err.into()),
                    }
                }
            }
        }
    }

    fn handle_text(&self, text: &str) {
        let parsed: std::result::Result<WsMessage, _> = serde_json::from_str(text);
        match parsed {
            Ok(WsMessage::Book(book)) => self.handle_book(book),
            Ok(WsMessage::PriceChange(change)) => self.handle_price_change(change),
            Ok(WsMessage::TickSizeChange(change)) => {
                if let Ok(tick) = change.new_tick_size.parse::<Decimal>() {
                    self.cache.set_tick_size(&TokenId::from(change.asset_id), tick);
                }
            }
            Ok(WsMessage::Unknown) | Ok(_) => {
                debug!("ignoring websocket message type outside the tracked set");
            }
            Err(err) => {
                debug!(error = %err, "dropping unparseable websocket message");
            }
        }
    }

    fn handle_book(&self, msg: super::messages::BookMessage) {
        let levels = |raw: &[super::messages::WsPriceLevel]| -> Vec<PriceLevel> {
            raw.iter()
                .filter_map(|l| Some(PriceLevel::new(l.price.parse().ok()?, l.size.parse().ok()?)))
                .collect()
        };
        let as_of = msg
            .timestamp
            .as_deref()
            .and_then(|s| parse_orderbook_timestamp(Some(&serde_json::Value::String(s.to_string()))))
            .unwrap_or_else(chrono::Utc::now);

        let meta = OrderbookMeta { hash: msg.hash, ..OrderbookMeta::default() };
        let mut book = OrderbookLatest::new(TokenId::from(msg.asset_id), levels(&msg.bids), levels(&msg.asks), as_of, meta);
        if let Some(market) = msg.market {
            book.set_condition_id(crate::domain::ConditionId::from(market));
        }
        self.cache.apply_snapshot(book);
    }

    fn handle_price_change(&self, msg: super::messages::PriceChangeMessage) {
        let token_id = TokenId::from(msg.asset_id);
        let as_of = msg
            .timestamp
            .as_deref()
            .and_then(|s| parse_orderbook_timestamp(Some(&serde_json::Value::String(s.to_string()))))
            .unwrap_or_else(chrono::Utc::now);

        let changes: Vec<PriceChange> = msg
            .changes
            .iter()
            .filter_map(|c| {
                let price = c.price.parse().ok()?;
                let size = c.size.parse().ok()?;
                let side = match c.side.to_ascii_uppercase().as_str() {
                    "BUY" | "BID" => BookSide::Bid,
                    _ => BookSide::Ask,
                };
                Some(PriceChange { price, size, side })
            })
            .collect();

        self.cache.apply_price_change(&token_id, &changes, as_of);
    }

    /// Requests REST snapshots for every subscribed token, used both right
    /// after (re)connecting and on the periodic heal schedule (§4.E).
    pub async fn force_snapshot_refresh(&self, tokens: &[String]) {
        for token in tokens {
            match self.rest.fetch_orderbook(token).await {
                Ok(Some(raw)) => {
                    if let Some(book) = crate::parse::orderbook::parse_book_snapshot(&raw) {
                        self.cache.apply_snapshot(book);
                    }
                }
                Ok(None) => {}
                Err(err) => warn!(token, error = %err, "snapshot heal request failed"),
            }
        }
    }

    async fn backoff_sleep(&self) {
        let attempt = self.reconnect_attempts.fetch_add(1, Ordering::Relaxed);
        let base = self.config.reconnect_base_delay_ms;
        let max = self.config.reconnect_max_delay_ms;
        let exp = base.saturating_mul(1u64 << attempt.min(10));
        let capped = exp.min(max);
        let jitter = rand::thread_rng().gen_range(0..=(capped / 4).max(1));
        error!(attempt, delay_ms = capped + jitter, "backing off before reconnect attempt");
        sleep(Duration::from_millis(capped + jitter)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_universe_caps_at_max_assets() {
        let config = WebsocketConfig { max_assets: 2, ..WebsocketConfig::default() };
        let cache = Arc::new(OrderbookCache::new());
        let rest = Arc::new(PolymarketRestClient::new(
            Arc::new(crate::http::HttpPool::new(crate::config::HttpConfig::default())),
            crate::config::UpstreamConfig::default(),
        ));
        let consumer = WebsocketConsumer::new(config, cache, rest);
        consumer.set_universe(vec![TokenId::from("a"), TokenId::from("b"), TokenId::from("c")]);
        assert_eq!(consumer.subscribed.read().len(), 2);
    }
}
