//! Websocket market-channel message shapes (§4.E, §6).

use serde::{Deserialize, Serialize};

/// Subscription request: `{type: "market", assets_ids: [...]}`.
#[derive(Debug, Serialize)]
pub struct SubscribeMessage {
    pub assets_ids: Vec<String>,
    #[serde(rename = "type")]
    pub msg_type: String,
}

impl SubscribeMessage {
    #[must_use]
    pub fn market(asset_ids: Vec<String>) -> Self {
        Self { assets_ids: asset_ids, msg_type: "market".to_string() }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WsPriceLevel {
    pub price: String,
    pub size: String,
}

/// Tagged union over every message type the market channel can emit.
/// Several variants are behind upstream feature flags and must be tolerated
/// as optional (§6) — unrecognized shapes fall into `Unknown`.
#[derive(Debug, Deserialize)]
#[serde(tag = "event_type")]
pub enum WsMessage {
    #[serde(rename = "book")]
    Book(BookMessage),
    #[serde(rename = "price_change")]
    PriceChange(PriceChangeMessage),
    #[serde(rename = "tick_size_change")]
    TickSizeChange(TickSizeChangeMessage),
    #[serde(rename = "last_trade_price")]
    LastTradePrice(serde_json::Value),
    #[serde(rename = "best_bid_ask")]
    BestBidAsk(serde_json::Value),
    #[serde(rename = "new_market")]
    NewMarket(serde_json::Value),
    #[serde(rename = "market_resolved")]
    MarketResolved(serde_json::Value),
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Deserialize)]
pub struct BookMessage {
    pub asset_id: String,
    pub market: Option<String>,
    pub bids: Vec<WsPriceLevel>,
    pub asks: Vec<WsPriceLevel>,
    pub timestamp: Option<String>,
    pub hash: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PriceChangeMessage {
    pub asset_id: String,
    pub market: Option<String>,
    pub changes: Vec<PriceChangeEntry>,
    pub timestamp: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PriceChangeEntry {
    pub price: String,
    pub size: String,
    pub side: String,
}

#[derive(Debug, Deserialize)]
pub struct TickSizeChangeMessage {
    pub asset_id: String,
    pub new_tick_size: String,
}
