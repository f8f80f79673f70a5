//! Diesel row types and their conversions to/from the domain layer.
//!
//! SQLite has no native decimal type, so monetary and price columns are
//! stored as canonical decimal text and parsed back through
//! [`rust_decimal::Decimal::from_str`] — this keeps exact precision, which
//! an `f64`/`REAL` column would silently lose.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr as _;

use super::schema::{
    alert_log, app_config, market_metrics_ts, markets, orderbook_latest, signal_events, trades,
    wallets,
};
use crate::domain::{
    AlertLogEntry, BookSide, ConditionId, DeliveryStatus, EventId, Market, MarketMetricSnapshot,
    Outcome, OrderbookLatest as DomainOrderbook, OrderbookMeta, PriceLevel, SignalEvent,
    SignalType, TokenId, Trade, TradeSide, Wallet, WalletId,
};

fn rfc3339(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339()
}

fn parse_rfc3339(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

fn dec(raw: &str) -> Decimal {
    Decimal::from_str(raw).unwrap_or(Decimal::ZERO)
}

#[derive(Queryable, Selectable, Insertable, AsChangeset, Debug, Clone)]
#[diesel(table_name = markets)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct MarketRow {
    pub condition_id: String,
    pub market_id: Option<String>,
    pub event_id: Option<String>,
    pub slug: Option<String>,
    pub question: String,
    pub tag_ids_json: String,
    pub neg_risk: bool,
    pub outcomes_json: String,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub last_seen_at: String,
}

impl From<&Market> for MarketRow {
    fn from(m: &Market) -> Self {
        let outcomes: Vec<(String, String)> = m
            .outcomes()
            .iter()
            .map(|o| (o.label().to_string(), o.token_id().as_str().to_string()))
            .collect();
        Self {
            condition_id: m.condition_id().as_str().to_string(),
            market_id: m.market_id().map(str::to_string),
            event_id: m.event_id().map(|e| e.as_str().to_string()),
            slug: m.slug().map(str::to_string),
            question: m.question().to_string(),
            tag_ids_json: serde_json::to_string(m.tag_ids()).unwrap_or_else(|_| "[]".to_string()),
            neg_risk: m.neg_risk(),
            outcomes_json: serde_json::to_string(&outcomes).unwrap_or_else(|_| "[]".to_string()),
            start_time: m.start_time().map(rfc3339),
            end_time: m.end_time().map(rfc3339),
            last_seen_at: rfc3339(m.last_seen_at()),
        }
    }
}

impl MarketRow {
    #[must_use]
    pub fn into_domain(self) -> Market {
        let outcomes: Vec<(String, String)> = serde_json::from_str(&self.outcomes_json).unwrap_or_default();
        let outcomes = outcomes
            .into_iter()
            .map(|(label, token_id)| Outcome::new(label, TokenId::from(token_id)))
            .collect();
        let mut market = Market::new(
            ConditionId::from(self.condition_id),
            self.question,
            outcomes,
            self.neg_risk,
            parse_rfc3339(&self.last_seen_at),
        );
        if let Some(market_id) = self.market_id {
            market.set_market_id(market_id);
        }
        if let Some(event_id) = self.event_id {
            market.set_event_id(EventId::from(event_id));
        }
        if let Some(slug) = self.slug {
            market.set_slug(slug);
        }
        let tag_ids = serde_json::from_str(&self.tag_ids_json).unwrap_or_default();
        market.set_tag_ids(tag_ids);
        market.set_start_time(self.start_time.as_deref().map(parse_rfc3339));
        market.set_end_time(self.end_time.as_deref().map(parse_rfc3339));
        market
    }
}

#[derive(Queryable, Selectable, Insertable, Debug, Clone)]
#[diesel(table_name = market_metrics_ts)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct NewMetricSnapshotRow {
    pub condition_id: String,
    pub ts: String,
    pub volume: String,
    pub liquidity: String,
    pub open_interest: String,
    pub best_bid_yes: Option<String>,
    pub best_ask_yes: Option<String>,
    pub best_bid_no: Option<String>,
    pub best_ask_no: Option<String>,
}

impl NewMetricSnapshotRow {
    #[must_use]
    pub fn into_domain(self) -> MarketMetricSnapshot {
        MarketMetricSnapshot::new(
            ConditionId::from(self.condition_id),
            parse_rfc3339(&self.ts),
            dec(&self.volume),
            dec(&self.liquidity),
            dec(&self.open_interest),
            self.best_bid_yes.as_deref().map(dec),
            self.best_ask_yes.as_deref().map(dec),
            self.best_bid_no.as_deref().map(dec),
            self.best_ask_no.as_deref().map(dec),
        )
    }
}

impl From<&MarketMetricSnapshot> for NewMetricSnapshotRow {
    fn from(s: &MarketMetricSnapshot) -> Self {
        Self {
            condition_id: s.condition_id().as_str().to_string(),
            ts: rfc3339(s.ts()),
            volume: s.volume().to_string(),
            liquidity: s.liquidity().to_string(),
            open_interest: s.open_interest().to_string(),
            best_bid_yes: s.best_bid_yes().map(|d| d.to_string()),
            best_ask_yes: s.best_ask_yes().map(|d| d.to_string()),
            best_bid_no: s.best_bid_no().map(|d| d.to_string()),
            best_ask_no: s.best_ask_no().map(|d| d.to_string()),
        }
    }
}

#[derive(Queryable, Selectable, Insertable, AsChangeset, Debug, Clone)]
#[diesel(table_name = orderbook_latest)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct OrderbookRow {
    pub token_id: String,
    pub condition_id: Option<String>,
    pub bids_json: String,
    pub asks_json: String,
    pub tick_size: String,
    pub min_order_size: String,
    pub neg_risk: bool,
    pub hash: Option<String>,
    pub as_of: String,
}

fn levels_to_json(levels: &[PriceLevel]) -> String {
    let pairs: Vec<(String, String)> = levels
        .iter()
        .map(|l| (l.price().to_string(), l.size().to_string()))
        .collect();
    serde_json::to_string(&pairs).unwrap_or_else(|_| "[]".to_string())
}

fn levels_from_json(raw: &str) -> Vec<PriceLevel> {
    let pairs: Vec<(String, String)> = serde_json::from_str(raw).unwrap_or_default();
    pairs
        .into_iter()
        .map(|(price, size)| PriceLevel::new(dec(&price), dec(&size)))
        .collect()
}

impl From<&DomainOrderbook> for OrderbookRow {
    fn from(book: &DomainOrderbook) -> Self {
        Self {
            token_id: book.token_id().as_str().to_string(),
            condition_id: book.condition_id().map(|c| c.as_str().to_string()),
            bids_json: levels_to_json(book.bids()),
            asks_json: levels_to_json(book.asks()),
            tick_size: book.meta().tick_size.to_string(),
            min_order_size: book.meta().min_order_size.to_string(),
            neg_risk: book.meta().neg_risk,
            hash: book.meta().hash.clone(),
            as_of: rfc3339(book.as_of()),
        }
    }
}

impl OrderbookRow {
    #[must_use]
    pub fn into_domain(self) -> DomainOrderbook {
        let meta = OrderbookMeta {
            tick_size: dec(&self.tick_size),
            min_order_size: dec(&self.min_order_size),
            neg_risk: self.neg_risk,
            hash: self.hash,
        };
        let mut book = DomainOrderbook::new(
            TokenId::from(self.token_id),
            levels_from_json(&self.bids_json),
            levels_from_json(&self.asks_json),
            parse_rfc3339(&self.as_of),
            meta,
        );
        if let Some(condition_id) = self.condition_id {
            book.set_condition_id(ConditionId::from(condition_id));
        }
        book
    }
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = trades)]
pub struct NewTradeRow {
    pub trade_key: String,
    pub transaction_hash: Option<String>,
    pub wallet: String,
    pub condition_id: String,
    pub token_id: String,
    pub side: String,
    pub price: String,
    pub size: String,
    pub notional_usd: String,
    pub trade_ts: String,
}

impl From<&Trade> for NewTradeRow {
    fn from(t: &Trade) -> Self {
        Self {
            trade_key: t.key().as_str().to_string(),
            transaction_hash: t.transaction_hash().map(str::to_string),
            wallet: t.wallet().as_str().to_string(),
            condition_id: t.condition_id().as_str().to_string(),
            token_id: t.token_id().as_str().to_string(),
            side: t.side().as_str().to_string(),
            price: t.price().to_string(),
            size: t.size().to_string(),
            notional_usd: t.notional_usd().to_string(),
            trade_ts: rfc3339(t.trade_ts()),
        }
    }
}

#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = trades)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct TradeRow {
    pub id: i64,
    pub trade_key: String,
    pub transaction_hash: Option<String>,
    pub wallet: String,
    pub condition_id: String,
    pub token_id: String,
    pub side: String,
    pub price: String,
    pub size: String,
    pub notional_usd: String,
    pub trade_ts: String,
}

impl TradeRow {
    #[must_use]
    pub fn into_domain(self) -> Trade {
        let side = if self.side == "BUY" { TradeSide::Buy } else { TradeSide::Sell };
        Trade::new(
            self.transaction_hash,
            WalletId::from(self.wallet),
            ConditionId::from(self.condition_id),
            TokenId::from(self.token_id),
            side,
            dec(&self.price),
            dec(&self.size),
            parse_rfc3339(&self.trade_ts),
        )
    }
}

#[derive(Queryable, Selectable, Insertable, AsChangeset, Debug, Clone)]
#[diesel(table_name = wallets)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct WalletRow {
    pub address: String,
    pub first_seen_at: String,
    pub last_seen_at: String,
    pub first_trade_ts: String,
    pub lifetime_notional_usd: String,
    pub last_7d_notional_usd: String,
}

impl From<&Wallet> for WalletRow {
    fn from(w: &Wallet) -> Self {
        Self {
            address: w.address().as_str().to_string(),
            first_seen_at: rfc3339(w.first_seen_at()),
            last_seen_at: rfc3339(w.last_seen_at()),
            first_trade_ts: rfc3339(w.first_trade_ts()),
            lifetime_notional_usd: w.lifetime_notional_usd().to_string(),
            last_7d_notional_usd: w.last_7d_notional_usd().to_string(),
        }
    }
}

impl WalletRow {
    #[must_use]
    pub fn into_domain(self) -> Wallet {
        Wallet::from_row(
            WalletId::from(self.address),
            parse_rfc3339(&self.first_seen_at),
            parse_rfc3339(&self.last_seen_at),
            parse_rfc3339(&self.first_trade_ts),
            dec(&self.lifetime_notional_usd),
            dec(&self.last_7d_notional_usd),
        )
    }
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = signal_events)]
pub struct NewSignalEventRow {
    pub signal_type: String,
    pub dedupe_key: String,
    pub created_at: String,
    pub severity: i32,
    pub wallet: Option<String>,
    pub condition_id: Option<String>,
    pub payload_json: String,
}

impl From<&SignalEvent> for NewSignalEventRow {
    fn from(s: &SignalEvent) -> Self {
        Self {
            signal_type: s.signal_type().as_str().to_string(),
            dedupe_key: s.dedupe_key().to_string(),
            created_at: rfc3339(s.created_at()),
            severity: i32::from(s.severity().get()),
            wallet: s.wallet().map(|w| w.as_str().to_string()),
            condition_id: s.condition_id().map(|c| c.as_str().to_string()),
            payload_json: s.payload().to_string(),
        }
    }
}

#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = signal_events)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct SignalEventRow {
    pub id: i64,
    pub signal_type: String,
    pub dedupe_key: String,
    pub created_at: String,
    pub severity: i32,
    pub wallet: Option<String>,
    pub condition_id: Option<String>,
    pub payload_json: String,
}

impl SignalEventRow {
    #[must_use]
    pub fn into_domain(self) -> (i64, SignalEvent) {
        let signal_type = SignalType::from_str(&self.signal_type).unwrap_or(SignalType::NewMarket);
        let payload = serde_json::from_str(&self.payload_json).unwrap_or(serde_json::Value::Null);
        let event = SignalEvent::new(
            signal_type,
            self.dedupe_key,
            parse_rfc3339(&self.created_at),
            crate::domain::Severity::clamp(self.severity),
            self.wallet.map(WalletId::from),
            self.condition_id.map(ConditionId::from),
            payload,
        );
        (self.id, event)
    }
}

#[derive(Insertable, Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = alert_log)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct AlertLogRow {
    pub signal_event_id: i64,
    pub channel: String,
    pub notification_key: String,
    pub sent_at: String,
    pub status: String,
    pub error: Option<String>,
}

impl From<&AlertLogEntry> for AlertLogRow {
    fn from(entry: &AlertLogEntry) -> Self {
        Self {
            signal_event_id: entry.signal_event_id(),
            channel: entry.channel().to_string(),
            notification_key: entry.notification_key().to_string(),
            sent_at: rfc3339(entry.sent_at()),
            status: entry.status().as_str().to_string(),
            error: entry.error().map(str::to_string),
        }
    }
}

impl AlertLogRow {
    #[must_use]
    pub fn status(&self) -> DeliveryStatus {
        match self.status.as_str() {
            "SENT" => DeliveryStatus::Sent,
            "FAILED" => DeliveryStatus::Failed,
            _ => DeliveryStatus::Suppressed,
        }
    }
}

#[derive(Insertable, Queryable, Selectable, AsChangeset, Debug, Clone)]
#[diesel(table_name = app_config)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct AppConfigRow {
    pub key: String,
    pub value_json: String,
    pub updated_at: String,
    pub updated_by: Option<String>,
}

/// Used where a price-change delta needs the book-side enum round-tripped
/// through a plain string column (e.g. an audit log of applied deltas).
#[must_use]
pub fn side_to_str(side: BookSide) -> &'static str {
    match side {
        BookSide::Bid => "BID",
        BookSide::Ask => "ASK",
    }
}
