//! Core domain types for the ingestion-and-signals pipeline.
//!
//! These types are pure data plus the small amount of behavior that keeps
//! their invariants true (e.g. an [`OrderbookLatest`] can't end up with
//! non-monotonic price levels). Everything upstream-shaped lives in
//! `crate::parse`; everything storage-shaped lives in `crate::db`.

mod alert_log;
mod ids;
mod market;
mod orderbook;
mod signal;
mod snapshot;
mod trade;
mod wallet;

pub use alert_log::{AlertLogEntry, DeliveryStatus};
pub use ids::{ConditionId, EventId, TokenId, Wallet as WalletId};
pub use market::{Market, Outcome};
pub use orderbook::{OrderbookLatest, OrderbookMeta, PriceLevel, Side as BookSide};
pub use signal::{SignalEvent, SignalType, Severity};
pub use snapshot::MarketMetricSnapshot;
pub use trade::{Side as TradeSide, Trade, TradeKey};
pub use wallet::Wallet;
