//! Trade signal engine (§4.H): turns newly-persisted trades into
//! `LARGE_TAKER_TRADE`, `LARGE_NEW_WALLET_TRADE` and
//! `DORMANT_WALLET_REACTIVATION` signal events.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde_json::json;
use tracing::info;

use crate::config::{AppConfig, TradeSignalConfig};
use crate::db::{self, DbConnection};
use crate::domain::{Severity, SignalEvent, SignalType, Trade, Wallet};
use crate::error::Result;

/// Notional-band base severity (§4.H "Severity").
fn notional_band_severity(notional_usd: Decimal) -> i32 {
    if notional_usd >= Decimal::new(1_000_000, 0) {
        5
    } else if notional_usd >= Decimal::new(250_000, 0) {
        4
    } else if notional_usd >= Decimal::new(50_000, 0) {
        3
    } else {
        2
    }
}

/// Processes every trade at or after `since`, upserting wallet state and
/// emitting signal events. Returns the number of trades examined.
pub fn run(conn: &mut DbConnection, config: &AppConfig, since: DateTime<Utc>, now: DateTime<Utc>) -> Result<usize> {
    let trades = db::trades::load_since(conn, since)?;
    let mut processed = 0;

    for trade in &trades {
        process_one(conn, &config.signals, trade, now)?;
        processed += 1;
    }

    Ok(processed)
}

fn process_one(conn: &mut DbConnection, config: &TradeSignalConfig, trade: &Trade, now: DateTime<Utc>) -> Result<()> {
    let notional_usd = trade.notional_usd();

    let previous = db::wallets::find(conn, trade.wallet())?;
    let previous_last_seen_at = previous.as_ref().map(Wallet::last_seen_at);
    let mut wallet = match previous {
        Some(w) => w,
        None => Wallet::first_seen(trade.wallet().clone(), now, trade.trade_ts()),
    };

    wallet.observe_trade(now, notional_usd);
    let last_7d = db::trades::sum_notional_last_7d(conn, wallet.address(), now)?;
    wallet.set_last_7d_notional_usd(last_7d);
    db::wallets::upsert(conn, &wallet)?;

    // "New wallet" per the Glossary is time-windowed off `first_seen_at`, not
    // merely "this wallet's first-ever trade" — a wallet's second or Nth
    // trade inside the window is still new.
    let is_new = wallet.is_new_as_of(trade.trade_ts(), config.new_wallet_window_days);

    if notional_usd < config.large_trade_usd_threshold {
        return Ok(());
    }

    let liquidity_floor_breached = db::snapshots::latest_for(conn, trade.condition_id())?
        .map(|s| s.liquidity() < config.liquidity_floor)
        .unwrap_or(false);

    emit_large_taker_trade(conn, config, trade, is_new, liquidity_floor_breached)?;

    if is_new {
        emit_large_new_wallet_trade(conn, config, trade, liquidity_floor_breached)?;
    }

    if let Some(previous_last_seen_at) = previous_last_seen_at {
        if Wallet::is_reactivation(previous_last_seen_at, trade.trade_ts(), config.dormant_window_days) {
            emit_dormant_reactivation(conn, config, trade, liquidity_floor_breached)?;
        }
    }

    Ok(())
}

fn dedupe_key(signal_type: SignalType, trade: &Trade) -> String {
    match trade.transaction_hash() {
        Some(hash) => format!("{}:{hash}", signal_type.as_str()),
        None => format!("{}:{}", signal_type.as_str(), trade.key().as_str()),
    }
}

fn severity_for(base: i32, is_new_wallet: bool, liquidity_floor_breached: bool) -> Severity {
    let mut value = base;
    if is_new_wallet {
        value += 1;
    }
    if liquidity_floor_breached {
        value += 1;
    }
    Severity::clamp(value)
}

fn payload_for(config: &TradeSignalConfig, trade: &Trade) -> serde_json::Value {
    json!({
        "wallet": trade.wallet().as_str(),
        "condition_id": trade.condition_id().as_str(),
        "token_id": trade.token_id().as_str(),
        "side": trade.side().as_str(),
        "price": trade.price().to_string(),
        "size": trade.size().to_string(),
        "notional_usd": trade.notional_usd().to_string(),
        "trade_ts": trade.trade_ts().to_rfc3339(),
        "transaction_hash": trade.transaction_hash(),
        "config_snapshot": {
            "large_trade_usd_threshold": config.large_trade_usd_threshold.to_string(),
            "new_wallet_window_days": config.new_wallet_window_days,
            "dormant_window_days": config.dormant_window_days,
            "liquidity_floor": config.liquidity_floor.to_string(),
        },
    })
}

fn emit_large_taker_trade(
    conn: &mut DbConnection,
    config: &TradeSignalConfig,
    trade: &Trade,
    is_new_wallet: bool,
    liquidity_floor_breached: bool,
) -> Result<()> {
    let signal_type = SignalType::LargeTakerTrade;
    let severity = severity_for(notional_band_severity(trade.notional_usd()), is_new_wallet, liquidity_floor_breached);
    let event = SignalEvent::new(
        signal_type,
        dedupe_key(signal_type, trade),
        trade.trade_ts(),
        severity,
        Some(trade.wallet().clone()),
        Some(trade.condition_id().clone()),
        payload_for(config, trade),
    );
    insert_logged(conn, event)
}

fn emit_large_new_wallet_trade(
    conn: &mut DbConnection,
    config: &TradeSignalConfig,
    trade: &Trade,
    liquidity_floor_breached: bool,
) -> Result<()> {
    let signal_type = SignalType::LargeNewWalletTrade;
    let severity = severity_for(notional_band_severity(trade.notional_usd()), true, liquidity_floor_breached);
    let event = SignalEvent::new(
        signal_type,
        dedupe_key(signal_type, trade),
        trade.trade_ts(),
        severity,
        Some(trade.wallet().clone()),
        Some(trade.condition_id().clone()),
        payload_for(config, trade),
    );
    insert_logged(conn, event)
}

fn emit_dormant_reactivation(
    conn: &mut DbConnection,
    config: &TradeSignalConfig,
    trade: &Trade,
    liquidity_floor_breached: bool,
) -> Result<()> {
    let signal_type = SignalType::DormantWalletReactivation;
    let severity = severity_for(notional_band_severity(trade.notional_usd()), false, liquidity_floor_breached);
    let event = SignalEvent::new(
        signal_type,
        dedupe_key(signal_type, trade),
        trade.trade_ts(),
        severity,
        Some(trade.wallet().clone()),
        Some(trade.condition_id().clone()),
        payload_for(config, trade),
    );
    insert_logged(conn, event)
}

fn insert_logged(conn: &mut DbConnection, event: SignalEvent) -> Result<()> {
    match db::signals::insert(conn, &event)? {
        db::signals::InsertOutcome::Inserted(id) => {
            info!(id, signal_type = event.signal_type().as_str(), dedupe_key = event.dedupe_key(), "signal emitted");
        }
        db::signals::InsertOutcome::AlreadyEmitted => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notional_band_boundaries() {
        assert_eq!(notional_band_severity(Decimal::new(10_000, 0)), 2);
        assert_eq!(notional_band_severity(Decimal::new(50_000, 0)), 3);
        assert_eq!(notional_band_severity(Decimal::new(250_000, 0)), 4);
        assert_eq!(notional_band_severity(Decimal::new(1_000_000, 0)), 5);
    }

    #[test]
    fn severity_bumps_and_clamps() {
        assert_eq!(severity_for(5, true, true).get(), 5);
        assert_eq!(severity_for(2, true, false).get(), 3);
        assert_eq!(severity_for(2, false, false).get(), 2);
    }
}
