//! `sync_positions` (§4.G).
//!
//! The core data model (§3) defines no dedicated positions/exposure table —
//! only Market, MarketMetricSnapshot, OrderbookLatest, Trade, Wallet,
//! SignalEvent, AlertLog and AppConfig. This job is therefore
//! observability-only: it confirms upstream reachability per tracked wallet
//! and logs position counts, without inventing an unspecified schema.

use std::sync::Arc;

use tracing::{info, warn};

use super::JobContext;
use crate::db;
use crate::error::Result;

pub async fn sync_positions(ctx: Arc<JobContext>) -> Result<()> {
    let mut conn = ctx.pool.get()?;

    let recent_trades = db::trades::load_since(&mut conn, chrono::Utc::now() - chrono::Duration::days(7))?;
    let mut seen = std::collections::HashSet::new();
    let mut tracked = Vec::new();
    for trade in &recent_trades {
        if !seen.insert(trade.wallet().clone()) {
            continue;
        }
        if let Some(wallet) = db::wallets::find(&mut conn, trade.wallet())? {
            tracked.push(wallet);
        }
    }

    let mut checked = 0;
    for wallet in &tracked {
        match ctx.rest.fetch_positions(wallet.address().as_str()).await {
            Ok(positions) => {
                info!(wallet = wallet.address().as_str(), open_positions = positions.len(), "position snapshot");
                checked += 1;
            }
            Err(err) => warn!(wallet = wallet.address().as_str(), error = %err, "positions fetch failed"),
        }
    }

    info!(wallets_checked = checked, "positions sync complete");
    Ok(())
}
