//! `run_signal_engine_trades` and `run_signal_engine_arb` (§4.G, §4.H, §4.I).

use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use super::JobContext;
use crate::db;
use crate::error::Result;
use crate::signals::{arb, trades};

pub async fn run_signal_engine_trades(ctx: Arc<JobContext>) -> Result<()> {
    let config = ctx.config();
    let now = Utc::now();
    let since = now - chrono::Duration::seconds(config.trades_fetch.trade_safety_window_secs * 4);
    let mut conn = ctx.pool.get()?;
    let processed = trades::run(&mut conn, &config, since, now)?;
    info!(processed, "trade signal engine pass complete");
    Ok(())
}

pub async fn run_signal_engine_arb(ctx: Arc<JobContext>) -> Result<()> {
    let config = ctx.config();
    let now = Utc::now();
    let mut conn = ctx.pool.get()?;
    let markets = db::markets::load_all(&mut conn)?;
    let mut cooldowns = ctx.arb_cooldowns.write();
    let emitted = arb::run(&mut conn, &config, &markets, &ctx.cache, &mut cooldowns, now)?;
    info!(emitted, "arb signal engine pass complete");
    Ok(())
}
