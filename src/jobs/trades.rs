//! `sync_large_trades` (§4.G pagination, §4.H feeds off its output).

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use super::JobContext;
use crate::db;
use crate::error::Result;
use crate::parse::trades::parse_trade;

/// Pages through the trades endpoint, newest first, walking back until
/// trades older than `last_trade_ts_seen - TRADE_SAFETY_WINDOW_SECONDS` are
/// reached or `TRADES_MAX_PAGES` is hit. Cold start is bounded by
/// `TRADES_INITIAL_LOOKBACK_HOURS` (already baked into `last_trade_ts_seen`'s
/// initial value, see [`super::JobContext::new`]).
pub async fn sync_large_trades(ctx: Arc<JobContext>) -> Result<()> {
    let config = ctx.config();
    let last_seen = *ctx.last_trade_ts_seen.read();
    let cutoff = last_seen - chrono::Duration::seconds(config.trades_fetch.trade_safety_window_secs);

    let mut conn = ctx.pool.get()?;
    let mut offset = 0u32;
    let mut inserted_count = 0usize;
    let mut newest_seen = last_seen;

    for _page_index in 0..config.trades_fetch.trades_max_pages {
        let page = ctx
            .rest
            .fetch_trades_page(config.signals.large_trade_usd_threshold, config.trades_fetch.page_limit, offset)
            .await?;
        if page.is_empty() {
            break;
        }

        let mut oldest_in_page = newest_seen;
        for raw in &page {
            let Some(trade) = parse_trade(raw) else {
                warn!("dropping unparseable trade");
                continue;
            };
            if trade.trade_ts() > newest_seen {
                newest_seen = trade.trade_ts();
            }
            if trade.trade_ts() < oldest_in_page {
                oldest_in_page = trade.trade_ts();
            }
            if db::trades::insert_if_new(&mut conn, &trade)? {
                inserted_count += 1;
            }
        }

        if oldest_in_page <= cutoff || (page.len() as u32) < config.trades_fetch.page_limit {
            break;
        }
        offset += config.trades_fetch.page_limit;
    }

    *ctx.last_trade_ts_seen.write() = newest_seen;
    info!(inserted = inserted_count, "large trades sync complete");
    Ok(())
}
