//! `sync_universe` (§4.G "Universe selection").

use std::sync::Arc;

use tracing::info;

use super::JobContext;
use crate::db;
use crate::domain::{Market, TokenId};
use crate::error::Result;

/// Recomputes the tracked token set from all known markets: include any
/// whose indexed volume/liquidity/open-interest clears a configured floor,
/// OR that are named in `manual_overrides`; cap at `max_tracked_markets`.
///
/// Volume/liquidity live on the most recent `MarketMetricSnapshot`, not on
/// `Market` itself (§3) — this reads the latest snapshot per candidate.
pub async fn sync_universe(ctx: Arc<JobContext>) -> Result<()> {
    let config = ctx.config();
    let mut conn = ctx.pool.get()?;
    let markets = db::markets::load_all(&mut conn)?;

    let mut manual: Vec<&Market> = Vec::new();
    let mut scored: Vec<&Market> = Vec::new();

    for market in &markets {
        if config.universe.manual_overrides.contains(market.condition_id().as_str()) {
            manual.push(market);
            continue;
        }
        let passes = db::snapshots::latest_for(&mut conn, market.condition_id())?
            .map(|snapshot| {
                snapshot.volume() >= config.universe.min_gamma_volume
                    || snapshot.liquidity() >= config.universe.min_gamma_liquidity
                    || snapshot.open_interest() >= config.universe.min_open_interest
            })
            .unwrap_or(false);
        if passes {
            scored.push(market);
        }
    }

    let remaining_capacity = config.universe.max_tracked_markets.saturating_sub(manual.len());
    scored.truncate(remaining_capacity);

    let mut tokens: Vec<TokenId> = Vec::new();
    for market in manual.into_iter().chain(scored) {
        if let Some((yes, no)) = market.token_pair() {
            tokens.push(yes.clone());
            tokens.push(no.clone());
        }
    }

    let tracked_count = tokens.len();
    ctx.websocket.set_universe(tokens.clone());
    *ctx.tracked_universe.write() = tokens;
    info!(tracked_tokens = tracked_count, "universe recomputed");
    Ok(())
}
