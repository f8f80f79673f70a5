//! `sync_open_interest` (§4.G).

use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use super::JobContext;
use crate::db;
use crate::domain::MarketMetricSnapshot;
use crate::error::Result;

/// Fetches open interest for every tracked market in one batched request
/// and appends a `MarketMetricSnapshot` row per market (§3 append-only).
pub async fn sync_open_interest(ctx: Arc<JobContext>) -> Result<()> {
    let mut conn = ctx.pool.get()?;
    let markets = db::markets::load_all(&mut conn)?;
    if markets.is_empty() {
        return Ok(());
    }

    let condition_ids: Vec<String> = markets.iter().map(|m| m.condition_id().as_str().to_string()).collect();
    let entries = ctx.rest.fetch_open_interest(&condition_ids).await?;
    let now = Utc::now();

    for entry in &entries {
        let previous = db::snapshots::latest_for(&mut conn, &entry.condition_id)?;
        let (volume, liquidity, best_bid_yes, best_ask_yes, best_bid_no, best_ask_no) = previous
            .map(|s| (s.volume(), s.liquidity(), s.best_bid_yes(), s.best_ask_yes(), s.best_bid_no(), s.best_ask_no()))
            .unwrap_or_default();

        let snapshot = MarketMetricSnapshot::new(
            entry.condition_id.clone(),
            now,
            volume,
            liquidity,
            entry.value,
            best_bid_yes,
            best_ask_yes,
            best_bid_no,
            best_ask_no,
        );
        db::snapshots::append(&mut conn, &snapshot)?;
    }

    info!(markets = entries.len(), "open interest sync complete");
    Ok(())
}
