//! `sync_gamma_events` and `sync_tag_metadata` (§4.G).

use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use tracing::{info, warn};

use super::JobContext;
use crate::db;
use crate::domain::{Severity, SignalEvent, SignalType};
use crate::error::Result;
use crate::parse::gamma::{parse_gamma_market, RawMarket};

/// Pages through the events/markets endpoint, upserts every parsed market,
/// and emits `NEW_MARKET` for condition ids not previously known.
pub async fn sync_gamma_events(ctx: Arc<JobContext>) -> Result<()> {
    let now = Utc::now();
    let mut offset = 0u32;
    const PAGE_LIMIT: u32 = 500;
    let mut parsed = Vec::new();

    loop {
        let page = ctx.rest.fetch_markets_page(offset, PAGE_LIMIT).await?;
        if page.is_empty() {
            break;
        }
        let page_len = page.len();
        for raw in &page {
            match parse_gamma_market(raw, now) {
                Some(market) => parsed.push(market.market),
                None => warn!("dropping unparseable gamma market"),
            }
        }
        if page_len < PAGE_LIMIT as usize {
            break;
        }
        offset += PAGE_LIMIT;
    }

    let mut conn = ctx.pool.get()?;
    let newly_discovered = db::markets::upsert_batch(&mut conn, &parsed)?;
    info!(markets = parsed.len(), new = newly_discovered.len(), "gamma sync complete");

    for condition_id in newly_discovered {
        let event = SignalEvent::new(
            SignalType::NewMarket,
            format!("NEW_MARKET:{}", condition_id.as_str()),
            now,
            Severity::clamp(1),
            None,
            Some(condition_id),
            json!({}),
        );
        match db::signals::insert(&mut conn, &event)? {
            db::signals::InsertOutcome::Inserted(_) => {}
            db::signals::InsertOutcome::AlreadyEmitted => {}
        }
    }

    Ok(())
}

/// Refreshes the tag dictionary. Tags are denormalized onto markets as
/// `tag_ids` (§3); this job persists the id→label dictionary itself as a
/// single runtime-config row since no dedicated tag table is part of the
/// core data model.
pub async fn sync_tag_metadata(ctx: Arc<JobContext>) -> Result<()> {
    let tags = ctx.rest.fetch_tags().await?;
    let mut conn = ctx.pool.get()?;
    db::config_store::set(&mut conn, "tag_dictionary", &serde_json::Value::Array(tags.clone()), None)?;
    info!(tags = tags.len(), "tag metadata sync complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_markets_missing_condition_id() {
        let raw = RawMarket(json!({"question": "no id here"}));
        assert!(parse_gamma_market(&raw, Utc::now()).is_none());
    }
}
