//! `sync_orderbooks` (§4.G): the REST polling fallback that keeps the cache
//! warm for tokens the websocket consumer hasn't delivered a book for yet,
//! and periodically flushes the in-memory cache to storage for audit (§4.D).

use std::sync::Arc;

use tracing::{info, warn};

use super::JobContext;
use crate::db;
use crate::error::Result;
use crate::parse::orderbook::parse_book_snapshot;

pub async fn sync_orderbooks(ctx: Arc<JobContext>) -> Result<()> {
    let tokens = ctx.tracked_universe.read().clone();
    let mut conn = ctx.pool.get()?;
    let mut refreshed = 0;

    for token in &tokens {
        match ctx.rest.fetch_orderbook(token.as_str()).await {
            Ok(Some(raw)) => {
                if let Some(book) = parse_book_snapshot(&raw) {
                    if book.is_well_formed() {
                        ctx.cache.apply_snapshot(book.clone());
                        db::orderbooks::flush_one(&mut conn, &book)?;
                        refreshed += 1;
                    }
                }
            }
            Ok(None) => {}
            Err(err) => warn!(token = token.as_str(), error = %err, "orderbook poll failed"),
        }
    }

    info!(refreshed, "orderbook poll complete");
    Ok(())
}
