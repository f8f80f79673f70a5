//! `alert_dispatcher` (§4.G, §4.J).

use std::sync::Arc;

use tracing::info;

use super::JobContext;
use crate::alerts;
use crate::error::Result;

pub async fn alert_dispatcher(ctx: Arc<JobContext>) -> Result<()> {
    let config = ctx.config();
    let mut conn = ctx.pool.get()?;
    let delivered = alerts::run(&mut conn, &config.alerts, &ctx.alert_rules, &ctx.alert_channels).await?;
    info!(delivered, "alert dispatch pass complete");
    Ok(())
}
