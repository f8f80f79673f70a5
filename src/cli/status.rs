//! Handler for the `status` command.
//!
//! Unlike a long-lived service with a systemd unit and a status file, this
//! process has no persistent handle to a running instance — so `status`
//! reports what's observable from storage: signal volume over the last day
//! and the freshness of the data each fetch job maintains.

use std::path::Path;

use chrono::Utc;

use crate::cli::output;
use crate::config::AppConfig;
use crate::db;
use crate::error::Result;

pub fn execute(config_path: &Path) -> Result<()> {
    let config = AppConfig::load(Some(config_path))?;
    let pool = db::create_pool(&config.database.url, 1)?;
    let mut conn = pool.get()?;

    output::section("marketwatch status");
    output::field("Database", &config.database.url);

    let markets = db::markets::load_all(&mut conn)?;
    output::field("Tracked markets", markets.len());

    let since = Utc::now() - chrono::Duration::hours(24);
    let signal_rows = db::signals::type_and_time_since(&mut conn, since)?;
    output::field("Signals (24h)", signal_rows.len());

    let mut by_type: std::collections::HashMap<String, usize> = std::collections::HashMap::new();
    for (signal_type, _) in &signal_rows {
        *by_type.entry(signal_type.clone()).or_insert(0) += 1;
    }
    let mut kinds: Vec<_> = by_type.into_iter().collect();
    kinds.sort_by(|a, b| b.1.cmp(&a.1));
    for (kind, count) in kinds {
        output::field(&kind, count);
    }

    output::success("status read complete");
    Ok(())
}
