//! Handler for the `run` command: wires every component together and runs
//! until a shutdown signal arrives (§5, AMBIENT.4).

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tokio::signal;
use tokio::sync::watch;
use tracing::{error, info};

use crate::alerts;
use crate::cache::OrderbookCache;
use crate::cli::RunArgs;
use crate::config::AppConfig;
use crate::db;
use crate::error::{Error, Result};
use crate::exchange::polymarket::{PolymarketRestClient, WebsocketConsumer};
use crate::http::HttpPool;
use crate::jobs::{self, JobContext};
use crate::scheduler::Scheduler;

fn map_join_result(result: std::result::Result<(), tokio::task::JoinError>) -> Result<()> {
    result.map_err(|e| Error::Connection(e.to_string()))
}

/// Execute the `run` command.
pub async fn execute(config_path: &Path, log_level: Option<&str>, args: &RunArgs) -> Result<()> {
    let mut config = AppConfig::load_base(Some(config_path)).map_err(|e| Error::FatalConfig(e.to_string()))?;

    // DATABASE_URL has to be resolvable before the pool exists, so it is the
    // one setting read from the environment ahead of the DB-backed overlay
    // (§6) — `apply_env_overrides` below reasserts it, and everything else,
    // on top of the overlay once the pool is up.
    if let Ok(url) = std::env::var("DATABASE_URL") {
        config.database.url = url;
    }
    let pool = db::create_pool(&config.database.url, config.database.max_connections)?;
    {
        let mut conn = pool.get()?;
        let overrides = db::config_store::load_all(&mut conn)?;
        config.apply_db_overrides(&overrides);
    }
    config.apply_env_overrides();
    if let Some(level) = log_level {
        config.logging.level = level.to_string();
    }
    if args.json_logs {
        config.logging.format = "json".to_string();
    }
    if args.no_alerts {
        config.alerts.enabled = false;
    }
    config.validate().map_err(|e| Error::FatalConfig(e.to_string()))?;

    config.logging.init();
    info!(channels = ?config.alerts.channels, "marketwatch starting");

    let http = Arc::new(HttpPool::new(config.http.clone()));
    let rest = Arc::new(PolymarketRestClient::new(Arc::clone(&http), config.upstream.clone()));
    let cache = Arc::new(OrderbookCache::new());
    let websocket = Arc::new(WebsocketConsumer::new(config.websocket.clone(), Arc::clone(&cache), Arc::clone(&rest)));

    let webhook_client = reqwest::Client::new();
    let alert_channels = alerts::build_channels(&config.alerts, webhook_client);
    let alert_rules = alerts::default_rules(&config.alerts);

    let config = Arc::new(config);
    let cold_start_lookback = chrono::Duration::hours(config.trades_fetch.trades_initial_lookback_hours);
    let ctx = Arc::new(JobContext::new(
        pool,
        Arc::clone(&rest),
        Arc::clone(&cache),
        Arc::clone(&websocket),
        Arc::clone(&config),
        cold_start_lookback,
        alert_channels,
        alert_rules,
    ));

    let mut scheduler = Scheduler::new();
    register_jobs(&mut scheduler, &ctx, &config);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let scheduler_handle = {
        let shutdown_rx = shutdown_rx.clone();
        tokio::spawn(async move {
            scheduler.run(shutdown_rx).await;
        })
    };

    let websocket_handle = if config.websocket.enabled {
        let websocket = Arc::clone(&websocket);
        let shutdown_rx = shutdown_rx.clone();
        Some(tokio::spawn(async move { websocket.run(shutdown_rx).await }))
    } else {
        None
    };

    tokio::select! {
        _ = signal::ctrl_c() => {
            info!("shutdown signal received");
            let _ = shutdown_tx.send(true);
        }
    }

    map_join_result(scheduler_handle.await)?;
    if let Some(handle) = websocket_handle {
        if let Err(e) = handle.await {
            error!(error = %e, "websocket consumer task join failed");
        }
    }

    info!("marketwatch stopped");
    Ok(())
}

/// Registers every fetch/processing job named in §4.G at its configured
/// interval. The websocket consumer and orderbook cache it feeds are long
/// running and registered separately, outside the scheduler (§5).
fn register_jobs(scheduler: &mut Scheduler, ctx: &Arc<JobContext>, config: &AppConfig) {
    macro_rules! register {
        ($name:literal, $secs:expr, $job:path) => {{
            let ctx = Arc::clone(ctx);
            scheduler.register($name, Duration::from_secs($secs), move || {
                let ctx = Arc::clone(&ctx);
                async move { $job(ctx).await }
            });
        }};
    }

    register!("sync_gamma_events", config.scheduling.sync_gamma_events_secs, jobs::gamma::sync_gamma_events);
    register!("sync_tag_metadata", config.scheduling.sync_tag_metadata_secs, jobs::gamma::sync_tag_metadata);
    register!("sync_universe", config.scheduling.sync_universe_secs, jobs::universe::sync_universe);
    register!("sync_open_interest", config.scheduling.sync_open_interest_secs, jobs::open_interest::sync_open_interest);
    register!("sync_large_trades", config.scheduling.sync_large_trades_secs, jobs::trades::sync_large_trades);
    register!("sync_orderbooks", config.scheduling.sync_orderbooks_secs, jobs::orderbooks::sync_orderbooks);
    register!("sync_positions", config.scheduling.sync_positions_secs, jobs::positions::sync_positions);
    register!(
        "run_signal_engine_trades",
        config.scheduling.run_signal_engine_trades_secs,
        jobs::signal_runs::run_signal_engine_trades
    );
    register!(
        "run_signal_engine_arb",
        config.scheduling.run_signal_engine_arb_secs,
        jobs::signal_runs::run_signal_engine_arb
    );
    register!("alert_dispatcher", config.scheduling.alert_dispatcher_secs, jobs::alert_run::alert_dispatcher);
}
