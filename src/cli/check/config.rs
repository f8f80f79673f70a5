use std::path::Path;

use crate::cli::output;
use crate::config::AppConfig;
use crate::error::Result;

/// Validate the configuration file without starting anything.
pub fn execute_config(config_path: &Path) -> Result<()> {
    output::section("Configuration Check");
    output::field("Config", config_path.display());

    let config = AppConfig::load(Some(config_path))?;
    output::success("Configuration file is valid");

    output::section("Summary");
    output::field("Database", &config.database.url);
    output::field("Max tracked markets", config.universe.max_tracked_markets);
    output::field("Alert channels", format!("{:?}", config.alerts.channels));
    output::field("Websocket enabled", config.websocket.enabled);

    if config.alerts.channels.contains(&crate::config::ChannelKind::Telegram) {
        if config.alerts.telegram.bot_token.is_some() && config.alerts.telegram.chat_id.is_some() {
            output::success("Telegram credentials present");
        } else {
            output::warning("Telegram channel enabled but bot_token/chat_id missing");
        }
    }
    if config.alerts.channels.contains(&crate::config::ChannelKind::Slack) {
        if config.alerts.slack.webhook_url.is_some() {
            output::success("Slack webhook configured");
        } else {
            output::warning("Slack channel enabled but webhook_url missing");
        }
    }

    output::success("Configuration check complete");
    Ok(())
}
