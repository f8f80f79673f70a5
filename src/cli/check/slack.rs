use std::path::Path;

use crate::cli::output;
use crate::config::AppConfig;
use crate::error::{Error, Result};

/// Send a test message through the Slack alert channel.
pub async fn execute_slack(config_path: &Path) -> Result<()> {
    let config = AppConfig::load(Some(config_path))?;

    let webhook_url = config
        .alerts
        .slack
        .webhook_url
        .clone()
        .ok_or_else(|| Error::Validation("SLACK_WEBHOOK_URL not configured".into()))?;

    output::section("Slack Check");
    output::field("Webhook", &webhook_url);

    let client = reqwest::Client::new();
    let response = client
        .post(&webhook_url)
        .json(&serde_json::json!({ "text": "marketwatch: test message from `check slack`" }))
        .send()
        .await
        .map_err(|e| Error::Connection(e.to_string()))?;

    if response.status().is_success() {
        output::success("test message sent");
        Ok(())
    } else {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        Err(Error::Connection(format!("slack webhook returned {status}: {body}")))
    }
}
