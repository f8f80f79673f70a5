use std::path::Path;

use crate::cli::output;
use crate::config::AppConfig;
use crate::error::{Error, Result};

/// Send a test message through the Telegram alert channel.
pub async fn execute_telegram(config_path: &Path) -> Result<()> {
    let config = AppConfig::load(Some(config_path))?;

    let token = config
        .alerts
        .telegram
        .bot_token
        .clone()
        .ok_or_else(|| Error::Validation("TELEGRAM_BOT_TOKEN not configured".into()))?;
    let chat_id = config
        .alerts
        .telegram
        .chat_id
        .clone()
        .ok_or_else(|| Error::Validation("TELEGRAM_CHAT_ID not configured".into()))?;

    output::section("Telegram Check");
    let masked = if token.len() >= 10 { format!("{}...{}", &token[..6], &token[token.len() - 4..]) } else { "***".to_string() };
    output::field("Bot token", masked);
    output::field("Chat ID", &chat_id);

    let client = reqwest::Client::new();
    let url = format!("https://api.telegram.org/bot{token}/sendMessage");
    let response = client
        .post(&url)
        .json(&serde_json::json!({ "chat_id": chat_id, "text": "marketwatch: test message from `check telegram`" }))
        .send()
        .await
        .map_err(|e| Error::Connection(e.to_string()))?;

    if response.status().is_success() {
        output::success("test message sent");
        Ok(())
    } else {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        Err(Error::Connection(format!("telegram sendMessage returned {status}: {body}")))
    }
}
