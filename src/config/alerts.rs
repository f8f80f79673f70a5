//! Alert dispatcher and channel configuration (§4.J, §6).

use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelKind {
    Log,
    Slack,
    Telegram,
    Email,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SlackConfig {
    pub webhook_url: Option<String>,
}

impl Default for SlackConfig {
    fn default() -> Self {
        Self { webhook_url: None }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    pub bot_token: Option<String>,
    pub chat_id: Option<String>,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: None,
            chat_id: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EmailConfig {
    pub smtp_host: Option<String>,
    pub smtp_port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub from_address: Option<String>,
    pub to_address: Option<String>,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            smtp_host: None,
            smtp_port: 587,
            username: None,
            password: None,
            from_address: None,
            to_address: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AlertConfig {
    pub enabled: bool,
    pub channels: Vec<ChannelKind>,
    pub dedup_window_secs: i64,
    pub min_severity: u8,
    pub max_delivery_attempts: u32,
    pub slack: SlackConfig,
    pub telegram: TelegramConfig,
    pub email: EmailConfig,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            channels: vec![ChannelKind::Log],
            dedup_window_secs: 3600,
            min_severity: 1,
            max_delivery_attempts: 3,
            slack: SlackConfig::default(),
            telegram: TelegramConfig::default(),
            email: EmailConfig::default(),
        }
    }
}
