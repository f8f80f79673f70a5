//! Pluggable alert channel drivers (§4.J): each exposes a single
//! `send(formatted_message)` operation.

use async_trait::async_trait;
use tracing::info;

use crate::config::{AlertConfig, ChannelKind};
use crate::error::{Error, Result};

/// A formatted alert ready for delivery, plus the structured metadata
/// channels may want alongside the rendered text (§4.J: "Message content
/// includes severity, type, principal numbers, deep link").
#[derive(Debug, Clone)]
pub struct FormattedAlert {
    pub text: String,
    pub severity: u8,
    pub signal_type: &'static str,
}

#[async_trait]
pub trait ChannelDriver: Send + Sync {
    fn kind(&self) -> ChannelKind;
    async fn send(&self, alert: &FormattedAlert) -> Result<()>;
}

/// Local structured-log channel; always available, used as the default and
/// as a fallback when no external channel is configured.
pub struct LogChannel;

#[async_trait]
impl ChannelDriver for LogChannel {
    fn kind(&self) -> ChannelKind {
        ChannelKind::Log
    }

    async fn send(&self, alert: &FormattedAlert) -> Result<()> {
        info!(severity = alert.severity, signal_type = alert.signal_type, "{}", alert.text);
        Ok(())
    }
}

/// Slack incoming-webhook channel (JSON POST of `{"text": ...}`).
pub struct SlackChannel {
    http: reqwest::Client,
    webhook_url: String,
}

impl SlackChannel {
    #[must_use]
    pub fn new(http: reqwest::Client, webhook_url: String) -> Self {
        Self { http, webhook_url }
    }
}

#[async_trait]
impl ChannelDriver for SlackChannel {
    fn kind(&self) -> ChannelKind {
        ChannelKind::Slack
    }

    async fn send(&self, alert: &FormattedAlert) -> Result<()> {
        let response = self
            .http
            .post(&self.webhook_url)
            .json(&serde_json::json!({ "text": alert.text }))
            .send()
            .await
            .map_err(|e| Error::Connection(e.to_string()))?;

        if response.status().is_success() {
            Ok(())
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(Error::Connection(format!("slack webhook returned {status}: {body}")))
        }
    }
}

/// Telegram bot API channel; direct `reqwest` POST rather than a bot
/// framework, matching how this kind of one-shot notification is sent
/// elsewhere in the stack.
pub struct TelegramChannel {
    http: reqwest::Client,
    bot_token: String,
    chat_id: String,
}

impl TelegramChannel {
    #[must_use]
    pub fn new(http: reqwest::Client, bot_token: String, chat_id: String) -> Self {
        Self { http, bot_token, chat_id }
    }
}

#[async_trait]
impl ChannelDriver for TelegramChannel {
    fn kind(&self) -> ChannelKind {
        ChannelKind::Telegram
    }

    async fn send(&self, alert: &FormattedAlert) -> Result<()> {
        let url = format!("https://api.telegram.org/bot{}/sendMessage", self.bot_token);
        let response = self
            .http
            .post(&url)
            .json(&serde_json::json!({ "chat_id": self.chat_id, "text": alert.text }))
            .send()
            .await
            .map_err(|e| Error::Connection(e.to_string()))?;

        if response.status().is_success() {
            Ok(())
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(Error::Connection(format!("telegram sendMessage returned {status}: {body}")))
        }
    }
}

/// SMTP email channel via `lettre`.
#[cfg(feature = "email")]
pub struct EmailChannel {
    transport: lettre::AsyncSmtpTransport<lettre::Tokio1Executor>,
    from_address: String,
    to_address: String,
}

#[cfg(feature = "email")]
impl EmailChannel {
    pub fn new(config: &crate::config::EmailConfig) -> Result<Self> {
        use lettre::transport::smtp::authentication::Credentials;

        let host = config
            .smtp_host
            .as_deref()
            .ok_or_else(|| Error::Validation("SMTP_HOST not configured".into()))?;

        let mut builder = lettre::AsyncSmtpTransport::<lettre::Tokio1Executor>::starttls_relay(host)
            .map_err(|e| Error::Validation(e.to_string()))?
            .port(config.smtp_port);

        if let (Some(user), Some(pass)) = (config.username.as_deref(), config.password.as_deref()) {
            builder = builder.credentials(Credentials::new(user.to_string(), pass.to_string()));
        }

        Ok(Self {
            transport: builder.build(),
            from_address: config.from_address.clone().unwrap_or_default(),
            to_address: config.to_address.clone().unwrap_or_default(),
        })
    }
}

#[cfg(feature = "email")]
#[async_trait]
impl ChannelDriver for EmailChannel {
    fn kind(&self) -> ChannelKind {
        ChannelKind::Email
    }

    async fn send(&self, alert: &FormattedAlert) -> Result<()> {
        use lettre::{AsyncTransport, Message};

        let email = Message::builder()
            .from(self.from_address.parse().map_err(|_| Error::Validation("invalid from_address".into()))?)
            .to(self.to_address.parse().map_err(|_| Error::Validation("invalid to_address".into()))?)
            .subject(format!("[{}] {}", alert.severity, alert.signal_type))
            .body(alert.text.clone())
            .map_err(|e| Error::Validation(e.to_string()))?;

        self.transport.send(email).await.map_err(|e| Error::Connection(e.to_string()))?;
        Ok(())
    }
}

/// Builds the set of channel drivers enabled by configuration (§4.J
/// "Channels"). `Log` is always included regardless of configured channels
/// since it requires no credentials and is the ultimate fallback.
#[must_use]
pub fn build_channels(config: &AlertConfig, http: reqwest::Client) -> Vec<Box<dyn ChannelDriver>> {
    let mut channels: Vec<Box<dyn ChannelDriver>> = vec![Box::new(LogChannel)];

    for kind in &config.channels {
        match kind {
            ChannelKind::Log => {}
            ChannelKind::Slack => {
                if let Some(url) = config.slack.webhook_url.clone() {
                    channels.push(Box::new(SlackChannel::new(http.clone(), url)));
                }
            }
            ChannelKind::Telegram => {
                if let (Some(token), Some(chat)) = (config.telegram.bot_token.clone(), config.telegram.chat_id.clone()) {
                    channels.push(Box::new(TelegramChannel::new(http.clone(), token, chat)));
                }
            }
            #[cfg(feature = "email")]
            ChannelKind::Email => {
                if let Ok(channel) = EmailChannel::new(&config.email) {
                    channels.push(Box::new(channel));
                }
            }
            #[cfg(not(feature = "email"))]
            ChannelKind::Email => {}
        }
    }

    channels
}
