mod harness;

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use marketwatch::alerts::{default_rules, ChannelDriver, FormattedAlert};
use marketwatch::config::{AlertConfig, ChannelKind};
use marketwatch::domain::{ConditionId, Severity, SignalEvent, SignalType};
use marketwatch::error::Result;

use harness::memory_db::MemoryDb;

/// A channel driver that records delivered text instead of sending anywhere,
/// sharing its log with the test via `Arc` so both sides can see deliveries.
struct RecordingChannel {
    sent: Arc<Mutex<Vec<String>>>,
}

impl RecordingChannel {
    fn new() -> (Self, Arc<Mutex<Vec<String>>>) {
        let sent = Arc::new(Mutex::new(Vec::new()));
        (Self { sent: Arc::clone(&sent) }, sent)
    }
}

#[async_trait]
impl ChannelDriver for RecordingChannel {
    fn kind(&self) -> ChannelKind {
        ChannelKind::Log
    }

    async fn send(&self, alert: &FormattedAlert) -> Result<()> {
        self.sent.lock().unwrap().push(alert.text.clone());
        Ok(())
    }
}

fn event(dedupe_key: &str, wallet: &str, severity: i32) -> SignalEvent {
    SignalEvent::new(
        SignalType::LargeTakerTrade,
        dedupe_key,
        Utc::now(),
        Severity::clamp(severity),
        Some(marketwatch::domain::WalletId::from(wallet)),
        Some(ConditionId::from("0xcond")),
        serde_json::json!({}),
    )
}

#[tokio::test]
async fn higher_severity_delivery_is_not_suppressed_by_dedup_window() {
    let db = MemoryDb::create();
    let mut conn = db.conn();
    let config = AlertConfig::default();
    let rules = default_rules(&config);

    marketwatch::db::signals::insert(&mut conn, &event("k3", "0xother", 2)).unwrap();
    marketwatch::db::signals::insert(&mut conn, &event("k4", "0xother", 5)).unwrap();

    let (recorder, _sent) = RecordingChannel::new();
    let channels: Vec<Box<dyn ChannelDriver>> = vec![Box::new(recorder)];
    let delivered = marketwatch::alerts::run(&mut conn, &config, &rules, &channels).await.unwrap();
    assert_eq!(delivered, 2);
}

#[tokio::test]
async fn equal_or_lower_severity_within_window_suppresses_second_delivery() {
    let db = MemoryDb::create();
    let mut conn = db.conn();
    let config = AlertConfig::default();
    let rules = default_rules(&config);

    marketwatch::db::signals::insert(&mut conn, &event("k5", "0xdup", 3)).unwrap();
    marketwatch::db::signals::insert(&mut conn, &event("k6", "0xdup", 2)).unwrap();

    let (recorder, _sent) = RecordingChannel::new();
    let channels: Vec<Box<dyn ChannelDriver>> = vec![Box::new(recorder)];
    let delivered = marketwatch::alerts::run(&mut conn, &config, &rules, &channels).await.unwrap();
    assert_eq!(delivered, 1);
}

#[tokio::test]
async fn rule_below_min_severity_floor_is_never_delivered() {
    let db = MemoryDb::create();
    let mut conn = db.conn();
    let mut config = AlertConfig::default();
    config.min_severity = 4;
    let rules = default_rules(&config);

    marketwatch::db::signals::insert(&mut conn, &event("k7", "0xlow", 2)).unwrap();

    let (recorder, _sent) = RecordingChannel::new();
    let channels: Vec<Box<dyn ChannelDriver>> = vec![Box::new(recorder)];
    let delivered = marketwatch::alerts::run(&mut conn, &config, &rules, &channels).await.unwrap();
    assert_eq!(delivered, 0);
}

#[tokio::test]
async fn delivered_alert_text_carries_severity_and_dedupe_key() {
    let db = MemoryDb::create();
    let mut conn = db.conn();
    let config = AlertConfig::default();
    let rules = default_rules(&config);

    marketwatch::db::signals::insert(&mut conn, &event("k8:0xdeadbeef", "0xwallet", 4)).unwrap();

    let (recorder, sent) = RecordingChannel::new();
    let channels: Vec<Box<dyn ChannelDriver>> = vec![Box::new(recorder)];
    let delivered = marketwatch::alerts::run(&mut conn, &config, &rules, &channels).await.unwrap();
    assert_eq!(delivered, 1);

    let texts = sent.lock().unwrap();
    assert_eq!(texts.len(), 1);
    assert!(texts[0].contains("k8:0xdeadbeef"));
    assert!(texts[0].contains('4'));
}
