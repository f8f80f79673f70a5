mod harness;

use chrono::Utc;
use marketwatch::config::AppConfig;
use marketwatch::db::{self, signals::InsertOutcome};
use marketwatch::domain::{ConditionId, Severity, SignalEvent, SignalType, Trade, TradeSide, WalletId};
use rust_decimal_macros::dec;

use harness::memory_db::MemoryDb;

fn trade(wallet: &str, tx_hash: &str, notional: rust_decimal::Decimal, trade_ts: chrono::DateTime<Utc>) -> Trade {
    let size = dec!(1000);
    let price = notional / size;
    Trade::new(
        Some(tx_hash.to_string()),
        WalletId::from(wallet),
        ConditionId::from("0xcond"),
        marketwatch::domain::TokenId::from("0xtoken"),
        TradeSide::Buy,
        price,
        size,
        trade_ts,
    )
}

#[test]
fn signal_dedupe_key_is_unique_across_reinserts() {
    let db = MemoryDb::create();
    let mut conn = db.conn();

    let event = SignalEvent::new(SignalType::ArbBuyBoth, "ARB_BUY_BOTH:0xcond:fixed", Utc::now(), Severity::clamp(3), None, Some(ConditionId::from("0xcond")), serde_json::json!({}));

    match db::signals::insert(&mut conn, &event).unwrap() {
        InsertOutcome::Inserted(_) => {}
        InsertOutcome::AlreadyEmitted => panic!("first insert should not collide"),
    }
    match db::signals::insert(&mut conn, &event).unwrap() {
        InsertOutcome::AlreadyEmitted => {}
        InsertOutcome::Inserted(_) => panic!("duplicate dedupe_key should not insert a second row"),
    }

    let since = Utc::now() - chrono::Duration::hours(1);
    let counts = db::signals::type_and_time_since(&mut conn, since).unwrap();
    assert_eq!(counts.len(), 1);
}

#[test]
fn trade_insert_if_new_is_idempotent_on_same_trade_key() {
    let db = MemoryDb::create();
    let mut conn = db.conn();

    let t = trade("0xwallet", "0xtx1", dec!(50000), Utc::now());
    assert!(db::trades::insert_if_new(&mut conn, &t).unwrap());
    assert!(!db::trades::insert_if_new(&mut conn, &t).unwrap());

    let loaded = db::trades::load_since(&mut conn, Utc::now() - chrono::Duration::hours(1)).unwrap();
    assert_eq!(loaded.len(), 1);
}

#[test]
fn large_new_wallet_trade_emits_taker_and_new_wallet_signals() {
    let db = MemoryDb::create();
    let mut conn = db.conn();
    let config = AppConfig::default();

    let t0 = Utc::now();
    let t = trade("0xnewwallet", "0xtx-new", dec!(50000), t0);
    assert!(db::trades::insert_if_new(&mut conn, &t).unwrap());

    let processed = marketwatch::signals::trades::run(&mut conn, &config, t0 - chrono::Duration::seconds(1), t0).unwrap();
    assert_eq!(processed, 1);

    let undispatched = db::signals::load_undispatched(&mut conn).unwrap();
    let types: Vec<SignalType> = undispatched.iter().map(|(_, e)| e.signal_type()).collect();
    assert!(types.contains(&SignalType::LargeTakerTrade));
    assert!(types.contains(&SignalType::LargeNewWalletTrade));
}

#[test]
fn dormant_wallet_reactivation_fires_on_return_after_window() {
    let db = MemoryDb::create();
    let mut conn = db.conn();
    let config = AppConfig::default();

    let t0 = Utc::now();
    let first = trade("0xdormant", "0xtx-first", dec!(50000), t0);
    assert!(db::trades::insert_if_new(&mut conn, &first).unwrap());
    marketwatch::signals::trades::run(&mut conn, &config, t0 - chrono::Duration::seconds(1), t0).unwrap();

    let t1 = t0 + chrono::Duration::days(45);
    let second = trade("0xdormant", "0xtx-second", dec!(60000), t1);
    assert!(db::trades::insert_if_new(&mut conn, &second).unwrap());
    marketwatch::signals::trades::run(&mut conn, &config, t1 - chrono::Duration::seconds(1), t1).unwrap();

    let undispatched = db::signals::load_undispatched(&mut conn).unwrap();
    let reactivations = undispatched.iter().filter(|(_, e)| e.signal_type() == SignalType::DormantWalletReactivation).count();
    assert_eq!(reactivations, 1);
}

#[test]
fn small_trade_emits_no_signals() {
    let db = MemoryDb::create();
    let mut conn = db.conn();
    let config = AppConfig::default();

    let t0 = Utc::now();
    let t = trade("0xsmall", "0xtx-small", dec!(100), t0);
    assert!(db::trades::insert_if_new(&mut conn, &t).unwrap());
    marketwatch::signals::trades::run(&mut conn, &config, t0 - chrono::Duration::seconds(1), t0).unwrap();

    let undispatched = db::signals::load_undispatched(&mut conn).unwrap();
    assert!(undispatched.is_empty());
}
