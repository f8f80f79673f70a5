mod harness;

use std::collections::HashMap;

use chrono::Utc;
use marketwatch::cache::OrderbookCache;
use marketwatch::config::AppConfig;
use marketwatch::db;
use marketwatch::domain::{ConditionId, Market, Outcome, OrderbookLatest, OrderbookMeta, PriceLevel, SignalType, TokenId};
use rust_decimal_macros::dec;

use harness::memory_db::MemoryDb;

fn binary_market(condition_id: &str, yes: &str, no: &str) -> Market {
    Market::new(
        ConditionId::from(condition_id),
        "Will it happen?",
        vec![Outcome::new("Yes", TokenId::from(yes)), Outcome::new("No", TokenId::from(no))],
        false,
        Utc::now(),
    )
}

fn book(token: &str, asks: Vec<PriceLevel>, as_of: chrono::DateTime<Utc>) -> OrderbookLatest {
    OrderbookLatest::new(TokenId::from(token), vec![], asks, as_of, OrderbookMeta::default())
}

#[test]
fn arb_run_emits_and_then_suppresses_during_cooldown() {
    let db = MemoryDb::create();
    let mut conn = db.conn();
    let mut config = AppConfig::default();
    config.arb.edge_min = dec!(0.01);
    config.arb.min_executable_shares = dec!(50);
    config.arb.market_cooldown_secs = 120;

    let market = binary_market("0xcond", "yes-tok", "no-tok");
    let cache = OrderbookCache::new();
    let now = Utc::now();
    cache.apply_snapshot(book("yes-tok", vec![PriceLevel::new(dec!(0.48), dec!(100)), PriceLevel::new(dec!(0.50), dec!(500))], now));
    cache.apply_snapshot(book("no-tok", vec![PriceLevel::new(dec!(0.50), dec!(200)), PriceLevel::new(dec!(0.52), dec!(400))], now));

    let mut cooldowns: HashMap<String, chrono::DateTime<Utc>> = HashMap::new();
    let emitted = marketwatch::signals::arb::run(&mut conn, &config, &[market.clone()], &cache, &mut cooldowns, now).unwrap();
    assert_eq!(emitted, 1);

    // Same pass, immediately after: cooldown suppresses a second opportunity on the same market.
    let emitted_again = marketwatch::signals::arb::run(&mut conn, &config, &[market], &cache, &mut cooldowns, now + chrono::Duration::seconds(1)).unwrap();
    assert_eq!(emitted_again, 0);

    let undispatched = db::signals::load_undispatched(&mut conn).unwrap();
    let arb_signals = undispatched.iter().filter(|(_, e)| e.signal_type() == SignalType::ArbBuyBoth).count();
    assert_eq!(arb_signals, 1);
}

#[test]
fn arb_run_skips_non_binary_and_stale_markets() {
    let db = MemoryDb::create();
    let mut conn = db.conn();
    let config = AppConfig::default();
    let cache = OrderbookCache::new();
    let now = Utc::now();

    let three_way = Market::new(
        ConditionId::from("0xthree"),
        "Pick one of three",
        vec![Outcome::new("A", TokenId::from("a")), Outcome::new("B", TokenId::from("b")), Outcome::new("C", TokenId::from("c"))],
        false,
        now,
    );

    let stale_market = binary_market("0xstale", "stale-yes", "stale-no");
    cache.apply_snapshot(book("stale-yes", vec![PriceLevel::new(dec!(0.40), dec!(500))], now - chrono::Duration::seconds(30)));
    cache.apply_snapshot(book("stale-no", vec![PriceLevel::new(dec!(0.40), dec!(500))], now));

    let mut cooldowns = HashMap::new();
    let emitted = marketwatch::signals::arb::run(&mut conn, &config, &[three_way, stale_market], &cache, &mut cooldowns, now).unwrap();
    assert_eq!(emitted, 0);

    let undispatched = db::signals::load_undispatched(&mut conn).unwrap();
    assert!(undispatched.is_empty());
}
