//! Depth-aware binary-market arbitrage signal engine (§4.I), the
//! numerically hardest part of the pipeline.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::json;
use tracing::info;

use crate::cache::OrderbookCache;
use crate::config::{AppConfig, ArbConfig};
use crate::db::{self, DbConnection};
use crate::domain::{ConditionId, Market, OrderbookLatest, PriceLevel, Severity, SignalEvent, SignalType};
use crate::error::Result;

/// Total cost to fill `q` shares greedily from an ascending-by-price ask
/// list. `None` if the book can't fill `q` (§4.I step 3).
fn raw_cost(levels: &[PriceLevel], q: Decimal) -> Option<Decimal> {
    if q <= Decimal::ZERO {
        return None;
    }
    let mut remaining = q;
    let mut cost = Decimal::ZERO;
    for level in levels {
        if remaining <= Decimal::ZERO {
            break;
        }
        let take = remaining.min(level.size());
        cost += take * level.price();
        remaining -= take;
    }
    if remaining > Decimal::ZERO {
        return None;
    }
    Some(cost)
}

/// Volume-weighted average price to fill `q` shares greedily from an
/// ascending-by-price ask list. `None` if the book can't fill `q` (§4.I
/// step 3).
#[must_use]
pub fn avg_ask(levels: &[PriceLevel], q: Decimal) -> Option<Decimal> {
    raw_cost(levels, q).map(|cost| cost / q)
}

fn total_depth(levels: &[PriceLevel]) -> Decimal {
    levels.iter().map(PriceLevel::size).sum()
}

/// Cumulative size consumed and the level price active up to that point,
/// one entry per ask level, in ascending order.
fn cumulative_levels(levels: &[PriceLevel]) -> Vec<(Decimal, Decimal)> {
    let mut cum = Decimal::ZERO;
    levels
        .iter()
        .map(|l| {
            cum += l.size();
            (cum, l.price())
        })
        .collect()
}

/// Exact piecewise-linear walk for `q_max` (§4.I step 4): the union of both
/// books' ask break-points makes `total_avg_cost(q) - m * q` piecewise
/// linear in `q` with a non-decreasing slope (ask prices only rise), so it
/// crosses zero at most once on the way up. Callers must already have
/// verified `lo_bound` satisfies the arb condition, i.e. that the crossing
/// (if any) lies at or beyond `lo_bound`. `m = 1 - edge_min - fee`.
fn find_q_max(yes_asks: &[PriceLevel], no_asks: &[PriceLevel], hi_bound: Decimal, m: Decimal) -> Option<Decimal> {
    let yes_cum = cumulative_levels(yes_asks);
    let no_cum = cumulative_levels(no_asks);
    if yes_cum.is_empty() || no_cum.is_empty() {
        return None;
    }

    let mut yi = 0usize;
    let mut ni = 0usize;
    let mut q = Decimal::ZERO;
    let mut cost = Decimal::ZERO;

    while q < hi_bound {
        let (yes_end, yes_price) = *yes_cum.get(yi)?;
        let (no_end, no_price) = *no_cum.get(ni)?;
        let next_q = yes_end.min(no_end).min(hi_bound);
        if next_q <= q {
            if yes_end <= q {
                yi += 1;
            }
            if no_end <= q {
                ni += 1;
            }
            continue;
        }

        let slope = yes_price + no_price;
        let slope_m = slope - m;
        if slope_m > Decimal::ZERO {
            // f(x) = (cost - m*q) + slope_m*(x - q); solve f(x) = 0.
            let base = cost - m * q;
            let dx = -base / slope_m;
            if dx >= Decimal::ZERO {
                let cross = q + dx;
                if cross <= next_q {
                    return Some(cross);
                }
            }
        }

        cost += slope * (next_q - q);
        q = next_q;
        if yes_end <= q {
            yi += 1;
        }
        if no_end <= q {
            ni += 1;
        }
    }

    Some(hi_bound)
}

/// Proportional fee applied at size `q`, expressed as an addition to the
/// combined average-cost sum (§4.I step 3). A flat bps rate applied to the
/// notional-per-share of roughly 1 unit, i.e. `fee_bps / 10_000` per share.
fn fee_model(taker_fee_bps: Decimal) -> Decimal {
    taker_fee_bps / dec!(10000)
}

/// One evaluated arb opportunity, ready to become a `SignalEvent` (§4.I step 5).
#[derive(Debug, Clone)]
pub struct ArbOpportunity {
    pub condition_id: ConditionId,
    pub yes_token: String,
    pub no_token: String,
    pub as_of_yes: DateTime<Utc>,
    pub as_of_no: DateTime<Utc>,
    pub best_ask_yes: Decimal,
    pub best_ask_no: Decimal,
    pub q_max: Decimal,
    pub edge_at_min_q: Decimal,
    pub edge_at_q_max: Decimal,
    pub avg_ask_yes_at_q_max: Decimal,
    pub avg_ask_no_at_q_max: Decimal,
    pub levels_yes_consumed: Vec<PriceLevel>,
    pub levels_no_consumed: Vec<PriceLevel>,
    pub neg_risk: bool,
    pub max_book_age_secs: i64,
}

fn levels_up_to(levels: &[PriceLevel], q: Decimal) -> Vec<PriceLevel> {
    let mut remaining = q;
    let mut out = Vec::new();
    for level in levels {
        if remaining <= Decimal::ZERO {
            break;
        }
        let take = remaining.min(level.size());
        out.push(PriceLevel::new(level.price(), take));
        remaining -= take;
    }
    out
}

/// Evaluates one binary market's pair of books for an executable arbitrage,
/// per §4.I steps 1-4. `yes_book`/`no_book` must both be fresh enough
/// (checked by the caller via `ARB_MAX_BOOK_AGE_SECONDS`).
#[must_use]
pub fn evaluate(
    condition_id: &ConditionId,
    neg_risk: bool,
    yes_book: &OrderbookLatest,
    no_book: &OrderbookLatest,
    config: &ArbConfig,
    now: DateTime<Utc>,
) -> Option<ArbOpportunity> {
    let yes_asks = yes_book.asks();
    let no_asks = no_book.asks();
    let best_ask_yes = yes_asks.first()?.price();
    let best_ask_no = no_asks.first()?.price();

    // Fast screen (§4.I step 2).
    if best_ask_yes + best_ask_no >= Decimal::ONE - config.edge_min {
        return None;
    }

    let max_q = total_depth(yes_asks).min(total_depth(no_asks)).min(config.max_shares_to_evaluate);
    if max_q < config.min_executable_shares {
        return None;
    }

    let fee = fee_model(config.taker_fee_bps);
    let cost_at = |q: Decimal| -> Option<Decimal> {
        let ask_yes = avg_ask(yes_asks, q)?;
        let ask_no = avg_ask(no_asks, q)?;
        Some(ask_yes + ask_no + fee)
    };
    let satisfies = |q: Decimal| cost_at(q).is_some_and(|cost| cost < Decimal::ONE - config.edge_min);

    if !satisfies(config.min_executable_shares) {
        return None;
    }

    // Exact piecewise-linear walk for q_max over [min_executable_shares, max_q]
    // (§4.I step 4) rather than a binary search to a tolerance.
    let m = Decimal::ONE - config.edge_min - fee;
    let q_max = find_q_max(yes_asks, no_asks, max_q, m)?;

    let total_cost_at_q_max = cost_at(q_max)?;
    let edge_at_q_max = Decimal::ONE - total_cost_at_q_max;
    let edge_at_min_q = Decimal::ONE - cost_at(config.min_executable_shares)?;

    Some(ArbOpportunity {
        condition_id: condition_id.clone(),
        yes_token: yes_book.token_id().as_str().to_string(),
        no_token: no_book.token_id().as_str().to_string(),
        as_of_yes: yes_book.as_of(),
        as_of_no: no_book.as_of(),
        best_ask_yes,
        best_ask_no,
        q_max,
        edge_at_min_q,
        edge_at_q_max,
        avg_ask_yes_at_q_max: avg_ask(yes_asks, q_max)?,
        avg_ask_no_at_q_max: avg_ask(no_asks, q_max)?,
        levels_yes_consumed: levels_up_to(yes_asks, q_max),
        levels_no_consumed: levels_up_to(no_asks, q_max),
        neg_risk,
        max_book_age_secs: (now - yes_book.as_of().min(no_book.as_of())).num_seconds(),
    })
}

/// Severity formula from §4.I ("Severity").
#[must_use]
pub fn severity_for(opportunity: &ArbOpportunity) -> Severity {
    let mut value = if opportunity.edge_at_q_max >= dec!(0.015) && opportunity.q_max >= dec!(500) {
        4
    } else if opportunity.edge_at_q_max >= dec!(0.010) && opportunity.q_max >= dec!(100) {
        3
    } else {
        2
    };
    if opportunity.max_book_age_secs > 5 {
        value -= 1;
    }
    Severity::clamp(value)
}

fn dedupe_key(opportunity: &ArbOpportunity) -> String {
    let edge_rounded = opportunity.edge_at_q_max.round_dp(4);
    let q_rounded = opportunity.q_max.round_dp(2);
    format!("ARB_BUY_BOTH:{}:{edge_rounded}:{q_rounded}", opportunity.condition_id.as_str())
}

fn payload_for(opportunity: &ArbOpportunity, config: &ArbConfig) -> serde_json::Value {
    let levels_json = |levels: &[PriceLevel]| -> serde_json::Value {
        serde_json::Value::Array(
            levels
                .iter()
                .map(|l| json!({"price": l.price().to_string(), "size": l.size().to_string()}))
                .collect(),
        )
    };
    json!({
        "condition_id": opportunity.condition_id.as_str(),
        "yes_token": opportunity.yes_token,
        "no_token": opportunity.no_token,
        "as_of_yes": opportunity.as_of_yes.to_rfc3339(),
        "as_of_no": opportunity.as_of_no.to_rfc3339(),
        "best_ask_yes": opportunity.best_ask_yes.to_string(),
        "best_ask_no": opportunity.best_ask_no.to_string(),
        "top_of_book_sum": (opportunity.best_ask_yes + opportunity.best_ask_no).to_string(),
        "edge_min": config.edge_min.to_string(),
        "q_max": opportunity.q_max.to_string(),
        "edge_at_min_q": opportunity.edge_at_min_q.to_string(),
        "edge_at_q_max": opportunity.edge_at_q_max.to_string(),
        "avg_ask_yes_at_q_max": opportunity.avg_ask_yes_at_q_max.to_string(),
        "avg_ask_no_at_q_max": opportunity.avg_ask_no_at_q_max.to_string(),
        "levels_yes_consumed": levels_json(&opportunity.levels_yes_consumed),
        "levels_no_consumed": levels_json(&opportunity.levels_no_consumed),
        "neg_risk": opportunity.neg_risk,
        "config_snapshot": {
            "edge_min": config.edge_min.to_string(),
            "min_executable_shares": config.min_executable_shares.to_string(),
            "max_shares_to_evaluate": config.max_shares_to_evaluate.to_string(),
            "max_book_age_secs": config.max_book_age_secs,
            "market_cooldown_secs": config.market_cooldown_secs,
            "taker_fee_bps": config.taker_fee_bps.to_string(),
        },
    })
}

/// Runs the arb engine over every tracked binary market, consulting the
/// in-memory cache directly (not storage — the cache is the freshest
/// source of book state, §4.D, §4.I).
pub fn run(
    conn: &mut DbConnection,
    config: &AppConfig,
    markets: &[Market],
    cache: &OrderbookCache,
    cooldowns: &mut HashMap<String, DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Result<usize> {
    let mut emitted = 0;

    for market in markets {
        if !market.is_binary() {
            continue;
        }
        let Some((yes_token, no_token)) = market.token_pair() else { continue };
        let (yes_book, no_book) = cache.get_pair(yes_token, no_token);
        let (Some(yes_book), Some(no_book)) = (yes_book, no_book) else { continue };

        let age_yes = (now - yes_book.as_of()).num_seconds();
        let age_no = (now - no_book.as_of()).num_seconds();
        if age_yes > config.arb.max_book_age_secs || age_no > config.arb.max_book_age_secs {
            continue;
        }

        let Some(opportunity) = evaluate(market.condition_id(), market.neg_risk(), &yes_book, &no_book, &config.arb, now) else {
            continue;
        };
        if opportunity.q_max < config.arb.min_executable_shares {
            continue;
        }

        let key = market.condition_id().as_str().to_string();
        if let Some(last) = cooldowns.get(&key) {
            if (now - *last).num_seconds() < config.arb.market_cooldown_secs {
                continue;
            }
        }

        let event = SignalEvent::new(
            SignalType::ArbBuyBoth,
            dedupe_key(&opportunity),
            now,
            severity_for(&opportunity),
            None,
            Some(opportunity.condition_id.clone()),
            payload_for(&opportunity, &config.arb),
        );

        match db::signals::insert(conn, &event)? {
            db::signals::InsertOutcome::Inserted(id) => {
                info!(id, condition_id = key, q_max = %opportunity.q_max, "arb opportunity emitted");
                cooldowns.insert(key, now);
                emitted += 1;
            }
            db::signals::InsertOutcome::AlreadyEmitted => {}
        }
    }

    Ok(emitted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::OrderbookMeta;

    fn levels(pairs: &[(Decimal, Decimal)]) -> Vec<PriceLevel> {
        pairs.iter().map(|(p, s)| PriceLevel::new(*p, *s)).collect()
    }

    #[test]
    fn avg_ask_is_non_decreasing_in_q() {
        let book = levels(&[(dec!(0.48), dec!(100)), (dec!(0.50), dec!(500))]);
        let a = avg_ask(&book, dec!(50)).unwrap();
        let b = avg_ask(&book, dec!(100)).unwrap();
        let c = avg_ask(&book, dec!(200)).unwrap();
        assert!(a <= b);
        assert!(b <= c);
    }

    #[test]
    fn avg_ask_at_least_best_ask() {
        let book = levels(&[(dec!(0.48), dec!(100)), (dec!(0.50), dec!(500))]);
        assert!(avg_ask(&book, dec!(300)).unwrap() >= dec!(0.48));
    }

    #[test]
    fn avg_ask_none_past_total_depth() {
        let book = levels(&[(dec!(0.48), dec!(100))]);
        assert!(avg_ask(&book, dec!(200)).is_none());
    }

    fn book(token: &str, asks: Vec<PriceLevel>, as_of: DateTime<Utc>) -> OrderbookLatest {
        OrderbookLatest::new(crate::domain::TokenId::from(token), vec![], asks, as_of, OrderbookMeta::default())
    }

    #[test]
    fn basic_arb_scenario_matches_spec_example() {
        let now = Utc::now();
        let yes = book("yes", levels(&[(dec!(0.48), dec!(100)), (dec!(0.50), dec!(500))]), now);
        let no = book("no", levels(&[(dec!(0.50), dec!(200)), (dec!(0.52), dec!(400))]), now);
        let config = ArbConfig { edge_min: dec!(0.01), min_executable_shares: dec!(50), max_shares_to_evaluate: dec!(5000), ..ArbConfig::default() };

        let opp = evaluate(&ConditionId::from("0xc"), false, &yes, &no, &config, now).expect("arb should be found");
        assert_eq!(opp.q_max, dec!(200));
        assert!((opp.edge_at_q_max - dec!(0.01)).abs() < dec!(0.0005));
        assert_eq!(severity_for(&opp).get(), 3);
    }

    #[test]
    fn no_arb_at_depth_below_minimum_executable_shares() {
        let now = Utc::now();
        let yes = book("yes", levels(&[(dec!(0.49), dec!(5)), (dec!(0.60), dec!(1000))]), now);
        let no = book("no", levels(&[(dec!(0.49), dec!(5)), (dec!(0.60), dec!(1000))]), now);
        let config = ArbConfig { edge_min: dec!(0.01), min_executable_shares: dec!(50), ..ArbConfig::default() };

        assert!(evaluate(&ConditionId::from("0xc"), false, &yes, &no, &config, now).is_none());
    }

    #[test]
    fn stale_book_is_excluded_by_caller_age_check() {
        let now = Utc::now();
        let stale = now - chrono::Duration::seconds(30);
        let yes = book("yes", levels(&[(dec!(0.45), dec!(500))]), stale);
        let no = book("no", levels(&[(dec!(0.45), dec!(500))]), now);
        let age_yes = (now - yes.as_of()).num_seconds();
        assert!(age_yes > 10);
        let _ = no;
    }
}
