//! Market metadata, as discovered via the events/markets sync job.

use chrono::{DateTime, Utc};
use std::collections::BTreeSet;

use super::ids::{ConditionId, EventId, TokenId};

/// A market's outcome labels paired with their token ids, in upstream order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    label: String,
    token_id: TokenId,
}

impl Outcome {
    #[must_use]
    pub fn new(label: impl Into<String>, token_id: TokenId) -> Self {
        Self {
            label: label.into(),
            token_id,
        }
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[must_use]
    pub const fn token_id(&self) -> &TokenId {
        &self.token_id
    }
}

/// Market metadata keyed by `condition_id`.
///
/// Invariant: if `outcomes.len() == 2` then both outcomes carry a resolvable
/// token id (binary markets always have a YES/NO token pair).
#[derive(Debug, Clone)]
pub struct Market {
    condition_id: ConditionId,
    market_id: Option<String>,
    event_id: Option<EventId>,
    slug: Option<String>,
    question: String,
    tag_ids: BTreeSet<i64>,
    neg_risk: bool,
    outcomes: Vec<Outcome>,
    start_time: Option<DateTime<Utc>>,
    end_time: Option<DateTime<Utc>>,
    last_seen_at: DateTime<Utc>,
}

impl Market {
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        condition_id: ConditionId,
        question: impl Into<String>,
        outcomes: Vec<Outcome>,
        neg_risk: bool,
        last_seen_at: DateTime<Utc>,
    ) -> Self {
        Self {
            condition_id,
            market_id: None,
            event_id: None,
            slug: None,
            question: question.into(),
            tag_ids: BTreeSet::new(),
            neg_risk,
            outcomes,
            start_time: None,
            end_time: None,
            last_seen_at,
        }
    }

    #[must_use]
    pub const fn condition_id(&self) -> &ConditionId {
        &self.condition_id
    }

    #[must_use]
    pub fn market_id(&self) -> Option<&str> {
        self.market_id.as_deref()
    }

    pub fn set_market_id(&mut self, market_id: impl Into<String>) {
        self.market_id = Some(market_id.into());
    }

    #[must_use]
    pub const fn event_id(&self) -> Option<&EventId> {
        self.event_id.as_ref()
    }

    pub fn set_event_id(&mut self, event_id: EventId) {
        self.event_id = Some(event_id);
    }

    #[must_use]
    pub fn slug(&self) -> Option<&str> {
        self.slug.as_deref()
    }

    pub fn set_slug(&mut self, slug: impl Into<String>) {
        self.slug = Some(slug.into());
    }

    #[must_use]
    pub fn question(&self) -> &str {
        &self.question
    }

    #[must_use]
    pub const fn tag_ids(&self) -> &BTreeSet<i64> {
        &self.tag_ids
    }

    pub fn set_tag_ids(&mut self, tag_ids: BTreeSet<i64>) {
        self.tag_ids = tag_ids;
    }

    #[must_use]
    pub const fn neg_risk(&self) -> bool {
        self.neg_risk
    }

    #[must_use]
    pub fn outcomes(&self) -> &[Outcome] {
        &self.outcomes
    }

    #[must_use]
    pub const fn start_time(&self) -> Option<DateTime<Utc>> {
        self.start_time
    }

    pub fn set_start_time(&mut self, t: Option<DateTime<Utc>>) {
        self.start_time = t;
    }

    #[must_use]
    pub const fn end_time(&self) -> Option<DateTime<Utc>> {
        self.end_time
    }

    pub fn set_end_time(&mut self, t: Option<DateTime<Utc>>) {
        self.end_time = t;
    }

    #[must_use]
    pub const fn last_seen_at(&self) -> DateTime<Utc> {
        self.last_seen_at
    }

    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.last_seen_at = now;
    }

    /// A binary market has exactly two outcomes, each with a token id.
    #[must_use]
    pub fn is_binary(&self) -> bool {
        self.outcomes.len() == 2
    }

    /// `[yes_token, no_token]` for a binary market; `None` otherwise.
    #[must_use]
    pub fn token_pair(&self) -> Option<(&TokenId, &TokenId)> {
        if self.outcomes.len() != 2 {
            return None;
        }
        Some((self.outcomes[0].token_id(), self.outcomes[1].token_id()))
    }

    /// Validates the `outcomes.len() == 2 => token_ids.len() == 2` invariant from §3.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        if self.outcomes.len() == 2 {
            self.outcomes.iter().all(|o| !o.token_id().as_str().is_empty())
        } else {
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(last_seen: DateTime<Utc>) -> Market {
        Market::new(
            ConditionId::from("0xabc"),
            "Will it happen?",
            vec![
                Outcome::new("Yes", TokenId::from("tok-yes")),
                Outcome::new("No", TokenId::from("tok-no")),
            ],
            false,
            last_seen,
        )
    }

    #[test]
    fn binary_market_exposes_token_pair() {
        let m = sample(Utc::now());
        assert!(m.is_binary());
        let (yes, no) = m.token_pair().unwrap();
        assert_eq!(yes.as_str(), "tok-yes");
        assert_eq!(no.as_str(), "tok-no");
        assert!(m.is_well_formed());
    }

    #[test]
    fn touch_updates_last_seen() {
        let mut m = sample(Utc::now());
        let later = Utc::now() + chrono::Duration::seconds(10);
        m.touch(later);
        assert_eq!(m.last_seen_at(), later);
    }

    #[test]
    fn non_binary_market_has_no_token_pair() {
        let m = Market::new(
            ConditionId::from("0xdef"),
            "Pick one of three",
            vec![
                Outcome::new("A", TokenId::from("a")),
                Outcome::new("B", TokenId::from("b")),
                Outcome::new("C", TokenId::from("c")),
            ],
            false,
            Utc::now(),
        );
        assert!(!m.is_binary());
        assert!(m.token_pair().is_none());
        assert!(m.is_well_formed());
    }
}
