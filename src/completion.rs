//! Deduplicates trade-completion events.
//!
//! The notification stream underneath delivers offer-state-changed events
//! at least once and is known to redeliver events for the same offer. The
//! post-completion pipeline (inventory reload, profit update,
//! notifications) must run exactly once per accepted offer, so every
//! completion passes through this cache first.

use crate::types::TradeOfferId;
use std::collections::HashMap;
use chrono::{DateTime, Duration, Utc};

const COMPLETION_TTL_MINUTES: i64 = 10;

/// A recency set of processed offer IDs. Unbounded in size but each entry
/// expires a fixed time after insertion, independent of access. After
/// expiry the same offer ID is treated as new again, an accepted bound
/// on the guarantee.
#[derive(Debug)]
pub struct CompletionCache {
    ttl: Duration,
    seen: HashMap<TradeOfferId, DateTime<Utc>>,
}

impl Default for CompletionCache {
    fn default() -> Self {
        Self::new()
    }
}

impl CompletionCache {
    /// Creates a cache with the standard 10 minute entry lifetime.
    pub fn new() -> Self {
        Self::with_ttl(Duration::minutes(COMPLETION_TTL_MINUTES))
    }

    /// Creates a cache with a custom entry lifetime.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            ttl,
            seen: HashMap::new(),
        }
    }

    /// Returns whether `tradeofferid` was already seen within the entry
    /// lifetime, marking it as seen if not. Expired entries are swept
    /// lazily on each call.
    pub fn seen_or_mark(&mut self, tradeofferid: TradeOfferId) -> bool {
        self.seen_or_mark_at(tradeofferid, Utc::now())
    }

    /// Same as [`seen_or_mark`](Self::seen_or_mark) with an explicit
    /// current time.
    pub fn seen_or_mark_at(
        &mut self,
        tradeofferid: TradeOfferId,
        now: DateTime<Utc>,
    ) -> bool {
        let ttl = self.ttl;

        self.seen.retain(|_, inserted| now - *inserted < ttl);

        if self.seen.contains_key(&tradeofferid) {
            return true;
        }

        self.seen.insert(tradeofferid, now);

        false
    }

    /// The number of live entries.
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_sighting_within_ttl_is_repeated() {
        let mut cache = CompletionCache::new();

        assert!(!cache.seen_or_mark(999));
        assert!(cache.seen_or_mark(999));
    }

    #[test]
    fn distinct_offers_do_not_collide() {
        let mut cache = CompletionCache::new();

        assert!(!cache.seen_or_mark(999));
        assert!(!cache.seen_or_mark(1000));
    }

    #[test]
    fn entries_expire_after_the_ttl() {
        let mut cache = CompletionCache::new();
        let start = Utc::now();

        assert!(!cache.seen_or_mark_at(999, start));
        // Three seconds later the redelivery is suppressed.
        assert!(cache.seen_or_mark_at(999, start + Duration::seconds(3)));
        // Past the lifetime the same ID is processed as a new completion.
        assert!(!cache.seen_or_mark_at(999, start + Duration::minutes(11)));
    }

    #[test]
    fn expired_entries_are_swept() {
        let mut cache = CompletionCache::new();
        let start = Utc::now();

        cache.seen_or_mark_at(1, start);
        cache.seen_or_mark_at(2, start);
        cache.seen_or_mark_at(3, start + Duration::minutes(11));

        assert_eq!(cache.len(), 1);
    }
}
