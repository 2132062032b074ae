/// Adrenaline bucket classification
///
/// Splits the cached token set into the three dashboard lists. A token may
/// land in more than one bucket. Classification is pure: the same input
/// always yields the same lists in the same order.
use serde::{Deserialize, Serialize};

use crate::config::AdrenalineConfig;
use crate::tokens::types::TokenRecord;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Buckets {
    /// Youngest first
    pub new_pairs: Vec<TokenRecord>,
    /// Largest market cap first
    pub migrating: Vec<TokenRecord>,
    /// Deepest liquidity first
    pub migrated: Vec<TokenRecord>,
}

impl Buckets {
    /// Copy of the buckets with every list cut to `max`
    pub fn truncated(&self, max: usize) -> Buckets {
        Buckets {
            new_pairs: self.new_pairs.iter().take(max).cloned().collect(),
            migrating: self.migrating.iter().take(max).cloned().collect(),
            migrated: self.migrated.iter().take(max).cloned().collect(),
        }
    }

    pub fn counts(&self) -> (usize, usize, usize) {
        (self.new_pairs.len(), self.migrating.len(), self.migrated.len())
    }
}

pub fn is_new_pair(token: &TokenRecord, config: &AdrenalineConfig) -> bool {
    token.age_minutes < config.new_max_age_minutes || token.market_cap_usd < config.new_max_mcap_usd
}

/// Still on a launchpad curve but gaining traction
pub fn is_migrating(token: &TokenRecord, config: &AdrenalineConfig) -> bool {
    !token.is_real_dex
        && token.market_cap_usd >= config.migrating_min_mcap_usd
        && token.age_minutes < config.migrating_max_age_minutes
}

pub fn is_migrated(token: &TokenRecord, config: &AdrenalineConfig) -> bool {
    token.is_real_dex && token.liquidity_usd >= config.migrated_min_liquidity_usd
}

pub fn classify(tokens: &[TokenRecord], config: &AdrenalineConfig) -> Buckets {
    let mut new_pairs: Vec<TokenRecord> = tokens
        .iter()
        .filter(|t| is_new_pair(t, config))
        .cloned()
        .collect();
    new_pairs.sort_by(|a, b| {
        a.age_minutes
            .cmp(&b.age_minutes)
            .then_with(|| a.mint.cmp(&b.mint))
    });

    let mut migrating: Vec<TokenRecord> = tokens
        .iter()
        .filter(|t| is_migrating(t, config))
        .cloned()
        .collect();
    migrating.sort_by(|a, b| {
        b.market_cap_usd
            .total_cmp(&a.market_cap_usd)
            .then_with(|| a.mint.cmp(&b.mint))
    });

    let mut migrated: Vec<TokenRecord> = tokens
        .iter()
        .filter(|t| is_migrated(t, config))
        .cloned()
        .collect();
    migrated.sort_by(|a, b| {
        b.liquidity_usd
            .total_cmp(&a.liquidity_usd)
            .then_with(|| a.mint.cmp(&b.mint))
    });

    Buckets {
        new_pairs,
        migrating,
        migrated,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokens::cache::TokenCache;
    use chrono::{Duration, TimeZone, Utc};

    fn token(mint: &str, age: i64, mcap: f64, liq: f64, real_dex: bool) -> TokenRecord {
        let mut t = TokenRecord::new(mint);
        t.age_minutes = age;
        t.market_cap_usd = mcap;
        t.liquidity_usd = liq;
        t.is_real_dex = real_dex;
        t.is_pump_fun = !real_dex;
        t
    }

    fn mints(list: &[TokenRecord]) -> Vec<&str> {
        list.iter().map(|t| t.mint.as_str()).collect()
    }

    #[test]
    fn new_pairs_by_age_or_small_cap() {
        let config = AdrenalineConfig::default();
        let tokens = vec![
            token("young", 2, 90_000.0, 0.0, false),
            token("small", 50, 29_999.0, 0.0, false),
            token("old_big", 3, 30_000.0, 0.0, false),
            token("fresh", 0, 45_000.0, 0.0, true),
        ];

        let buckets = classify(&tokens, &config);
        assert_eq!(mints(&buckets.new_pairs), vec!["fresh", "young", "small"]);
    }

    #[test]
    fn migrating_requires_launchpad_cap_and_age() {
        let config = AdrenalineConfig::default();
        let tokens = vec![
            token("a", 10, 12_000.0, 0.0, false),
            token("b", 10, 55_000.0, 0.0, false),
            token("too_old", 120, 80_000.0, 0.0, false),
            token("on_raydium", 10, 80_000.0, 9_000.0, true),
            token("too_small", 10, 9_999.0, 0.0, false),
        ];

        let buckets = classify(&tokens, &config);
        assert_eq!(mints(&buckets.migrating), vec!["b", "a"]);
    }

    #[test]
    fn migrated_requires_real_dex_liquidity() {
        let config = AdrenalineConfig::default();
        let tokens = vec![
            token("shallow", 10, 0.0, 4_999.0, true),
            token("deep", 10, 0.0, 50_000.0, true),
            token("mid", 10, 0.0, 5_000.0, true),
            token("pump", 10, 0.0, 90_000.0, false),
        ];

        let buckets = classify(&tokens, &config);
        assert_eq!(mints(&buckets.migrated), vec!["deep", "mid"]);
    }

    #[test]
    fn classification_is_deterministic() {
        let config = AdrenalineConfig::default();
        let tokens = vec![
            token("x", 1, 5_000.0, 0.0, false),
            token("y", 1, 5_000.0, 0.0, false),
            token("z", 1, 15_000.0, 6_000.0, true),
        ];
        let mut reversed = tokens.clone();
        reversed.reverse();

        assert_eq!(classify(&tokens, &config), classify(&reversed, &config));
    }

    #[test]
    fn truncation_only_applies_to_published_copy() {
        let config = AdrenalineConfig::default();
        let tokens: Vec<TokenRecord> = (0..40)
            .map(|i| token(&format!("m{:02}", i), i, 1_000.0, 0.0, false))
            .collect();

        let buckets = classify(&tokens, &config);
        assert_eq!(buckets.new_pairs.len(), 40);
        let published = buckets.truncated(config.max_pairs_displayed);
        assert_eq!(published.counts(), (30, 0, 0));
        assert_eq!(published.new_pairs[0].mint, "m00");
    }

    #[test]
    fn token_leaves_new_pairs_once_it_ages_and_grows() {
        let config = AdrenalineConfig::default();
        let mut cache = TokenCache::with_max_age_minutes(config.cache_max_age_minutes);
        let t0 = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();

        cache.upsert_at(vec![token("rocket", 0, 5_000.0, 0.0, false)], t0);
        let observed = cache.upsert_at(
            vec![token("rocket", 0, 5_000.0, 0.0, false)],
            t0 + Duration::seconds(30),
        );
        assert_eq!(observed[0].age_minutes, 0);
        assert_eq!(mints(&classify(&observed, &config).new_pairs), vec!["rocket"]);

        let observed = cache.upsert_at(
            vec![token("rocket", 0, 50_000.0, 0.0, false)],
            t0 + Duration::minutes(4),
        );
        assert_eq!(observed[0].age_minutes, 4);
        assert!(classify(&observed, &config).new_pairs.is_empty());
    }

    #[test]
    fn small_cap_stays_new_past_the_age_window() {
        let config = AdrenalineConfig::default();
        let mut cache = TokenCache::with_max_age_minutes(config.cache_max_age_minutes);
        let t0 = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();

        cache.upsert_at(vec![token("slow", 0, 5_000.0, 0.0, false)], t0);
        for minutes in [4, 30, 90] {
            let observed = cache.upsert_at(
                vec![token("slow", 0, 29_999.0, 0.0, false)],
                t0 + Duration::minutes(minutes),
            );
            assert_eq!(observed[0].age_minutes, minutes);
            assert_eq!(mints(&classify(&observed, &config).new_pairs), vec!["slow"]);
        }
    }

    #[test]
    fn migration_moves_token_between_buckets() {
        let config = AdrenalineConfig::default();
        let mut cache = TokenCache::with_max_age_minutes(config.cache_max_age_minutes);
        let t0 = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();

        cache.upsert_at(vec![token("grad", 0, 15_000.0, 0.0, false)], t0);
        let observed = cache.upsert_at(
            vec![token("grad", 0, 15_000.0, 0.0, false)],
            t0 + Duration::minutes(10),
        );
        assert_eq!(observed[0].age_minutes, 10);
        let buckets = classify(&observed, &config);
        assert_eq!(mints(&buckets.migrating), vec!["grad"]);
        assert!(buckets.migrated.is_empty());

        let observed = cache.upsert_at(
            vec![token("grad", 0, 15_000.0, 6_000.0, true)],
            t0 + Duration::minutes(11),
        );
        let buckets = classify(&observed, &config);
        assert!(buckets.migrating.is_empty());
        assert_eq!(mints(&buckets.migrated), vec!["grad"]);
    }
}
