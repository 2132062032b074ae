/// Trending score and tiering
///
/// Score formula (log-scaled volumes, momentum, activity, validation):
///
/// ```text
/// 3·log10(vol5m+1) + 2·log10(vol1h+1) + log10(vol24h+1) + log10(liq+1)
///   + pc5m/5 + pc1h/10 + pc24h/20 + txns5m/5
///   + 3 (DexScreener validated) - 2 (active boosts)
/// ```
///
/// Volumes and transaction counts prefer GeckoTerminal and fall back to
/// DexScreener, liquidity takes the larger of the two, price changes come
/// from DexScreener only.
use chrono::{DateTime, Utc};

use crate::config::TrendingConfig;
use crate::tokens::types::{Tier, TrendingToken};

pub const TIER_S_MIN_SCORE: f64 = 20.0;
pub const TIER_A_MIN_SCORE: f64 = 10.0;

const VALIDATED_BONUS: f64 = 3.0;
const BOOST_PENALTY: f64 = -2.0;

/// Flattened metrics the score is computed from
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScoreInputs {
    pub volume_5m: f64,
    pub volume_1h: f64,
    pub volume_24h: f64,
    pub liquidity: f64,
    pub price_change_5m: f64,
    pub price_change_1h: f64,
    pub price_change_24h: f64,
    pub txns_5m: f64,
    pub validated: bool,
    pub boosted: bool,
}

impl ScoreInputs {
    pub fn from_token(token: &TrendingToken) -> Self {
        let gt = &token.gecko;
        let ds = token.dexscreener.as_ref();

        let ds_liquidity = ds.and_then(|d| d.liquidity_usd).unwrap_or(0.0);

        Self {
            volume_5m: gt
                .volume_5m_usd
                .or_else(|| ds.and_then(|d| d.volume_5m_usd))
                .unwrap_or(0.0),
            volume_1h: gt
                .volume_1h_usd
                .or_else(|| ds.and_then(|d| d.volume_1h_usd))
                .unwrap_or(0.0),
            volume_24h: gt
                .volume_24h_usd
                .or_else(|| ds.and_then(|d| d.volume_24h_usd))
                .unwrap_or(0.0),
            liquidity: gt.liquidity_usd.unwrap_or(0.0).max(ds_liquidity),
            price_change_5m: ds.and_then(|d| d.price_change_5m_pct).unwrap_or(0.0),
            price_change_1h: ds.and_then(|d| d.price_change_1h_pct).unwrap_or(0.0),
            price_change_24h: ds.and_then(|d| d.price_change_24h_pct).unwrap_or(0.0),
            txns_5m: gt
                .txns_5m
                .or_else(|| ds.map(|d| d.txns_5m))
                .unwrap_or(0.0),
            validated: token.is_dexscreener_validated(),
            boosted: ds.map(|d| d.boosts_active > 0).unwrap_or(false),
        }
    }
}

/// Hard filters on the larger value reported by either source
pub fn passes_hard_filter(token: &TrendingToken, config: &TrendingConfig) -> bool {
    let gt = &token.gecko;
    let ds = token.dexscreener.as_ref();

    let best = |g: Option<f64>, d: Option<f64>| g.unwrap_or(0.0).max(d.unwrap_or(0.0));

    let liquidity = best(gt.liquidity_usd, ds.and_then(|d| d.liquidity_usd));
    let volume_1h = best(gt.volume_1h_usd, ds.and_then(|d| d.volume_1h_usd));
    let volume_24h = best(gt.volume_24h_usd, ds.and_then(|d| d.volume_24h_usd));

    if liquidity < config.min_liquidity_usd {
        return false;
    }

    volume_1h >= config.min_volume_1h_usd || volume_24h >= config.min_volume_24h_usd
}

/// Raw score, floored at zero
pub fn compute_score(inputs: &ScoreInputs) -> f64 {
    let volume_short_term = (inputs.volume_5m + 1.0).log10() * 3.0 + (inputs.volume_1h + 1.0).log10() * 2.0;
    let volume_24h = (inputs.volume_24h + 1.0).log10();
    let liquidity = (inputs.liquidity + 1.0).log10();
    let momentum = inputs.price_change_5m / 5.0 + inputs.price_change_1h / 10.0 + inputs.price_change_24h / 20.0;
    let activity = inputs.txns_5m / 5.0;
    let validation = if inputs.validated { VALIDATED_BONUS } else { 0.0 };
    let boost = if inputs.boosted { BOOST_PENALTY } else { 0.0 };

    let score = volume_short_term + volume_24h + liquidity + momentum + activity + validation + boost;

    // NaN only comes from degenerate upstream input (e.g. negative volume)
    if score.is_nan() {
        0.0
    } else {
        score.max(0.0)
    }
}

pub fn tier_for(score: f64) -> Tier {
    if score >= TIER_S_MIN_SCORE {
        Tier::S
    } else if score >= TIER_A_MIN_SCORE {
        Tier::A
    } else {
        Tier::B
    }
}

/// Apply hard filters, score and tier survivors, sort by score descending and
/// keep the top `max_tokens_stored`
pub fn filter_and_score(tokens: Vec<TrendingToken>, config: &TrendingConfig, now: DateTime<Utc>) -> Vec<TrendingToken> {
    let mut scored: Vec<TrendingToken> = tokens
        .into_iter()
        .filter(|t| passes_hard_filter(t, config))
        .map(|mut t| {
            let score = compute_score(&ScoreInputs::from_token(&t));
            let tier = tier_for(score);
            t.score = score;
            t.tier = tier;
            t.token.score = Some(score);
            t.token.tier = Some(tier);
            t.last_updated_at = Some(now);
            t
        })
        .collect();

    scored.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| a.mint().cmp(b.mint()))
    });
    scored.truncate(config.max_tokens_stored);
    scored
}

/// Tokens per tier, in S/A/B order
pub fn tier_counts(tokens: &[TrendingToken]) -> (usize, usize, usize) {
    tokens.iter().fold((0, 0, 0), |(s, a, b), t| match t.tier {
        Tier::S => (s + 1, a, b),
        Tier::A => (s, a + 1, b),
        Tier::B => (s, a, b + 1),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokens::types::{DexScreenerMetrics, GeckoMetrics, TokenRecord};

    fn trending(mint: &str, liq: f64, vol1h: f64, vol24h: f64) -> TrendingToken {
        let gecko = GeckoMetrics {
            pool_id: format!("solana_{}", mint),
            liquidity_usd: Some(liq).filter(|v| *v != 0.0),
            volume_1h_usd: Some(vol1h).filter(|v| *v != 0.0),
            volume_24h_usd: Some(vol24h).filter(|v| *v != 0.0),
            ..GeckoMetrics::default()
        };
        TrendingToken::new(TokenRecord::new(mint), gecko)
    }

    #[test]
    fn liquidity_boundary_is_inclusive() {
        let config = TrendingConfig::default();
        assert!(!passes_hard_filter(&trending("m", 1_999.99, 5_000.0, 0.0), &config));
        assert!(passes_hard_filter(&trending("m", 2_000.0, 5_000.0, 0.0), &config));
    }

    #[test]
    fn either_volume_window_passes() {
        let config = TrendingConfig::default();
        assert!(passes_hard_filter(&trending("m", 5_000.0, 2_000.0, 0.0), &config));
        assert!(passes_hard_filter(&trending("m", 5_000.0, 0.0, 10_000.0), &config));
        assert!(!passes_hard_filter(&trending("m", 5_000.0, 1_999.0, 9_999.0), &config));
    }

    #[test]
    fn hard_filter_uses_best_source() {
        let config = TrendingConfig::default();
        let mut token = trending("m", 500.0, 100.0, 0.0);
        assert!(!passes_hard_filter(&token, &config));

        token.dexscreener = Some(DexScreenerMetrics {
            liquidity_usd: Some(3_000.0),
            volume_24h_usd: Some(12_000.0),
            ..DexScreenerMetrics::default()
        });
        assert!(passes_hard_filter(&token, &config));
    }

    #[test]
    fn tier_boundaries() {
        assert_eq!(tier_for(19.99), Tier::A);
        assert_eq!(tier_for(20.0), Tier::S);
        assert_eq!(tier_for(9.99), Tier::B);
        assert_eq!(tier_for(10.0), Tier::A);
        assert_eq!(tier_for(0.0), Tier::B);
    }

    #[test]
    fn score_is_monotonic_in_volume_and_liquidity() {
        let base = ScoreInputs {
            volume_5m: 1_000.0,
            volume_1h: 10_000.0,
            volume_24h: 100_000.0,
            liquidity: 20_000.0,
            ..ScoreInputs::default()
        };
        let base_score = compute_score(&base);

        for bumped in [
            ScoreInputs { volume_5m: 2_000.0, ..base },
            ScoreInputs { volume_1h: 20_000.0, ..base },
            ScoreInputs { volume_24h: 200_000.0, ..base },
            ScoreInputs { liquidity: 40_000.0, ..base },
            ScoreInputs { txns_5m: 10.0, ..base },
        ] {
            assert!(compute_score(&bumped) > base_score);
        }
    }

    #[test]
    fn validation_bonus_and_boost_penalty() {
        let base = ScoreInputs {
            volume_1h: 9_999.0,
            ..ScoreInputs::default()
        };
        let plain = compute_score(&base);

        let validated = compute_score(&ScoreInputs { validated: true, ..base });
        assert!((validated - plain - 3.0).abs() < 1e-9);

        let boosted = compute_score(&ScoreInputs { boosted: true, ..base });
        assert!((plain - boosted - 2.0).abs() < 1e-9);
    }

    #[test]
    fn score_never_negative() {
        let dumping = ScoreInputs {
            price_change_5m: -90.0,
            price_change_1h: -95.0,
            price_change_24h: -99.0,
            boosted: true,
            ..ScoreInputs::default()
        };
        assert_eq!(compute_score(&dumping), 0.0);
        assert_eq!(tier_for(compute_score(&dumping)), Tier::B);
    }

    #[test]
    fn known_score_value() {
        // 3*log10(1000) + 2*log10(10000) + log10(100000) + log10(10000)
        // + 10/5 + 0 + 0 + 5/5 + 3 = 9 + 8 + 5 + 4 + 2 + 1 + 3
        let inputs = ScoreInputs {
            volume_5m: 999.0,
            volume_1h: 9_999.0,
            volume_24h: 99_999.0,
            liquidity: 9_999.0,
            price_change_5m: 10.0,
            txns_5m: 5.0,
            validated: true,
            ..ScoreInputs::default()
        };
        let score = compute_score(&inputs);
        assert!((score - 32.0).abs() < 1e-9);
        assert_eq!(tier_for(score), Tier::S);
    }

    #[test]
    fn gecko_preferred_over_dexscreener_for_volume() {
        let mut token = trending("m", 5_000.0, 4_000.0, 0.0);
        token.gecko.txns_5m = None;
        token.dexscreener = Some(DexScreenerMetrics {
            volume_1h_usd: Some(99_000.0),
            volume_24h_usd: Some(50_000.0),
            liquidity_usd: Some(8_000.0),
            price_change_1h_pct: Some(12.0),
            txns_5m: 40.0,
            ..DexScreenerMetrics::default()
        });

        let inputs = ScoreInputs::from_token(&token);
        assert_eq!(inputs.volume_1h, 4_000.0);
        assert_eq!(inputs.volume_24h, 50_000.0);
        assert_eq!(inputs.liquidity, 8_000.0);
        assert_eq!(inputs.price_change_1h, 12.0);
        assert_eq!(inputs.txns_5m, 40.0);
        assert!(inputs.validated);
    }

    #[test]
    fn filter_and_score_sorts_and_caps() {
        let config = TrendingConfig {
            max_tokens_stored: 2,
            ..TrendingConfig::default()
        };
        let now = Utc::now();
        let tokens = vec![
            trending("low", 2_500.0, 2_500.0, 0.0),
            trending("filtered", 100.0, 90_000.0, 0.0),
            trending("high", 500_000.0, 400_000.0, 5_000_000.0),
            trending("mid", 50_000.0, 30_000.0, 200_000.0),
        ];

        let scored = filter_and_score(tokens, &config, now);
        let mints: Vec<&str> = scored.iter().map(|t| t.mint()).collect();
        assert_eq!(mints, vec!["high", "mid"]);
        assert!(scored[0].score > scored[1].score);
        assert_eq!(scored[0].token.tier, Some(scored[0].tier));
        assert_eq!(scored[0].last_updated_at, Some(now));
    }

    #[test]
    fn tier_counts_by_tier() {
        let mut a = trending("a", 0.0, 0.0, 0.0);
        a.tier = Tier::S;
        let b = trending("b", 0.0, 0.0, 0.0);
        let c = trending("c", 0.0, 0.0, 0.0);
        assert_eq!(tier_counts(&[a, b, c]), (1, 0, 2));
    }
}
