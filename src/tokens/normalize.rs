/// Entity normalization: upstream pool/pair payloads -> `TokenRecord`
///
/// GeckoTerminal pages carry their base tokens and dexes in an `included`
/// side table; `IncludedIndex` is built once per page and relationships are
/// resolved through it by `"{type}:{id}"`.
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;
use std::collections::HashMap;

use crate::apis::dexscreener::types::{DexScreenerPair, DexScreenerTxnPeriod};
use crate::apis::geckoterminal::types::{
    GeckoTerminalIncluded, GeckoTerminalPoolData, GeckoTerminalPoolsPage, GeckoTerminalRelationship,
    GeckoTerminalTxnCounts,
};
use crate::tokens::types::{DexScreenerMetrics, GeckoMetrics, SocialLinks, TokenRecord, TrendingToken};

/// Venue substrings that mark an established AMM
const REAL_DEX_MARKERS: [&str; 4] = ["raydium", "orca", "meteora", "whirlpool"];

// ============================================================================
// PERMISSIVE NUMERICS
// ============================================================================

/// Finite float from a JSON number or numeric string; anything else is `0.0`
pub fn parse_num(value: Option<&Value>) -> f64 {
    let parsed = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite()).unwrap_or(0.0)
}

/// Zero means "not reported" for per-source metrics
pub fn non_zero(value: f64) -> Option<f64> {
    if value == 0.0 {
        None
    } else {
        Some(value)
    }
}

fn count(value: Option<&Value>) -> u64 {
    let n = parse_num(value);
    if n > 0.0 {
        n as u64
    } else {
        0
    }
}

fn gecko_txns(counts: Option<&GeckoTerminalTxnCounts>) -> u64 {
    counts
        .map(|c| count(c.buys.as_ref()) + count(c.sells.as_ref()))
        .unwrap_or(0)
}

/// Sum only when both sides are reported
fn gecko_txns_strict(counts: Option<&GeckoTerminalTxnCounts>) -> Option<f64> {
    let c = counts?;
    let buys = c.buys.as_ref().filter(|v| !v.is_null())?;
    let sells = c.sells.as_ref().filter(|v| !v.is_null())?;
    non_zero(parse_num(Some(buys)) + parse_num(Some(sells)))
}

fn dex_txns(period: Option<&DexScreenerTxnPeriod>) -> u64 {
    period
        .map(|p| count(p.buys.as_ref()) + count(p.sells.as_ref()))
        .unwrap_or(0)
}

// ============================================================================
// VENUE CLASSIFICATION
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VenueClass {
    pub is_real_dex: bool,
    pub is_pump_fun: bool,
}

/// Case-insensitive substring classification of a venue name
pub fn classify_venue(name: &str) -> VenueClass {
    let lower = name.to_lowercase();
    VenueClass {
        is_real_dex: REAL_DEX_MARKERS.iter().any(|m| lower.contains(m)),
        is_pump_fun: lower.contains("pump"),
    }
}

// ============================================================================
// INCLUDED SIDE TABLE
// ============================================================================

pub struct IncludedIndex<'a> {
    entities: HashMap<String, &'a GeckoTerminalIncluded>,
}

impl<'a> IncludedIndex<'a> {
    pub fn build(included: &'a [GeckoTerminalIncluded]) -> Self {
        Self {
            entities: included
                .iter()
                .map(|item| (item.composite_key(), item))
                .collect(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&'a GeckoTerminalIncluded> {
        self.entities.get(key).copied()
    }

    pub fn resolve(&self, relationship: Option<&GeckoTerminalRelationship>) -> Option<&'a GeckoTerminalIncluded> {
        let reference = relationship?.data.as_ref()?;
        self.get(&reference.composite_key())
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

// ============================================================================
// NORMALIZATION
// ============================================================================

/// Upstream payload accepted by the normalizer
pub enum RawPool<'a> {
    GeckoTerminal {
        pool: &'a GeckoTerminalPoolData,
        included: &'a IncludedIndex<'a>,
    },
    DexScreener(&'a DexScreenerPair),
}

/// Map one upstream payload to a record. `None` when no mint can be resolved.
pub fn normalize(raw: RawPool<'_>, now: DateTime<Utc>) -> Option<TokenRecord> {
    match raw {
        RawPool::GeckoTerminal { pool, included } => normalize_gecko_pool(pool, included, now),
        RawPool::DexScreener(pair) => normalize_dexscreener_pair(pair, now),
    }
}

fn age_minutes(created_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> i64 {
    created_at
        .map(|created| (now - created).num_minutes().max(0))
        .unwrap_or(0)
}

fn parse_timestamp(raw: Option<&str>) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw?)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn non_empty(value: Option<&String>) -> Option<String> {
    value.filter(|s| !s.is_empty()).cloned()
}

fn normalize_gecko_pool(
    pool: &GeckoTerminalPoolData,
    included: &IncludedIndex<'_>,
    now: DateTime<Utc>,
) -> Option<TokenRecord> {
    let attrs = &pool.attributes;
    let rel = &pool.relationships;

    let base = included.resolve(rel.base_token.as_ref()).map(|t| &t.attributes);
    let mint = non_empty(base.and_then(|b| b.address.as_ref()))?;

    let dex = included
        .resolve(rel.dex.as_ref())
        .and_then(|d| non_empty(d.attributes.name.as_ref()))
        .unwrap_or_else(|| "Unknown".to_string());
    let venue = classify_venue(&dex);

    let volume = attrs.volume_usd.as_ref();
    let change = attrs.price_change_percentage.as_ref();
    let created_at = parse_timestamp(attrs.pool_created_at.as_deref());

    let mut record = TokenRecord::new(&mint);
    if let Some(symbol) = non_empty(base.and_then(|b| b.symbol.as_ref())) {
        record.symbol = symbol;
    }
    if let Some(name) = non_empty(base.and_then(|b| b.name.as_ref())) {
        record.name = name;
    }
    record.logo_url = non_empty(base.and_then(|b| b.image_url.as_ref()));
    record.pool_id = pool.id.clone();
    record.pair_address = attrs.address.clone().unwrap_or_default();
    record.dex_id = dex.to_lowercase();
    record.dex = dex;
    record.is_real_dex = venue.is_real_dex;
    record.is_pump_fun = venue.is_pump_fun;
    record.created_at = created_at;
    record.age_minutes = age_minutes(created_at, now);
    record.price_usd = parse_num(attrs.base_token_price_usd.as_ref());
    record.market_cap_usd = parse_num(attrs.fdv_usd.as_ref());
    record.liquidity_usd = parse_num(attrs.reserve_in_usd.as_ref());
    record.volume_5m_usd = parse_num(volume.and_then(|v| v.m5.as_ref()));
    record.volume_1h_usd = parse_num(volume.and_then(|v| v.h1.as_ref()));
    record.volume_24h_usd = parse_num(volume.and_then(|v| v.h24.as_ref()));
    record.price_change_5m_pct = parse_num(change.and_then(|c| c.m5.as_ref()));
    record.price_change_1h_pct = parse_num(change.and_then(|c| c.h1.as_ref()));
    record.price_change_24h_pct = parse_num(change.and_then(|c| c.h24.as_ref()));
    record.tx_count_5m = gecko_txns(attrs.transactions.as_ref().and_then(|t| t.m5.as_ref()));

    Some(record)
}

fn normalize_dexscreener_pair(pair: &DexScreenerPair, now: DateTime<Utc>) -> Option<TokenRecord> {
    let base = pair.base_token.as_ref();
    let mint = non_empty(base.and_then(|b| b.address.as_ref()))?;

    let dex = non_empty(pair.dex_id.as_ref()).unwrap_or_else(|| "Unknown".to_string());
    let venue = classify_venue(&dex);
    let created_at = match parse_num(pair.pair_created_at.as_ref()) {
        ms if ms > 0.0 => Utc.timestamp_millis_opt(ms as i64).single(),
        _ => None,
    };

    let volume = pair.volume.as_ref();
    let change = pair.price_change.as_ref();
    let market_cap = match parse_num(pair.market_cap.as_ref()) {
        mc if mc > 0.0 => mc,
        _ => parse_num(pair.fdv.as_ref()),
    };

    let mut record = TokenRecord::new(&mint);
    if let Some(symbol) = non_empty(base.and_then(|b| b.symbol.as_ref())) {
        record.symbol = symbol;
    }
    if let Some(name) = non_empty(base.and_then(|b| b.name.as_ref())) {
        record.name = name;
    }
    record.logo_url = pair.info.as_ref().and_then(|i| non_empty(i.image_url.as_ref()));
    record.pair_address = pair.pair_address.clone().unwrap_or_default();
    record.pool_id = record.pair_address.clone();
    record.dex_id = dex.to_lowercase();
    record.dex = dex;
    record.is_real_dex = venue.is_real_dex;
    record.is_pump_fun = venue.is_pump_fun;
    record.created_at = created_at;
    record.age_minutes = age_minutes(created_at, now);
    record.price_usd = parse_num(pair.price_usd.as_ref());
    record.market_cap_usd = market_cap;
    record.liquidity_usd = parse_num(pair.liquidity.as_ref().and_then(|l| l.usd.as_ref()));
    record.volume_5m_usd = parse_num(volume.and_then(|v| v.m5.as_ref()));
    record.volume_1h_usd = parse_num(volume.and_then(|v| v.h1.as_ref()));
    record.volume_24h_usd = parse_num(volume.and_then(|v| v.h24.as_ref()));
    record.price_change_5m_pct = parse_num(change.and_then(|c| c.m5.as_ref()));
    record.price_change_1h_pct = parse_num(change.and_then(|c| c.h1.as_ref()));
    record.price_change_24h_pct = parse_num(change.and_then(|c| c.h24.as_ref()));
    record.tx_count_5m = dex_txns(pair.txns.as_ref().and_then(|t| t.m5.as_ref()));

    let links = social_links_from_pair(pair);
    record.apply_socials(&links);

    Some(record)
}

/// New-pools feed: pools without `pool_created_at` are skipped
pub fn normalize_new_pools_page(page: &GeckoTerminalPoolsPage, now: DateTime<Utc>) -> Vec<TokenRecord> {
    let included = IncludedIndex::build(&page.included);

    page.data
        .iter()
        .filter(|pool| {
            pool.attributes
                .pool_created_at
                .as_deref()
                .map(|s| !s.is_empty())
                .unwrap_or(false)
        })
        .filter_map(|pool| {
            normalize(
                RawPool::GeckoTerminal {
                    pool,
                    included: &included,
                },
                now,
            )
        })
        .collect()
}

/// Trending feed: pools whose base token cannot be resolved are skipped
pub fn normalize_trending_page(page: &GeckoTerminalPoolsPage, now: DateTime<Utc>) -> Vec<TrendingToken> {
    let included = IncludedIndex::build(&page.included);

    page.data
        .iter()
        .filter_map(|pool| {
            let record = normalize(
                RawPool::GeckoTerminal {
                    pool,
                    included: &included,
                },
                now,
            )?;
            let metrics = gecko_metrics(pool, &included);
            Some(TrendingToken::new(record, metrics))
        })
        .collect()
}

pub fn gecko_metrics(pool: &GeckoTerminalPoolData, included: &IncludedIndex<'_>) -> GeckoMetrics {
    let attrs = &pool.attributes;
    let volume = attrs.volume_usd.as_ref();
    let txns = attrs.transactions.as_ref();

    GeckoMetrics {
        pool_id: pool.id.clone(),
        pool_address: attrs.address.clone(),
        dex_name: included
            .resolve(pool.relationships.dex.as_ref())
            .and_then(|d| d.attributes.name.clone()),
        liquidity_usd: non_zero(parse_num(attrs.reserve_in_usd.as_ref())),
        volume_5m_usd: non_zero(parse_num(volume.and_then(|v| v.m5.as_ref()))),
        volume_1h_usd: non_zero(parse_num(volume.and_then(|v| v.h1.as_ref()))),
        volume_24h_usd: non_zero(parse_num(volume.and_then(|v| v.h24.as_ref()))),
        price_usd: non_zero(parse_num(attrs.base_token_price_usd.as_ref())),
        txns_5m: gecko_txns_strict(txns.and_then(|t| t.m5.as_ref())),
        txns_1h: gecko_txns_strict(txns.and_then(|t| t.h1.as_ref())),
        txns_24h: gecko_txns_strict(txns.and_then(|t| t.h24.as_ref())),
        pool_created_at: attrs.pool_created_at.clone(),
    }
}

/// Cross-validation snapshot of a DexScreener pair
pub fn dexscreener_metrics(pair: &DexScreenerPair) -> DexScreenerMetrics {
    let volume = pair.volume.as_ref();
    let change = pair.price_change.as_ref();

    DexScreenerMetrics {
        pair_address: pair.pair_address.clone(),
        dex_id: pair.dex_id.clone(),
        liquidity_usd: non_zero(parse_num(pair.liquidity.as_ref().and_then(|l| l.usd.as_ref()))),
        volume_5m_usd: non_zero(parse_num(volume.and_then(|v| v.m5.as_ref()))),
        volume_1h_usd: non_zero(parse_num(volume.and_then(|v| v.h1.as_ref()))),
        volume_24h_usd: non_zero(parse_num(volume.and_then(|v| v.h24.as_ref()))),
        price_change_5m_pct: non_zero(parse_num(change.and_then(|c| c.m5.as_ref()))),
        price_change_1h_pct: non_zero(parse_num(change.and_then(|c| c.h1.as_ref()))),
        price_change_24h_pct: non_zero(parse_num(change.and_then(|c| c.h24.as_ref()))),
        fdv: non_zero(parse_num(pair.fdv.as_ref())),
        market_cap: non_zero(parse_num(pair.market_cap.as_ref())),
        boosts_active: count(pair.boosts.as_ref().and_then(|b| b.active.as_ref())),
        txns_5m: dex_txns(pair.txns.as_ref().and_then(|t| t.m5.as_ref())) as f64,
    }
}

/// First twitter social and first website with a URL
pub fn social_links_from_pair(pair: &DexScreenerPair) -> SocialLinks {
    let Some(info) = pair.info.as_ref() else {
        return SocialLinks::none();
    };

    let twitter = info
        .socials
        .iter()
        .flatten()
        .find(|s| s.social_type.as_deref() == Some("twitter"))
        .and_then(|s| non_empty(s.url.as_ref()));
    let website = info
        .websites
        .iter()
        .flatten()
        .find_map(|w| non_empty(w.url.as_ref()));

    SocialLinks::new(twitter, website)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apis::dexscreener::types::DexScreenerPairsResponse;
    use serde_json::json;

    fn page(value: Value) -> GeckoTerminalPoolsPage {
        serde_json::from_value(value).unwrap()
    }

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2025-01-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn new_pools_fixture() -> GeckoTerminalPoolsPage {
        page(json!({
            "data": [
                {
                    "id": "solana_PoolA",
                    "type": "pool",
                    "attributes": {
                        "address": "PoolA",
                        "pool_created_at": "2025-01-01T11:58:30Z",
                        "base_token_price_usd": "0.0012",
                        "fdv_usd": "25000.5",
                        "reserve_in_usd": "8000",
                        "volume_usd": {"m5": "1500", "h1": "4000", "h24": null},
                        "price_change_percentage": {"m5": "12.5", "h1": "-3"},
                        "transactions": {"m5": {"buys": 10, "sells": 4}}
                    },
                    "relationships": {
                        "base_token": {"data": {"id": "solana_MintA", "type": "token"}},
                        "dex": {"data": {"id": "pump-fun", "type": "dex"}}
                    }
                },
                {
                    "id": "solana_PoolB",
                    "type": "pool",
                    "attributes": {"address": "PoolB"},
                    "relationships": {
                        "base_token": {"data": {"id": "solana_MintB", "type": "token"}}
                    }
                },
                {
                    "id": "solana_PoolC",
                    "type": "pool",
                    "attributes": {"address": "PoolC", "pool_created_at": "2025-01-01T10:00:00Z"},
                    "relationships": {
                        "base_token": {"data": {"id": "solana_MintC", "type": "token"}},
                        "dex": {"data": {"id": "raydium", "type": "dex"}}
                    }
                }
            ],
            "included": [
                {"id": "solana_MintA", "type": "token", "attributes": {"address": "MintA", "symbol": "NEB", "name": "Nebula", "image_url": "https://img/a.png"}},
                {"id": "solana_MintB", "type": "token", "attributes": {"address": "MintB"}},
                {"id": "solana_MintC", "type": "token", "attributes": {"address": "MintC"}},
                {"id": "pump-fun", "type": "dex", "attributes": {"name": "Pump.fun"}},
                {"id": "raydium", "type": "dex", "attributes": {"name": "Raydium"}},
                {"id": "solana_MintA", "type": "dex", "attributes": {"name": "Decoy"}}
            ]
        }))
    }

    #[test]
    fn parse_num_is_permissive() {
        assert_eq!(parse_num(Some(&json!("12.5"))), 12.5);
        assert_eq!(parse_num(Some(&json!(7))), 7.0);
        assert_eq!(parse_num(Some(&json!("abc"))), 0.0);
        assert_eq!(parse_num(Some(&json!(null))), 0.0);
        assert_eq!(parse_num(Some(&json!("NaN"))), 0.0);
        assert_eq!(parse_num(Some(&json!("inf"))), 0.0);
        assert_eq!(parse_num(None), 0.0);
    }

    #[test]
    fn venue_classification() {
        let pump = classify_venue("Pump.fun");
        assert!(pump.is_pump_fun && !pump.is_real_dex);

        for name in ["Raydium CLMM", "ORCA", "Meteora DLMM", "whirlpool"] {
            assert!(classify_venue(name).is_real_dex, "{}", name);
        }
        assert!(!classify_venue("Unknown").is_real_dex);
    }

    #[test]
    fn composite_key_resolves_by_type_and_id() {
        let page = new_pools_fixture();
        let index = IncludedIndex::build(&page.included);

        let token = index.get("token:solana_MintA").unwrap();
        assert_eq!(token.attributes.symbol.as_deref(), Some("NEB"));
        // same id, different type
        let decoy = index.get("dex:solana_MintA").unwrap();
        assert_eq!(decoy.attributes.name.as_deref(), Some("Decoy"));
        assert!(index.get("token:pump-fun").is_none());
    }

    #[test]
    fn new_pools_page_normalization() {
        let records = normalize_new_pools_page(&new_pools_fixture(), now());

        // PoolB has no creation time
        assert_eq!(records.len(), 2);

        let a = &records[0];
        assert_eq!(a.mint, "MintA");
        assert_eq!(a.symbol, "NEB");
        assert_eq!(a.pool_id, "solana_PoolA");
        assert_eq!(a.pair_address, "PoolA");
        assert_eq!(a.dex, "Pump.fun");
        assert_eq!(a.dex_id, "pump.fun");
        assert!(a.is_pump_fun);
        assert_eq!(a.age_minutes, 1);
        assert_eq!(a.market_cap_usd, 25000.5);
        assert_eq!(a.liquidity_usd, 8000.0);
        assert_eq!(a.volume_5m_usd, 1500.0);
        assert_eq!(a.volume_24h_usd, 0.0);
        assert_eq!(a.price_change_5m_pct, 12.5);
        assert_eq!(a.price_change_1h_pct, -3.0);
        assert_eq!(a.tx_count_5m, 14);
        assert_eq!(a.logo_url.as_deref(), Some("https://img/a.png"));

        let c = &records[1];
        assert_eq!(c.symbol, "UNKNOWN");
        assert_eq!(c.name, "Unknown Token");
        assert!(c.is_real_dex);
        assert_eq!(c.age_minutes, 120);
    }

    #[test]
    fn missing_dex_defaults_to_unknown() {
        let p = page(json!({
            "data": [{
                "id": "solana_P",
                "attributes": {"pool_created_at": "2025-01-01T12:00:00Z"},
                "relationships": {"base_token": {"data": {"id": "t", "type": "token"}}}
            }],
            "included": [{"id": "t", "type": "token", "attributes": {"address": "M"}}]
        }));
        let records = normalize_new_pools_page(&p, now());
        assert_eq!(records[0].dex, "Unknown");
        assert!(!records[0].is_real_dex);
    }

    #[test]
    fn trending_metrics_treat_zero_as_absent() {
        let p = page(json!({
            "data": [
                {
                    "id": "solana_T1",
                    "attributes": {
                        "reserve_in_usd": "0",
                        "volume_usd": {"m5": "10", "h1": "0", "h24": "5000"},
                        "transactions": {"m5": {"buys": 3, "sells": 2}, "h1": {"buys": 1}}
                    },
                    "relationships": {"base_token": {"data": {"id": "t1", "type": "token"}}}
                },
                {
                    "id": "solana_T2",
                    "attributes": {},
                    "relationships": {"base_token": {"data": {"id": "missing", "type": "token"}}}
                }
            ],
            "included": [{"id": "t1", "type": "token", "attributes": {"address": "Mint1"}}]
        }));

        let tokens = normalize_trending_page(&p, now());
        assert_eq!(tokens.len(), 1);

        let g = &tokens[0].gecko;
        assert_eq!(g.liquidity_usd, None);
        assert_eq!(g.volume_5m_usd, Some(10.0));
        assert_eq!(g.volume_1h_usd, None);
        assert_eq!(g.txns_5m, Some(5.0));
        assert_eq!(g.txns_1h, None);
        assert!(!tokens[0].is_dexscreener_validated());
    }

    #[test]
    fn dexscreener_pair_normalization_and_socials() {
        let pair: DexScreenerPair = serde_json::from_value(json!({
            "chainId": "solana",
            "dexId": "raydium",
            "pairAddress": "PairX",
            "baseToken": {"address": "MintX", "name": "Xeno", "symbol": "XEN"},
            "priceUsd": "0.5",
            "txns": {"m5": {"buys": 2, "sells": 1}},
            "volume": {"h24": 12000, "h1": 0},
            "priceChange": {"h24": -4.2},
            "liquidity": {"usd": 9000.5},
            "fdv": 50000,
            "info": {
                "socials": [{"type": "telegram", "url": "https://t.me/x"}, {"type": "twitter", "url": "https://x.com/xeno"}],
                "websites": [{"label": "Website"}, {"url": "https://xeno.io"}]
            },
            "boosts": {"active": 2}
        }))
        .unwrap();

        let record = normalize(RawPool::DexScreener(&pair), now()).unwrap();
        assert_eq!(record.mint, "MintX");
        assert!(record.is_real_dex);
        assert_eq!(record.market_cap_usd, 50000.0);
        assert_eq!(record.tx_count_5m, 3);
        assert!(record.has_socials);
        assert_eq!(record.twitter.as_deref(), Some("https://x.com/xeno"));
        assert_eq!(record.website.as_deref(), Some("https://xeno.io"));

        let metrics = dexscreener_metrics(&pair);
        assert_eq!(metrics.volume_24h_usd, Some(12000.0));
        assert_eq!(metrics.volume_1h_usd, None);
        assert_eq!(metrics.boosts_active, 2);
        assert_eq!(metrics.txns_5m, 3.0);
    }

    #[test]
    fn pair_without_base_address_is_dropped() {
        let pair = DexScreenerPair::default();
        assert!(normalize(RawPool::DexScreener(&pair), now()).is_none());
        assert_eq!(social_links_from_pair(&pair), SocialLinks::none());
    }

    #[test]
    fn malformed_pool_is_skipped_without_losing_the_page() {
        let p = page(json!({
            "data": [
                {
                    "type": "pool",
                    "attributes": {"address": "NoId", "pool_created_at": "2025-01-01T11:59:00Z"},
                    "relationships": {"base_token": {"data": {"id": "t_bad", "type": "token"}}}
                },
                {
                    "id": "solana_Good",
                    "type": "pool",
                    "attributes": {"address": "Good", "pool_created_at": "2025-01-01T11:59:00Z"},
                    "relationships": {"base_token": {"data": {"id": "t_good", "type": "token"}}}
                },
                {
                    "id": "solana_BadRef",
                    "relationships": {"base_token": {"data": {"type": "token"}}}
                }
            ],
            "included": [
                {"type": "token", "attributes": {"address": "Orphan"}},
                {"id": "t_bad", "type": "token", "attributes": {"address": "MintBad"}},
                {"id": "t_good", "type": "token", "attributes": {"address": "MintGood", "symbol": "OK"}}
            ]
        }));

        assert_eq!(p.data.len(), 1);
        assert_eq!(p.included.len(), 2);

        let records = normalize_new_pools_page(&p, now());
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].mint, "MintGood");
        assert_eq!(records[0].symbol, "OK");
    }

    #[test]
    fn odd_pair_fields_parse_and_broken_pairs_are_skipped() {
        let response: DexScreenerPairsResponse = serde_json::from_value(json!({
            "schemaVersion": "1.0.0",
            "pairs": [
                {
                    "dexId": "raydium",
                    "baseToken": {"address": "MintA", "symbol": "AAA"},
                    "pairCreatedAt": "1735732740000",
                    "boosts": {"active": 1.5}
                },
                {"dexId": "orca", "baseToken": "not-an-object"},
                {
                    "dexId": "orca",
                    "baseToken": {"address": "MintB", "symbol": "BBB"},
                    "pairCreatedAt": 1735732680000_i64,
                    "volume": {"h24": 500}
                }
            ]
        }))
        .unwrap();

        let pairs = response.into_pairs();
        let mints: Vec<_> = pairs.iter().filter_map(|p| p.base_address()).collect();
        assert_eq!(mints, vec!["MintA", "MintB"]);

        assert_eq!(dexscreener_metrics(&pairs[0]).boosts_active, 1);
        let a = normalize(RawPool::DexScreener(&pairs[0]), now()).unwrap();
        assert_eq!(a.age_minutes, 1);
        let b = normalize(RawPool::DexScreener(&pairs[1]), now()).unwrap();
        assert_eq!(b.age_minutes, 2);
    }

    #[test]
    fn null_pairs_mean_no_match() {
        let response: DexScreenerPairsResponse =
            serde_json::from_value(json!({"schemaVersion": "1.0.0", "pairs": null})).unwrap();
        assert!(response.into_pairs().is_empty());
    }
}
