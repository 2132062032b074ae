/// Core types for discovered tokens
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Data source identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    GeckoTerminal,
    DexScreener,
    Jupiter,
}

impl DataSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataSource::GeckoTerminal => "geckoterminal",
            DataSource::DexScreener => "dexscreener",
            DataSource::Jupiter => "jupiter",
        }
    }
}

impl std::fmt::Display for DataSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trending tier derived from the score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Tier {
    S,
    A,
    B,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::S => "S",
            Tier::A => "A",
            Tier::B => "B",
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// TOKEN RECORD - one observation of a token on a venue
// ============================================================================

/// Normalized token observation shared by every feed
///
/// Numeric fields are never null: anything missing or unparsable upstream is
/// stored as `0.0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenRecord {
    pub mint: String,
    pub symbol: String,
    pub name: String,
    pub logo_url: Option<String>,

    pub pool_id: String,
    pub pair_address: String,
    /// Venue display name ("Raydium", "Pump.fun", ...)
    pub dex: String,
    /// Lowercased venue name used for classification
    pub dex_id: String,
    pub is_real_dex: bool,
    pub is_pump_fun: bool,

    pub created_at: Option<DateTime<Utc>>,
    pub age_minutes: i64,

    pub price_usd: f64,
    pub market_cap_usd: f64,
    pub liquidity_usd: f64,
    pub volume_5m_usd: f64,
    pub volume_1h_usd: f64,
    pub volume_24h_usd: f64,
    pub price_change_5m_pct: f64,
    pub price_change_1h_pct: f64,
    pub price_change_24h_pct: f64,
    pub tx_count_5m: u64,

    pub has_socials: bool,
    pub twitter: Option<String>,
    pub website: Option<String>,

    pub score: Option<f64>,
    pub tier: Option<Tier>,
}

impl TokenRecord {
    /// Empty record for `mint`, every metric zeroed
    pub fn new(mint: &str) -> Self {
        Self {
            mint: mint.to_string(),
            symbol: "UNKNOWN".to_string(),
            name: "Unknown Token".to_string(),
            logo_url: None,
            pool_id: String::new(),
            pair_address: String::new(),
            dex: "Unknown".to_string(),
            dex_id: "unknown".to_string(),
            is_real_dex: false,
            is_pump_fun: false,
            created_at: None,
            age_minutes: 0,
            price_usd: 0.0,
            market_cap_usd: 0.0,
            liquidity_usd: 0.0,
            volume_5m_usd: 0.0,
            volume_1h_usd: 0.0,
            volume_24h_usd: 0.0,
            price_change_5m_pct: 0.0,
            price_change_1h_pct: 0.0,
            price_change_24h_pct: 0.0,
            tx_count_5m: 0,
            has_socials: false,
            twitter: None,
            website: None,
            score: None,
            tier: None,
        }
    }

    pub fn apply_socials(&mut self, links: &SocialLinks) {
        self.has_socials = links.has_socials;
        self.twitter = links.twitter.clone();
        self.website = links.website.clone();
    }
}

/// Social links found for a mint
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SocialLinks {
    pub twitter: Option<String>,
    pub website: Option<String>,
    pub has_socials: bool,
}

impl SocialLinks {
    pub fn new(twitter: Option<String>, website: Option<String>) -> Self {
        let has_socials = twitter.is_some() || website.is_some();
        Self {
            twitter,
            website,
            has_socials,
        }
    }

    pub fn none() -> Self {
        Self::default()
    }
}

// ============================================================================
// TRENDING - per-source metric snapshots
// ============================================================================

/// GeckoTerminal trending pool metrics. Zero values are stored as `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeckoMetrics {
    pub pool_id: String,
    pub pool_address: Option<String>,
    pub dex_name: Option<String>,
    pub liquidity_usd: Option<f64>,
    pub volume_5m_usd: Option<f64>,
    pub volume_1h_usd: Option<f64>,
    pub volume_24h_usd: Option<f64>,
    pub price_usd: Option<f64>,
    pub txns_5m: Option<f64>,
    pub txns_1h: Option<f64>,
    pub txns_24h: Option<f64>,
    pub pool_created_at: Option<String>,
}

/// DexScreener pair metrics attached during cross-validation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DexScreenerMetrics {
    pub pair_address: Option<String>,
    pub dex_id: Option<String>,
    pub liquidity_usd: Option<f64>,
    pub volume_5m_usd: Option<f64>,
    pub volume_1h_usd: Option<f64>,
    pub volume_24h_usd: Option<f64>,
    pub price_change_5m_pct: Option<f64>,
    pub price_change_1h_pct: Option<f64>,
    pub price_change_24h_pct: Option<f64>,
    pub fdv: Option<f64>,
    pub market_cap: Option<f64>,
    pub boosts_active: u64,
    pub txns_5m: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendingToken {
    pub token: TokenRecord,
    pub gecko: GeckoMetrics,
    /// Present once DexScreener confirmed a pair for the mint
    pub dexscreener: Option<DexScreenerMetrics>,
    pub jupiter_price: Option<f64>,
    pub score: f64,
    pub tier: Tier,
    pub last_updated_at: Option<DateTime<Utc>>,
}

impl TrendingToken {
    pub fn new(token: TokenRecord, gecko: GeckoMetrics) -> Self {
        Self {
            token,
            gecko,
            dexscreener: None,
            jupiter_price: None,
            score: 0.0,
            tier: Tier::B,
            last_updated_at: None,
        }
    }

    pub fn mint(&self) -> &str {
        &self.token.mint
    }

    pub fn is_dexscreener_validated(&self) -> bool {
        self.dexscreener.is_some()
    }
}

// ============================================================================
// SEARCH / SELECTION
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub source: DataSource,
    pub name: String,
    pub symbol: String,
    pub address: String,
    pub logo: Option<String>,
    pub verified: bool,
    pub price: Option<f64>,
    pub market_cap: Option<f64>,
    pub volume_24h: Option<f64>,
    pub liquidity: Option<f64>,
    pub price_change_24h: Option<f64>,
    pub pair_address: Option<String>,
}

/// Hand-off record for a coin detail view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectedCoin {
    pub mint: String,
    pub symbol: String,
    pub name: String,
    /// "{SYMBOL}/SOL"
    pub pair: String,
    #[serde(rename = "pairAddr")]
    pub pair_address: String,
    pub price: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn social_links_flag_follows_links() {
        assert!(!SocialLinks::new(None, None).has_socials);
        assert!(SocialLinks::new(Some("https://x.com/nebula".into()), None).has_socials);
        assert!(SocialLinks::new(None, Some("https://nebula.io".into())).has_socials);
    }

    #[test]
    fn tier_ordering_and_labels() {
        assert!(Tier::S < Tier::A);
        assert_eq!(Tier::A.to_string(), "A");
        assert_eq!(
            serde_json::to_string(&DataSource::GeckoTerminal).unwrap(),
            "\"geckoterminal\""
        );
    }
}
