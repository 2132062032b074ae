/// DexScreener API response types
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::apis::lenient::skip_malformed;

/// `/latest/dex/tokens/{mints}` and `/latest/dex/search` response
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DexScreenerPairsResponse {
    #[serde(rename = "schemaVersion", default)]
    pub schema_version: Option<String>,
    /// `null` when nothing matched; undecodable pairs are dropped
    #[serde(default, deserialize_with = "skip_malformed")]
    pub pairs: Vec<DexScreenerPair>,
}

impl DexScreenerPairsResponse {
    pub fn into_pairs(self) -> Vec<DexScreenerPair> {
        self.pairs
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DexScreenerPair {
    pub chain_id: Option<String>,
    pub dex_id: Option<String>,
    pub url: Option<String>,
    pub pair_address: Option<String>,
    pub base_token: Option<DexScreenerToken>,
    pub quote_token: Option<DexScreenerToken>,
    pub price_usd: Option<Value>,
    pub txns: Option<DexScreenerTxns>,
    pub volume: Option<DexScreenerWindows>,
    pub price_change: Option<DexScreenerWindows>,
    pub liquidity: Option<DexScreenerLiquidity>,
    pub fdv: Option<Value>,
    pub market_cap: Option<Value>,
    /// Epoch milliseconds, number or numeric string
    pub pair_created_at: Option<Value>,
    pub info: Option<DexScreenerInfo>,
    pub boosts: Option<DexScreenerBoosts>,
}

impl DexScreenerPair {
    pub fn base_address(&self) -> Option<&str> {
        self.base_token.as_ref().and_then(|t| t.address.as_deref())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DexScreenerToken {
    pub address: Option<String>,
    pub name: Option<String>,
    pub symbol: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DexScreenerTxns {
    pub m5: Option<DexScreenerTxnPeriod>,
    pub h1: Option<DexScreenerTxnPeriod>,
    pub h6: Option<DexScreenerTxnPeriod>,
    pub h24: Option<DexScreenerTxnPeriod>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DexScreenerTxnPeriod {
    pub buys: Option<Value>,
    pub sells: Option<Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DexScreenerWindows {
    pub m5: Option<Value>,
    pub h1: Option<Value>,
    pub h6: Option<Value>,
    pub h24: Option<Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DexScreenerLiquidity {
    pub usd: Option<Value>,
    pub base: Option<Value>,
    pub quote: Option<Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DexScreenerInfo {
    pub image_url: Option<String>,
    pub websites: Option<Vec<DexScreenerWebsite>>,
    pub socials: Option<Vec<DexScreenerSocial>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DexScreenerWebsite {
    pub label: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DexScreenerSocial {
    #[serde(rename = "type")]
    pub social_type: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DexScreenerBoosts {
    pub active: Option<Value>,
}
