/// GeckoTerminal JSON:API response types
///
/// Numeric attributes arrive as strings (sometimes numbers, sometimes null)
/// and are kept as raw `serde_json::Value` until normalization. A pool or
/// included entity that fails to decode is dropped from its page.
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::apis::lenient::skip_malformed;

/// One page of `/new_pools`, `/trending_pools` or `/search/pools`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeckoTerminalPoolsPage {
    #[serde(default, deserialize_with = "skip_malformed")]
    pub data: Vec<GeckoTerminalPoolData>,
    /// Side table referenced by `relationships`, keyed by `(type, id)`
    #[serde(default, deserialize_with = "skip_malformed")]
    pub included: Vec<GeckoTerminalIncluded>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeckoTerminalPoolData {
    pub id: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub attributes: GeckoTerminalPoolAttributes,
    #[serde(default)]
    pub relationships: GeckoTerminalRelationships,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GeckoTerminalPoolAttributes {
    pub address: Option<String>,
    pub name: Option<String>,
    pub pool_created_at: Option<String>,
    pub base_token_price_usd: Option<Value>,
    pub fdv_usd: Option<Value>,
    pub market_cap_usd: Option<Value>,
    pub reserve_in_usd: Option<Value>,
    pub volume_usd: Option<GeckoTerminalWindows>,
    pub price_change_percentage: Option<GeckoTerminalWindows>,
    pub transactions: Option<GeckoTerminalTransactions>,
}

/// Values keyed by time window
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GeckoTerminalWindows {
    pub m5: Option<Value>,
    pub h1: Option<Value>,
    pub h6: Option<Value>,
    pub h24: Option<Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GeckoTerminalTransactions {
    pub m5: Option<GeckoTerminalTxnCounts>,
    pub h1: Option<GeckoTerminalTxnCounts>,
    pub h24: Option<GeckoTerminalTxnCounts>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GeckoTerminalTxnCounts {
    pub buys: Option<Value>,
    pub sells: Option<Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GeckoTerminalRelationships {
    pub base_token: Option<GeckoTerminalRelationship>,
    pub quote_token: Option<GeckoTerminalRelationship>,
    pub dex: Option<GeckoTerminalRelationship>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeckoTerminalRelationship {
    #[serde(default)]
    pub data: Option<GeckoTerminalResourceRef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeckoTerminalResourceRef {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl GeckoTerminalResourceRef {
    /// `"{type}:{id}"`, the lookup key into the `included` side table
    pub fn composite_key(&self) -> String {
        format!("{}:{}", self.kind, self.id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeckoTerminalIncluded {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub attributes: GeckoTerminalIncludedAttributes,
}

impl GeckoTerminalIncluded {
    pub fn composite_key(&self) -> String {
        format!("{}:{}", self.kind, self.id)
    }
}

/// Attributes of an included `token` or `dex` entity
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GeckoTerminalIncludedAttributes {
    pub address: Option<String>,
    pub name: Option<String>,
    pub symbol: Option<String>,
    pub image_url: Option<String>,
}
