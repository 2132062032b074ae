/// Log tags identify the subsystem a message comes from.
///
/// Each tag maps to a `--debug-<key>` flag that unlocks its debug output.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LogTag {
    System,
    Config,
    Api,
    Cache,
    Adrenaline,
    Trending,
    Enrichment,
    Events,
    Search,
    Wallet,
    Test,
    Other(String),
}

impl LogTag {
    /// Key used by `--debug-<key>` / `--verbose-<key>` flags
    pub fn to_debug_key(&self) -> String {
        match self {
            LogTag::System => "system".to_string(),
            LogTag::Config => "config".to_string(),
            LogTag::Api => "api".to_string(),
            LogTag::Cache => "cache".to_string(),
            LogTag::Adrenaline => "adrenaline".to_string(),
            LogTag::Trending => "trending".to_string(),
            LogTag::Enrichment => "enrichment".to_string(),
            LogTag::Events => "events".to_string(),
            LogTag::Search => "search".to_string(),
            LogTag::Wallet => "wallet".to_string(),
            LogTag::Test => "test".to_string(),
            LogTag::Other(name) => name.to_lowercase(),
        }
    }

    /// Uppercase label without colors, used in the log file
    pub fn to_plain_string(&self) -> String {
        match self {
            LogTag::Adrenaline => "ADRENALN".to_string(),
            LogTag::Enrichment => "ENRICH".to_string(),
            other => other.to_debug_key().to_uppercase(),
        }
    }
}

impl std::fmt::Display for LogTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_plain_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_keys_and_file_labels() {
        assert_eq!(LogTag::Trending.to_debug_key(), "trending");
        assert_eq!(LogTag::Other("Jito".into()).to_debug_key(), "jito");
        assert_eq!(LogTag::Adrenaline.to_plain_string(), "ADRENALN");
        assert_eq!(LogTag::Api.to_string(), "API");
    }
}
