/// Error types for the NebulaX pipeline
///
/// `ApiError` covers everything that can go wrong talking to an upstream
/// source. None of these are fatal: callers log them and treat the source as
/// empty for the current cycle. `NebulaError` covers startup concerns.
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    /// Transport failure (DNS, connection reset, TLS, body read)
    #[error("Network error: {0}")]
    Network(String),

    /// Non-success HTTP status
    #[error("HTTP {status} from {endpoint}")]
    HttpStatus { endpoint: String, status: u16 },

    /// Local request budget exhausted or source cooling down after a 429
    #[error("Rate limit exceeded: {source_name}")]
    RateLimited { source_name: String },

    /// Body could not be decoded into the expected shape
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Request timeout after {seconds}s")]
    Timeout { seconds: u64 },

    #[error("{0} client disabled via configuration")]
    Disabled(String),
}

impl ApiError {
    /// Whether a retry could reasonably succeed
    pub fn is_transient(&self) -> bool {
        matches!(self, ApiError::Network(_) | ApiError::Timeout { .. })
    }

    pub fn from_reqwest(err: reqwest::Error, timeout_secs: u64) -> Self {
        if err.is_timeout() {
            ApiError::Timeout {
                seconds: timeout_secs,
            }
        } else if err.is_decode() {
            ApiError::InvalidResponse(err.to_string())
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

#[derive(Error, Debug)]
pub enum NebulaError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Api(#[from] ApiError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_classification() {
        assert!(ApiError::Network("reset".into()).is_transient());
        assert!(ApiError::Timeout { seconds: 10 }.is_transient());
        assert!(!ApiError::HttpStatus {
            endpoint: "quote".into(),
            status: 400
        }
        .is_transient());
        assert!(!ApiError::InvalidResponse("missing outAmount".into()).is_transient());
    }

    #[test]
    fn display_messages() {
        let err = ApiError::RateLimited {
            source_name: "GeckoTerminal".into(),
        };
        assert_eq!(err.to_string(), "Rate limit exceeded: GeckoTerminal");
        let wrapped: NebulaError = err.into();
        assert_eq!(wrapped.to_string(), "Rate limit exceeded: GeckoTerminal");
    }
}
