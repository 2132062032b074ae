/// Per-source request statistics
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ApiStats {
    pub total_requests: u64,
    pub successful_requests: u64,
    pub failed_requests: u64,
    /// Calls skipped by the local budget or a 429 cooldown
    pub skipped_requests: u64,
    pub average_response_time_ms: f64,
    pub last_error: Option<String>,
    pub last_request_at: Option<DateTime<Utc>>,
}

impl ApiStats {
    pub fn success_rate(&self) -> f64 {
        if self.total_requests == 0 {
            return 0.0;
        }
        self.successful_requests as f64 / self.total_requests as f64 * 100.0
    }
}

#[derive(Debug, Default)]
pub struct ApiStatsTracker {
    inner: Mutex<ApiStats>,
}

impl ApiStatsTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_request(&self, success: bool, elapsed_ms: f64) {
        let mut stats = self.inner.lock();
        stats.total_requests += 1;
        if success {
            stats.successful_requests += 1;
        } else {
            stats.failed_requests += 1;
        }
        // running mean
        let n = stats.total_requests as f64;
        stats.average_response_time_ms += (elapsed_ms - stats.average_response_time_ms) / n;
        stats.last_request_at = Some(Utc::now());
    }

    pub fn record_skipped(&self) {
        self.inner.lock().skipped_requests += 1;
    }

    pub fn record_error(&self, message: &str) {
        self.inner.lock().last_error = Some(message.to_string());
    }

    pub fn get_stats(&self) -> ApiStats {
        self.inner.lock().clone()
    }
}
