/// Base HTTP client with a windowed request budget
///
/// Upstream calls are never queued: once a source has spent its budget for
/// the current window, or is cooling down after an HTTP 429, the call is
/// skipped and the caller treats the source as empty for this cycle.
use parking_lot::Mutex;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::apis::stats::{ApiStats, ApiStatsTracker};
use crate::errors::ApiError;
use crate::logger::{self, LogTag};

#[derive(Debug)]
struct RateLimitState {
    window_started: Option<Instant>,
    used: usize,
    cooldown_until: Option<Instant>,
}

/// Per-source request budget: `max_requests` per fixed window, plus a
/// cooldown tripped by HTTP 429
#[derive(Debug)]
pub struct RateLimiter {
    source_name: String,
    max_requests: usize,
    window: Duration,
    backoff: Duration,
    state: Mutex<RateLimitState>,
}

impl RateLimiter {
    pub fn new(source_name: &str, max_requests: usize, window: Duration, backoff: Duration) -> Self {
        Self {
            source_name: source_name.to_string(),
            max_requests,
            window,
            backoff,
            state: Mutex::new(RateLimitState {
                window_started: None,
                used: 0,
                cooldown_until: None,
            }),
        }
    }

    pub fn try_acquire(&self) -> Result<(), ApiError> {
        self.try_acquire_at(Instant::now())
    }

    /// Spend one request from the budget, or report why the call must be skipped
    pub fn try_acquire_at(&self, now: Instant) -> Result<(), ApiError> {
        let mut state = self.state.lock();

        if let Some(until) = state.cooldown_until {
            if now < until {
                return Err(self.limited());
            }
            state.cooldown_until = None;
        }

        let window_expired = match state.window_started {
            Some(started) => now.saturating_duration_since(started) >= self.window,
            None => true,
        };
        if window_expired {
            state.window_started = Some(now);
            state.used = 0;
        }

        if state.used >= self.max_requests {
            return Err(self.limited());
        }

        state.used += 1;
        Ok(())
    }

    pub fn trip_cooldown(&self) {
        self.trip_cooldown_at(Instant::now());
    }

    pub fn trip_cooldown_at(&self, now: Instant) {
        self.state.lock().cooldown_until = Some(now + self.backoff);
    }

    pub fn is_cooling_down_at(&self, now: Instant) -> bool {
        self.state
            .lock()
            .cooldown_until
            .map(|until| now < until)
            .unwrap_or(false)
    }

    /// Requests left in the current window (ignores cooldown)
    pub fn remaining_at(&self, now: Instant) -> usize {
        let state = self.state.lock();
        match state.window_started {
            Some(started) if now.saturating_duration_since(started) < self.window => {
                self.max_requests.saturating_sub(state.used)
            }
            _ => self.max_requests,
        }
    }

    pub fn max_requests(&self) -> usize {
        self.max_requests
    }

    fn limited(&self) -> ApiError {
        ApiError::RateLimited {
            source_name: self.source_name.clone(),
        }
    }
}

/// HTTP client wrapper shared by every upstream source
///
/// `get_json` / `post_json` return `Ok(None)` for non-2xx responses: the
/// status is logged and recorded, and the caller gets an empty result.
pub struct HttpClient {
    source_name: String,
    client: Client,
    timeout: Duration,
    rate_limiter: Option<RateLimiter>,
    stats: Arc<ApiStatsTracker>,
    enabled: bool,
}

impl HttpClient {
    pub fn new(
        source_name: &str,
        enabled: bool,
        timeout_secs: u64,
        rate_limiter: Option<RateLimiter>,
    ) -> Result<Self, String> {
        if timeout_secs == 0 {
            return Err(format!("{}: timeout must be greater than zero", source_name));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| format!("Failed to create HTTP client: {}", e))?;

        Ok(Self {
            source_name: source_name.to_string(),
            client,
            timeout: Duration::from_secs(timeout_secs),
            rate_limiter,
            stats: Arc::new(ApiStatsTracker::new()),
            enabled,
        })
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    pub fn rate_limiter(&self) -> Option<&RateLimiter> {
        self.rate_limiter.as_ref()
    }

    pub fn get_stats(&self) -> ApiStats {
        self.stats.get_stats()
    }

    fn ensure_ready(&self, endpoint: &str) -> Result<(), ApiError> {
        if !self.enabled {
            return Err(ApiError::Disabled(self.source_name.clone()));
        }
        if let Some(limiter) = &self.rate_limiter {
            if let Err(err) = limiter.try_acquire() {
                self.stats.record_skipped();
                logger::warning(
                    LogTag::Api,
                    &format!("[{}] Rate limited, skipping {}", self.source_name, endpoint),
                );
                return Err(err);
            }
        }
        Ok(())
    }

    pub async fn get_json<T>(
        &self,
        endpoint: &str,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<Option<T>, ApiError>
    where
        T: DeserializeOwned,
    {
        self.ensure_ready(endpoint)?;

        logger::debug(
            LogTag::Api,
            &format!("[{}] GET {} {:?}", self.source_name, endpoint, query),
        );

        let builder = self
            .client
            .get(url)
            .header("Accept", "application/json")
            .query(query);
        self.execute(endpoint, builder).await
    }

    pub async fn post_json<B, T>(&self, endpoint: &str, url: &str, body: &B) -> Result<Option<T>, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.ensure_ready(endpoint)?;

        logger::debug(
            LogTag::Api,
            &format!("[{}] POST {}", self.source_name, endpoint),
        );

        let builder = self.client.post(url).json(body);
        self.execute(endpoint, builder).await
    }

    async fn execute<T>(
        &self,
        endpoint: &str,
        builder: reqwest::RequestBuilder,
    ) -> Result<Option<T>, ApiError>
    where
        T: DeserializeOwned,
    {
        let start = Instant::now();
        let response = match builder.send().await {
            Ok(response) => response,
            Err(err) => {
                let elapsed = start.elapsed().as_millis() as f64;
                let error = ApiError::from_reqwest(err, self.timeout.as_secs());
                self.stats.record_request(false, elapsed);
                self.stats.record_error(&error.to_string());
                logger::warning(
                    LogTag::Api,
                    &format!("[{}] {} failed: {}", self.source_name, endpoint, error),
                );
                return Err(error);
            }
        };

        let status = response.status();
        if !status.is_success() {
            let elapsed = start.elapsed().as_millis() as f64;
            self.stats.record_request(false, elapsed);
            self.stats
                .record_error(&format!("HTTP {} from {}", status.as_u16(), endpoint));

            if status == StatusCode::TOO_MANY_REQUESTS {
                if let Some(limiter) = &self.rate_limiter {
                    limiter.trip_cooldown();
                }
                logger::warning(
                    LogTag::Api,
                    &format!("[{}] HTTP 429 on {}, cooling down", self.source_name, endpoint),
                );
            } else {
                logger::warning(
                    LogTag::Api,
                    &format!("[{}] {} returned HTTP {}", self.source_name, endpoint, status),
                );
            }
            return Ok(None);
        }

        let parsed = response.json::<T>().await;
        let elapsed = start.elapsed().as_millis() as f64;
        match parsed {
            Ok(value) => {
                self.stats.record_request(true, elapsed);
                Ok(Some(value))
            }
            Err(err) => {
                let error = ApiError::from_reqwest(err, self.timeout.as_secs());
                self.stats.record_request(false, elapsed);
                self.stats.record_error(&error.to_string());
                logger::warning(
                    LogTag::Api,
                    &format!("[{}] {} parse error: {}", self.source_name, endpoint, error),
                );
                Err(error)
            }
        }
    }
}
