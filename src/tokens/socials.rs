/// Best-effort social link enrichment
///
/// Only the head of each list is enriched, in small concurrent batches with
/// a pause in between. Lookups (including failed ones) are cached per mint.
use futures::future::join_all;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::EnrichmentConfig;
use crate::engines::sources::SocialSource;
use crate::logger::{self, LogTag};
use crate::tokens::types::{SocialLinks, TokenRecord};

pub struct SocialCache {
    ttl: Duration,
    entries: Mutex<HashMap<String, (SocialLinks, Instant)>>,
}

impl SocialCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn get_at(&self, mint: &str, now: Instant) -> Option<SocialLinks> {
        let entries = self.entries.lock();
        entries
            .get(mint)
            .filter(|(_, fetched)| now.saturating_duration_since(*fetched) < self.ttl)
            .map(|(links, _)| links.clone())
    }

    pub fn insert_at(&self, mint: &str, links: SocialLinks, now: Instant) {
        self.entries.lock().insert(mint.to_string(), (links, now));
    }

    /// Drop expired entries
    pub fn prune_at(&self, now: Instant) {
        let ttl = self.ttl;
        self.entries
            .lock()
            .retain(|_, (_, fetched)| now.saturating_duration_since(*fetched) < ttl);
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

pub struct SocialEnricher {
    source: Arc<dyn SocialSource>,
    cache: SocialCache,
    config: EnrichmentConfig,
}

impl SocialEnricher {
    pub fn new(source: Arc<dyn SocialSource>, config: EnrichmentConfig) -> Self {
        Self {
            source,
            cache: SocialCache::new(config.cache_ttl()),
            config,
        }
    }

    pub fn cache(&self) -> &SocialCache {
        &self.cache
    }

    /// Cached links for `mint`, fetching on miss. Failures yield no socials.
    pub async fn lookup(&self, mint: &str) -> SocialLinks {
        if let Some(links) = self.cache.get_at(mint, Instant::now()) {
            return links;
        }

        let links = match self.source.fetch_socials(mint).await {
            Ok(links) => links,
            Err(e) => {
                logger::debug(
                    LogTag::Enrichment,
                    &format!("Social lookup failed for {}: {}", mint, e),
                );
                SocialLinks::none()
            }
        };

        self.cache.insert_at(mint, links.clone(), Instant::now());
        links
    }

    /// Enrich the first `max_tokens_per_list` records in place.
    /// Returns how many of them have socials.
    pub async fn enrich(&self, tokens: &mut [TokenRecord]) -> usize {
        if !self.config.enabled || tokens.is_empty() {
            return 0;
        }

        self.cache.prune_at(Instant::now());

        let limit = tokens.len().min(self.config.max_tokens_per_list);
        let batch_size = self.config.batch_size.max(1);
        let batch_count = limit.div_ceil(batch_size);
        let mut with_socials = 0;

        for (index, batch) in tokens[..limit].chunks_mut(batch_size).enumerate() {
            let mints: Vec<String> = batch.iter().map(|t| t.mint.clone()).collect();
            let results = join_all(mints.iter().map(|mint| self.lookup(mint))).await;

            for (token, links) in batch.iter_mut().zip(results) {
                token.apply_socials(&links);
                if links.has_socials {
                    with_socials += 1;
                }
            }

            if index + 1 < batch_count {
                tokio::time::sleep(self.config.batch_delay()).await;
            }
        }

        logger::debug(
            LogTag::Enrichment,
            &format!("Enriched {} tokens, {} with socials", limit, with_socials),
        );
        with_socials
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ApiError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakeSocials {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl SocialSource for FakeSocials {
        async fn fetch_socials(&self, mint: &str) -> Result<SocialLinks, ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match mint {
                m if m.starts_with("social") => Ok(SocialLinks::new(
                    Some(format!("https://x.com/{}", m)),
                    None,
                )),
                m if m.starts_with("fail") => Err(ApiError::Network("reset".into())),
                _ => Ok(SocialLinks::none()),
            }
        }
    }

    fn enricher(source: Arc<FakeSocials>) -> SocialEnricher {
        SocialEnricher::new(source, EnrichmentConfig::default())
    }

    fn tokens(mints: &[&str]) -> Vec<TokenRecord> {
        mints.iter().map(|m| TokenRecord::new(m)).collect()
    }

    #[tokio::test(start_paused = true)]
    async fn only_head_of_list_is_enriched() {
        let source = Arc::new(FakeSocials {
            calls: AtomicUsize::new(0),
        });
        let enricher = enricher(source.clone());

        let mints: Vec<String> = (0..25).map(|i| format!("social{}", i)).collect();
        let refs: Vec<&str> = mints.iter().map(|s| s.as_str()).collect();
        let mut list = tokens(&refs);

        let started = tokio::time::Instant::now();
        let count = enricher.enrich(&mut list).await;

        assert_eq!(count, 20);
        assert_eq!(source.calls.load(Ordering::SeqCst), 20);
        assert!(list[19].has_socials);
        assert!(!list[20].has_socials);
        // four batches of five, three pauses between them
        assert!(started.elapsed() >= Duration::from_millis(600));
        assert!(started.elapsed() < Duration::from_millis(800));
    }

    #[tokio::test]
    async fn failures_mean_no_socials_and_are_cached() {
        let source = Arc::new(FakeSocials {
            calls: AtomicUsize::new(0),
        });
        let enricher = enricher(source.clone());

        let mut list = tokens(&["fail1", "plain", "social1"]);
        list[0].has_socials = true;
        assert_eq!(enricher.enrich(&mut list).await, 1);
        assert!(!list[0].has_socials);
        assert!(!list[1].has_socials);
        assert_eq!(list[2].twitter.as_deref(), Some("https://x.com/social1"));

        // second pass is served from cache
        enricher.enrich(&mut list).await;
        assert_eq!(source.calls.load(Ordering::SeqCst), 3);
        assert_eq!(enricher.cache().len(), 3);
    }

    #[test]
    fn cache_entries_expire_after_ttl() {
        let cache = SocialCache::new(Duration::from_secs(600));
        let t0 = Instant::now();
        cache.insert_at("m", SocialLinks::new(None, Some("https://m.io".into())), t0);

        assert!(cache.get_at("m", t0 + Duration::from_secs(599)).is_some());
        assert!(cache.get_at("m", t0 + Duration::from_secs(600)).is_none());

        cache.prune_at(t0 + Duration::from_secs(601));
        assert!(cache.is_empty());
    }
}
