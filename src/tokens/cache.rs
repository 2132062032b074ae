/// In-memory token cache keyed by mint
///
/// Tracks when each mint was first observed. `age_minutes` on cached records
/// is measured from that first observation, not from the upstream creation
/// time. Entries older than `max_age` are swept at the start of every upsert;
/// a mint that simply stops appearing upstream stays cached until then.
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;

use crate::tokens::types::TokenRecord;

#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub record: TokenRecord,
    pub first_seen_at: DateTime<Utc>,
    pub last_seen_at: DateTime<Utc>,
}

impl CacheEntry {
    pub fn age_minutes_at(&self, now: DateTime<Utc>) -> i64 {
        (now - self.first_seen_at).num_minutes().max(0)
    }
}

#[derive(Debug)]
pub struct TokenCache {
    entries: HashMap<String, CacheEntry>,
    max_age: Duration,
}

impl TokenCache {
    pub fn new(max_age: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            max_age,
        }
    }

    pub fn with_max_age_minutes(minutes: i64) -> Self {
        Self::new(Duration::minutes(minutes))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, mint: &str) -> Option<&CacheEntry> {
        self.entries.get(mint)
    }

    pub fn upsert(&mut self, tokens: Vec<TokenRecord>) -> Vec<TokenRecord> {
        self.upsert_at(tokens, Utc::now())
    }

    /// Merge a fresh observation into the cache and return every cached
    /// record with ages recomputed against `now`. Ordered by first
    /// observation, then mint.
    pub fn upsert_at(&mut self, tokens: Vec<TokenRecord>, now: DateTime<Utc>) -> Vec<TokenRecord> {
        self.sweep_at(now);

        for token in tokens {
            if token.mint.is_empty() {
                continue;
            }

            match self.entries.get_mut(&token.mint) {
                Some(entry) => {
                    entry.record = token;
                    entry.last_seen_at = now;
                }
                None => {
                    self.entries.insert(
                        token.mint.clone(),
                        CacheEntry {
                            record: token,
                            first_seen_at: now,
                            last_seen_at: now,
                        },
                    );
                }
            }
        }

        let mut entries: Vec<&mut CacheEntry> = self.entries.values_mut().collect();
        entries.sort_by(|a, b| {
            a.first_seen_at
                .cmp(&b.first_seen_at)
                .then_with(|| a.record.mint.cmp(&b.record.mint))
        });

        entries
            .into_iter()
            .map(|entry| {
                entry.record.age_minutes = entry.age_minutes_at(now);
                entry.record.clone()
            })
            .collect()
    }

    /// Drop entries first seen more than `max_age` ago; returns how many
    pub fn sweep_at(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.entries.len();
        let max_age = self.max_age;
        self.entries.retain(|_, entry| now - entry.first_seen_at <= max_age);
        before - self.entries.len()
    }
}
