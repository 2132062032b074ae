/// Publish/subscribe bus for pipeline snapshots
///
/// Each topic has its own broadcast channel. Publishing never blocks and never
/// fails: with no subscribers the event is simply dropped. A subscriber that
/// falls more than `channel_capacity` events behind gets `Lagged` and resumes
/// from the newest snapshots. The latest payload per topic is also retained
/// for synchronous getters.
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::config::EventsConfig;
use crate::logger::{self, LogTag};
use crate::tokens::types::{TokenRecord, TrendingToken};

pub const TOPIC_NEW_PAIRS: &str = "adrenaline:newpairs:updated";
pub const TOPIC_MIGRATING: &str = "adrenaline:migrating:updated";
pub const TOPIC_MIGRATED: &str = "adrenaline:migrated:updated";
pub const TOPIC_TRENDING: &str = "nebula:trending:updated";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    NewPairs,
    Migrating,
    Migrated,
    Trending,
}

impl Topic {
    pub const ALL: [Topic; 4] = [Topic::NewPairs, Topic::Migrating, Topic::Migrated, Topic::Trending];

    pub fn name(&self) -> &'static str {
        match self {
            Topic::NewPairs => TOPIC_NEW_PAIRS,
            Topic::Migrating => TOPIC_MIGRATING,
            Topic::Migrated => TOPIC_MIGRATED,
            Topic::Trending => TOPIC_TRENDING,
        }
    }

    pub fn from_name(name: &str) -> Option<Topic> {
        Topic::ALL.into_iter().find(|t| t.name() == name)
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Payload of the three adrenaline topics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairsUpdated {
    pub pairs: Vec<TokenRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendingUpdated {
    pub tokens: Vec<TrendingToken>,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EventPayload {
    Pairs(Arc<PairsUpdated>),
    Trending(Arc<TrendingUpdated>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct BusEvent {
    pub topic: Topic,
    pub payload: EventPayload,
}

impl BusEvent {
    /// JSON body of the event, as a UI listener would receive it
    pub fn to_json(&self) -> serde_json::Value {
        let value = match &self.payload {
            EventPayload::Pairs(p) => serde_json::to_value(p.as_ref()),
            EventPayload::Trending(t) => serde_json::to_value(t.as_ref()),
        };
        value.unwrap_or(serde_json::Value::Null)
    }
}

#[derive(Default)]
struct Snapshots {
    new_pairs: Vec<TokenRecord>,
    migrating: Vec<TokenRecord>,
    migrated: Vec<TokenRecord>,
    trending: Vec<TrendingToken>,
    trending_last_update: Option<DateTime<Utc>>,
}

pub struct EventBus {
    new_pairs_tx: broadcast::Sender<BusEvent>,
    migrating_tx: broadcast::Sender<BusEvent>,
    migrated_tx: broadcast::Sender<BusEvent>,
    trending_tx: broadcast::Sender<BusEvent>,
    snapshots: RwLock<Snapshots>,
}

impl EventBus {
    pub fn new(config: &EventsConfig) -> Self {
        let capacity = config.channel_capacity.max(1);
        Self {
            new_pairs_tx: broadcast::channel(capacity).0,
            migrating_tx: broadcast::channel(capacity).0,
            migrated_tx: broadcast::channel(capacity).0,
            trending_tx: broadcast::channel(capacity).0,
            snapshots: RwLock::new(Snapshots::default()),
        }
    }

    fn sender(&self, topic: Topic) -> &broadcast::Sender<BusEvent> {
        match topic {
            Topic::NewPairs => &self.new_pairs_tx,
            Topic::Migrating => &self.migrating_tx,
            Topic::Migrated => &self.migrated_tx,
            Topic::Trending => &self.trending_tx,
        }
    }

    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<BusEvent> {
        self.sender(topic).subscribe()
    }

    pub fn subscriber_count(&self, topic: Topic) -> usize {
        self.sender(topic).receiver_count()
    }

    /// Fan out to current subscribers; returns how many received it
    fn send(&self, event: BusEvent) -> usize {
        let topic = event.topic;
        match self.sender(topic).send(event) {
            Ok(receivers) => {
                logger::verbose(
                    LogTag::Events,
                    &format!("{} delivered to {} subscribers", topic, receivers),
                );
                receivers
            }
            // No receivers is not an error
            Err(_) => 0,
        }
    }

    /// Retain and publish an adrenaline list. `topic` must be one of the
    /// pairs topics; trending goes through `publish_trending`.
    pub fn publish_pairs(&self, topic: Topic, pairs: Vec<TokenRecord>) -> usize {
        {
            let mut snapshots = self.snapshots.write();
            match topic {
                Topic::NewPairs => snapshots.new_pairs = pairs.clone(),
                Topic::Migrating => snapshots.migrating = pairs.clone(),
                Topic::Migrated => snapshots.migrated = pairs.clone(),
                Topic::Trending => {
                    logger::warning(
                        LogTag::Events,
                        "Ignoring pairs payload published on the trending topic",
                    );
                    return 0;
                }
            }
        }

        self.send(BusEvent {
            topic,
            payload: EventPayload::Pairs(Arc::new(PairsUpdated { pairs })),
        })
    }

    pub fn publish_trending(&self, tokens: Vec<TrendingToken>, updated_at: DateTime<Utc>) -> usize {
        {
            let mut snapshots = self.snapshots.write();
            snapshots.trending = tokens.clone();
            snapshots.trending_last_update = Some(updated_at);
        }

        let count = tokens.len();
        self.send(BusEvent {
            topic: Topic::Trending,
            payload: EventPayload::Trending(Arc::new(TrendingUpdated { tokens, count })),
        })
    }

    pub fn get_new_pairs(&self) -> Vec<TokenRecord> {
        self.snapshots.read().new_pairs.clone()
    }

    pub fn get_migrating_pairs(&self) -> Vec<TokenRecord> {
        self.snapshots.read().migrating.clone()
    }

    pub fn get_migrated_pairs(&self) -> Vec<TokenRecord> {
        self.snapshots.read().migrated.clone()
    }

    pub fn get_trending_tokens(&self) -> Vec<TrendingToken> {
        self.snapshots.read().trending.clone()
    }

    pub fn get_trending_last_update(&self) -> Option<DateTime<Utc>> {
        self.snapshots.read().trending_last_update
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokens::types::GeckoMetrics;
    use tokio::sync::broadcast::error::{RecvError, TryRecvError};

    fn bus(capacity: usize) -> EventBus {
        EventBus::new(&EventsConfig {
            channel_capacity: capacity,
        })
    }

    fn pairs(mints: &[&str]) -> Vec<TokenRecord> {
        mints.iter().map(|m| TokenRecord::new(m)).collect()
    }

    #[test]
    fn topic_names_round_trip() {
        for topic in Topic::ALL {
            assert_eq!(Topic::from_name(topic.name()), Some(topic));
        }
        assert_eq!(Topic::Trending.to_string(), "nebula:trending:updated");
        assert_eq!(Topic::from_name("adrenaline:unknown"), None);
    }

    #[test]
    fn publish_without_subscribers_is_fine() {
        let bus = bus(4);
        assert_eq!(bus.publish_pairs(Topic::NewPairs, pairs(&["a"])), 0);
        assert_eq!(bus.get_new_pairs().len(), 1);
    }

    #[tokio::test]
    async fn every_subscriber_gets_the_event() {
        let bus = bus(4);
        let mut first = bus.subscribe(Topic::Migrated);
        let mut second = bus.subscribe(Topic::Migrated);
        let mut other_topic = bus.subscribe(Topic::NewPairs);
        assert_eq!(bus.subscriber_count(Topic::Migrated), 2);

        assert_eq!(bus.publish_pairs(Topic::Migrated, pairs(&["m1", "m2"])), 2);

        for rx in [&mut first, &mut second] {
            let event = rx.recv().await.unwrap();
            assert_eq!(event.topic, Topic::Migrated);
            assert_eq!(event.to_json()["pairs"].as_array().map(|a| a.len()), Some(2));
        }
        assert!(matches!(other_topic.try_recv(), Err(TryRecvError::Empty)));
    }

    #[tokio::test]
    async fn slow_subscriber_lags_then_sees_latest() {
        let bus = bus(2);
        let mut rx = bus.subscribe(Topic::NewPairs);

        for i in 0..5 {
            let mint = format!("m{}", i);
            bus.publish_pairs(Topic::NewPairs, pairs(&[mint.as_str()]));
        }

        assert!(matches!(rx.recv().await, Err(RecvError::Lagged(3))));
        let mut last = None;
        while let Ok(event) = rx.try_recv() {
            last = Some(event);
        }
        let Some(BusEvent {
            payload: EventPayload::Pairs(latest),
            ..
        }) = last
        else {
            panic!("expected a pairs event");
        };
        assert_eq!(latest.pairs[0].mint, "m4");
        assert_eq!(bus.get_new_pairs()[0].mint, "m4");
    }

    #[tokio::test]
    async fn trending_payload_carries_count_and_timestamp() {
        let bus = bus(4);
        let mut rx = bus.subscribe(Topic::Trending);
        assert!(bus.get_trending_last_update().is_none());

        let now = Utc::now();
        let tokens = vec![
            TrendingToken::new(TokenRecord::new("a"), GeckoMetrics::default()),
            TrendingToken::new(TokenRecord::new("b"), GeckoMetrics::default()),
        ];
        bus.publish_trending(tokens, now);

        let event = rx.recv().await.unwrap();
        assert_eq!(event.to_json()["count"], 2);
        assert_eq!(bus.get_trending_tokens().len(), 2);
        assert_eq!(bus.get_trending_last_update(), Some(now));
    }

    #[test]
    fn pairs_on_trending_topic_are_rejected() {
        let bus = bus(4);
        let _rx = bus.subscribe(Topic::Trending);
        assert_eq!(bus.publish_pairs(Topic::Trending, pairs(&["x"])), 0);
        assert!(bus.get_trending_tokens().is_empty());
    }
}
