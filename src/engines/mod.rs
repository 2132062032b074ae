/// Refresh engines
///
/// Each engine owns its cache, its cycle guard and its cadence, and publishes
/// snapshots to the shared [`EventBus`](crate::events::EventBus).
pub mod adrenaline;
pub mod guard;
pub mod sources;
pub mod trending;

pub use adrenaline::{AdrenalineCycleReport, AdrenalineEngine};
pub use guard::{CycleGuard, CyclePermit, EngineState};
pub use sources::{NewPoolsSource, PairSource, PriceSource, SocialSource, TrendingSource};
pub use trending::{RefreshOutcome, TrendingEngine};
