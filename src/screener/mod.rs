/// Pure classification and scoring over normalized tokens
///
/// - `buckets`: new pairs / migrating / migrated lists for the adrenaline engine
/// - `scoring`: trending hard filters, score and tier
pub mod buckets;
pub mod scoring;

pub use buckets::{classify, Buckets};
pub use scoring::{compute_score, filter_and_score, passes_hard_filter, tier_counts, tier_for, ScoreInputs};
