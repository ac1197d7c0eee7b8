//! Head-to-head comparison scoring for drivers and constructors: the
//! scoring primitives, the comparison session and the HTTP routes around them.

pub mod api;
pub mod config;
pub mod engine;
pub mod metrics;
pub mod provider;
pub mod session;
pub mod stats;
pub mod strength_index;

// Scoring primitives (leaf to root: metric catalogue, normalizer, dampener, bonus)
pub mod bonus;
pub mod dampen;
pub mod metric;
pub mod normalize;

// ---- Re-exports for stable public API ----
pub use crate::api::router;
pub use crate::engine::{aggregate, CompositeScore, ScoringContext};
pub use crate::metric::{Direction, EnabledMetrics, MetricKey, StatsView};
pub use crate::session::{ComparisonSession, Slot, SlotPhase};
pub use crate::stats::{CompetitorStats, StatLine, TimeScope};
pub use crate::strength_index::StrengthIndex;
