//! # Composite Engine
//! Pure, testable logic that maps `(stats_a, stats_b, enabled metrics)` to a
//! `CompositeScore`. No I/O, no clock: the fallback season for career views is
//! carried in by `ScoringContext`.
//!
//! Per metric: normalize -> (both teams known) dampen by strength rating,
//! then underdog bonus -> weight. The weighted mean is scaled to 0..=100.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::config::{MetricWeights, ProfileKind, ScoringConfig, ScoringProfile};
use crate::dampen::dampen;
use crate::metric::{EnabledMetrics, MetricKey, StatsView};
use crate::normalize::normalize;
use crate::stats::CompetitorStats;
use crate::strength_index::StrengthIndex;

/// Everything besides the two records that scoring depends on.
#[derive(Debug, Clone, Copy)]
pub struct ScoringContext<'a> {
    pub index: &'a StrengthIndex,
    pub profile: ScoringProfile,
    pub weights: MetricWeights,
    /// Season used for strength lookups when comparing career totals.
    pub fallback_season: i32,
}

impl ScoringContext<'static> {
    /// Head-to-head defaults against the shipped strength table.
    pub fn head_to_head(fallback_season: i32) -> Self {
        Self {
            index: StrengthIndex::shipped(),
            profile: ScoringProfile::HEAD_TO_HEAD,
            weights: MetricWeights::default(),
            fallback_season,
        }
    }
}

impl<'a> ScoringContext<'a> {
    pub fn from_config(
        cfg: &ScoringConfig,
        kind: ProfileKind,
        index: &'a StrengthIndex,
        fallback_season: i32,
    ) -> Self {
        Self {
            index,
            profile: cfg.profile(kind),
            weights: cfg.weights,
            fallback_season,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompositeScore {
    pub score_a: Option<f64>,
    pub score_b: Option<f64>,
    /// Adjusted (pre-weight) per-metric pair for each contributing metric.
    pub per_metric: BTreeMap<MetricKey, [f64; 2]>,
}

impl CompositeScore {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.score_a.is_none() && self.score_b.is_none()
    }
}

/// Year view only when both sides carry season data; scopes are never mixed.
pub fn comparison_view(a: &CompetitorStats, b: &CompetitorStats) -> StatsView {
    if a.is_year_scoped() && b.is_year_scoped() {
        StatsView::Year
    } else {
        StatsView::Career
    }
}

/// Reduce two statistics records to a composite score.
///
/// Returns an empty score when either side is missing or when no enabled
/// metric applies to the chosen view.
pub fn aggregate(
    stats_a: Option<&CompetitorStats>,
    stats_b: Option<&CompetitorStats>,
    enabled: &EnabledMetrics,
    ctx: &ScoringContext<'_>,
) -> CompositeScore {
    let (Some(a), Some(b)) = (stats_a, stats_b) else {
        return CompositeScore::empty();
    };

    let view = comparison_view(a, b);
    let line_a = a.line(view);
    let line_b = b.line(view);

    // Ratings only when both teams are known; otherwise leave scores as normalized.
    let ratings = match (a.team(), b.team()) {
        (Some(team_a), Some(team_b)) => {
            let season_of = |s: &CompetitorStats| match view {
                StatsView::Year => s.season().unwrap_or(ctx.fallback_season),
                StatsView::Career => ctx.fallback_season,
            };
            Some((
                ctx.index.lookup(season_of(a), team_a),
                ctx.index.lookup(season_of(b), team_b),
            ))
        }
        _ => None,
    };

    let mut per_metric = BTreeMap::new();
    let mut total_a = 0.0;
    let mut total_b = 0.0;
    let mut total_weight = 0.0;

    for key in MetricKey::ALL {
        if !enabled.is_enabled(key) || !key.applies_to(view) {
            continue;
        }
        let direction = key.direction();
        let (mut s_a, mut s_b) = normalize(direction, line_a.value(key), line_b.value(key));

        if let Some((r_a, r_b)) = ratings {
            let alpha = ctx.profile.alpha;
            s_a = dampen(s_a, r_a, direction, alpha) * ctx.profile.underdog.multiplier(key, r_a);
            s_b = dampen(s_b, r_b, direction, alpha) * ctx.profile.underdog.multiplier(key, r_b);
        }

        let w = ctx.weights.get(key);
        per_metric.insert(key, [s_a, s_b]);
        total_a += s_a * w;
        total_b += s_b * w;
        total_weight += w;
    }

    if total_weight == 0.0 {
        return CompositeScore::empty();
    }

    CompositeScore {
        score_a: Some(to_percent(total_a / total_weight)),
        score_b: Some(to_percent(total_b / total_weight)),
        per_metric,
    }
}

fn to_percent(mean: f64) -> f64 {
    (mean * 100.0).round().clamp(0.0, 100.0)
}
