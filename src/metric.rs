//! # Metric catalogue
//!
//! The fixed set of comparable statistics, their direction, their default
//! importance weight and the view they apply to. `EnabledMetrics` is the
//! UI-facing toggle map that decides which of them take part in a comparison.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Whether a bigger raw value is a better result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    HigherIsBetter,
    LowerIsBetter,
}

/// Which statistics block a comparison reads from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatsView {
    Year,
    Career,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKey {
    Wins,
    Podiums,
    Points,
    Poles,
    #[serde(alias = "fastestLaps")]
    FastestLaps,
    #[serde(alias = "sprintWins")]
    SprintWins,
    #[serde(alias = "sprintPodiums")]
    SprintPodiums,
    Dnfs,
    Races,
}

impl MetricKey {
    /// Evaluation order used by the aggregator and for default maps.
    pub const ALL: [MetricKey; 9] = [
        MetricKey::Wins,
        MetricKey::Podiums,
        MetricKey::Points,
        MetricKey::Poles,
        MetricKey::FastestLaps,
        MetricKey::SprintWins,
        MetricKey::SprintPodiums,
        MetricKey::Dnfs,
        MetricKey::Races,
    ];

    pub fn direction(self) -> Direction {
        match self {
            MetricKey::Dnfs => Direction::LowerIsBetter,
            _ => Direction::HigherIsBetter,
        }
    }

    /// Built-in importance weight. `config::MetricWeights` may override it.
    pub fn default_weight(self) -> f64 {
        match self {
            MetricKey::Wins => 3.0,
            MetricKey::Podiums => 2.0,
            MetricKey::Points => 2.0,
            MetricKey::Poles => 1.5,
            MetricKey::FastestLaps => 1.0,
            MetricKey::SprintWins => 1.0,
            MetricKey::SprintPodiums => 0.75,
            MetricKey::Dnfs => 1.0,
            MetricKey::Races => 0.5,
        }
    }

    /// Poles are only tracked reliably per season, so career views skip them.
    pub fn applies_to(self, view: StatsView) -> bool {
        match self {
            MetricKey::Poles => view == StatsView::Year,
            _ => true,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MetricKey::Wins => "wins",
            MetricKey::Podiums => "podiums",
            MetricKey::Points => "points",
            MetricKey::Poles => "poles",
            MetricKey::FastestLaps => "fastest_laps",
            MetricKey::SprintWins => "sprint_wins",
            MetricKey::SprintPodiums => "sprint_podiums",
            MetricKey::Dnfs => "dnfs",
            MetricKey::Races => "races",
        }
    }
}

/// Toggle state per metric. A key missing from the map counts as disabled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EnabledMetrics(BTreeMap<MetricKey, bool>);

impl EnabledMetrics {
    /// Every metric set to `on`.
    pub fn all(on: bool) -> Self {
        Self(MetricKey::ALL.iter().map(|&k| (k, on)).collect())
    }

    /// Defaults for a view: everything on, except fastest laps for a single
    /// season (the source data has no per-year fastest-lap totals).
    pub fn for_view(view: StatsView) -> Self {
        let mut m = Self::all(true);
        if view == StatsView::Year {
            m.set(MetricKey::FastestLaps, false);
        }
        m
    }

    pub fn is_enabled(&self, key: MetricKey) -> bool {
        self.0.get(&key).copied().unwrap_or(false)
    }

    pub fn set(&mut self, key: MetricKey, on: bool) {
        self.0.insert(key, on);
    }

    /// Flip a flag; returns the new value.
    pub fn toggle(&mut self, key: MetricKey) -> bool {
        let next = !self.is_enabled(key);
        self.0.insert(key, next);
        next
    }

    pub fn iter(&self) -> impl Iterator<Item = (MetricKey, bool)> + '_ {
        self.0.iter().map(|(&k, &v)| (k, v))
    }
}

impl Default for EnabledMetrics {
    fn default() -> Self {
        Self::for_view(StatsView::Career)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_dnfs_is_lower_is_better() {
        for k in MetricKey::ALL {
            let expected = if k == MetricKey::Dnfs {
                Direction::LowerIsBetter
            } else {
                Direction::HigherIsBetter
            };
            assert_eq!(k.direction(), expected, "{}", k.as_str());
        }
    }

    #[test]
    fn year_defaults_drop_fastest_laps_only() {
        let y = EnabledMetrics::for_view(StatsView::Year);
        let c = EnabledMetrics::for_view(StatsView::Career);
        for k in MetricKey::ALL {
            assert!(c.is_enabled(k));
            assert_eq!(y.is_enabled(k), k != MetricKey::FastestLaps);
        }
    }

    #[test]
    fn toggle_flips_and_missing_is_disabled() {
        let mut m: EnabledMetrics = serde_json::from_str(r#"{"wins":true}"#).unwrap();
        assert!(m.is_enabled(MetricKey::Wins));
        assert!(!m.is_enabled(MetricKey::Points));
        assert!(!m.toggle(MetricKey::Wins));
        assert!(m.toggle(MetricKey::Points));
    }

    #[test]
    fn poles_skip_career_view() {
        assert!(MetricKey::Poles.applies_to(StatsView::Year));
        assert!(!MetricKey::Poles.applies_to(StatsView::Career));
        assert!(MetricKey::Wins.applies_to(StatsView::Career));
    }

    #[test]
    fn camel_case_keys_accepted() {
        let m: EnabledMetrics =
            serde_json::from_str(r#"{"fastestLaps":true,"sprint_wins":true}"#).unwrap();
        assert!(m.is_enabled(MetricKey::FastestLaps));
        assert!(m.is_enabled(MetricKey::SprintWins));
    }
}
