//! Underdog bonus: a flat multiplier for headline results achieved in a weak
//! car. Applied after dampening, never instead of it.
//!
//! The multipliers differ between comparison contexts and are kept as
//! separate named profiles rather than one shared constant.

use serde::{Deserialize, Serialize};

use crate::metric::MetricKey;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UnderdogBonus {
    /// Ratings strictly below this qualify.
    pub threshold: f64,
    pub wins: f64,
    pub points: f64,
    pub podiums: f64,
}

impl UnderdogBonus {
    /// Driver/constructor head-to-head views.
    pub const HEAD_TO_HEAD: UnderdogBonus = UnderdogBonus {
        threshold: 0.9,
        wins: 1.5,
        points: 1.5,
        podiums: 1.3,
    };

    /// Season-bonus views.
    pub const SEASON: UnderdogBonus = UnderdogBonus {
        threshold: 0.9,
        wins: 1.5,
        points: 1.15,
        podiums: 1.1,
    };

    pub fn multiplier(&self, metric: MetricKey, strength_rating: f64) -> f64 {
        if strength_rating >= self.threshold {
            return 1.0;
        }
        match metric {
            MetricKey::Wins => self.wins,
            MetricKey::Points => self.points,
            MetricKey::Podiums => self.podiums,
            _ => 1.0,
        }
    }
}

/// Free-function form of [`UnderdogBonus::multiplier`].
pub fn bonus_multiplier(metric: MetricKey, strength_rating: f64, profile: &UnderdogBonus) -> f64 {
    profile.multiplier(metric, strength_rating)
}
