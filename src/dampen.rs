//! Strength dampener: scale a normalized score by the equipment rating.
//!
//! Higher-is-better scores get `score * rating^alpha`, so results in a strong
//! car count for more and results in a weak car for less. Lower-is-better
//! scores apply the reciprocal rating to the deficit `1 - score` instead.
//!
//! `0` and `1` are fixed points only when the rating is exactly `1.0`; a
//! perfect raw score in a dominant car does not stay at `1.0`.

use crate::metric::Direction;

/// Exponent for head-to-head comparisons.
pub const HEAD_TO_HEAD_ALPHA: f64 = 0.3;
/// Exponent for season-bonus contexts.
pub const SEASON_ALPHA: f64 = 0.6;

pub fn dampen(score01: f64, strength_rating: f64, direction: Direction, alpha: f64) -> f64 {
    match direction {
        Direction::HigherIsBetter => score01 * strength_rating.powf(alpha),
        Direction::LowerIsBetter => 1.0 - (1.0 - score01) * (1.0 / strength_rating).powf(alpha),
    }
}
