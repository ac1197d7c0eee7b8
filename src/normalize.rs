//! Metric normalizer: two raw totals -> a comparable pair in `[0, 1]`.
//!
//! Higher-is-better totals are heavy-tailed (a handful of wins next to
//! hundreds of points), so they are log-compressed before being scaled by the
//! larger side. Lower-is-better totals (DNFs) are scaled linearly and
//! inverted, so the side with fewer occurrences scores closer to 1.

use crate::metric::Direction;

/// Normalize a pair of raw values. Negative or non-finite inputs count as 0.
pub fn normalize(direction: Direction, value_a: f64, value_b: f64) -> (f64, f64) {
    let a = sanitize(value_a);
    let b = sanitize(value_b);

    match direction {
        Direction::LowerIsBetter => {
            // No negative events on either side: both perfect.
            if a == 0.0 && b == 0.0 {
                return (1.0, 1.0);
            }
            let m = a.max(b);
            if m == 0.0 {
                return (0.5, 0.5);
            }
            (1.0 - a / m, 1.0 - b / m)
        }
        Direction::HigherIsBetter => {
            // Tie with no signal.
            if a == 0.0 && b == 0.0 {
                return (0.5, 0.5);
            }
            let la = a.ln_1p();
            let lb = b.ln_1p();
            let peak = la.max(lb);
            if peak == 0.0 {
                return (0.5, 0.5);
            }
            (la / peak, lb / peak)
        }
    }
}

fn sanitize(v: f64) -> f64 {
    if v.is_finite() && v > 0.0 {
        v
    } else {
        0.0
    }
}
