//! Period-over-period GPA trend.
//!
//! Only the two most recent periods decide the direction; changes inside the
//! deadband are treated as noise.

use crate::grades::round2;
use crate::models::{TrendDirection, TrendResult};

/// GPA delta that must be exceeded (either way) to count as a trend.
pub const TREND_DEADBAND: f64 = 0.2;

/// `history` is ordered oldest to newest.
pub fn analyze(history: &[f64]) -> TrendResult {
    let [.., previous, latest] = history else {
        return TrendResult {
            direction: TrendDirection::Stable,
            magnitude: 0.0,
        };
    };

    let delta = round2(latest - previous);
    let direction = if delta > TREND_DEADBAND {
        TrendDirection::Improving
    } else if delta < -TREND_DEADBAND {
        TrendDirection::Declining
    } else {
        TrendDirection::Stable
    };

    TrendResult {
        direction,
        magnitude: delta,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fewer_than_two_points_is_stable() {
        assert_eq!(analyze(&[]).direction, TrendDirection::Stable);
        let single = analyze(&[7.4]);
        assert_eq!(single.direction, TrendDirection::Stable);
        assert_eq!(single.magnitude, 0.0);
    }

    #[test]
    fn deadband_absorbs_small_changes() {
        let stable = analyze(&[7.0, 7.15]);
        assert_eq!(stable.direction, TrendDirection::Stable);
        assert_eq!(stable.magnitude, 0.15);

        let improving = analyze(&[7.0, 7.25]);
        assert_eq!(improving.direction, TrendDirection::Improving);
        assert_eq!(improving.magnitude, 0.25);

        let declining = analyze(&[7.0, 6.79]);
        assert_eq!(declining.direction, TrendDirection::Declining);
        assert_eq!(declining.magnitude, -0.21);
    }

    #[test]
    fn exactly_the_deadband_is_stable() {
        assert_eq!(analyze(&[6.0, 6.2]).direction, TrendDirection::Stable);
        assert_eq!(analyze(&[6.2, 6.0]).direction, TrendDirection::Stable);
    }

    #[test]
    fn only_the_latest_pair_counts() {
        let result = analyze(&[4.0, 8.0, 7.5]);
        assert_eq!(result.direction, TrendDirection::Declining);
        assert_eq!(result.magnitude, -0.5);
    }
}
