//! Vote weight calculator.

/// Per-point multiplier for a vote cast from inside the rumor's area.
pub const WITHIN_AREA_MULTIPLIER: f64 = 1.5;
/// Per-point multiplier for a vote cast from outside the rumor's area.
pub const OUTSIDE_AREA_MULTIPLIER: f64 = 0.5;
pub const BASE_WEIGHT: f64 = 1.0;

/// `points * (1.5 | 0.5) + 1.0`.
///
/// Computed once at admission and persisted with the vote. Negative
/// reputation yields a weight below the base, and below zero from -1
/// point inside the area or -3 outside it.
pub fn vote_weight(points: i64, is_within_area: bool) -> f64 {
    let multiplier = if is_within_area {
        WITHIN_AREA_MULTIPLIER
    } else {
        OUTSIDE_AREA_MULTIPLIER
    };
    points as f64 * multiplier + BASE_WEIGHT
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_weights() {
        assert_eq!(vote_weight(100, true), 151.0);
        assert_eq!(vote_weight(100, false), 51.0);
        assert_eq!(vote_weight(0, true), 1.0);
        assert_eq!(vote_weight(0, false), 1.0);
    }

    #[test]
    fn within_area_counts_three_times_per_point() {
        let inside = vote_weight(40, true) - BASE_WEIGHT;
        let outside = vote_weight(40, false) - BASE_WEIGHT;
        assert_eq!(inside, outside * 3.0);
    }

    #[test]
    fn negative_points_reduce_weight() {
        assert_eq!(vote_weight(-10, true), -14.0);
        assert_eq!(vote_weight(-1, false), 0.5);
    }
}
