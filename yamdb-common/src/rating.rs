//! Rating aggregation
//!
//! A title's displayed rating is the arithmetic mean of its review scores,
//! recomputed on every read. The repository computes the mean with SQL
//! `AVG(score)`; this module pins the rounding rule.

/// Round an average score to the displayed integer rating.
///
/// Rounding rule: half-up (`f64::round` is half-away-from-zero, which is
/// half-up on the non-negative score scale). A title with no reviews has
/// no rating at all - never 0.
pub fn round_rating(average: Option<f64>) -> Option<i64> {
    average.map(|value| value.round() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_reviews_means_no_rating() {
        assert_eq!(round_rating(None), None);
    }

    #[test]
    fn exact_mean_passes_through() {
        // scores [8, 10] -> mean 9.0
        assert_eq!(round_rating(Some(9.0)), Some(9));
        assert_eq!(round_rating(Some(0.0)), Some(0));
        assert_eq!(round_rating(Some(10.0)), Some(10));
    }

    #[test]
    fn half_rounds_up() {
        // scores [8, 9] -> mean 8.5 -> 9 under half-up
        assert_eq!(round_rating(Some(8.5)), Some(9));
        assert_eq!(round_rating(Some(0.5)), Some(1));
        assert_eq!(round_rating(Some(7.4999)), Some(7));
        assert_eq!(round_rating(Some(7.5)), Some(8));
    }

    #[test]
    fn thirds_round_to_nearest() {
        // scores [10, 10, 9] -> mean 9.666... -> 10
        assert_eq!(round_rating(Some(29.0 / 3.0)), Some(10));
        // scores [1, 1, 2] -> mean 1.333... -> 1
        assert_eq!(round_rating(Some(4.0 / 3.0)), Some(1));
    }
}
