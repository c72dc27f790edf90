//! Rating aggregation.
//!
//! A title's rating is the average of its review scores, or `None`
//! when it has no reviews. Storage backends recompute it inside the
//! same transaction as the review mutation, so the mutation and the
//! recompute commit or fail together.

/// Average the given scores. `None` for an empty slice.
#[must_use]
#[allow(clippy::cast_precision_loss)] // scores are tiny integers
pub fn average(scores: &[i16]) -> Option<f64> {
    if scores.is_empty() {
        return None;
    }
    let sum: i64 = scores.iter().map(|s| i64::from(*s)).sum();
    Some(sum as f64 / scores.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_reviews_means_no_rating() {
        assert_eq!(average(&[]), None);
    }

    #[test]
    fn test_single_review_is_its_own_average() {
        assert_eq!(average(&[8]), Some(8.0));
    }

    #[test]
    fn test_spec_worked_example() {
        // 8 → 8, add 6 → 7, drop the 8 → 6
        assert_eq!(average(&[8]), Some(8.0));
        assert_eq!(average(&[8, 6]), Some(7.0));
        assert_eq!(average(&[6]), Some(6.0));
    }

    #[test]
    fn test_fractional_average_is_exact() {
        assert_eq!(average(&[10, 9]), Some(9.5));
        assert_eq!(average(&[1, 2, 2]), Some(5.0 / 3.0));
    }
}
