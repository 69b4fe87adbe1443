//! Standard normal tail probabilities.

use statrs::distribution::{ContinuousCDF, Normal};

/// Probability that a standard normal variate falls outside `[-z, z]`.
///
/// Computed as `1 - (Φ(z) - Φ(-z))`, symmetric in the sign of `z`.
#[must_use]
pub fn tail_probability(z: f64) -> f64 {
    let z = z.abs();
    Normal::new(0.0, 1.0).map_or(f64::NAN, |n| n.cdf(-z) - n.cdf(z) + 1.0)
}

/// Number of breaches of threshold `z` expected among `n` normal draws,
/// rounded up.
#[must_use]
pub fn expected_breaches(n: usize, z: f64) -> u64 {
    let expected = (n as f64 * tail_probability(z)).ceil();
    if expected.is_finite() && expected > 0.0 { expected as u64 } else { 0 }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(1.645, 0.0999)]
    #[case(1.96, 0.05)]
    #[case(2.575, 0.01)]
    #[case(3.0, 0.0027)]
    fn tail_probabilities(#[case] z: f64, #[case] p: f64) {
        assert_relative_eq!(tail_probability(z), p, epsilon = 1e-3);
        assert_relative_eq!(tail_probability(-z), tail_probability(z), epsilon = 1e-15);
    }

    #[rstest]
    #[case(10, 1.96, 1)]
    #[case(100, 1.96, 5)]
    #[case(101, 1.96, 6)]
    #[case(0, 1.96, 0)]
    #[case(1000, 3.0, 3)]
    fn expected_counts_round_up(#[case] n: usize, #[case] z: f64, #[case] expected: u64) {
        assert_eq!(expected_breaches(n, z), expected);
    }
}
