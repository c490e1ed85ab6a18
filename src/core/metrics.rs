//! Guarded arithmetic shared by every derivation engine.
//!
//! Each helper is total: a zero divisor resolves to a documented neutral value
//! instead of propagating NaN or infinity.

/// Period-over-period change of `current` relative to `previous`, in percent.
///
/// A zero baseline yields 100 when the current value is positive and 0
/// otherwise.
pub fn period_variance(current: f64, previous: f64) -> f64 {
    if previous == 0.0 {
        return if current > 0.0 { 100.0 } else { 0.0 };
    }
    (current - previous) / previous.abs() * 100.0
}

/// `numerator / denominator`, or `fallback` when the denominator is zero.
pub fn ratio_or(numerator: f64, denominator: f64, fallback: f64) -> f64 {
    if denominator == 0.0 {
        fallback
    } else {
        numerator / denominator
    }
}

/// `numerator` as a percentage of `denominator`, 0 for a zero denominator.
pub fn percent_of(numerator: f64, denominator: f64) -> f64 {
    ratio_or(numerator, denominator, 0.0) * 100.0
}

/// Population standard deviation; 0 for fewer than two values.
pub fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    variance.sqrt()
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Replace NaN and infinities with zero.
pub fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_period_variance_zero_baseline() {
        assert_eq!(period_variance(0.0, 0.0), 0.0);
        assert_eq!(period_variance(250.0, 0.0), 100.0);
        assert_eq!(period_variance(-250.0, 0.0), 0.0);
    }

    #[test]
    fn test_period_variance_uses_absolute_baseline() {
        assert_eq!(period_variance(120.0, 100.0), 20.0);
        // Moving from -100 to -50 is an improvement, not a decline
        assert_eq!(period_variance(-50.0, -100.0), 50.0);
    }

    #[test]
    fn test_std_dev_matches_population_formula() {
        let sd = std_dev(&[20.0, 18.0, 12.0]);
        assert!((sd - 3.399_346).abs() < 1e-5);
        assert_eq!(std_dev(&[5.0]), 0.0);
        assert_eq!(std_dev(&[]), 0.0);
    }

    #[test]
    fn test_ratio_and_percent_guards() {
        assert_eq!(ratio_or(5.0, 0.0, 1.0), 1.0);
        assert_eq!(percent_of(5.0, 0.0), 0.0);
        assert_eq!(percent_of(1.0, 4.0), 25.0);
    }

    #[test]
    fn test_finite_or_zero() {
        assert_eq!(finite_or_zero(f64::NAN), 0.0);
        assert_eq!(finite_or_zero(f64::INFINITY), 0.0);
        assert_eq!(finite_or_zero(-3.5), -3.5);
    }

    proptest! {
        #[test]
        fn variance_against_itself_is_zero(x in -1e9..1e9f64) {
            prop_assume!(x != 0.0);
            prop_assert_eq!(period_variance(x, x), 0.0);
        }

        #[test]
        fn variance_from_zero_baseline(x in -1e9..1e9f64) {
            let expected = if x > 0.0 { 100.0 } else { 0.0 };
            prop_assert_eq!(period_variance(x, 0.0), expected);
        }
    }
}
