//! Numeric indicators shared by the strategy modules.

pub mod volatility;

/// Clamp a value into `[lo, hi]`.
///
/// A NaN input comes back as `lo`, so callers filter non-finite values
/// before clamping.
pub fn clamp(value: f64, lo: f64, hi: f64) -> f64 {
    value.max(lo).min(hi)
}

/// Clamp a value into the probability range `[0, 1]`.
pub fn clamp_probability(value: f64) -> f64 {
    clamp(value, 0.0, 1.0)
}

/// Bessel-corrected sample standard deviation (divides by `n - 1`).
///
/// Returns `None` with fewer than two samples or a non-finite result.
pub fn sample_std_dev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    let std = variance.sqrt();
    std.is_finite().then_some(std)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_keeps_valid_probabilities() {
        for p in [0.0, 0.001, 0.25, 0.5, 0.999, 1.0] {
            assert_eq!(clamp_probability(p), p);
        }
    }

    #[test]
    fn test_clamp_bounds_finite_inputs() {
        for x in [-1e12, -3.5, -0.0001, 1.0001, 7.0, 1e300] {
            let c = clamp_probability(x);
            assert!((0.0..=1.0).contains(&c), "{x} clamped to {c}");
        }
        assert_eq!(clamp(-2.0, -1.0, 1.0), -1.0);
        assert_eq!(clamp(2.0, -1.0, 1.0), 1.0);
    }

    #[test]
    fn test_clamp_nan_returns_lower_bound() {
        assert_eq!(clamp(f64::NAN, -1.0, 1.0), -1.0);
        assert_eq!(clamp_probability(f64::NAN), 0.0);
    }

    #[test]
    fn test_sample_std_dev_bessel() {
        // mean 5, squared deviations sum 32, / (8 - 1)
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let std = sample_std_dev(&values).unwrap();
        assert!((std - (32.0f64 / 7.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_sample_std_dev_needs_two_samples() {
        assert!(sample_std_dev(&[]).is_none());
        assert!(sample_std_dev(&[0.5]).is_none());
        assert_eq!(sample_std_dev(&[0.5, 0.5]), Some(0.0));
    }

    #[test]
    fn test_sample_std_dev_non_finite() {
        assert!(sample_std_dev(&[1.0, f64::INFINITY]).is_none());
    }
}
