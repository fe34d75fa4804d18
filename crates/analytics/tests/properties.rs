use analytics::{correlation, mean, percentile, rolling, std_dev, sum};
use proptest::prelude::*;

fn series() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(-1.0e6..1.0e6f64, 0..64)
}

proptest! {
    #[test]
    fn std_dev_is_never_negative(s in series()) {
        prop_assert!(std_dev(&s) >= 0.0);
    }

    #[test]
    fn mean_lies_between_extremes(s in prop::collection::vec(-1.0e6..1.0e6f64, 1..64)) {
        let lo = s.iter().cloned().fold(f64::INFINITY, f64::min);
        let hi = s.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let m = mean(&s);
        prop_assert!(m >= lo - 1e-6 && m <= hi + 1e-6);
    }

    #[test]
    fn percentile_stays_within_range(s in prop::collection::vec(-1.0e6..1.0e6f64, 1..64), p in 0.0..=100.0f64) {
        let lo = s.iter().cloned().fold(f64::INFINITY, f64::min);
        let hi = s.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let v = percentile(&s, p);
        prop_assert!(v >= lo && v <= hi);
    }

    #[test]
    fn self_correlation_is_one(s in prop::collection::vec(-1.0e3..1.0e3f64, 2..32)) {
        prop_assume!(std_dev(&s) > 1e-6);
        prop_assert!((correlation(&s, &s) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn rolling_yields_one_value_per_window(s in series(), window in 1usize..10) {
        let out = rolling(&s, window, sum);
        let expected = if s.len() < window { 0 } else { s.len() - window + 1 };
        prop_assert_eq!(out.len(), expected);
    }

    #[test]
    fn constant_series_has_zero_deviation(value in -1.0e6..1.0e6f64, n in 2usize..20) {
        // The mean of repeated values can be off by an ulp, so allow rounding noise.
        prop_assert!(std_dev(&vec![value; n]) <= 1e-9 * value.abs().max(1.0));
    }
}
