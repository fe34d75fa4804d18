use std::f64::consts::PI;

/// Standard normal cumulative distribution, P(Z <= x).
///
/// Uses the fixed-coefficient rational approximation from Hart (Abramowitz &
/// Stegun 26.2.17), accurate to roughly 1e-7.
pub fn cdf(x: f64) -> f64 {
    let t = 1.0 / (1.0 + 0.2316419 * x.abs());
    let d = 0.3989423 * (-x * x / 2.0).exp();
    let tail = d
        * t
        * (0.3193815 + t * (-0.3565638 + t * (1.781478 + t * (-1.821256 + t * 1.330274))));
    if x > 0.0 { 1.0 - tail } else { tail }
}

/// Standard normal probability density.
pub fn norm_pdf(x: f64) -> f64 {
    (-0.5 * x * x).exp() / (2.0 * PI).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn cdf_matches_reference_quantiles() {
        // The rational approximation is accurate to roughly 1e-7 near the centre.
        assert_abs_diff_eq!(cdf(0.0), 0.5, epsilon = 2e-7);
        assert_abs_diff_eq!(cdf(1.0), 0.841344746, epsilon = 1e-6);
        assert_abs_diff_eq!(cdf(-1.959964), 0.025, epsilon = 1e-6);
        assert_abs_diff_eq!(cdf(3.0), 0.998650102, epsilon = 1e-6);
    }

    #[test]
    fn cdf_is_symmetric() {
        for x in [0.1, 0.5, 1.3, 2.7] {
            assert_abs_diff_eq!(cdf(x) + cdf(-x), 1.0, epsilon = 1e-7);
        }
    }

    #[test]
    fn pdf_peaks_at_zero() {
        assert_abs_diff_eq!(norm_pdf(0.0), 0.3989422804, epsilon = 1e-9);
        assert!(norm_pdf(1.0) < norm_pdf(0.0));
        assert_abs_diff_eq!(norm_pdf(1.5), norm_pdf(-1.5), epsilon = 1e-15);
    }
}
