//! Descriptive statistics over plain `f64` series.
//!
//! These functions never fail. Degenerate inputs yield the neutral value the
//! callers expect (`0.0` for empty sums and deviations) or `NaN` where no
//! meaningful answer exists (correlation of a constant series).

/// Total of all elements. An empty series sums to zero.
pub fn sum(series: &[f64]) -> f64 {
    series.iter().sum()
}

/// Arithmetic mean. An empty series has a mean of zero, not an error.
pub fn mean(series: &[f64]) -> f64 {
    if series.is_empty() {
        return 0.0;
    }
    sum(series) / series.len() as f64
}

/// Sample standard deviation (divides by `n - 1`). Fewer than two points yields zero.
pub fn std_dev(series: &[f64]) -> f64 {
    if series.len() < 2 {
        return 0.0;
    }
    let mu = mean(series);
    let squared: f64 = series.iter().map(|x| (x - mu).powi(2)).sum();
    (squared / (series.len() - 1) as f64).sqrt()
}

/// Linearly interpolated percentile of a sorted copy of `series`.
///
/// `p` is expressed in percent and clamped to `[0, 100]`. The fractional index
/// `(p / 100) * (n - 1)` is interpolated between its floor and ceiling.
/// An empty series has no percentile and yields `NaN`.
pub fn percentile(series: &[f64], p: f64) -> f64 {
    if series.is_empty() {
        return f64::NAN;
    }
    let mut sorted = series.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let index = (p.clamp(0.0, 100.0) / 100.0) * (sorted.len() - 1) as f64;
    let lower = index.floor();
    let upper = index.ceil();
    if lower == upper {
        return sorted[lower as usize];
    }
    let (lo, hi) = (sorted[lower as usize], sorted[upper as usize]);
    lo + (hi - lo) * (index - lower)
}

/// Pearson correlation using sample covariance over sample deviations.
///
/// Returns `NaN` when the lengths differ, when fewer than two pairs exist, or
/// when either series is constant.
pub fn correlation(a: &[f64], b: &[f64]) -> f64 {
    if a.len() != b.len() || a.len() < 2 {
        return f64::NAN;
    }
    let (sd_a, sd_b) = (std_dev(a), std_dev(b));
    if sd_a == 0.0 || sd_b == 0.0 {
        return f64::NAN;
    }
    let (mean_a, mean_b) = (mean(a), mean(b));
    let covariance = a
        .iter()
        .zip(b)
        .map(|(x, y)| (x - mean_a) * (y - mean_b))
        .sum::<f64>()
        / (a.len() - 1) as f64;
    covariance / (sd_a * sd_b)
}

/// The result of an ordinary least squares fit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
}

impl LinearFit {
    const UNDEFINED: LinearFit = LinearFit {
        slope: f64::NAN,
        intercept: f64::NAN,
        r_squared: f64::NAN,
    };

    /// Evaluates the fitted line at `x`.
    pub fn predict(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }
}

/// Ordinary least squares over `(x, y)` points via the sum-of-products formulas.
///
/// Fewer than two points leaves every output as `NaN`.
pub fn linear_regression(points: &[(f64, f64)]) -> LinearFit {
    if points.len() < 2 {
        return LinearFit::UNDEFINED;
    }
    let n = points.len() as f64;
    let (mut sx, mut sy, mut sxy, mut sx2, mut sy2) = (0.0, 0.0, 0.0, 0.0, 0.0);
    for &(x, y) in points {
        sx += x;
        sy += y;
        sxy += x * y;
        sx2 += x * x;
        sy2 += y * y;
    }

    let numerator = n * sxy - sx * sy;
    let slope = numerator / (n * sx2 - sx * sx);
    let intercept = (sy - slope * sx) / n;
    let r = numerator / ((n * sx2 - sx * sx) * (n * sy2 - sy * sy)).sqrt();

    LinearFit {
        slope,
        intercept,
        r_squared: r * r,
    }
}

/// Ratio of summed gains above `threshold` to summed losses below it.
///
/// With no losses at all the ratio is unbounded and `f64::INFINITY` is returned.
pub fn omega_ratio(returns: &[f64], threshold: f64) -> f64 {
    let gains: f64 = returns
        .iter()
        .filter(|&&r| r > threshold)
        .map(|r| r - threshold)
        .sum();
    let losses: f64 = returns
        .iter()
        .filter(|&&r| r < threshold)
        .map(|r| threshold - r)
        .sum();
    if losses == 0.0 {
        return f64::INFINITY;
    }
    gains / losses
}

/// Applies `f` to every contiguous window of `window` elements, sliding by one.
///
/// A series shorter than the window (or a zero window) produces nothing.
pub fn rolling<T, R, F>(series: &[T], window: usize, f: F) -> Vec<R>
where
    F: FnMut(&[T]) -> R,
{
    if window == 0 || series.len() < window {
        return Vec::new();
    }
    series.windows(window).map(f).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn sum_and_mean_of_small_series() {
        let s = [2.0, 4.0, 6.0];
        assert_eq!(sum(&s), 12.0);
        assert_eq!(mean(&s), 4.0);
        assert_eq!(mean(&[]), 0.0);
        assert_eq!(sum(&[]), 0.0);
    }

    #[test]
    fn std_dev_is_the_sample_estimator() {
        assert_eq!(std_dev(&[]), 0.0);
        assert_eq!(std_dev(&[5.0]), 0.0);
        assert_eq!(std_dev(&[3.0, 3.0, 3.0]), 0.0);
        // Population deviation would be 2.0; the sample estimator divides by n - 1.
        let s = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_relative_eq!(std_dev(&s), (32.0_f64 / 7.0).sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn percentile_interpolates_between_ranks() {
        let s = [15.0, 20.0, 35.0, 40.0, 50.0];
        assert_eq!(percentile(&s, 0.0), 15.0);
        assert_eq!(percentile(&s, 50.0), 35.0);
        assert_eq!(percentile(&s, 100.0), 50.0);
        // index = 0.4 * 4 = 1.6 -> 20 + 0.6 * 15
        assert_relative_eq!(percentile(&s, 40.0), 29.0, epsilon = 1e-12);
        assert!(percentile(&[], 50.0).is_nan());
    }

    #[test]
    fn percentile_does_not_mutate_input() {
        let s = vec![3.0, 1.0, 2.0];
        let _ = percentile(&s, 50.0);
        assert_eq!(s, vec![3.0, 1.0, 2.0]);
    }

    #[test]
    fn correlation_sentinels() {
        let x = [1.0, 2.0, 3.0, 4.0];
        assert_relative_eq!(correlation(&x, &x), 1.0, epsilon = 1e-12);
        let inverse = [4.0, 3.0, 2.0, 1.0];
        assert_relative_eq!(correlation(&x, &inverse), -1.0, epsilon = 1e-12);
        assert!(correlation(&x, &[1.0, 2.0]).is_nan());
        assert!(correlation(&[1.0], &[1.0]).is_nan());
        assert!(correlation(&x, &[2.0, 2.0, 2.0, 2.0]).is_nan());
    }

    #[test]
    fn regression_recovers_an_exact_line() {
        let points: Vec<(f64, f64)> = (0..10).map(|i| (i as f64, 3.0 + 2.0 * i as f64)).collect();
        let fit = linear_regression(&points);
        assert_relative_eq!(fit.slope, 2.0, epsilon = 1e-12);
        assert_relative_eq!(fit.intercept, 3.0, epsilon = 1e-12);
        assert_relative_eq!(fit.r_squared, 1.0, epsilon = 1e-12);
        assert_relative_eq!(fit.predict(20.0), 43.0, epsilon = 1e-9);
    }

    #[test]
    fn regression_needs_two_points() {
        let fit = linear_regression(&[(1.0, 1.0)]);
        assert!(fit.slope.is_nan() && fit.intercept.is_nan() && fit.r_squared.is_nan());
    }

    #[test]
    fn omega_ratio_without_losses_is_infinite() {
        assert_eq!(omega_ratio(&[0.01, 0.02], 0.0), f64::INFINITY);
        assert_relative_eq!(omega_ratio(&[0.03, -0.01, 0.01, -0.02], 0.0), 4.0 / 3.0, epsilon = 1e-12);
    }

    #[test]
    fn rolling_windows_slide_by_one() {
        let s = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(rolling(&s, 2, mean), vec![1.5, 2.5, 3.5]);
        assert!(rolling(&s, 5, mean).is_empty());
        assert!(rolling(&s, 0, mean).is_empty());
        assert_eq!(rolling(&s, 4, sum), vec![10.0]);
    }
}
