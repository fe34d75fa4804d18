//! One-dimensional root finders.

use tracing::debug;

/// Default tolerance on `|f(x) - target|` for [`bisection`].
pub const DEFAULT_TOLERANCE: f64 = 1e-5;
/// Default iteration cap for [`bisection`].
pub const DEFAULT_MAX_ITERATIONS: usize = 100;

/// Searches `[low, high]` for `x` such that `f(x)` is within `tolerance` of `target`.
///
/// `f` is assumed to be increasing over the interval. The search stops early when
/// the midpoint can no longer move (floating-point precision floor) or when the
/// tolerance is met. Otherwise the last midpoint after `max_iterations` is returned.
///
/// The result is not checked against the bounds. A result sitting at either end of
/// the interval means the target was never bracketed, and callers must report that
/// as non-convergence.
pub fn bisection<F>(
    mut f: F,
    target: f64,
    mut low: f64,
    mut high: f64,
    tolerance: f64,
    max_iterations: usize,
) -> f64
where
    F: FnMut(f64) -> f64,
{
    let mut mid = 0.0;
    for _ in 0..max_iterations {
        mid = (low + high) / 2.0;
        if mid == low || mid == high {
            return mid;
        }
        let estimate = f(mid);
        if (estimate - target).abs() < tolerance {
            return mid;
        }
        if estimate > target {
            high = mid;
        } else {
            low = mid;
        }
    }
    mid
}

/// Net present value of `cashflows` at `rate`, with `cashflows[0]` at period zero.
pub fn npv(cashflows: &[f64], rate: f64) -> f64 {
    cashflows
        .iter()
        .enumerate()
        .map(|(t, cf)| cf / (1.0 + rate).powi(t as i32))
        .sum()
}

/// Internal rate of return of a cash-flow series.
///
/// Runs Newton-Raphson from `guess` for up to 100 iterations (step tolerance 1e-7).
/// If the derivative collapses or the iteration fails to settle, falls back to a
/// bisection over `[-0.99, 2.0]`.
pub fn solve_irr(cashflows: &[f64], guess: f64) -> f64 {
    const MAX_ITERATIONS: usize = 100;
    const TOLERANCE: f64 = 1e-7;

    let mut x0 = guess;
    for _ in 0..MAX_ITERATIONS {
        let mut value = 0.0;
        let mut derivative = 0.0;
        for (t, cf) in cashflows.iter().enumerate() {
            let t = t as i32;
            value += cf / (1.0 + x0).powi(t);
            derivative += -(t as f64) * cf / (1.0 + x0).powi(t + 1);
        }

        if derivative.abs() < 1e-10 {
            break;
        }

        let x1 = x0 - value / derivative;
        if (x1 - x0).abs() < TOLERANCE {
            return x1;
        }
        x0 = x1;
    }

    debug!(flows = cashflows.len(), "Newton-Raphson did not converge; falling back to bisection");
    let (low, high) = (IRR_FALLBACK_LOW, IRR_FALLBACK_HIGH);
    // Bisection needs an increasing function; conventional flows give a falling NPV.
    if npv(cashflows, low) > npv(cashflows, high) {
        bisection(|r| -npv(cashflows, r), 0.0, low, high, 1e-6, 100)
    } else {
        bisection(|r| npv(cashflows, r), 0.0, low, high, 1e-6, 100)
    }
}

/// Lower bound of the IRR bisection fallback.
pub const IRR_FALLBACK_LOW: f64 = -0.99;
/// Upper bound of the IRR bisection fallback.
pub const IRR_FALLBACK_HIGH: f64 = 2.0;
