//! Lattice pricers for American calls.
//!
//! Both trees assume no dividends and a constant rate and volatility. Accuracy
//! is governed solely by the step count; there is no adaptive refinement.

use crate::error::PricingError;

/// Largest step count either tree accepts. Work grows with the square of the steps.
pub const MAX_TREE_STEPS: usize = 10_000;

fn validate(s: f64, k: f64, t: f64, v: f64, steps: usize) -> Result<(), PricingError> {
    if !(s > 0.0 && k > 0.0 && t > 0.0 && v > 0.0) {
        return Err(PricingError::InvalidParameters(
            "stock price, strike, time and volatility must all be positive".to_string(),
        ));
    }
    if steps == 0 {
        return Err(PricingError::InvalidParameters(
            "the tree needs at least one step".to_string(),
        ));
    }
    if steps > MAX_TREE_STEPS {
        return Err(PricingError::InvalidParameters(format!(
            "the tree allows at most {MAX_TREE_STEPS} steps"
        )));
    }
    Ok(())
}

/// Prices an American call on a Cox-Ross-Rubinstein binomial tree.
///
/// # Arguments
///
/// * `s`, `k` - Spot and strike.
/// * `t` - Time to expiry in years.
/// * `v`, `r` - Volatility and risk-free rate as decimals.
/// * `steps` - Number of time steps; the tree has `steps + 1` terminal nodes.
pub fn binomial_american_call(
    s: f64,
    k: f64,
    t: f64,
    v: f64,
    r: f64,
    steps: usize,
) -> Result<f64, PricingError> {
    validate(s, k, t, v, steps)?;

    let dt = t / steps as f64;
    let u = (v * dt.sqrt()).exp();
    let d = 1.0 / u;
    let p = ((r * dt).exp() - d) / (u - d);
    let discount = (-r * dt).exp();
    let node_price = |ups: usize, level: usize| s * u.powi(ups as i32) * d.powi((level - ups) as i32);

    let mut values: Vec<f64> = (0..=steps)
        .map(|i| (node_price(i, steps) - k).max(0.0))
        .collect();

    for level in (0..steps).rev() {
        for i in 0..=level {
            let exercise = (node_price(i, level) - k).max(0.0);
            let hold = (p * values[i + 1] + (1.0 - p) * values[i]) * discount;
            values[i] = exercise.max(hold);
        }
    }

    Ok(values[0])
}

/// Prices an American call on a recombining trinomial tree.
///
/// Node `i` of level `j` sits at `s * u^(j - i)`, so index 0 is the highest
/// price and each node's children are `i`, `i + 1`, `i + 2` (up, middle, down).
pub fn trinomial_american_call(
    s: f64,
    k: f64,
    t: f64,
    v: f64,
    r: f64,
    steps: usize,
) -> Result<f64, PricingError> {
    validate(s, k, t, v, steps)?;

    let dt = t / steps as f64;
    let u = (v * (2.0 * dt).sqrt()).exp();
    let half_up = (v * (dt / 2.0).sqrt()).exp();
    let half_down = (-v * (dt / 2.0).sqrt()).exp();
    let drift = (r * dt / 2.0).exp();

    let pu = ((drift - half_down) / (half_up - half_down)).powi(2);
    let pd = ((half_up - drift) / (half_up - half_down)).powi(2);
    let pm = 1.0 - pu - pd;
    let discount = (-r * dt).exp();
    let node_price = |level: usize, i: usize| s * u.powi(level as i32 - i as i32);

    let mut values: Vec<f64> = (0..=2 * steps)
        .map(|i| (node_price(steps, i) - k).max(0.0))
        .collect();

    for level in (0..steps).rev() {
        for i in 0..=2 * level {
            let continuation = discount * (pu * values[i] + pm * values[i + 1] + pd * values[i + 2]);
            values[i] = (node_price(level, i) - k).max(continuation);
        }
    }

    Ok(values[0])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::black_scholes::black_scholes;
    use approx::assert_relative_eq;
    use core_types::OptionType;

    #[test]
    fn binomial_converges_to_black_scholes() {
        // Without dividends an American call is never exercised early.
        let bs = black_scholes(100.0, 100.0, 1.0, 0.2, 0.05, OptionType::Call);
        let tree = binomial_american_call(100.0, 100.0, 1.0, 0.2, 0.05, 200).unwrap();
        assert_relative_eq!(tree, bs, max_relative = 0.01);
    }

    #[test]
    fn trinomial_converges_to_black_scholes() {
        let bs = black_scholes(100.0, 110.0, 0.5, 0.3, 0.04, OptionType::Call);
        let tree = trinomial_american_call(100.0, 110.0, 0.5, 0.3, 0.04, 200).unwrap();
        assert_relative_eq!(tree, bs, max_relative = 0.01);
    }

    #[test]
    fn single_step_binomial_by_hand() {
        let (s, k, t, v, r): (f64, f64, f64, f64, f64) = (100.0, 100.0, 1.0, 0.2, 0.05);
        let u = v.exp();
        let d = 1.0 / u;
        let p = (r.exp() - d) / (u - d);
        let expected = (p * (s * u - k) * (-r).exp()).max(0.0);
        let tree = binomial_american_call(s, k, t, v, r, 1).unwrap();
        assert_relative_eq!(tree, expected, epsilon = 1e-12);
    }

    #[test]
    fn deep_in_the_money_is_worth_at_least_intrinsic() {
        let price = trinomial_american_call(150.0, 100.0, 0.25, 0.2, 0.01, 50).unwrap();
        assert!(price >= 50.0);
    }

    #[test]
    fn zero_steps_is_rejected() {
        assert!(binomial_american_call(100.0, 100.0, 1.0, 0.2, 0.05, 0).is_err());
        assert!(trinomial_american_call(100.0, 100.0, 1.0, -0.2, 0.05, 10).is_err());
    }

    #[test]
    fn step_count_is_capped() {
        let err = binomial_american_call(100.0, 100.0, 1.0, 0.2, 0.05, usize::MAX).unwrap_err();
        assert!(matches!(err, PricingError::InvalidParameters(_)));
        assert!(trinomial_american_call(100.0, 100.0, 1.0, 0.2, 0.05, MAX_TREE_STEPS + 1).is_err());
    }
}
