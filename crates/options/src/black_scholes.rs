use analytics::cdf;
use core_types::OptionType;

/// Returns `true` when every Black-Scholes input that must be positive is.
pub(crate) fn inputs_are_valid(s: f64, k: f64, t: f64, v: f64) -> bool {
    s > 0.0 && k > 0.0 && t > 0.0 && v > 0.0
}

/// The `(d1, d2)` pair shared by the closed-form price and its Greeks.
pub(crate) fn d1_d2(s: f64, k: f64, t: f64, v: f64, r: f64) -> (f64, f64) {
    let vol_sqrt_t = v * t.sqrt();
    let d1 = ((s / k).ln() + (r + v * v / 2.0) * t) / vol_sqrt_t;
    (d1, d1 - vol_sqrt_t)
}

/// Black-Scholes price of a European option on a non-dividend-paying underlying.
///
/// # Arguments
///
/// * `s` - Spot price.
/// * `k` - Strike price.
/// * `t` - Time to expiry in years.
/// * `v` - Annualized volatility as a decimal (0.2 for 20%).
/// * `r` - Continuously compounded risk-free rate as a decimal.
///
/// # Returns
///
/// The option price, or `0.0` when any of `s`, `k`, `t`, `v` is not positive.
/// A zero price is therefore ambiguous and callers must validate inputs first.
pub fn black_scholes(s: f64, k: f64, t: f64, v: f64, r: f64, option_type: OptionType) -> f64 {
    if !inputs_are_valid(s, k, t, v) {
        return 0.0;
    }
    let (d1, d2) = d1_d2(s, k, t, v, r);
    let discounted_strike = k * (-r * t).exp();
    match option_type {
        OptionType::Call => s * cdf(d1) - discounted_strike * cdf(d2),
        OptionType::Put => discounted_strike * cdf(-d2) - s * cdf(-d1),
    }
}
