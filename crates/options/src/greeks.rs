//! First- and second-order Black-Scholes sensitivities.
//!
//! All values are annualized raw units. Display code divides theta by 365 for a
//! per-day figure and vega by 100 for a per-vol-point figure.

use crate::black_scholes::{d1_d2, inputs_are_valid};
use analytics::{cdf, norm_pdf};
use serde::{Deserialize, Serialize};

/// The Greeks of a vanilla option pair sharing one strike and expiry.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Greeks {
    pub delta_call: f64,
    pub delta_put: f64,
    pub gamma: f64,
    pub theta_call: f64,
    pub theta_put: f64,
    pub vega: f64,
    /// d(delta)/d(vol)
    pub vanna: f64,
    /// d(delta)/d(time)
    pub charm: f64,
}

impl Greeks {
    /// Theta of the call per calendar day.
    pub fn theta_call_per_day(&self) -> f64 {
        self.theta_call / 365.0
    }

    /// Theta of the put per calendar day.
    pub fn theta_put_per_day(&self) -> f64 {
        self.theta_put / 365.0
    }

    /// Vega per one percentage point of volatility.
    pub fn vega_per_point(&self) -> f64 {
        self.vega / 100.0
    }
}

/// Computes the Greeks bundle. Any non-positive `s`, `k`, `t`, `v` yields all zeros.
pub fn calculate_greeks(s: f64, k: f64, t: f64, v: f64, r: f64) -> Greeks {
    if !inputs_are_valid(s, k, t, v) {
        return Greeks::default();
    }

    let (d1, d2) = d1_d2(s, k, t, v, r);
    let sqrt_t = t.sqrt();
    let pdf_d1 = norm_pdf(d1);
    let discounted_strike = k * (-r * t).exp();

    let delta_call = cdf(d1);
    let gamma = pdf_d1 / (s * v * sqrt_t);
    let vega = s * pdf_d1 * sqrt_t;
    let theta_call = -(s * pdf_d1 * v) / (2.0 * sqrt_t) - r * discounted_strike * cdf(d2);
    let theta_put = theta_call + r * discounted_strike;

    // --- Second order ---
    let vanna = (vega / s) * (1.0 - d1 / (v * sqrt_t));
    let charm = -cdf(d1) * (r / t - d2 * v / (2.0 * t)) - pdf_d1 * (v / (2.0 * sqrt_t));

    Greeks {
        delta_call,
        delta_put: delta_call - 1.0,
        gamma,
        theta_call,
        theta_put,
        vega,
        vanna,
        charm,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::black_scholes::black_scholes;
    use approx::assert_relative_eq;
    use core_types::OptionType;

    #[test]
    fn atm_call_delta_is_above_one_half() {
        let g = calculate_greeks(100.0, 100.0, 1.0, 0.2, 0.05);
        assert!(g.delta_call > 0.5 && g.delta_call < 0.7);
        assert_relative_eq!(g.delta_put, g.delta_call - 1.0);
    }

    #[test]
    fn greeks_match_finite_differences() {
        let (s, k, t, v, r) = (100.0, 95.0, 0.5, 0.25, 0.03);
        let g = calculate_greeks(s, k, t, v, r);
        let h = 1e-4;

        let price = |s: f64, t: f64, v: f64| black_scholes(s, k, t, v, r, OptionType::Call);
        let delta = (price(s + h, t, v) - price(s - h, t, v)) / (2.0 * h);
        let gamma = (price(s + h, t, v) - 2.0 * price(s, t, v) + price(s - h, t, v)) / (h * h);
        let vega = (price(s, t, v + h) - price(s, t, v - h)) / (2.0 * h);
        let theta = -(price(s, t + h, v) - price(s, t - h, v)) / (2.0 * h);

        // The normal CDF approximation limits agreement to a few parts in 1e-5.
        assert_relative_eq!(g.delta_call, delta, epsilon = 1e-4);
        assert_relative_eq!(g.gamma, gamma, epsilon = 1e-3);
        assert_relative_eq!(g.vega, vega, epsilon = 1e-2);
        assert_relative_eq!(g.theta_call, theta, epsilon = 1e-2);
    }

    #[test]
    fn invalid_inputs_give_a_zero_bundle() {
        assert_eq!(calculate_greeks(100.0, 100.0, 0.0, 0.2, 0.05), Greeks::default());
        assert_eq!(calculate_greeks(100.0, 100.0, 1.0, -0.2, 0.05), Greeks::default());
    }

    #[test]
    fn display_conversions() {
        let g = Greeks {
            theta_call: -3.65,
            theta_put: -1.825,
            vega: 37.5,
            ..Greeks::default()
        };
        assert_relative_eq!(g.theta_call_per_day(), -0.01);
        assert_relative_eq!(g.theta_put_per_day(), -0.005);
        assert_relative_eq!(g.vega_per_point(), 0.375);
    }
}
