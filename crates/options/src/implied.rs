use crate::black_scholes::black_scholes;
use crate::error::PricingError;
use analytics::bisection;
use core_types::OptionType;
use tracing::debug;

/// Lower end of the implied volatility search.
pub const IV_LOWER_BOUND: f64 = 0.001;
/// Upper end of the implied volatility search.
pub const IV_UPPER_BOUND: f64 = 5.0;
/// Any solution at or above this value is treated as a failure to bracket the price.
pub const IV_CONVERGENCE_CEILING: f64 = 4.99;

/// Solves for the volatility at which the Black-Scholes price equals `market_price`.
///
/// Bisects over `[0.001, 5.0]` with a price tolerance of 1e-5. The price is
/// increasing in volatility, which is what the bisection requires. A result pinned
/// near the upper bound means no volatility in range reproduces the price.
pub fn implied_volatility(
    s: f64,
    k: f64,
    t: f64,
    r: f64,
    market_price: f64,
    option_type: OptionType,
) -> Result<f64, PricingError> {
    let iv = bisection(
        |vol| black_scholes(s, k, t, vol, r, option_type),
        market_price,
        IV_LOWER_BOUND,
        IV_UPPER_BOUND,
        1e-5,
        100,
    );

    if iv >= IV_CONVERGENCE_CEILING {
        debug!(iv, market_price, "implied volatility pinned to the upper bound");
        return Err(PricingError::NonConvergence(
            "Could not converge. Check inputs or market price.".to_string(),
        ));
    }
    Ok(iv)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn recovers_the_volatility_used_to_price() {
        for (vol, side) in [(0.2, OptionType::Call), (0.45, OptionType::Put)] {
            let price = black_scholes(100.0, 105.0, 0.25, vol, 0.05, side);
            let iv = implied_volatility(100.0, 105.0, 0.25, 0.05, price, side).unwrap();
            assert_abs_diff_eq!(iv, vol, epsilon = 1e-3);
        }
    }

    #[test]
    fn unreachable_price_is_an_error() {
        // A call can never be worth more than the stock itself.
        let err = implied_volatility(100.0, 105.0, 0.25, 0.05, 150.0, OptionType::Call).unwrap_err();
        assert_eq!(err.to_string(), "Could not converge. Check inputs or market price.");
    }
}
