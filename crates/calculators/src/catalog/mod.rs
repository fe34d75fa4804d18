//! The concrete calculators, one module per category.
//!
//! Each module exposes a `CALCULATORS` slice in display order. Adding a calculator
//! means writing its compute function, declaring its `Calculator` constant, and
//! listing it in that slice; the registry picks it up from there.

pub mod backtesting;
pub mod commodities;
pub mod crypto;
pub mod forex;
pub mod general;
pub mod market_analysis;
pub mod meta;
pub mod options;
pub mod order_flow;
pub mod portfolio;
pub mod quant;
pub mod risk;
pub mod stocks;
pub mod taxes;
pub mod trading_analytics;
pub mod valuation;

use crate::error::CalcError;
use analytics::{npv, solve_irr};
use core_types::CalculationResult;

/// Shorthand for a labeled scalar result.
pub(crate) fn kv(label: impl Into<String>, value: impl Into<String>) -> CalculationResult {
    CalculationResult::key_value(label, value)
}

/// Fails with a domain error unless `condition` holds.
pub(crate) fn ensure(condition: bool, message: &str) -> Result<(), CalcError> {
    if condition {
        Ok(())
    } else {
        Err(CalcError::domain(message))
    }
}

/// The largest value, or `-inf` for an empty slice.
pub(crate) fn max_of(values: &[f64]) -> f64 {
    values.iter().copied().fold(f64::NEG_INFINITY, f64::max)
}

/// The smallest value, or `+inf` for an empty slice.
pub(crate) fn min_of(values: &[f64]) -> f64 {
    values.iter().copied().fold(f64::INFINITY, f64::min)
}

/// The last `n` elements, or all of them when there are fewer.
pub(crate) fn tail<T>(values: &[T], n: usize) -> &[T] {
    &values[values.len().saturating_sub(n)..]
}

/// Solves for the IRR of `flows` and rejects answers that do not zero the NPV.
///
/// The bisection fallback inside the solver returns a search boundary when no sign
/// change exists, so the root is checked against the cash flows themselves.
pub(crate) fn checked_irr(flows: &[f64]) -> Result<f64, CalcError> {
    let irr = solve_irr(flows, 0.1);
    let scale = flows.iter().fold(1.0_f64, |acc, cf| acc.max(cf.abs()));
    if irr.is_finite() && irr > -1.0 && npv(flows, irr).abs() <= 1e-4 * scale {
        Ok(irr)
    } else {
        Err(CalcError::non_convergence(
            "Could not find an IRR for these cash flows.",
        ))
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use crate::input::Inputs;
    use crate::{Calculator, Outcome};
    use core_types::{CalculationResult, TableResult};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::collections::HashMap;

    /// Coerces `pairs` and runs `calc` with a fixed-seed generator.
    pub fn run(calc: &Calculator, pairs: &[(&str, &str)]) -> Outcome {
        run_seeded(calc, pairs, 7)
    }

    pub fn run_seeded(calc: &Calculator, pairs: &[(&str, &str)], seed: u64) -> Outcome {
        let raw: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let inputs = Inputs::coerce(calc.inputs, &raw)?;
        calc.calculate(&inputs, &mut ChaCha8Rng::seed_from_u64(seed))
    }

    /// The formatted value of the key/value result labeled `label`.
    pub fn value_of(results: &[CalculationResult], label: &str) -> String {
        results
            .iter()
            .find_map(|r| match r {
                CalculationResult::KeyValue { label: l, value, .. } if l == label => {
                    Some(value.clone())
                }
                _ => None,
            })
            .unwrap_or_else(|| panic!("no result labeled {label}"))
    }

    /// The first table in a batch.
    pub fn table_of(results: &[CalculationResult]) -> &TableResult {
        results
            .iter()
            .find_map(|r| match r {
                CalculationResult::Table { table, .. } => Some(table),
                _ => None,
            })
            .expect("no table result")
    }
}
