use crate::error::CalcError;
use crate::input::Inputs;
use crate::registry;
use crate::Calculator;
use core_types::CalculationResult;
use rand::RngCore;
use std::collections::HashMap;
use tracing::{debug, warn};

/// Runs calculators on raw user input.
///
/// The host is the single place where failures become data: whatever goes wrong
/// inside coercion or a calculator, the caller receives a well-formed batch of
/// results, with errors carried as `CalculationResult::Error`.
#[derive(Debug, Default)]
pub struct CalculatorHost {}

impl CalculatorHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up `id` in the catalog and evaluates it.
    ///
    /// # Returns
    ///
    /// `Err(CalcError::UnknownCalculator)` only when `id` is not in the catalog.
    /// Every other failure is reported inside the returned results.
    pub fn run(
        &self,
        id: &str,
        raw: &HashMap<String, String>,
        rng: &mut dyn RngCore,
    ) -> Result<Vec<CalculationResult>, CalcError> {
        let calculator = registry::find(id)?;
        Ok(self.evaluate(calculator, raw, rng))
    }

    /// Coerces `raw` against the calculator's fields and runs it.
    pub fn evaluate(
        &self,
        calculator: &Calculator,
        raw: &HashMap<String, String>,
        rng: &mut dyn RngCore,
    ) -> Vec<CalculationResult> {
        debug!(calculator = calculator.id, fields = raw.len(), "coercing inputs");
        let outcome = Inputs::coerce(calculator.inputs, raw)
            .and_then(|inputs| calculator.calculate(&inputs, rng));

        match outcome {
            Ok(results) => {
                let labels: Vec<&str> = results.iter().filter_map(CalculationResult::label).collect();
                debug!(calculator = calculator.id, ?labels, "calculation complete");
                results
            }
            Err(e) => {
                warn!(calculator = calculator.id, error = %e, "calculation failed");
                vec![CalculationResult::error(e.to_string())]
            }
        }
    }
}
