//! # Quantdesk Calculators
//!
//! The calculator contract and the catalog of concrete calculators built on it.
//!
//! ## Architectural Principles
//!
//! - **Layer 2 Logic:** Depends on `core-types` for the contract's data, on
//!   `analytics` and `options` for the math. It knows nothing about how inputs are
//!   collected or how results are displayed.
//! - **One coercion stage:** Raw strings become a typed [`Inputs`] map before any
//!   calculator runs. Calculators never see untyped text for `number` fields.
//! - **Errors are values:** A calculator returns `Result<Vec<CalculationResult>, CalcError>`,
//!   and the [`CalculatorHost`] folds every `Err` into an error-variant result.
//! - **Explicit randomness:** Monte Carlo calculators are declared
//!   [`Compute::Stochastic`] and draw only from the generator they are handed.
//!
//! ## Public API
//!
//! - `Calculator`, `Compute`: a calculator's definition and its compute function.
//! - `Inputs`, `InputValue`: the typed input map.
//! - `CalculatorHost`: coerces, invokes, and converts failures.
//! - `registry`: lookup of the full catalog by id or category.
//! - `parse`: series and row-record parsing.

pub mod catalog;
pub mod error;
pub mod host;
pub mod input;
pub mod parse;
pub mod registry;

// Re-export the key components to create a clean, public-facing API.
pub use error::CalcError;
pub use host::CalculatorHost;
pub use input::{InputValue, Inputs};
pub use registry::{all, by_category, find};

use core_types::{CalculationResult, Category, InputField};
use rand::RngCore;

/// What a calculator returns: one or more results, or the reason it could not run.
pub type Outcome = Result<Vec<CalculationResult>, CalcError>;

/// The compute function of a calculator.
#[derive(Debug, Clone, Copy)]
pub enum Compute {
    /// A deterministic function of the inputs.
    Pure(fn(&Inputs) -> Outcome),
    /// A Monte Carlo routine that draws from the injected generator.
    Stochastic(fn(&Inputs, &mut dyn RngCore) -> Outcome),
}

/// A named, categorized calculation with its declared inputs.
#[derive(Debug, Clone, Copy)]
pub struct Calculator {
    /// Stable identifier, e.g. `"black-scholes"`.
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub category: Category,
    /// Input fields in display order.
    pub inputs: &'static [InputField],
    pub compute: Compute,
}

impl Calculator {
    /// Runs the compute function on already coerced inputs.
    ///
    /// `rng` is only touched by stochastic calculators.
    pub fn calculate(&self, inputs: &Inputs, rng: &mut dyn RngCore) -> Outcome {
        match self.compute {
            Compute::Pure(f) => f(inputs),
            Compute::Stochastic(f) => f(inputs, rng),
        }
    }

    pub fn is_stochastic(&self) -> bool {
        matches!(self.compute, Compute::Stochastic(_))
    }

    pub fn field(&self, name: &str) -> Option<&'static InputField> {
        self.inputs.iter().find(|f| f.name == name)
    }
}
