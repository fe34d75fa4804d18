use options::PricingError;
use thiserror::Error;

/// Everything that can stop a calculator from producing its normal output.
///
/// The host turns every variant into a `CalculationResult::Error` whose message is
/// this type's `Display` output, so the messages here are written for end users.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CalcError {
    /// A `number` field held text that does not start with a number.
    #[error("Invalid number for \"{label}\". Please enter a valid number.")]
    InvalidNumber { label: String },

    /// A required `number` field was left empty.
    #[error("Please enter a value for \"{0}\".")]
    MissingInput(String),

    /// A calculator-specific precondition failed.
    #[error("{0}")]
    Domain(String),

    /// A multi-line record had the wrong shape.
    #[error("{0}")]
    MalformedRow(String),

    /// A root finder ended on its search boundary.
    #[error("{0}")]
    NonConvergence(String),

    #[error("Calculator '{0}' not found")]
    UnknownCalculator(String),

    #[error(transparent)]
    Pricing(#[from] PricingError),
}

impl CalcError {
    pub fn domain(message: impl Into<String>) -> Self {
        Self::Domain(message.into())
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedRow(message.into())
    }

    pub fn non_convergence(message: impl Into<String>) -> Self {
        Self::NonConvergence(message.into())
    }
}
