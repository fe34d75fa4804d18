use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PricingError {
    #[error("Invalid pricing parameters: {0}")]
    InvalidParameters(String),

    /// The solver ran into its search boundary. The message is user-facing.
    #[error("{0}")]
    NonConvergence(String),
}
