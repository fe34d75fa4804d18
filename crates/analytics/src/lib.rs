//! # Quantdesk Analytics Kernel
//!
//! The numerical core every calculator leans on: descriptive statistics, the
//! standard normal distribution, and one-dimensional root finding.
//!
//! ## Architectural Principles
//!
//! - **Layer 1 Logic:** A pure logic crate with no knowledge of inputs, formatting, or
//!   the calculator contract.
//! - **Sentinels, not errors:** Degenerate inputs produce `0.0` or `NaN` exactly as
//!   documented on each function. Interpreting a sentinel is the caller's job.
//! - **Deterministic:** Every function here is a pure function of its arguments.
//!
//! ## Public API
//!
//! - `stats`: `sum`, `mean`, `std_dev`, `percentile`, `correlation`,
//!   `linear_regression`, `omega_ratio`, `rolling`.
//! - `distribution`: `cdf`, `norm_pdf`.
//! - `solvers`: `bisection`, `npv`, `solve_irr`.

pub mod distribution;
pub mod solvers;
pub mod stats;

// Re-export the key components to create a clean, public-facing API.
pub use distribution::{cdf, norm_pdf};
pub use solvers::{bisection, npv, solve_irr};
pub use stats::{
    correlation, linear_regression, mean, omega_ratio, percentile, rolling, std_dev, sum,
    LinearFit,
};
