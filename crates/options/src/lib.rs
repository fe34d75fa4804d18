//! # Quantdesk Option Pricing
//!
//! Closed-form and lattice pricing for vanilla options, built on the analytics kernel.
//!
//! ## Architectural Principles
//!
//! - **Layer 1 Logic:** Pure functions over `f64`. Depends only on `analytics` and
//!   `core-types`.
//! - **Guarded closed forms:** `black_scholes` and `calculate_greeks` return zero for
//!   non-positive inputs instead of failing. The trees and the implied volatility
//!   solver return a `PricingError` instead, since their callers have no sensible
//!   zero to fall back on.
//!
//! ## Public API
//!
//! - `black_scholes`: European price for either side.
//! - `Greeks`, `calculate_greeks`: first- and second-order sensitivities.
//! - `binomial_american_call`, `trinomial_american_call`: American call lattices.
//! - `implied_volatility`: bisection over Black-Scholes.
//! - `PricingError`: the error type of this crate.

pub mod black_scholes;
pub mod error;
pub mod greeks;
pub mod implied;
pub mod trees;

// Re-export the key components to create a clean, public-facing API.
pub use black_scholes::black_scholes;
pub use error::PricingError;
pub use greeks::{calculate_greeks, Greeks};
pub use implied::implied_volatility;
pub use trees::{binomial_american_call, trinomial_american_call, MAX_TREE_STEPS};

// Re-export OptionType from core_types
pub use core_types::OptionType;
