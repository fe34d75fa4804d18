//! # Quantdesk Core Types
//!
//! The shared vocabulary of the calculator catalog. Every other crate speaks in
//! these types: the declared shape of a calculator's inputs, the tagged result a
//! calculator produces, and the formatting helpers that turn raw numbers into the
//! strings a user actually sees.
//!
//! ## Architectural Principles
//!
//! - **Layer 0:** This crate depends on nothing else in the workspace.
//! - **Data, not behavior:** Apart from formatting, nothing here computes anything.

pub mod enums;
pub mod error;
pub mod format;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use enums::{Category, InputKind, OptionType};
pub use error::CoreError;
pub use format::{format_currency, format_number, format_percent};
pub use structs::{CalculationResult, Cell, InputField, TableResult};
