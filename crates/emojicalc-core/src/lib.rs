//! Core calculation model for Emojicalc.
//!
//! This crate owns everything the calculator knows about arithmetic, with no
//! knowledge of HTTP or views:
//!
//! - [`Symbol`] - the display glyph and human name of an operator
//! - [`Operator`] - one arithmetic capability, implemented by [`Addition`],
//!   [`Subtraction`], [`Multiply`] and [`Division`]
//! - [`Operators`] - the ordered, duplicate-rejecting operator registry
//! - [`calculate_guarded`] - runs a calculation inside a fault guard
//! - [`number`] - decimal parsing and display formatting for operands and results
//!
//! # Example
//!
//! ```
//! use emojicalc_core::{default_operators, calculate_guarded};
//!
//! let operators = default_operators();
//! let subtraction = operators.find_by_type("-").unwrap();
//!
//! let result = calculate_guarded(subtraction.as_ref(), 102.43, 43.32).unwrap();
//! assert_eq!(emojicalc_core::number::format_number(result), "59.11");
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod calculation;
mod error;
pub mod number;
mod operator;
mod operators;
mod symbol;

pub use calculation::calculate_guarded;
pub use error::{CalculationFault, OperatorsError};
pub use operator::{Addition, Division, Multiply, Operator, Subtraction};
pub use operators::{default_operators, Operators};
pub use symbol::Symbol;
