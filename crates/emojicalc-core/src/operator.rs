//! Arithmetic operators.
//!
//! The operator set is closed: [`Addition`], [`Subtraction`], [`Multiply`]
//! and [`Division`]. Each carries its own [`Symbol`] and a fixed type tag
//! and name.

use std::fmt;

use crate::{CalculationFault, Symbol};

/// One arithmetic capability paired with a display symbol.
///
/// Implementations must keep [`operator_type`](Operator::operator_type) and
/// [`name`](Operator::name) fixed for the lifetime of the value.
pub trait Operator: Send + Sync + fmt::Debug {
    /// Returns the type tag (`+`, `-`, `*` or `/`).
    fn operator_type(&self) -> &'static str;

    /// Returns the lower-case operator name, e.g. `"subtraction"`.
    fn name(&self) -> &'static str;

    /// Returns the display symbol.
    fn symbol(&self) -> &Symbol;

    /// Applies the operator to two operands.
    fn calculate(&self, first: f64, second: f64) -> Result<f64, CalculationFault>;
}

/// Adds the second operand to the first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Addition {
    symbol: Symbol,
}

impl Addition {
    /// Creates an addition operator shown as `symbol`.
    #[must_use]
    pub fn new(symbol: Symbol) -> Self {
        Self { symbol }
    }
}

impl Operator for Addition {
    fn operator_type(&self) -> &'static str {
        "+"
    }

    fn name(&self) -> &'static str {
        "addition"
    }

    fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    fn calculate(&self, first: f64, second: f64) -> Result<f64, CalculationFault> {
        Ok(first + second)
    }
}

/// Subtracts the second operand from the first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subtraction {
    symbol: Symbol,
}

impl Subtraction {
    /// Creates a subtraction operator shown as `symbol`.
    #[must_use]
    pub fn new(symbol: Symbol) -> Self {
        Self { symbol }
    }
}

impl Operator for Subtraction {
    fn operator_type(&self) -> &'static str {
        "-"
    }

    fn name(&self) -> &'static str {
        "subtraction"
    }

    fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    fn calculate(&self, first: f64, second: f64) -> Result<f64, CalculationFault> {
        Ok(first - second)
    }
}

/// Multiplies the operands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Multiply {
    symbol: Symbol,
}

impl Multiply {
    /// Creates a multiplication operator shown as `symbol`.
    #[must_use]
    pub fn new(symbol: Symbol) -> Self {
        Self { symbol }
    }
}

impl Operator for Multiply {
    fn operator_type(&self) -> &'static str {
        "*"
    }

    fn name(&self) -> &'static str {
        "multiply"
    }

    fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    fn calculate(&self, first: f64, second: f64) -> Result<f64, CalculationFault> {
        Ok(first * second)
    }
}

/// Divides the first operand by the second.
///
/// Only an exact zero divisor is rejected. Tiny divisors are allowed and may
/// produce very large or infinite results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Division {
    symbol: Symbol,
}

impl Division {
    /// Message carried by the fault raised for a zero divisor.
    pub const DIVIDE_BY_ZERO: &'static str = "Cannot divide by zero";

    /// Creates a division operator shown as `symbol`.
    #[must_use]
    pub fn new(symbol: Symbol) -> Self {
        Self { symbol }
    }
}

impl Operator for Division {
    fn operator_type(&self) -> &'static str {
        "/"
    }

    fn name(&self) -> &'static str {
        "division"
    }

    fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    #[allow(clippy::float_cmp)]
    fn calculate(&self, first: f64, second: f64) -> Result<f64, CalculationFault> {
        if second == 0.0 {
            return Err(CalculationFault::arithmetic(Self::DIVIDE_BY_ZERO));
        }
        Ok(first / second)
    }
}
