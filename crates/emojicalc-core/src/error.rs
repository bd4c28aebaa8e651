//! Error types for the operator registry and calculations.

use thiserror::Error;

/// Errors raised by the [`Operators`](crate::Operators) registry.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum OperatorsError {
    /// The exact operator instance is already registered.
    #[error("Duplicated operator")]
    Duplicate,

    /// No registered operator matched the queried type or symbol.
    ///
    /// The message is the query itself.
    #[error("{query}")]
    Unrecognised {
        /// The type tag or symbol code that was looked up.
        query: String,
    },
}

impl OperatorsError {
    /// Creates a new unrecognised-operator error for the given query.
    pub fn unrecognised(query: impl Into<String>) -> Self {
        Self::Unrecognised {
            query: query.into(),
        }
    }
}

/// Faults raised while performing a calculation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CalculationFault {
    /// A numeric fault, such as dividing by zero.
    #[error("{0}")]
    Arithmetic(String),

    /// The operator could not be resolved at calculation time.
    #[error("{0}")]
    UnrecognisedOperator(String),
}

impl CalculationFault {
    /// Creates a new arithmetic fault.
    pub fn arithmetic(message: impl Into<String>) -> Self {
        Self::Arithmetic(message.into())
    }

    /// Returns `true` if this is an arithmetic fault.
    #[must_use]
    pub fn is_arithmetic(&self) -> bool {
        matches!(self, Self::Arithmetic(_))
    }
}

impl From<OperatorsError> for CalculationFault {
    fn from(err: OperatorsError) -> Self {
        Self::UnrecognisedOperator(err.to_string())
    }
}
