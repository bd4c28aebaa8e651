//! Guarded calculation.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use crate::{CalculationFault, Operator};

/// Runs `operator.calculate(first, second)` inside a fault guard.
///
/// Faults returned by the operator pass through unchanged. A panic raised
/// while calculating is caught and reported as
/// [`CalculationFault::Arithmetic`] carrying the panic message, so a
/// misbehaving operator cannot take the request down with it.
///
/// # Example
///
/// ```
/// use emojicalc_core::{calculate_guarded, Division, Symbol};
///
/// let division = Division::new(Symbol::new("/", "Slash"));
/// let fault = calculate_guarded(&division, 1.0, 0.0).unwrap_err();
/// assert_eq!(fault.to_string(), "Cannot divide by zero");
/// ```
pub fn calculate_guarded(
    operator: &dyn Operator,
    first: f64,
    second: f64,
) -> Result<f64, CalculationFault> {
    match panic::catch_unwind(AssertUnwindSafe(|| operator.calculate(first, second))) {
        Ok(result) => result,
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            tracing::warn!(
                operator_type = operator.operator_type(),
                error = %message,
                "Calculation panicked"
            );
            Err(CalculationFault::Arithmetic(message))
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "Bad sum".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Subtraction, Symbol};

    #[derive(Debug)]
    struct Exploding(Symbol);

    impl Operator for Exploding {
        fn operator_type(&self) -> &'static str {
            "!"
        }

        fn name(&self) -> &'static str {
            "exploding"
        }

        fn symbol(&self) -> &Symbol {
            &self.0
        }

        fn calculate(&self, _first: f64, _second: f64) -> Result<f64, CalculationFault> {
            panic!("overflowed the abacus");
        }
    }

    #[derive(Debug)]
    struct Vanishing(Symbol);

    impl Operator for Vanishing {
        fn operator_type(&self) -> &'static str {
            "?"
        }

        fn name(&self) -> &'static str {
            "vanishing"
        }

        fn symbol(&self) -> &Symbol {
            &self.0
        }

        fn calculate(&self, _first: f64, _second: f64) -> Result<f64, CalculationFault> {
            Err(CalculationFault::UnrecognisedOperator("?".to_string()))
        }
    }

    #[test]
    fn test_guard_passes_success_through() {
        let op = Subtraction::new(Symbol::new("-", "Minus"));
        assert_eq!(calculate_guarded(&op, 5.0, 3.0).unwrap(), 2.0);
    }

    #[test]
    fn test_guard_passes_faults_through() {
        let op = Vanishing(Symbol::new("?", "Huh"));
        let fault = calculate_guarded(&op, 1.0, 2.0).unwrap_err();
        assert!(!fault.is_arithmetic());
    }

    #[test]
    fn test_guard_converts_panic_to_arithmetic_fault() {
        let op = Exploding(Symbol::new("!", "Bang"));
        let fault = calculate_guarded(&op, 1.0, 2.0).unwrap_err();
        assert_eq!(fault, CalculationFault::arithmetic("overflowed the abacus"));
    }

    #[test]
    fn test_guard_usable_after_panic() {
        let exploding = Exploding(Symbol::new("!", "Bang"));
        let _ = calculate_guarded(&exploding, 1.0, 2.0);

        let op = Subtraction::new(Symbol::new("-", "Minus"));
        assert_eq!(calculate_guarded(&op, 10.0, 4.0).unwrap(), 6.0);
    }

    #[test]
    fn test_panic_message_fallback() {
        let payload: Box<dyn Any + Send> = Box::new(42_u8);
        assert_eq!(panic_message(payload.as_ref()), "Bad sum");
    }
}
