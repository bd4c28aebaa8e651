//! The operator registry.

use std::slice;
use std::sync::Arc;

use crate::{Addition, Division, Multiply, Operator, OperatorsError, Subtraction, Symbol};

/// An ordered, duplicate-rejecting collection of operators.
///
/// Insertion order is iteration order, so the entry form always lists
/// operators the same way. Duplicates are detected by identity: adding a
/// second handle to an already registered operator fails, while two distinct
/// operators with equal fields are both accepted.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use emojicalc_core::{Addition, Operator, Operators, Symbol};
///
/// let addition: Arc<dyn Operator> = Arc::new(Addition::new(Symbol::new("+", "Plus")));
///
/// let mut operators = Operators::new();
/// operators.add(Arc::clone(&addition)).unwrap();
/// assert!(operators.add(addition).is_err());
/// assert_eq!(operators.len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Operators {
    operators: Vec<Arc<dyn Operator>>,
}

impl Operators {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an operator.
    ///
    /// Returns the registry for chaining, or [`OperatorsError::Duplicate`]
    /// if this exact operator is already present. A failed add leaves the
    /// registry unchanged.
    pub fn add(&mut self, operator: Arc<dyn Operator>) -> Result<&mut Self, OperatorsError> {
        if self.contains(&operator) {
            tracing::debug!(
                operator_type = operator.operator_type(),
                "Rejected duplicate operator"
            );
            return Err(OperatorsError::Duplicate);
        }
        self.operators.push(operator);
        Ok(self)
    }

    /// Chaining form of [`add`](Self::add) for building a registry by value.
    pub fn with(mut self, operator: Arc<dyn Operator>) -> Result<Self, OperatorsError> {
        self.add(operator)?;
        Ok(self)
    }

    /// Returns `true` if this exact operator instance is registered.
    #[must_use]
    pub fn contains(&self, operator: &Arc<dyn Operator>) -> bool {
        self.operators.iter().any(|existing| same_instance(existing, operator))
    }

    /// Finds the first operator with the given type tag.
    pub fn find_by_type(&self, operator_type: &str) -> Result<&Arc<dyn Operator>, OperatorsError> {
        self.operators
            .iter()
            .find(|op| op.operator_type() == operator_type)
            .ok_or_else(|| OperatorsError::unrecognised(operator_type))
    }

    /// Finds the first operator whose symbol code equals `code`.
    pub fn find_by_symbol(&self, code: &str) -> Result<&Arc<dyn Operator>, OperatorsError> {
        self.operators
            .iter()
            .find(|op| op.symbol().code() == code)
            .ok_or_else(|| OperatorsError::unrecognised(code))
    }

    /// Returns a fresh iterator over the operators in insertion order.
    ///
    /// Every call starts again from the first operator.
    pub fn iter(&self) -> slice::Iter<'_, Arc<dyn Operator>> {
        self.operators.iter()
    }

    /// Returns the number of registered operators.
    #[must_use]
    pub fn len(&self) -> usize {
        self.operators.len()
    }

    /// Returns `true` if no operators are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.operators.is_empty()
    }
}

impl<'a> IntoIterator for &'a Operators {
    type Item = &'a Arc<dyn Operator>;
    type IntoIter = slice::Iter<'a, Arc<dyn Operator>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// Compares data pointers only; vtable pointers for the same type may differ
// between codegen units.
fn same_instance(a: &Arc<dyn Operator>, b: &Arc<dyn Operator>) -> bool {
    std::ptr::eq(
        Arc::as_ptr(a).cast::<()>(),
        Arc::as_ptr(b).cast::<()>(),
    )
}

/// Builds the default registry: Alien, Skull, Ghost and Scream.
///
/// | Symbol | Name | Operator |
/// |--------|------|----------|
/// | 👽 | Alien | addition |
/// | 💀 | Skull | subtraction |
/// | 👻 | Ghost | multiply |
/// | 😱 | Scream | division |
#[must_use]
pub fn default_operators() -> Operators {
    let defaults: [Arc<dyn Operator>; 4] = [
        Arc::new(Addition::new(Symbol::new("\u{1f47d}", "Alien"))),
        Arc::new(Subtraction::new(Symbol::new("\u{1f480}", "Skull"))),
        Arc::new(Multiply::new(Symbol::new("\u{1f47b}", "Ghost"))),
        Arc::new(Division::new(Symbol::new("\u{1f631}", "Scream"))),
    ];

    Operators {
        operators: defaults.into_iter().collect(),
    }
}
