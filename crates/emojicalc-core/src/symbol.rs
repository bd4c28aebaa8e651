//! Operator display symbols.

use std::fmt;

/// The display glyph and human-readable name of an operator.
///
/// Symbols are created once when the operator registry is built and never
/// change afterwards.
///
/// # Example
///
/// ```
/// use emojicalc_core::Symbol;
///
/// let symbol = Symbol::new("\u{1f47d}", "Alien");
/// assert_eq!(symbol.code(), "👽");
/// assert_eq!(symbol.name(), "Alien");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Symbol {
    code: String,
    name: String,
}

impl Symbol {
    /// Creates a new symbol from its glyph and name.
    #[must_use]
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
        }
    }

    /// Returns the glyph shown to users.
    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Returns the human-readable name of the glyph.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.code)
    }
}
