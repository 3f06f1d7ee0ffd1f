//! The runtime symbol registry.
//!
//! Coercion from text to symbol is only allowed for symbols that already
//! exist in the table — converting untrusted input must never grow the
//! registry. Registration happens at schema-definition time from trusted,
//! caller-declared names (field names, defaults, `choices` literals).

use lasso::ThreadedRodeo;
use std::fmt;

/// An interned registry of known symbol names.
///
/// Thread-safe: registration and lookup take `&self`, so one table can be
/// shared across concurrent validations of the same schema.
#[derive(Default)]
pub struct SymbolTable {
    rodeo: ThreadedRodeo,
}

impl SymbolTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a symbol name, interning it if new.
    ///
    /// Only trusted, caller-declared names belong here; validation-time
    /// coercion never calls this.
    pub fn register(&self, name: &str) {
        self.rodeo.get_or_intern(name);
    }

    /// Returns true if the symbol already exists in the table.
    ///
    /// This is the existence check that bounds text-to-symbol coercion.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.rodeo.get(name).is_some()
    }

    /// Number of registered symbols.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rodeo.len()
    }

    /// Returns true if no symbols are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rodeo.is_empty()
    }
}

impl fmt::Debug for SymbolTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SymbolTable")
            .field("len", &self.len())
            .finish()
    }
}
