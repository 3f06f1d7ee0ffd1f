//! Dual-representation map keys.
//!
//! Input maps at the trust boundary may be keyed by symbols or by plain
//! text for the same logical field name. The validator tolerates both forms
//! transparently, and the validated output is always symbol-keyed.

use std::fmt;

use crate::value::{Value, ValueMap};

/// A map key: either a symbol or plain text.
///
/// The two forms are distinct for hashing and equality; dual-form lookup is
/// done by probing both (see [`ValueMapExt::get_field`]).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Key {
    Symbol(String),
    Text(String),
}

impl Key {
    /// Creates a symbol key.
    pub fn symbol(name: impl Into<String>) -> Self {
        Self::Symbol(name.into())
    }

    /// Creates a text key.
    pub fn text(name: impl Into<String>) -> Self {
        Self::Text(name.into())
    }

    /// The key's name, regardless of form.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Symbol(s) | Self::Text(s) => s.as_str(),
        }
    }

    /// Returns true if this is the symbol form.
    #[must_use]
    pub fn is_symbol(&self) -> bool {
        matches!(self, Self::Symbol(_))
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Symbol(s) => write!(f, ":{s}"),
            Self::Text(s) => write!(f, "{s:?}"),
        }
    }
}

/// Dual-form lookup helpers for [`ValueMap`].
pub trait ValueMapExt {
    /// Resolve a field by name under either key form (symbol wins).
    fn get_field(&self, name: &str) -> Option<&Value>;

    /// Returns true if the field name is present under either key form.
    fn contains_field(&self, name: &str) -> bool;

    /// Insert a value under the symbol form of `name`.
    fn insert_symbol(&mut self, name: &str, value: Value);
}

impl ValueMapExt for ValueMap {
    fn get_field(&self, name: &str) -> Option<&Value> {
        self.get(&Key::symbol(name))
            .or_else(|| self.get(&Key::text(name)))
    }

    fn contains_field(&self, name: &str) -> bool {
        self.contains_key(&Key::symbol(name)) || self.contains_key(&Key::text(name))
    }

    fn insert_symbol(&mut self, name: &str, value: Value) {
        self.insert(Key::symbol(name), value);
    }
}
