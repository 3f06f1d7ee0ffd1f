//! The `Validatable` capability extension point.
//!
//! Lets callers plug domain types into the grammar without widening it:
//! anything that can say yes/no to a value can participate as
//! `TypeSpec::Custom`. Coercion is a no-op for custom specs; only
//! structural validation consults the implementation.

use std::fmt;

use veld_value::Value;

use crate::error::ValidationError;

/// A caller-supplied type that knows how to validate a value.
///
/// # Examples
///
/// ```rust,ignore
/// use veld_schema::{TypeSpec, Validatable, ValidationError};
/// use veld_value::Value;
///
/// #[derive(Debug)]
/// struct Port;
///
/// impl Validatable for Port {
///     fn type_name(&self) -> &str {
///         "port"
///     }
///
///     fn check(&self, value: &Value) -> Result<(), ValidationError> {
///         match value.as_integer() {
///             Some(n) if (1..=65535).contains(&n) => Ok(()),
///             _ => Err(ValidationError::global("custom", "expected a port number")),
///         }
///     }
/// }
///
/// let spec = TypeSpec::custom(Port);
/// ```
pub trait Validatable: fmt::Debug + Send + Sync {
    /// The name this type reports in messages and `Display`.
    fn type_name(&self) -> &str;

    /// Validates a value against this type.
    ///
    /// The returned error's path is relative to the value; the engine
    /// prefixes the enclosing field path.
    fn check(&self, value: &Value) -> Result<(), ValidationError>;
}
