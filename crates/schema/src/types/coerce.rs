//! Best-effort coercion of a value toward a `TypeSpec`.
//!
//! Conversions are explicitly enumerated, never a fallback to raw casting:
//! scalars convert along the table below, arrays convert elementwise, unions
//! take the first alternative whose coercion succeeds, and every other spec
//! passes the value through untouched — structural correctness is
//! [`check`](super::check)'s job, not coercion's.
//!
//! | target  | accepted sources                                   |
//! |---------|----------------------------------------------------|
//! | text    | boolean, integer, float, symbol                    |
//! | integer | text holding exactly an integer literal            |
//! | float   | integer (widening), text holding a float literal   |
//! | boolean | the exact literals `"true"` / `"false"`            |
//! | symbol  | text naming a symbol already in the table          |
//!
//! Float never narrows to integer, boolean parsing is not case-insensitive,
//! and text-to-symbol conversion requires the symbol to pre-exist — untrusted
//! input must not grow the symbol table.

use veld_value::{Path, SymbolTable, Value};

use super::spec::TypeSpec;
use crate::error::ValidationError;

/// Coerces `value` toward `spec`.
///
/// Error paths are relative to the value being coerced (array failures
/// carry their element index); the validator prefixes the field path.
pub fn coerce(
    spec: &TypeSpec,
    value: Value,
    symbols: &SymbolTable,
) -> Result<Value, Vec<ValidationError>> {
    match spec {
        TypeSpec::Text => match value {
            Value::Text(_) => Ok(value),
            Value::Boolean(b) => Ok(Value::Text(b.to_string())),
            Value::Integer(n) => Ok(Value::Text(n.to_string())),
            Value::Float(n) => Ok(Value::Text(n.to_string())),
            Value::Symbol(name) => Ok(Value::Text(name)),
            other => Err(vec![failure(spec, &other)]),
        },
        TypeSpec::Integer => match value {
            Value::Integer(_) => Ok(value),
            // Leading/trailing junk is a failure, not a truncation;
            // `str::parse` already demands the full literal.
            Value::Text(ref s) => s
                .parse::<i64>()
                .map(Value::Integer)
                .map_err(|_| vec![failure(spec, &value)]),
            other => Err(vec![failure(spec, &other)]),
        },
        TypeSpec::Float => match value {
            Value::Float(_) => Ok(value),
            Value::Integer(n) => Ok(Value::Float(n as f64)),
            Value::Text(ref s) => s
                .parse::<f64>()
                .map(Value::Float)
                .map_err(|_| vec![failure(spec, &value)]),
            other => Err(vec![failure(spec, &other)]),
        },
        TypeSpec::Boolean => match value {
            Value::Boolean(_) => Ok(value),
            Value::Text(ref s) => match s.as_str() {
                "true" => Ok(Value::Boolean(true)),
                "false" => Ok(Value::Boolean(false)),
                _ => Err(vec![failure(spec, &value)]),
            },
            other => Err(vec![failure(spec, &other)]),
        },
        TypeSpec::Symbol => match value {
            Value::Symbol(_) => Ok(value),
            Value::Text(ref s) if symbols.contains(s) => Ok(Value::symbol(s.clone())),
            other => Err(vec![failure(spec, &other)]),
        },
        TypeSpec::Array { element, .. } => match value {
            Value::Array(items) => {
                let mut coerced = Vec::with_capacity(items.len());
                let mut errors = Vec::new();
                for (index, item) in items.into_iter().enumerate() {
                    match coerce(element, item, symbols) {
                        Ok(item) => coerced.push(item),
                        Err(item_errors) => {
                            let prefix = Path::single(index);
                            errors.extend(item_errors.into_iter().map(|e| e.prefixed(&prefix)));
                        }
                    }
                }
                if errors.is_empty() {
                    Ok(Value::Array(coerced))
                } else {
                    Err(errors)
                }
            }
            // Not a sequence: leave it for the structural check to reject.
            other => Ok(other),
        },
        TypeSpec::Union(alternatives) => {
            for alternative in alternatives {
                if let Ok(coerced) = coerce(alternative, value.clone(), symbols) {
                    return Ok(coerced);
                }
            }
            Err(vec![failure(spec, &value)])
        }
        // Coercion does not know how to convert these; the value passes
        // through unchanged even when it does not structurally match.
        TypeSpec::Any | TypeSpec::Map | TypeSpec::Tuple(_) | TypeSpec::TypedMap { .. }
        | TypeSpec::Custom(_) => Ok(value),
    }
}

fn failure(spec: &TypeSpec, value: &Value) -> ValidationError {
    ValidationError::coercion(Path::root(), spec, value)
}
