//! Structural validation of a value against a `TypeSpec`.
//!
//! The aggregation policy is fixed: within one composite value every
//! independent failure is collected (array elements, tuple positions, map
//! entries), but a union resolves to its first structural success and
//! reports a single synthetic error when nothing matches — per-branch
//! failures for an N-way union are noise, so they are deliberately dropped.

use veld_value::{Key, Path, Segment, Value, ValueKind};

use super::spec::TypeSpec;
use crate::error::ValidationError;

/// Validates `value` against `spec`, tracking location via `path`.
///
/// Returns all structural errors found within the value. The value itself
/// is untouched; callers that need the coerced form run
/// [`coerce`](super::coerce) first.
pub fn check(spec: &TypeSpec, value: &Value, path: &Path) -> Result<(), Vec<ValidationError>> {
    match spec {
        TypeSpec::Any => Ok(()),
        TypeSpec::Text
        | TypeSpec::Integer
        | TypeSpec::Float
        | TypeSpec::Boolean
        | TypeSpec::Symbol
        | TypeSpec::Map => {
            // Exact runtime-kind match; no widening, no coercion.
            if primitive_kind(spec) == Some(value.kind()) {
                Ok(())
            } else {
                Err(vec![mismatch(spec, value, path)])
            }
        }
        TypeSpec::Array { element, bounds } => {
            let Some(items) = value.as_array() else {
                // Not a sequence at all: one type error, no bounds checks.
                return Err(vec![mismatch(spec, value, path)]);
            };
            let mut errors = Vec::new();
            for (index, item) in items.iter().enumerate() {
                if let Err(item_errors) = check(element, item, &path.child(index)) {
                    errors.extend(item_errors);
                }
            }
            if let Some(min) = bounds.min_items {
                if items.len() < min {
                    errors.push(
                        ValidationError::new(
                            path.clone(),
                            "min_items",
                            format!("must have at least {min} items"),
                        )
                        .with_context("limit", min as i64)
                        .with_context("actual", items.len() as i64),
                    );
                }
            }
            if let Some(max) = bounds.max_items {
                if items.len() > max {
                    errors.push(
                        ValidationError::new(
                            path.clone(),
                            "max_items",
                            format!("must have at most {max} items"),
                        )
                        .with_context("limit", max as i64)
                        .with_context("actual", items.len() as i64),
                    );
                }
            }
            if errors.is_empty() { Ok(()) } else { Err(errors) }
        }
        TypeSpec::Union(alternatives) => {
            for alternative in alternatives {
                if check(alternative, value, path).is_ok() {
                    return Ok(());
                }
            }
            Err(vec![mismatch(spec, value, path)])
        }
        TypeSpec::Tuple(elements) => {
            let Some(items) = value.as_array() else {
                return Err(vec![mismatch(spec, value, path)]);
            };
            if items.len() != elements.len() {
                // Arity is its own failure kind: the value *is* a tuple,
                // it just has the wrong size.
                return Err(vec![
                    ValidationError::new(
                        path.clone(),
                        "tuple_size",
                        format!(
                            "expected a tuple of {} elements, got {}",
                            elements.len(),
                            items.len()
                        ),
                    )
                    .with_context("expected", elements.len() as i64)
                    .with_context("actual", items.len() as i64),
                ]);
            }
            let mut errors = Vec::new();
            for (index, (element, item)) in elements.iter().zip(items).enumerate() {
                if let Err(item_errors) = check(element, item, &path.child(index)) {
                    errors.extend(item_errors);
                }
            }
            if errors.is_empty() { Ok(()) } else { Err(errors) }
        }
        TypeSpec::TypedMap { key, value: value_spec } => {
            let Some(entries) = value.as_map() else {
                return Err(vec![mismatch(spec, value, path)]);
            };
            let mut errors = Vec::new();
            // Iteration follows map insertion order, so error order is
            // deterministic. Key failures are labeled `key(<k>)`, value
            // failures use the key name as a field segment.
            for (entry_key, entry_value) in entries {
                let key_value = key_as_value(entry_key);
                if let Err(key_errors) =
                    check(key, &key_value, &path.child(Segment::map_key(entry_key.name())))
                {
                    errors.extend(key_errors);
                }
                if let Err(value_errors) =
                    check(value_spec, entry_value, &path.child(entry_key.name()))
                {
                    errors.extend(value_errors);
                }
            }
            if errors.is_empty() { Ok(()) } else { Err(errors) }
        }
        TypeSpec::Custom(validatable) => match validatable.check(value) {
            Ok(()) => Ok(()),
            Err(error) => Err(vec![error.prefixed(path)]),
        },
    }
}

fn primitive_kind(spec: &TypeSpec) -> Option<ValueKind> {
    match spec {
        TypeSpec::Text => Some(ValueKind::Text),
        TypeSpec::Integer => Some(ValueKind::Integer),
        TypeSpec::Float => Some(ValueKind::Float),
        TypeSpec::Boolean => Some(ValueKind::Boolean),
        TypeSpec::Symbol => Some(ValueKind::Symbol),
        TypeSpec::Map => Some(ValueKind::Map),
        _ => None,
    }
}

fn mismatch(spec: &TypeSpec, value: &Value, path: &Path) -> ValidationError {
    ValidationError::type_mismatch(path.clone(), spec, value.kind())
}

fn key_as_value(key: &Key) -> Value {
    match key {
        Key::Symbol(name) => Value::Symbol(name.clone()),
        Key::Text(name) => Value::Text(name.clone()),
    }
}
