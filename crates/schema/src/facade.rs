//! One-off and reusable validation conveniences.
//!
//! The one-off helpers synthesize a temporary single-field schema, run the
//! full pipeline, and strip the synthetic field name back out of every
//! error path before returning — that stripping is a visible, tested
//! contract, not an implementation detail.

use std::collections::BTreeMap;

use veld_value::{Key, Value, ValueMap, ValueMapExt};

use crate::error::ValidationError;
use crate::schema::{FieldSpec, Schema, SchemaOptions};
use crate::types::TypeSpec;
use crate::validate::{ValidateOptions, Validator};

/// Field name used by the anonymous one-off check.
const ONE_OFF_FIELD: &str = "value";

/// Validates a single value against a bare type spec.
///
/// Returns the (possibly coerced) value on success. Only the `coerce`
/// flag of `options` applies; paths come back relative to the value
/// itself.
///
/// # Panics
///
/// Panics when `spec` is malformed — a one-off check synthesizes a schema,
/// and malformed specs are programmer errors rejected at definition time.
pub fn check_value(
    spec: &TypeSpec,
    value: &Value,
    options: &ValidateOptions,
) -> Result<Value, Vec<ValidationError>> {
    one_off(ONE_OFF_FIELD, spec, value, options).map_err(|errors| {
        errors
            .into_iter()
            .map(ValidationError::without_path_head)
            .collect()
    })
}

/// Validates a single named value against a bare type spec.
///
/// Identical to [`check_value`], but the synthetic field carries the
/// caller's name: error paths are stripped the same way, while messages
/// keep the name as a prefix so the diagnostic still says what failed.
///
/// # Panics
///
/// Panics when `spec` is malformed, as for [`check_value`].
pub fn check_named(
    name: &str,
    spec: &TypeSpec,
    value: &Value,
    options: &ValidateOptions,
) -> Result<Value, Vec<ValidationError>> {
    one_off(name, spec, value, options).map_err(|errors| {
        errors
            .into_iter()
            .map(|error| {
                let mut error = error.without_path_head();
                error.message = format!("{name}: {}", error.message).into();
                error
            })
            .collect()
    })
}

/// Validates a heterogeneous list of `(name, spec, value)` triples, each
/// against its own temporary schema.
///
/// Returns every validated value when all pass, or a map from item index
/// to that item's (path-stripped) errors when any fails.
///
/// # Panics
///
/// Panics when any spec is malformed, as for [`check_value`].
pub fn check_many(
    items: impl IntoIterator<Item = (String, TypeSpec, Value)>,
    options: &ValidateOptions,
) -> Result<Vec<Value>, BTreeMap<usize, Vec<ValidationError>>> {
    let mut outputs = Vec::new();
    let mut failures: BTreeMap<usize, Vec<ValidationError>> = BTreeMap::new();

    for (index, (name, spec, value)) in items.into_iter().enumerate() {
        match check_named(&name, &spec, &value, options) {
            Ok(validated) => outputs.push(validated),
            Err(errors) => {
                failures.insert(index, errors);
            }
        }
    }

    if failures.is_empty() {
        Ok(outputs)
    } else {
        Err(failures)
    }
}

/// Validates a heterogeneous list of anonymous `(spec, value)` pairs.
///
/// The unnamed sibling of [`check_many`]: errors come back path-stripped
/// like [`check_value`]'s, keyed by item index.
///
/// # Panics
///
/// Panics when any spec is malformed, as for [`check_value`].
pub fn check_many_values(
    pairs: impl IntoIterator<Item = (TypeSpec, Value)>,
    options: &ValidateOptions,
) -> Result<Vec<Value>, BTreeMap<usize, Vec<ValidationError>>> {
    let mut outputs = Vec::new();
    let mut failures: BTreeMap<usize, Vec<ValidationError>> = BTreeMap::new();

    for (index, (spec, value)) in pairs.into_iter().enumerate() {
        match check_value(&spec, &value, options) {
            Ok(validated) => outputs.push(validated),
            Err(errors) => {
                failures.insert(index, errors);
            }
        }
    }

    if failures.is_empty() {
        Ok(outputs)
    } else {
        Err(failures)
    }
}

/// Builds a reusable validator closure over an owned schema.
///
/// The schema is built once and captured; repeated calls skip rebuild
/// cost. A performance affordance, not new logic.
pub fn validator_for(
    schema: Schema,
    options: ValidateOptions,
) -> impl Fn(&Value) -> Result<ValueMap, Vec<ValidationError>> {
    move |input| Validator::new(&schema).validate(input, &options)
}

/// Builds a reusable batch-validator closure over an owned schema.
pub fn batch_validator_for(
    schema: Schema,
    options: ValidateOptions,
) -> impl Fn(&[Value]) -> Result<Vec<ValueMap>, BTreeMap<usize, Vec<ValidationError>>> {
    move |inputs| Validator::new(&schema).validate_many(inputs, &options)
}

/// Synthesizes the one-field schema and runs the pipeline.
fn one_off(
    name: &str,
    spec: &TypeSpec,
    value: &Value,
    options: &ValidateOptions,
) -> Result<Value, Vec<ValidationError>> {
    let schema = Schema::define(
        [FieldSpec::new(name, spec.clone())],
        SchemaOptions::new(),
    )
    .unwrap_or_else(|error| panic!("one-off type spec must be well-formed: {error}"));

    // Only the coercion flag carries over; one-off paths are relative to
    // the value, so the caller's root prefix does not apply.
    let inner = ValidateOptions {
        coerce: options.coerce,
        strict: None,
        root: veld_value::Path::root(),
    };

    let mut input = ValueMap::new();
    input.insert(Key::symbol(name), value.clone());

    let mut output = Validator::new(&schema).validate(&Value::Map(input), &inner)?;
    Ok(output
        .swap_remove(&Key::symbol(name))
        .unwrap_or(Value::Null))
}
