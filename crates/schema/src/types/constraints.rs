//! Constraints — predicates layered on top of a type match.
//!
//! Constraints run against an already-type-validated value, in declaration
//! order, and aggregate every violation for one field. A constraint whose
//! predicate does not apply to the value's runtime kind (e.g. `gt` against
//! text) is silently skipped, not treated as a violation.

use regex::Regex;
use std::cmp::Ordering;
use std::fmt;

use veld_value::{Path, Value};

use crate::error::ValidationError;

/// A single declared constraint.
///
/// Length constraints measure text in characters and reuse the same codes
/// for array element counts; `min_items`/`max_items` apply to collections
/// (arrays and maps). The error code for a violation is always the
/// constraint's own name.
#[derive(Debug, Clone)]
pub enum Constraint {
    MinLength(usize),
    MaxLength(usize),
    MinItems(usize),
    MaxItems(usize),
    Gt(Value),
    Gteq(Value),
    Lt(Value),
    Lteq(Value),
    Format(Regex),
    Choices(Vec<Value>),
}

impl Constraint {
    /// The constraint's name, used verbatim as its error code.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::MinLength(_) => "min_length",
            Self::MaxLength(_) => "max_length",
            Self::MinItems(_) => "min_items",
            Self::MaxItems(_) => "max_items",
            Self::Gt(_) => "gt",
            Self::Gteq(_) => "gteq",
            Self::Lt(_) => "lt",
            Self::Lteq(_) => "lteq",
            Self::Format(_) => "format",
            Self::Choices(_) => "choices",
        }
    }

    /// Checks the constraint against `value`.
    ///
    /// `Ok(true)` — passed; `Ok(false)` — predicate does not apply to this
    /// value's kind (skip); `Err` — violated.
    fn evaluate(&self, value: &Value, path: &Path) -> Result<bool, ValidationError> {
        match self {
            Self::MinLength(min) => match measured_length(value) {
                Some(len) if len < *min => Err(self
                    .violation(path, format!("length must be at least {min}"))
                    .with_context("limit", *min as i64)
                    .with_context("actual", len as i64)),
                Some(_) => Ok(true),
                None => Ok(false),
            },
            Self::MaxLength(max) => match measured_length(value) {
                Some(len) if len > *max => Err(self
                    .violation(path, format!("length must be at most {max}"))
                    .with_context("limit", *max as i64)
                    .with_context("actual", len as i64)),
                Some(_) => Ok(true),
                None => Ok(false),
            },
            Self::MinItems(min) => match item_count(value) {
                Some(count) if count < *min => Err(self
                    .violation(path, format!("must have at least {min} items"))
                    .with_context("limit", *min as i64)
                    .with_context("actual", count as i64)),
                Some(_) => Ok(true),
                None => Ok(false),
            },
            Self::MaxItems(max) => match item_count(value) {
                Some(count) if count > *max => Err(self
                    .violation(path, format!("must have at most {max} items"))
                    .with_context("limit", *max as i64)
                    .with_context("actual", count as i64)),
                Some(_) => Ok(true),
                None => Ok(false),
            },
            Self::Gt(bound) => self.compare(value, bound, path, "greater than", |ord| {
                ord == Ordering::Greater
            }),
            Self::Gteq(bound) => {
                self.compare(value, bound, path, "at least", |ord| ord != Ordering::Less)
            }
            Self::Lt(bound) => {
                self.compare(value, bound, path, "less than", |ord| ord == Ordering::Less)
            }
            Self::Lteq(bound) => self.compare(value, bound, path, "at most", |ord| {
                ord != Ordering::Greater
            }),
            Self::Format(pattern) => match value.as_text() {
                Some(text) if pattern.is_match(text) => Ok(true),
                Some(_) => Err(self
                    .violation(path, format!("must match pattern {}", pattern.as_str()))
                    .with_context("pattern", pattern.as_str())),
                None => Ok(false),
            },
            Self::Choices(allowed) => {
                if allowed.contains(value) {
                    Ok(true)
                } else {
                    Err(self
                        .violation(path, "must be one of the allowed values")
                        .with_context("choices", Value::Array(allowed.clone())))
                }
            }
        }
    }

    fn compare(
        &self,
        value: &Value,
        bound: &Value,
        path: &Path,
        description: &str,
        accept: impl Fn(Ordering) -> bool,
    ) -> Result<bool, ValidationError> {
        let Some(ordering) = compare_numbers(value, bound) else {
            return Ok(false);
        };
        if accept(ordering) {
            Ok(true)
        } else {
            Err(self
                .violation(path, format!("must be {description} {bound}"))
                .with_context("limit", bound.clone())
                .with_context("actual", value.clone()))
        }
    }

    fn violation(&self, path: &Path, message: impl Into<std::borrow::Cow<'static, str>>) -> ValidationError {
        ValidationError::new(path.clone(), self.name(), message)
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Applies `constraints` in declaration order, aggregating all violations.
pub fn apply_constraints(
    constraints: &[Constraint],
    value: &Value,
    path: &Path,
) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    for constraint in constraints {
        if let Err(error) = constraint.evaluate(value, path) {
            errors.push(error);
        }
    }
    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

/// Length for the `min_length`/`max_length` family: characters for text,
/// element count for arrays (the historical list-length reuse).
fn measured_length(value: &Value) -> Option<usize> {
    match value {
        Value::Text(s) => Some(s.chars().count()),
        Value::Array(items) => Some(items.len()),
        _ => None,
    }
}

/// Entry count for the `min_items`/`max_items` family (collections only).
fn item_count(value: &Value) -> Option<usize> {
    match value {
        Value::Array(items) => Some(items.len()),
        Value::Map(map) => Some(map.len()),
        _ => None,
    }
}

/// Numeric comparison: integer pairs compare exactly, mixed pairs widen.
fn compare_numbers(value: &Value, bound: &Value) -> Option<Ordering> {
    match (value, bound) {
        (Value::Integer(a), Value::Integer(b)) => Some(a.cmp(b)),
        _ => value.as_number()?.partial_cmp(&bound.as_number()?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use veld_value::value;

    fn root() -> Path {
        Path::root()
    }

    #[test]
    fn test_min_length_on_text_counts_chars() {
        let constraints = [Constraint::MinLength(5)];
        assert!(apply_constraints(&constraints, &value!("hello"), &root()).is_ok());
        assert!(apply_constraints(&constraints, &value!("h\u{e9}llo"), &root()).is_ok());
        let errors = apply_constraints(&constraints, &value!("hi"), &root()).unwrap_err();
        assert_eq!(errors[0].code, "min_length");
    }

    #[test]
    fn test_length_family_reused_for_arrays() {
        let constraints = [Constraint::MinLength(2), Constraint::MaxLength(3)];
        assert!(apply_constraints(&constraints, &value!([1i64, 2i64]), &root()).is_ok());
        assert!(apply_constraints(&constraints, &value!([1i64]), &root()).is_err());
    }

    #[test]
    fn test_items_family_applies_to_maps() {
        let constraints = [Constraint::MinItems(1)];
        assert!(apply_constraints(&constraints, &value!({ "a" => 1i64 }), &root()).is_ok());
        let errors = apply_constraints(&constraints, &value!({}), &root()).unwrap_err();
        assert_eq!(errors[0].code, "min_items");
    }

    #[test]
    fn test_ordered_comparisons() {
        assert!(apply_constraints(&[Constraint::Gt(value!(0i64))], &value!(1i64), &root()).is_ok());
        assert!(apply_constraints(&[Constraint::Gt(value!(0i64))], &value!(0i64), &root()).is_err());
        assert!(apply_constraints(&[Constraint::Gteq(value!(0i64))], &value!(0i64), &root()).is_ok());
        assert!(apply_constraints(&[Constraint::Lt(value!(10i64))], &value!(9i64), &root()).is_ok());
        assert!(apply_constraints(&[Constraint::Lteq(value!(10i64))], &value!(11i64), &root()).is_err());
    }

    #[test]
    fn test_mixed_numeric_comparison_widens() {
        assert!(apply_constraints(&[Constraint::Gt(value!(0.5))], &value!(1i64), &root()).is_ok());
        assert!(apply_constraints(&[Constraint::Lt(value!(2i64))], &value!(1.5), &root()).is_ok());
    }

    #[test]
    fn test_inapplicable_predicates_are_skipped() {
        // `gt` does not apply to text, `format` does not apply to integers.
        assert!(apply_constraints(&[Constraint::Gt(value!(0i64))], &value!("word"), &root()).is_ok());
        assert!(
            apply_constraints(
                &[Constraint::Format(Regex::new("^a").unwrap())],
                &value!(5i64),
                &root()
            )
            .is_ok()
        );
    }

    #[test]
    fn test_format_matches_text() {
        let constraints = [Constraint::Format(Regex::new(r"^\d{4}-\d{2}$").unwrap())];
        assert!(apply_constraints(&constraints, &value!("2024-01"), &root()).is_ok());
        let errors = apply_constraints(&constraints, &value!("Jan 2024"), &root()).unwrap_err();
        assert_eq!(errors[0].code, "format");
    }

    #[test]
    fn test_choices_membership() {
        let constraints = [Constraint::Choices(vec![
            Value::symbol("low"),
            Value::symbol("high"),
        ])];
        assert!(apply_constraints(&constraints, &Value::symbol("low"), &root()).is_ok());
        let errors = apply_constraints(&constraints, &Value::symbol("mid"), &root()).unwrap_err();
        assert_eq!(errors[0].code, "choices");
    }

    #[test]
    fn test_violations_aggregate_in_declaration_order() {
        let constraints = [
            Constraint::MinLength(10),
            Constraint::Format(Regex::new(r"^\d+$").unwrap()),
        ];
        let errors = apply_constraints(&constraints, &value!("abc"), &root()).unwrap_err();
        let codes: Vec<_> = errors.iter().map(|e| e.code.as_ref()).collect();
        assert_eq!(codes, ["min_length", "format"]);
    }

    #[test]
    fn test_passing_value_is_untouched() {
        let constraints = [
            Constraint::Gt(value!(0i64)),
            Constraint::Lteq(value!(100i64)),
        ];
        assert!(apply_constraints(&constraints, &value!(42i64), &root()).is_ok());
    }
}
