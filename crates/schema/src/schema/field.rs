//! Field specifications and their resolved definitions.
//!
//! A [`FieldSpec`] is what callers hand to [`Schema::define`]
//! (crate::Schema::define): a name, a type spec and an ordered list of
//! [`FieldOption`]s. Definition resolves it into a [`FieldDefinition`] —
//! requiredness computed, constraints extracted, array bounds folded into
//! the type spec — or rejects it with a definition error.

use regex::Regex;

use veld_value::Value;

use super::DefinitionError;
use crate::types::{Constraint, TypeSpec};

/// One declared option on a field.
///
/// The recognized option keys are exactly: `required`, `optional`,
/// `default`, `description`, `example`, `min_length`, `max_length`,
/// `min_items`, `max_items`, `gt`, `gteq`, `lt`, `lteq`, `format`,
/// `choices`. Anything else fails schema definition.
#[derive(Debug, Clone)]
pub enum FieldOption {
    Required(bool),
    Optional(bool),
    Default(Value),
    Description(String),
    Example(Value),
    MinLength(usize),
    MaxLength(usize),
    MinItems(usize),
    MaxItems(usize),
    Gt(Value),
    Gteq(Value),
    Lt(Value),
    Lteq(Value),
    Format(String),
    Choices(Vec<Value>),
}

/// Failure parsing a dynamic `(key, value)` option pair.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OptionParseError {
    #[error("unknown option key `{0}`")]
    UnknownKey(String),
    #[error("option `{key}` {reason}")]
    InvalidValue { key: String, reason: String },
}

impl FieldOption {
    /// Parses a runtime-supplied `(key, value)` pair into an option.
    ///
    /// This is the dynamic front door for runtime-constructed schemas;
    /// unknown keys are rejected outright.
    pub fn parse(key: &str, value: Value) -> Result<Self, OptionParseError> {
        let invalid = |reason: &str| OptionParseError::InvalidValue {
            key: key.to_owned(),
            reason: reason.to_owned(),
        };
        match key {
            "required" => value
                .as_boolean()
                .map(Self::Required)
                .ok_or_else(|| invalid("expects a boolean")),
            "optional" => value
                .as_boolean()
                .map(Self::Optional)
                .ok_or_else(|| invalid("expects a boolean")),
            "default" => Ok(Self::Default(value)),
            "description" => value
                .as_text()
                .map(|s| Self::Description(s.to_owned()))
                .ok_or_else(|| invalid("expects text")),
            "example" => Ok(Self::Example(value)),
            "min_length" => parse_count(&value).map(Self::MinLength).ok_or_else(|| invalid("expects a non-negative integer")),
            "max_length" => parse_count(&value).map(Self::MaxLength).ok_or_else(|| invalid("expects a non-negative integer")),
            "min_items" => parse_count(&value).map(Self::MinItems).ok_or_else(|| invalid("expects a non-negative integer")),
            "max_items" => parse_count(&value).map(Self::MaxItems).ok_or_else(|| invalid("expects a non-negative integer")),
            "gt" | "gteq" | "lt" | "lteq" => {
                if value.as_number().is_none() {
                    return Err(invalid("expects a number"));
                }
                Ok(match key {
                    "gt" => Self::Gt(value),
                    "gteq" => Self::Gteq(value),
                    "lt" => Self::Lt(value),
                    _ => Self::Lteq(value),
                })
            }
            "format" => value
                .as_text()
                .map(|s| Self::Format(s.to_owned()))
                .ok_or_else(|| invalid("expects a pattern as text")),
            "choices" => match value {
                Value::Array(items) => Ok(Self::Choices(items)),
                _ => Err(invalid("expects an array of allowed values")),
            },
            other => Err(OptionParseError::UnknownKey(other.to_owned())),
        }
    }

    // Lowercase constructors mirror the option keys one-to-one so the
    // `schema!` macro can map `key: value` straight onto them.

    #[must_use]
    pub fn required(required: bool) -> Self {
        Self::Required(required)
    }

    #[must_use]
    pub fn optional(optional: bool) -> Self {
        Self::Optional(optional)
    }

    pub fn default(value: impl Into<Value>) -> Self {
        Self::Default(value.into())
    }

    pub fn description(text: impl Into<String>) -> Self {
        Self::Description(text.into())
    }

    pub fn example(value: impl Into<Value>) -> Self {
        Self::Example(value.into())
    }

    #[must_use]
    pub fn min_length(min: usize) -> Self {
        Self::MinLength(min)
    }

    #[must_use]
    pub fn max_length(max: usize) -> Self {
        Self::MaxLength(max)
    }

    #[must_use]
    pub fn min_items(min: usize) -> Self {
        Self::MinItems(min)
    }

    #[must_use]
    pub fn max_items(max: usize) -> Self {
        Self::MaxItems(max)
    }

    pub fn gt(bound: impl Into<Value>) -> Self {
        Self::Gt(bound.into())
    }

    pub fn gteq(bound: impl Into<Value>) -> Self {
        Self::Gteq(bound.into())
    }

    pub fn lt(bound: impl Into<Value>) -> Self {
        Self::Lt(bound.into())
    }

    pub fn lteq(bound: impl Into<Value>) -> Self {
        Self::Lteq(bound.into())
    }

    pub fn format(pattern: impl Into<String>) -> Self {
        Self::Format(pattern.into())
    }

    #[must_use]
    pub fn choices(allowed: Vec<Value>) -> Self {
        Self::Choices(allowed)
    }
}

fn parse_count(value: &Value) -> Option<usize> {
    value.as_integer().and_then(|n| usize::try_from(n).ok())
}

/// A field specification: what callers feed to schema definition.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub name: String,
    pub spec: TypeSpec,
    pub options: Vec<FieldOption>,
}

impl FieldSpec {
    /// Creates a spec with no options.
    pub fn new(name: impl Into<String>, spec: TypeSpec) -> Self {
        Self {
            name: name.into(),
            spec,
            options: Vec::new(),
        }
    }

    /// Appends an option.
    #[must_use = "builder methods must be chained or built"]
    pub fn with(mut self, option: FieldOption) -> Self {
        self.options.push(option);
        self
    }

    /// Appends an option parsed from a dynamic `(key, value)` pair.
    pub fn with_parsed(self, key: &str, value: Value) -> Result<Self, OptionParseError> {
        let option = FieldOption::parse(key, value)?;
        Ok(self.with(option))
    }
}

/// A resolved field: the immutable form a schema holds.
#[derive(Debug, Clone)]
pub struct FieldDefinition {
    name: String,
    spec: TypeSpec,
    required: bool,
    constraints: Vec<Constraint>,
    default: Option<Value>,
    description: Option<String>,
    example: Option<Value>,
}

impl FieldDefinition {
    /// Resolves a [`FieldSpec`] into its definition, rejecting malformed
    /// type specs, conflicting options and invalid constraint payloads.
    pub(super) fn resolve(field: FieldSpec) -> Result<Self, DefinitionError> {
        let FieldSpec {
            name,
            mut spec,
            options,
        } = field;

        let mut required_opt: Option<bool> = None;
        let mut optional_opt: Option<bool> = None;
        let mut default: Option<Value> = None;
        let mut description = None;
        let mut example = None;
        let mut constraints = Vec::new();
        let mut fold_min_items: Option<usize> = None;
        let mut fold_max_items: Option<usize> = None;

        let is_array = matches!(spec, TypeSpec::Array { .. });

        for option in options {
            match option {
                FieldOption::Required(flag) => required_opt = Some(flag),
                FieldOption::Optional(flag) => optional_opt = Some(flag),
                // A null default means "no default" — it would be
                // indistinguishable from an absent field anyway.
                FieldOption::Default(value) if value.is_null() => default = None,
                FieldOption::Default(value) => default = Some(value),
                FieldOption::Description(text) => description = Some(text),
                FieldOption::Example(value) => example = Some(value),
                FieldOption::MinLength(min) => constraints.push(Constraint::MinLength(min)),
                FieldOption::MaxLength(max) => constraints.push(Constraint::MaxLength(max)),
                // Array length bounds fold into the type spec so validate
                // and coerce see them without a separate lookup.
                FieldOption::MinItems(min) if is_array => fold_min_items = Some(min),
                FieldOption::MaxItems(max) if is_array => fold_max_items = Some(max),
                FieldOption::MinItems(min) => constraints.push(Constraint::MinItems(min)),
                FieldOption::MaxItems(max) => constraints.push(Constraint::MaxItems(max)),
                FieldOption::Gt(bound) => {
                    constraints.push(Constraint::Gt(numeric_bound(&name, "gt", bound)?));
                }
                FieldOption::Gteq(bound) => {
                    constraints.push(Constraint::Gteq(numeric_bound(&name, "gteq", bound)?));
                }
                FieldOption::Lt(bound) => {
                    constraints.push(Constraint::Lt(numeric_bound(&name, "lt", bound)?));
                }
                FieldOption::Lteq(bound) => {
                    constraints.push(Constraint::Lteq(numeric_bound(&name, "lteq", bound)?));
                }
                FieldOption::Format(pattern) => {
                    let compiled =
                        Regex::new(&pattern).map_err(|source| DefinitionError::BadPattern {
                            field: name.clone(),
                            source,
                        })?;
                    constraints.push(Constraint::Format(compiled));
                }
                FieldOption::Choices(allowed) => {
                    if allowed.is_empty() {
                        return Err(DefinitionError::BadConstraint {
                            field: name,
                            reason: "`choices` must list at least one allowed value".to_owned(),
                        });
                    }
                    constraints.push(Constraint::Choices(allowed));
                }
            }
        }

        if let TypeSpec::Array { bounds, .. } = &mut spec {
            if fold_min_items.is_some() {
                bounds.min_items = fold_min_items;
            }
            if fold_max_items.is_some() {
                bounds.max_items = fold_max_items;
            }
        }

        spec.ensure_well_formed()
            .map_err(|reason| DefinitionError::MalformedType {
                field: name.clone(),
                reason,
            })?;

        // Explicit `required` wins, then explicit `optional` (negated), then
        // a default forces optional, then fields default to required.
        let required = required_opt
            .or(optional_opt.map(|flag| !flag))
            .unwrap_or_else(|| default.is_none());
        if required && default.is_some() {
            return Err(DefinitionError::RequiredWithDefault { field: name });
        }

        Ok(Self {
            name,
            spec,
            required,
            constraints,
            default,
            description,
            example,
        })
    }

    /// The field's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The field's type spec (array bounds folded in).
    #[must_use]
    pub fn spec(&self) -> &TypeSpec {
        &self.spec
    }

    /// Whether the field must be present in input.
    #[must_use]
    pub fn is_required(&self) -> bool {
        self.required
    }

    /// Declared constraints, in declaration order.
    #[must_use]
    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// Default applied when the field is absent. Defaults are trusted and
    /// bypass type and constraint checks.
    #[must_use]
    pub fn default(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    /// Optional human description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Optional example value.
    #[must_use]
    pub fn example(&self) -> Option<&Value> {
        self.example.as_ref()
    }
}

fn numeric_bound(field: &str, key: &str, bound: Value) -> Result<Value, DefinitionError> {
    if bound.as_number().is_some() {
        Ok(bound)
    } else {
        Err(DefinitionError::BadConstraint {
            field: field.to_owned(),
            reason: format!("`{key}` bound must be numeric, got {}", bound.kind()),
        })
    }
}
