//! Structured validation failures.
//!
//! A [`ValidationError`] is data, not a thrown exception: a path locating
//! the failure, a machine-readable code, a human message, and optional
//! structured context. Errors from independent branches aggregate into flat
//! `Vec<ValidationError>` lists; the helpers here format, group and
//! serialize those lists.
//!
//! All string fields use `Cow<'static, str>` for zero-allocation in the
//! common case of static codes and messages.

use indexmap::IndexMap;
use std::borrow::Cow;
use std::fmt;

use veld_value::{Key, Path, Segment, Value};

// ============================================================================
// ERROR CODES
// ============================================================================

/// The error-code vocabulary, one consistent set used everywhere.
///
/// Constraint violations use the constraint's own name as the code
/// (`min_length`, `gt`, `format`, `choices`, ...), so only the non-constraint
/// codes are named here.
pub mod codes {
    /// Non-map input handed to the validator.
    pub const INPUT_FORMAT: &str = "input_format";
    /// Missing required field.
    pub const REQUIRED: &str = "required";
    /// Runtime value does not match the declared type.
    pub const TYPE: &str = "type";
    /// Tuple value with the wrong arity.
    pub const TUPLE_SIZE: &str = "tuple_size";
    /// Value could not be converted under the enumerated coercion rules.
    pub const COERCION: &str = "coercion";
    /// Unexpected keys present in strict mode.
    pub const EXTRA_FIELDS: &str = "extra_fields";
    /// The post-validation hook rejected the data or panicked.
    pub const POST_VALIDATION: &str = "post_validation";
    /// A custom `Validatable` implementation rejected the value.
    pub const CUSTOM: &str = "custom";
}

// ============================================================================
// VALIDATION ERROR
// ============================================================================

/// A structured validation error.
///
/// # Examples
///
/// ```rust,ignore
/// use veld_schema::ValidationError;
/// use veld_value::Path;
///
/// let error = ValidationError::new(Path::single("age"), "gt", "must be greater than 0")
///     .with_context("limit", 0i64)
///     .with_context("actual", -3i64);
/// assert_eq!(error.format(true, "."), "age: must be greater than 0");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Where in the nested input the failure occurred. Empty for global
    /// (schema-level) errors such as non-map input or strict-mode leftovers.
    pub path: Path,

    /// Machine-readable kind, e.g. `type`, `required`, `min_length`.
    pub code: Cow<'static, str>,

    /// Human-readable message in English.
    pub message: Cow<'static, str>,

    /// Optional structured context (expected/actual values, limits).
    pub context: Option<IndexMap<String, Value>>,
}

impl ValidationError {
    /// Creates a new validation error.
    ///
    /// A bare segment works as the path; it wraps into a one-segment
    /// sequence via `Path::from`.
    pub fn new(
        path: impl Into<Path>,
        code: impl Into<Cow<'static, str>>,
        message: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self {
            path: path.into(),
            code: code.into(),
            message: message.into(),
            context: None,
        }
    }

    /// Creates a global (path-less) error.
    pub fn global(code: impl Into<Cow<'static, str>>, message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(Path::root(), code, message)
    }

    /// Adds a context entry.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.context
            .get_or_insert_with(IndexMap::new)
            .insert(key.into(), value.into());
        self
    }

    /// Looks up a context entry by key.
    #[must_use]
    pub fn context_value(&self, key: &str) -> Option<&Value> {
        self.context.as_ref().and_then(|ctx| ctx.get(key))
    }

    /// Returns a copy of this error with `prefix` prepended to its path.
    #[must_use]
    pub fn prefixed(mut self, prefix: &Path) -> Self {
        self.path = self.path.prefixed(prefix);
        self
    }

    /// Returns a copy of this error with the first path segment dropped.
    #[must_use]
    pub fn without_path_head(mut self) -> Self {
        self.path = self.path.without_first();
        self
    }

    /// Formats the error, optionally prefixing the rendered path.
    #[must_use]
    pub fn format(&self, include_path: bool, separator: &str) -> String {
        if include_path && !self.path.is_empty() {
            format!("{}: {}", self.path.render(separator), self.message)
        } else {
            self.message.to_string()
        }
    }

    // ------------------------------------------------------------------
    // Convenience constructors for the fixed vocabulary
    // ------------------------------------------------------------------

    /// Creates a `required` error for a missing field.
    pub fn required(path: impl Into<Path>, field: &str) -> Self {
        Self::new(
            path,
            codes::REQUIRED,
            format!("required field `{field}` is missing"),
        )
    }

    /// Creates a `type` error naming the expected and actual type.
    pub fn type_mismatch(path: impl Into<Path>, expected: impl fmt::Display, actual: impl fmt::Display) -> Self {
        let expected = expected.to_string();
        let actual = actual.to_string();
        Self::new(
            path,
            codes::TYPE,
            format!("expected {expected}, got {actual}"),
        )
        .with_context("expected", expected)
        .with_context("actual", actual)
    }

    /// Creates a `coercion` error.
    pub fn coercion(path: impl Into<Path>, target: impl fmt::Display, value: &Value) -> Self {
        Self::new(
            path,
            codes::COERCION,
            format!("cannot coerce {} to {target}", value.kind()),
        )
        .with_context("target", target.to_string())
        .with_context("actual", value.kind().name())
    }

    /// Creates an `input_format` error (global).
    pub fn input_format(actual: impl fmt::Display) -> Self {
        Self::global(
            codes::INPUT_FORMAT,
            format!("input must be a map, got {actual}"),
        )
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format(true, "."))
    }
}

impl std::error::Error for ValidationError {}

// ============================================================================
// LIST HELPERS
// ============================================================================

/// Formats a list of errors as one newline-joined, path-prefixed string.
#[must_use]
pub fn format_many(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.format(true, "."))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Groups errors by their rendered path, preserving first-seen order.
#[must_use]
pub fn group_by_path<'a>(
    errors: &'a [ValidationError],
) -> IndexMap<String, Vec<&'a ValidationError>> {
    let mut groups: IndexMap<String, Vec<&ValidationError>> = IndexMap::new();
    for error in errors {
        groups.entry(error.path.render(".")).or_default().push(error);
    }
    groups
}

/// Groups errors by code, preserving first-seen order.
#[must_use]
pub fn group_by_code<'a>(
    errors: &'a [ValidationError],
) -> IndexMap<String, Vec<&'a ValidationError>> {
    let mut groups: IndexMap<String, Vec<&ValidationError>> = IndexMap::new();
    for error in errors {
        groups
            .entry(error.code.to_string())
            .or_default()
            .push(error);
    }
    groups
}

/// Filters errors to those with the given code.
#[must_use]
pub fn filter_by_code<'a>(errors: &'a [ValidationError], code: &str) -> Vec<&'a ValidationError> {
    errors.iter().filter(|e| e.code == code).collect()
}

// ============================================================================
// PORTABLE FORM
// ============================================================================

/// Failure reconstructing an error from its portable form.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PortableErrorInvalid {
    #[error("portable error is missing field `{0}`")]
    MissingField(&'static str),
    #[error("portable error field `{field}` must be {expected}")]
    WrongKind {
        field: &'static str,
        expected: &'static str,
    },
}

impl ValidationError {
    /// Converts the error into its portable map form:
    /// `{"path": [text, ...], "code": text, "message": text, "context"?: map}`.
    #[must_use]
    pub fn to_portable(&self) -> Value {
        let mut map = veld_value::ValueMap::new();
        map.insert(
            Key::text("path"),
            Value::Array(
                self.path
                    .iter()
                    .map(|segment| Value::Text(segment.render()))
                    .collect(),
            ),
        );
        map.insert(Key::text("code"), Value::Text(self.code.to_string()));
        map.insert(Key::text("message"), Value::Text(self.message.to_string()));
        if let Some(context) = &self.context {
            map.insert(
                Key::text("context"),
                Value::Map(
                    context
                        .iter()
                        .map(|(k, v)| (Key::text(k.clone()), v.clone()))
                        .collect(),
                ),
            );
        }
        Value::Map(map)
    }

    /// Reconstructs an error from its portable map form.
    ///
    /// Reports a recoverable error on a missing or mistyped field rather
    /// than panicking.
    pub fn from_portable(portable: &Value) -> Result<Self, PortableErrorInvalid> {
        let map = portable.as_map().ok_or(PortableErrorInvalid::WrongKind {
            field: "portable",
            expected: "a map",
        })?;

        let path_value = map
            .get(&Key::text("path"))
            .ok_or(PortableErrorInvalid::MissingField("path"))?;
        let segments = path_value
            .as_array()
            .ok_or(PortableErrorInvalid::WrongKind {
                field: "path",
                expected: "an array of text",
            })?;
        let path: Path = segments
            .iter()
            .map(|segment| {
                segment
                    .as_text()
                    .map(Segment::parse)
                    .ok_or(PortableErrorInvalid::WrongKind {
                        field: "path",
                        expected: "an array of text",
                    })
            })
            .collect::<Result<_, _>>()?;

        let code = map
            .get(&Key::text("code"))
            .ok_or(PortableErrorInvalid::MissingField("code"))?
            .as_text()
            .ok_or(PortableErrorInvalid::WrongKind {
                field: "code",
                expected: "text",
            })?
            .to_owned();
        let message = map
            .get(&Key::text("message"))
            .ok_or(PortableErrorInvalid::MissingField("message"))?
            .as_text()
            .ok_or(PortableErrorInvalid::WrongKind {
                field: "message",
                expected: "text",
            })?
            .to_owned();

        let context = match map.get(&Key::text("context")) {
            None => None,
            Some(value) => {
                let entries = value.as_map().ok_or(PortableErrorInvalid::WrongKind {
                    field: "context",
                    expected: "a map",
                })?;
                Some(
                    entries
                        .iter()
                        .map(|(k, v)| (k.name().to_owned(), v.clone()))
                        .collect(),
                )
            }
        };

        Ok(Self {
            path,
            code: code.into(),
            message: message.into(),
            context,
        })
    }
}

// Serde rides on the portable shape so the wire form and the in-process
// portable form never drift apart.
impl serde::Serialize for ValidationError {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serde::Serialize::serialize(&self.to_portable(), serializer)
    }
}

impl<'de> serde::Deserialize<'de> for ValidationError {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let portable = <Value as serde::Deserialize>::deserialize(deserializer)?;
        Self::from_portable(&portable).map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// TESTS
// ============================================================================
