//! The validation pipeline.
//!
//! Five stages in fixed order, each able to stop the whole run:
//!
//! 1. input-shape check — input must be a map;
//! 2. required-field presence — all missing fields collected together;
//! 3. per-field validation — coerce (optional), type check, constraints,
//!    defaults; all field errors collected together;
//! 4. strict-mode sweep — leftover input keys become one global error;
//! 5. post-validation hook — cross-field rules, isolated from panics.
//!
//! The two-level propagation policy is the load-bearing contract here:
//! *aggregate within a stage, short-circuit across stages*. A missing
//! required field therefore never co-reports type errors for other fields,
//! while several present-but-invalid fields always report together.

use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};

use veld_value::{Path, Value, ValueMap, ValueMapExt};

use crate::error::{ValidationError, codes, format_many};
use crate::schema::{HookRejection, Schema};
use crate::types::{apply_constraints, check, coerce};

mod batch;

// ============================================================================
// OPTIONS
// ============================================================================

/// Per-call validation options.
#[derive(Debug, Clone, Default)]
pub struct ValidateOptions {
    /// Attempt coercion before the structural check. Coercion failures
    /// propagate as errors; the original value is never silently kept.
    pub coerce: bool,
    /// Overrides the schema's strict flag when set.
    pub strict: Option<bool>,
    /// Prefix for every reported path. Batch validation uses this to tag
    /// each item's errors with its index.
    pub root: Path,
}

impl ValidateOptions {
    /// Options with every knob at its default.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables coercion.
    #[must_use = "builder methods must be chained or built"]
    pub fn coercing(mut self) -> Self {
        self.coerce = true;
        self
    }

    /// Forces strict mode on or off, overriding the schema.
    #[must_use = "builder methods must be chained or built"]
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = Some(strict);
        self
    }

    /// Sets the path prefix for reported errors.
    #[must_use = "builder methods must be chained or built"]
    pub fn rooted(mut self, root: Path) -> Self {
        self.root = root;
        self
    }
}

// ============================================================================
// SCHEMA VIOLATION
// ============================================================================

/// The full aggregated error list as one `std::error::Error` value, for
/// callers who want a single exception-like carrier instead of a panic.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaViolation {
    errors: Vec<ValidationError>,
}

impl SchemaViolation {
    /// The aggregated errors, in pipeline order.
    #[must_use]
    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    /// Consumes the violation, yielding the error list.
    #[must_use]
    pub fn into_errors(self) -> Vec<ValidationError> {
        self.errors
    }
}

impl From<Vec<ValidationError>> for SchemaViolation {
    fn from(errors: Vec<ValidationError>) -> Self {
        Self { errors }
    }
}

impl fmt::Display for SchemaViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", format_many(&self.errors))
    }
}

impl std::error::Error for SchemaViolation {}

// ============================================================================
// VALIDATOR
// ============================================================================

/// The orchestration pipeline over one schema.
///
/// Borrows the schema; cheap to copy, safe to share across threads.
#[derive(Debug, Clone, Copy)]
pub struct Validator<'s> {
    schema: &'s Schema,
}

impl<'s> Validator<'s> {
    /// Creates a validator over `schema`.
    #[must_use]
    pub fn new(schema: &'s Schema) -> Self {
        Self { schema }
    }

    /// Runs the five-stage pipeline over `input`.
    ///
    /// Returns the validated output map — symbol-keyed by the schema's
    /// field names, values possibly coerced or defaulted — or the
    /// aggregated errors of the first failing stage.
    pub fn validate(
        &self,
        input: &Value,
        options: &ValidateOptions,
    ) -> Result<ValueMap, Vec<ValidationError>> {
        let strict = options.strict.unwrap_or_else(|| self.schema.is_strict());
        tracing::debug!(
            fields = self.schema.len(),
            coerce = options.coerce,
            strict,
            "validating input"
        );

        // Stage 1: the input must be a map at all.
        let Some(input_map) = input.as_map() else {
            return Err(vec![
                ValidationError::input_format(input.kind()).prefixed(&options.root),
            ]);
        };

        // Stage 2: collect every missing required field, then stop.
        // Field-level validation never runs against an incomplete input.
        let missing: Vec<ValidationError> = self
            .schema
            .required_fields()
            .filter(|&name| !input_map.contains_field(name))
            .map(|name| ValidationError::required(options.root.child(name), name))
            .collect();
        if !missing.is_empty() {
            tracing::debug!(missing = missing.len(), "required fields absent");
            return Err(missing);
        }

        // Stage 3: per-field validation, aggregated across all fields.
        let mut output = ValueMap::new();
        let mut errors = Vec::new();
        for field in self.schema.fields() {
            let field_path = options.root.child(field.name());
            match input_map.get_field(field.name()) {
                Some(present) => {
                    let value = if options.coerce {
                        match coerce(field.spec(), present.clone(), self.schema.symbols()) {
                            Ok(coerced) => coerced,
                            Err(coercion_errors) => {
                                errors.extend(
                                    coercion_errors
                                        .into_iter()
                                        .map(|e| e.prefixed(&field_path)),
                                );
                                continue;
                            }
                        }
                    } else {
                        present.clone()
                    };

                    match check(field.spec(), &value, &field_path) {
                        Err(type_errors) => errors.extend(type_errors),
                        // Constraints assume a type-validated value, so
                        // they only run once the structural check passed.
                        Ok(()) => match apply_constraints(field.constraints(), &value, &field_path)
                        {
                            Err(constraint_errors) => errors.extend(constraint_errors),
                            Ok(()) => {
                                output.insert_symbol(field.name(), value);
                            }
                        },
                    }
                }
                None if field.default().is_some() => {
                    // Defaults are trusted: no type or constraint checks.
                    if let Some(default) = field.default() {
                        output.insert_symbol(field.name(), default.clone());
                    }
                }
                None if field.is_required() => {
                    // Redundant with stage 2, kept as a safety net for
                    // direct calls.
                    errors.push(ValidationError::required(field_path, field.name()));
                }
                // Absent optional fields are omitted entirely, not nulled.
                None => {}
            }
        }
        if !errors.is_empty() {
            tracing::debug!(errors = errors.len(), "field validation failed");
            return Err(errors);
        }

        // Stage 4: strict-mode sweep over leftover input keys.
        if strict {
            let mut extras: Vec<String> = Vec::new();
            for key in input_map.keys() {
                let name = key.name();
                if !output.contains_field(name) && !extras.iter().any(|e| e == name) {
                    extras.push(name.to_owned());
                }
            }
            if !extras.is_empty() {
                return Err(vec![
                    ValidationError::new(
                        options.root.clone(),
                        codes::EXTRA_FIELDS,
                        format!("unexpected fields: {}", extras.join(", ")),
                    )
                    .with_context(
                        "fields",
                        Value::Array(extras.into_iter().map(Value::Text).collect()),
                    ),
                ]);
            }
        }

        // Stage 5: the post-validation hook, isolated from panics.
        if let Some(hook) = self.schema.post_validate_hook() {
            output = match catch_unwind(AssertUnwindSafe(|| hook(output))) {
                Ok(Ok(replacement)) => replacement,
                Ok(Err(rejection)) => {
                    return Err(rejection_errors(rejection, &options.root));
                }
                Err(panic) => {
                    return Err(vec![ValidationError::new(
                        options.root.clone(),
                        codes::POST_VALIDATION,
                        format!(
                            "post-validation hook panicked: {}",
                            panic_message(panic.as_ref())
                        ),
                    )]);
                }
            };
        }

        Ok(output)
    }

    /// Like [`validate`](Self::validate), but yields a single
    /// [`SchemaViolation`] on failure.
    pub fn validate_checked(
        &self,
        input: &Value,
        options: &ValidateOptions,
    ) -> Result<ValueMap, SchemaViolation> {
        self.validate(input, options).map_err(SchemaViolation::from)
    }

    /// Panic-on-failure variant: returns the bare validated map, or panics
    /// with the newline-joined, path-prefixed rendering of every error.
    ///
    /// # Panics
    ///
    /// Panics when validation fails.
    #[must_use]
    pub fn must_validate(&self, input: &Value, options: &ValidateOptions) -> ValueMap {
        match self.validate(input, options) {
            Ok(output) => output,
            Err(errors) => panic!("schema validation failed:\n{}", format_many(&errors)),
        }
    }
}

impl Schema {
    /// A validator borrowing this schema.
    #[must_use]
    pub fn validator(&self) -> Validator<'_> {
        Validator::new(self)
    }

    /// Validates `input` against this schema; see [`Validator::validate`].
    pub fn validate(
        &self,
        input: &Value,
        options: &ValidateOptions,
    ) -> Result<ValueMap, Vec<ValidationError>> {
        self.validator().validate(input, options)
    }
}

fn rejection_errors(rejection: HookRejection, root: &Path) -> Vec<ValidationError> {
    match rejection {
        HookRejection::Message(message) => {
            vec![ValidationError::new(
                root.clone(),
                codes::POST_VALIDATION,
                message,
            )]
        }
        HookRejection::Error(error) => vec![error.prefixed(root)],
        HookRejection::Errors(errors) => {
            errors.into_iter().map(|e| e.prefixed(root)).collect()
        }
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "opaque panic payload".to_owned()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldOption, FieldSpec, SchemaOptions};
    use crate::types::TypeSpec;
    use veld_value::value;

    fn person() -> Schema {
        Schema::define(
            [
                FieldSpec::new("name", TypeSpec::Text),
                FieldSpec::new("age", TypeSpec::Integer)
                    .with(FieldOption::optional(true))
                    .with(FieldOption::gt(0i64)),
            ],
            SchemaOptions::new(),
        )
        .unwrap()
    }

    #[test]
    fn test_happy_path_is_symbol_keyed() {
        let schema = person();
        let output = schema
            .validate(&value!({ "name" => "Ada", "age" => 36i64 }), &ValidateOptions::new())
            .unwrap();
        assert_eq!(output.get_field("name"), Some(&value!("Ada")));
        assert!(output.keys().all(veld_value::Key::is_symbol));
    }

    #[test]
    fn test_non_map_input_stops_everything() {
        let schema = person();
        let errors = schema
            .validate(&value!("not a map"), &ValidateOptions::new())
            .unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code, "input_format");
        assert!(errors[0].path.is_empty());
    }

    #[test]
    fn test_missing_required_short_circuits_field_checks() {
        let schema = Schema::define(
            [
                FieldSpec::new("name", TypeSpec::Text),
                FieldSpec::new("age", TypeSpec::Integer),
            ],
            SchemaOptions::new(),
        )
        .unwrap();
        // `age` is present but mistyped; its type error must NOT appear
        // because the missing `name` stops the pipeline at stage 2.
        let errors = schema
            .validate(&value!({ "age" => "x" }), &ValidateOptions::new())
            .unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code, "required");
        assert_eq!(errors[0].path.render("."), "name");
    }

    #[test]
    fn test_all_missing_required_fields_aggregate() {
        let schema = Schema::define(
            [
                FieldSpec::new("name", TypeSpec::Text),
                FieldSpec::new("age", TypeSpec::Integer),
            ],
            SchemaOptions::new(),
        )
        .unwrap();
        let errors = schema.validate(&value!({}), &ValidateOptions::new()).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().all(|e| e.code == "required"));
    }

    #[test]
    fn test_field_errors_aggregate_across_fields() {
        let schema = Schema::define(
            [
                FieldSpec::new("a", TypeSpec::Integer),
                FieldSpec::new("b", TypeSpec::Boolean),
            ],
            SchemaOptions::new(),
        )
        .unwrap();
        let errors = schema
            .validate(&value!({ "a" => "x", "b" => 1i64 }), &ValidateOptions::new())
            .unwrap_err();
        assert_eq!(errors.len(), 2);
        let paths: Vec<_> = errors.iter().map(|e| e.path.render(".")).collect();
        assert_eq!(paths, ["a", "b"]);
    }

    #[test]
    fn test_dual_key_lookup() {
        let schema = person();
        let mut map = ValueMap::new();
        map.insert_symbol("name", value!("Ada"));
        let output = schema
            .validate(&Value::Map(map), &ValidateOptions::new())
            .unwrap();
        assert_eq!(output.get_field("name"), Some(&value!("Ada")));
    }

    #[test]
    fn test_coercion_then_constraints() {
        let schema = person();
        // "0" coerces cleanly to 0, then the gt constraint rejects it —
        // the failure is `gt`, never `coercion`.
        let errors = schema
            .validate(
                &value!({ "name" => "Ada", "age" => "0" }),
                &ValidateOptions::new().coercing(),
            )
            .unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code, "gt");
        assert_eq!(errors[0].path.render("."), "age");
    }

    #[test]
    fn test_coercion_failure_propagates() {
        let schema = person();
        let errors = schema
            .validate(
                &value!({ "name" => "Ada", "age" => "young" }),
                &ValidateOptions::new().coercing(),
            )
            .unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code, "coercion");
        assert_eq!(errors[0].path.render("."), "age");
    }

    #[test]
    fn test_without_coercion_text_is_a_type_error() {
        let schema = person();
        let errors = schema
            .validate(
                &value!({ "name" => "Ada", "age" => "36" }),
                &ValidateOptions::new(),
            )
            .unwrap_err();
        assert_eq!(errors[0].code, "type");
    }

    #[test]
    fn test_default_bypasses_checks() {
        let schema = Schema::define(
            [
                FieldSpec::new("count", TypeSpec::Integer)
                    .with(FieldOption::default(0i64))
                    .with(FieldOption::gt(0i64)),
            ],
            SchemaOptions::new(),
        )
        .unwrap();
        // The default 0 violates gt:0, but defaults are trusted.
        let output = schema.validate(&value!({}), &ValidateOptions::new()).unwrap();
        assert_eq!(output.get_field("count"), Some(&value!(0i64)));
    }

    #[test]
    fn test_absent_optional_is_omitted() {
        let schema = person();
        let output = schema
            .validate(&value!({ "name" => "Ada" }), &ValidateOptions::new())
            .unwrap();
        assert!(!output.contains_field("age"));
        assert_eq!(output.len(), 1);
    }

    #[test]
    fn test_strict_mode_reports_extras() {
        let schema = Schema::define(
            [FieldSpec::new("name", TypeSpec::Text)],
            SchemaOptions::new().strict(),
        )
        .unwrap();
        let errors = schema
            .validate(
                &value!({ "name" => "Ada", "extra" => "x" }),
                &ValidateOptions::new(),
            )
            .unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code, "extra_fields");
        assert!(errors[0].path.is_empty());
        assert!(errors[0].message.contains("extra"));
    }

    #[test]
    fn test_strict_override_per_call() {
        let schema = Schema::define(
            [FieldSpec::new("name", TypeSpec::Text)],
            SchemaOptions::new(),
        )
        .unwrap();
        let input = value!({ "name" => "Ada", "extra" => "x" });
        assert!(schema.validate(&input, &ValidateOptions::new()).is_ok());
        assert!(
            schema
                .validate(&input, &ValidateOptions::new().strict(true))
                .is_err()
        );
    }

    #[test]
    fn test_hook_can_replace_the_map() {
        let schema = Schema::define(
            [FieldSpec::new("name", TypeSpec::Text)],
            SchemaOptions::new().post_validate(|mut map: ValueMap| {
                map.insert_symbol("greeted", value!(true));
                Ok::<_, HookRejection>(map)
            }),
        )
        .unwrap();
        let output = schema
            .validate(&value!({ "name" => "Ada" }), &ValidateOptions::new())
            .unwrap();
        assert_eq!(output.get_field("greeted"), Some(&value!(true)));
    }

    #[test]
    fn test_hook_rejection_with_message() {
        let schema = Schema::define(
            [FieldSpec::new("name", TypeSpec::Text)],
            SchemaOptions::new().post_validate(|_map| Err::<ValueMap, _>("names are closed today")),
        )
        .unwrap();
        let errors = schema
            .validate(&value!({ "name" => "Ada" }), &ValidateOptions::new())
            .unwrap_err();
        assert_eq!(errors[0].code, "post_validation");
        assert_eq!(errors[0].message, "names are closed today");
    }

    #[test]
    fn test_hook_rejection_with_error_list() {
        let schema = Schema::define(
            [FieldSpec::new("name", TypeSpec::Text)],
            SchemaOptions::new().post_validate(|_map| {
                Err::<ValueMap, _>(vec![
                    ValidationError::new("name", "custom", "first"),
                    ValidationError::new("name", "custom", "second"),
                ])
            }),
        )
        .unwrap();
        let errors = schema
            .validate(&value!({ "name" => "Ada" }), &ValidateOptions::new())
            .unwrap_err();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].code, "custom");
    }

    #[test]
    fn test_hook_panic_is_isolated() {
        let schema = Schema::define(
            [FieldSpec::new("name", TypeSpec::Text)],
            SchemaOptions::new()
                .post_validate(|_map: ValueMap| -> Result<ValueMap, HookRejection> {
                    panic!("hook exploded")
                }),
        )
        .unwrap();
        let errors = schema
            .validate(&value!({ "name" => "Ada" }), &ValidateOptions::new())
            .unwrap_err();
        assert_eq!(errors[0].code, "post_validation");
        assert!(errors[0].message.contains("hook exploded"));
    }

    #[test]
    fn test_hook_only_runs_after_clean_stages() {
        use std::sync::atomic::{AtomicBool, Ordering};
        use std::sync::Arc;

        let ran = Arc::new(AtomicBool::new(false));
        let ran_in_hook = Arc::clone(&ran);
        let schema = Schema::define(
            [FieldSpec::new("name", TypeSpec::Text)],
            SchemaOptions::new().post_validate(move |map| {
                ran_in_hook.store(true, Ordering::SeqCst);
                Ok::<_, HookRejection>(map)
            }),
        )
        .unwrap();
        let _ = schema.validate(&value!({ "name" => 3i64 }), &ValidateOptions::new());
        assert!(!ran.load(Ordering::SeqCst));
    }

    #[test]
    fn test_validation_is_idempotent() {
        let schema = person();
        let options = ValidateOptions::new();
        let once = schema
            .validate(
                &value!({ "name" => "Ada", "age" => 36i64 }),
                &options,
            )
            .unwrap();
        let twice = schema.validate(&Value::Map(once.clone()), &options).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_must_validate_panics_with_full_rendering() {
        let schema = Schema::define(
            [
                FieldSpec::new("a", TypeSpec::Text),
                FieldSpec::new("b", TypeSpec::Text),
            ],
            SchemaOptions::new(),
        )
        .unwrap();
        let panicked = std::panic::catch_unwind(AssertUnwindSafe(|| {
            schema.validator().must_validate(&value!({}), &ValidateOptions::new())
        }))
        .unwrap_err();
        let message = panicked.downcast_ref::<String>().unwrap();
        assert!(message.contains("a: required"));
        assert!(message.contains("b: required"));
    }

    #[test]
    fn test_validate_checked_wraps_errors() {
        let schema = person();
        let violation = schema
            .validator()
            .validate_checked(&value!({}), &ValidateOptions::new())
            .unwrap_err();
        assert_eq!(violation.errors().len(), 1);
        assert!(violation.to_string().contains("name"));
    }

    #[test]
    fn test_root_prefix_tags_all_errors() {
        let schema = person();
        let options = ValidateOptions::new().rooted(Path::single(7usize));
        let errors = schema.validate(&value!({}), &options).unwrap_err();
        assert_eq!(errors[0].path.render("."), "7.name");
        let errors = schema.validate(&value!("x"), &options).unwrap_err();
        assert_eq!(errors[0].path.render("."), "7");
    }
}
