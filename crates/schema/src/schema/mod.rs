//! The immutable schema model.
//!
//! A [`Schema`] binds field names to resolved definitions plus schema-level
//! configuration (strict mode, an optional post-validation hook, metadata).
//! It is built once by [`Schema::define`] and read-only thereafter — the
//! validator never mutates it, so one schema can serve concurrent
//! validations without locking.

use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;

use veld_value::{SymbolTable, Value, ValueMap};

use crate::error::ValidationError;

mod field;

pub use field::{FieldDefinition, FieldOption, FieldSpec, OptionParseError};

// ============================================================================
// DEFINITION ERRORS
// ============================================================================

/// Why schema definition was rejected.
///
/// These are programmer errors — a bug in the caller's schema, not bad
/// input data — so definition fails fast on the first one found.
#[derive(Debug, thiserror::Error)]
pub enum DefinitionError {
    #[error("field `{field}` has a malformed type: {reason}")]
    MalformedType { field: String, reason: String },
    #[error("field `{field}`: {source}")]
    UnknownOption {
        field: String,
        #[source]
        source: OptionParseError,
    },
    #[error("field `{field}` is declared required but carries a default")]
    RequiredWithDefault { field: String },
    #[error("field `{field}` has an invalid constraint: {reason}")]
    BadConstraint { field: String, reason: String },
    #[error("field `{field}` has an invalid `format` pattern: {source}")]
    BadPattern {
        field: String,
        #[source]
        source: regex::Error,
    },
    #[error("duplicate field `{field}`")]
    DuplicateField { field: String },
}

// ============================================================================
// POST-VALIDATION HOOK
// ============================================================================

/// How a post-validation hook rejects a validated map.
#[derive(Debug)]
pub enum HookRejection {
    /// A bare message; becomes one `post_validation` error.
    Message(String),
    /// A structured error, passed through as-is.
    Error(ValidationError),
    /// Several structured errors, passed through as-is.
    Errors(Vec<ValidationError>),
}

impl From<&str> for HookRejection {
    fn from(message: &str) -> Self {
        Self::Message(message.to_owned())
    }
}

impl From<String> for HookRejection {
    fn from(message: String) -> Self {
        Self::Message(message)
    }
}

impl From<ValidationError> for HookRejection {
    fn from(error: ValidationError) -> Self {
        Self::Error(error)
    }
}

impl From<Vec<ValidationError>> for HookRejection {
    fn from(errors: Vec<ValidationError>) -> Self {
        Self::Errors(errors)
    }
}

/// A caller-supplied cross-field check, run after all per-field checks
/// pass. May replace the validated map (data enrichment) or reject it.
pub type PostValidateHook = Arc<dyn Fn(ValueMap) -> Result<ValueMap, HookRejection> + Send + Sync>;

// ============================================================================
// SCHEMA OPTIONS
// ============================================================================

/// Caller-supplied schema metadata. The core never reads clocks or
/// environment; whatever belongs here is injected explicitly.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SchemaMetadata {
    pub version: Option<String>,
    pub created_at: Option<String>,
}

/// Schema-level configuration for [`Schema::define`].
#[derive(Clone, Default)]
pub struct SchemaOptions {
    pub strict: bool,
    pub title: Option<String>,
    pub description: Option<String>,
    pub post_validate: Option<PostValidateHook>,
    pub symbols: Option<Arc<SymbolTable>>,
    pub metadata: SchemaMetadata,
}

impl SchemaOptions {
    /// Options with every knob at its default.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables strict mode: unrecognized input keys become an error.
    #[must_use = "builder methods must be chained or built"]
    pub fn strict(mut self) -> Self {
        self.strict = true;
        self
    }

    /// Sets the schema title.
    #[must_use = "builder methods must be chained or built"]
    pub fn titled(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets the schema description.
    #[must_use = "builder methods must be chained or built"]
    pub fn described(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Installs a post-validation hook.
    #[must_use = "builder methods must be chained or built"]
    pub fn post_validate<F, E>(mut self, hook: F) -> Self
    where
        F: Fn(ValueMap) -> Result<ValueMap, E> + Send + Sync + 'static,
        E: Into<HookRejection>,
    {
        self.post_validate = Some(Arc::new(move |map| hook(map).map_err(Into::into)));
        self
    }

    /// Shares an existing symbol table instead of starting a fresh one.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_symbols(mut self, symbols: Arc<SymbolTable>) -> Self {
        self.symbols = Some(symbols);
        self
    }

    /// Attaches caller-supplied metadata.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_metadata(mut self, metadata: SchemaMetadata) -> Self {
        self.metadata = metadata;
        self
    }
}

impl fmt::Debug for SchemaOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaOptions")
            .field("strict", &self.strict)
            .field("title", &self.title)
            .field("description", &self.description)
            .field("post_validate", &self.post_validate.is_some())
            .field("metadata", &self.metadata)
            .finish()
    }
}

// ============================================================================
// SCHEMA
// ============================================================================

/// An immutable binding of field names to definitions plus schema-level
/// configuration. Field iteration preserves definition order, so
/// downstream output (JSON Schema emission, summaries) is deterministic.
#[derive(Clone)]
pub struct Schema {
    fields: IndexMap<String, FieldDefinition>,
    strict: bool,
    post_validate: Option<PostValidateHook>,
    title: Option<String>,
    description: Option<String>,
    symbols: Arc<SymbolTable>,
    metadata: SchemaMetadata,
}

impl Schema {
    /// Builds a schema from field specs, rejecting the whole schema on the
    /// first malformed spec.
    ///
    /// Field names and any symbol literals appearing in defaults or
    /// `choices` are registered into the schema's symbol table here —
    /// these are trusted, caller-declared names. Validation-time coercion
    /// only ever *reads* the table.
    pub fn define(
        specs: impl IntoIterator<Item = FieldSpec>,
        options: SchemaOptions,
    ) -> Result<Self, DefinitionError> {
        let symbols = options.symbols.unwrap_or_default();
        let mut fields = IndexMap::new();

        for spec in specs {
            let field = FieldDefinition::resolve(spec)?;
            symbols.register(field.name());
            if let Some(default) = field.default() {
                register_symbols(&symbols, default);
            }
            for constraint in field.constraints() {
                if let crate::types::Constraint::Choices(allowed) = constraint {
                    for choice in allowed {
                        register_symbols(&symbols, choice);
                    }
                }
            }
            let name = field.name().to_owned();
            if fields.insert(name.clone(), field).is_some() {
                return Err(DefinitionError::DuplicateField { field: name });
            }
        }

        tracing::debug!(
            fields = fields.len(),
            strict = options.strict,
            has_hook = options.post_validate.is_some(),
            "schema defined"
        );

        Ok(Self {
            fields,
            strict: options.strict,
            post_validate: options.post_validate,
            title: options.title,
            description: options.description,
            symbols,
            metadata: options.metadata,
        })
    }

    /// Builds a schema from dynamic `(name, type, option_map)` tuples, the
    /// runtime-constructed front door. Option maps are ordered `(key,
    /// value)` pairs; an unrecognized key fails the whole definition.
    pub fn define_dynamic(
        specs: impl IntoIterator<Item = (String, TypeSpec, Vec<(String, Value)>)>,
        options: SchemaOptions,
    ) -> Result<Self, DefinitionError> {
        let mut resolved = Vec::new();
        for (name, spec, entries) in specs {
            let mut field = FieldSpec::new(name.clone(), spec);
            for (key, value) in entries {
                field = match field.with_parsed(&key, value) {
                    Ok(field) => field,
                    Err(source) => {
                        return Err(DefinitionError::UnknownOption {
                            field: name,
                            source,
                        });
                    }
                };
            }
            resolved.push(field);
        }
        Self::define(resolved, options)
    }

    /// Field definitions in definition order.
    pub fn fields(&self) -> impl Iterator<Item = &FieldDefinition> {
        self.fields.values()
    }

    /// Looks up a field by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields.get(name)
    }

    /// Number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if the schema declares no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Names of required fields, in definition order.
    pub fn required_fields(&self) -> impl Iterator<Item = &str> {
        self.fields()
            .filter(|f| f.is_required())
            .map(FieldDefinition::name)
    }

    /// Names of optional fields, in definition order.
    pub fn optional_fields(&self) -> impl Iterator<Item = &str> {
        self.fields()
            .filter(|f| !f.is_required())
            .map(FieldDefinition::name)
    }

    /// Whether strict mode is on by default for this schema.
    #[must_use]
    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// The post-validation hook, if one is installed.
    #[must_use]
    pub fn post_validate_hook(&self) -> Option<&PostValidateHook> {
        self.post_validate.as_ref()
    }

    /// Schema title.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Schema description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Caller-supplied metadata.
    #[must_use]
    pub fn metadata(&self) -> &SchemaMetadata {
        &self.metadata
    }

    /// The symbol table backing text-to-symbol coercion for this schema.
    #[must_use]
    pub fn symbols(&self) -> &Arc<SymbolTable> {
        &self.symbols
    }

    /// Counts and flags for introspection and debugging.
    #[must_use]
    pub fn summary(&self) -> SchemaSummary {
        SchemaSummary {
            fields: self.fields.len(),
            required: self.required_fields().count(),
            optional: self.optional_fields().count(),
            strict: self.strict,
            has_post_validate: self.post_validate.is_some(),
        }
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("fields", &self.fields)
            .field("strict", &self.strict)
            .field("post_validate", &self.post_validate.is_some())
            .field("title", &self.title)
            .field("metadata", &self.metadata)
            .finish()
    }
}

/// Introspection counts for a schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemaSummary {
    pub fields: usize,
    pub required: usize,
    pub optional: usize,
    pub strict: bool,
    pub has_post_validate: bool,
}

/// Registers every symbol literal reachable inside `value`.
fn register_symbols(symbols: &SymbolTable, value: &Value) {
    match value {
        Value::Symbol(name) => symbols.register(name),
        Value::Array(items) => {
            for item in items {
                register_symbols(symbols, item);
            }
        }
        Value::Map(map) => {
            for (key, entry) in map {
                if key.is_symbol() {
                    symbols.register(key.name());
                }
                register_symbols(symbols, entry);
            }
        }
        _ => {}
    }
}
