//! Prelude module for convenient imports.
//!
//! A single `use veld_schema::prelude::*;` brings in the types and
//! functions most call sites need.

pub use crate::error::{
    ValidationError, filter_by_code, format_many, group_by_code, group_by_path,
};
pub use crate::facade::{
    batch_validator_for, check_many, check_many_values, check_named, check_value, validator_for,
};
pub use crate::json_schema::to_json_schema;
pub use crate::schema::{
    FieldDefinition, FieldOption, FieldSpec, HookRejection, Schema, SchemaMetadata, SchemaOptions,
};
// The `schema!` macro lives at the crate root; this brings it (and the
// module of the same name) into glob imports of the prelude.
pub use crate::schema;
pub use crate::types::{Constraint, TypeSpec, Validatable, apply_constraints, check, coerce};
pub use crate::validate::{SchemaViolation, ValidateOptions, Validator};

pub use veld_value::{
    Key, Path, Segment, SymbolTable, Value, ValueKind, ValueMap, ValueMapExt, value,
};
