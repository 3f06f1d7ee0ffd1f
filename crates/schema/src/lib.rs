//! # veld-schema
//!
//! A runtime schema-definition and data-validation engine: declare field
//! specs at runtime, get back an immutable [`Schema`], and run untrusted
//! key-value input through a five-stage validation pipeline with optional
//! coercion and a post-validation hook.
//!
//! Built for dynamic validation needs — classifying responses from an
//! external, non-deterministic source against an expected shape — where
//! the schema cannot be known at compile time.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use veld_schema::prelude::*;
//!
//! let user = schema! {
//!     name: TypeSpec::Text, min_length: 1;
//!     age: TypeSpec::Integer, optional: true, gt: 0;
//! }?;
//!
//! let output = user.validate(
//!     &value!({ "name" => "Ada", "age" => "36" }),
//!     &ValidateOptions::new().coercing(),
//! )?;
//! assert_eq!(output.get_field("age"), Some(&Value::Integer(36)));
//! ```
//!
//! ## Pipeline contract
//!
//! Validation runs five stages in fixed order — input shape, required
//! presence, per-field checks, strict-mode sweep, post-validation hook —
//! aggregating every independent failure *within* a stage while a failing
//! stage stops everything *after* it. See [`validate`] for the details.
//!
//! ## Pieces
//!
//! - [`types`] — the recursive [`TypeSpec`] grammar, structural checking,
//!   coercion, constraints.
//! - [`schema`] — immutable [`Schema`] construction and introspection.
//! - [`validate`] — the pipeline, batch and streaming variants.
//! - [`facade`] — one-off checks and reusable validator closures.
//! - [`json_schema`] — deterministic JSON Schema emission.

pub mod error;
pub mod facade;
pub mod json_schema;
mod macros;
pub mod prelude;
pub mod schema;
pub mod types;
pub mod validate;

pub use error::{PortableErrorInvalid, ValidationError, codes};
pub use schema::{
    DefinitionError, FieldDefinition, FieldOption, FieldSpec, HookRejection, OptionParseError,
    PostValidateHook, Schema, SchemaMetadata, SchemaOptions, SchemaSummary,
};
pub use types::{ArrayBounds, Constraint, TypeSpec, Validatable};
pub use validate::{SchemaViolation, ValidateOptions, Validator};
