//! Deterministic JSON Schema emission.
//!
//! A one-way mapping from the type model to a JSON Schema document.
//! Fields emit in definition order and `serde_json`'s `preserve_order`
//! keeps them there, so the same schema always renders byte-identically.

use serde_json::{Map, Value as Json, json};

use crate::schema::{FieldDefinition, Schema};
use crate::types::{Constraint, TypeSpec};

/// Renders `schema` as a JSON Schema object document.
#[must_use]
pub fn to_json_schema(schema: &Schema) -> Json {
    let mut document = Map::new();
    if let Some(title) = schema.title() {
        document.insert("title".to_owned(), json!(title));
    }
    if let Some(description) = schema.description() {
        document.insert("description".to_owned(), json!(description));
    }
    document.insert("type".to_owned(), json!("object"));

    let mut properties = Map::new();
    for field in schema.fields() {
        properties.insert(field.name().to_owned(), field_entry(field));
    }
    document.insert("properties".to_owned(), Json::Object(properties));

    let required: Vec<&str> = schema.required_fields().collect();
    if !required.is_empty() {
        document.insert("required".to_owned(), json!(required));
    }
    if schema.is_strict() {
        document.insert("additionalProperties".to_owned(), json!(false));
    }

    Json::Object(document)
}

fn field_entry(field: &FieldDefinition) -> Json {
    let Json::Object(mut entry) = type_entry(field.spec()) else {
        unreachable!("type_entry always returns an object");
    };
    for constraint in field.constraints() {
        constraint_keyword(constraint, &mut entry);
    }
    if let Some(description) = field.description() {
        entry.insert("description".to_owned(), json!(description));
    }
    if let Some(default) = field.default() {
        if let Ok(default) = Json::try_from(default) {
            entry.insert("default".to_owned(), default);
        }
    }
    if let Some(example) = field.example() {
        if let Ok(example) = Json::try_from(example) {
            entry.insert("examples".to_owned(), Json::Array(vec![example]));
        }
    }
    Json::Object(entry)
}

fn type_entry(spec: &TypeSpec) -> Json {
    match spec {
        TypeSpec::Text | TypeSpec::Symbol => json!({"type": "string"}),
        TypeSpec::Integer => json!({"type": "integer"}),
        TypeSpec::Float => json!({"type": "number"}),
        TypeSpec::Boolean => json!({"type": "boolean"}),
        TypeSpec::Any => json!({}),
        TypeSpec::Map => json!({"type": "object"}),
        TypeSpec::Array { element, bounds } => {
            let mut entry = Map::new();
            entry.insert("type".to_owned(), json!("array"));
            entry.insert("items".to_owned(), type_entry(element));
            if let Some(min) = bounds.min_items {
                entry.insert("minItems".to_owned(), json!(min));
            }
            if let Some(max) = bounds.max_items {
                entry.insert("maxItems".to_owned(), json!(max));
            }
            Json::Object(entry)
        }
        TypeSpec::Union(alternatives) => json!({
            "anyOf": alternatives.iter().map(type_entry).collect::<Vec<_>>(),
        }),
        TypeSpec::Tuple(elements) => json!({
            "type": "array",
            "prefixItems": elements.iter().map(type_entry).collect::<Vec<_>>(),
            "minItems": elements.len(),
            "maxItems": elements.len(),
        }),
        TypeSpec::TypedMap { key, value } => json!({
            "type": "object",
            "propertyNames": type_entry(key),
            "additionalProperties": type_entry(value),
        }),
        // Custom types have no standard JSON Schema rendering; the
        // extension keyword at least names them.
        TypeSpec::Custom(validatable) => json!({"x-custom-type": validatable.type_name()}),
    }
}

fn constraint_keyword(constraint: &Constraint, entry: &mut Map<String, Json>) {
    match constraint {
        Constraint::MinLength(min) => {
            entry.insert("minLength".to_owned(), json!(min));
        }
        Constraint::MaxLength(max) => {
            entry.insert("maxLength".to_owned(), json!(max));
        }
        Constraint::MinItems(min) => {
            entry.insert("minItems".to_owned(), json!(min));
        }
        Constraint::MaxItems(max) => {
            entry.insert("maxItems".to_owned(), json!(max));
        }
        Constraint::Gt(bound) => {
            if let Ok(bound) = Json::try_from(bound) {
                entry.insert("exclusiveMinimum".to_owned(), bound);
            }
        }
        Constraint::Gteq(bound) => {
            if let Ok(bound) = Json::try_from(bound) {
                entry.insert("minimum".to_owned(), bound);
            }
        }
        Constraint::Lt(bound) => {
            if let Ok(bound) = Json::try_from(bound) {
                entry.insert("exclusiveMaximum".to_owned(), bound);
            }
        }
        Constraint::Lteq(bound) => {
            if let Ok(bound) = Json::try_from(bound) {
                entry.insert("maximum".to_owned(), bound);
            }
        }
        Constraint::Format(pattern) => {
            entry.insert("pattern".to_owned(), json!(pattern.as_str()));
        }
        Constraint::Choices(allowed) => {
            let rendered: Vec<Json> = allowed.iter().filter_map(|v| Json::try_from(v).ok()).collect();
            entry.insert("enum".to_owned(), Json::Array(rendered));
        }
    }
}
