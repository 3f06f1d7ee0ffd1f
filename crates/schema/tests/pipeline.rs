//! End-to-end tests for the validation pipeline contract.
//!
//! The single most important invariant exercised here: aggregate within a
//! stage, short-circuit across stages.

use pretty_assertions::assert_eq;
use rstest::rstest;

use veld_schema::prelude::*;

fn account_schema() -> Schema {
    schema! {
        name: TypeSpec::Text, min_length: 1;
        age: TypeSpec::Integer, optional: true, gt: 0i64;
        tags: TypeSpec::array(TypeSpec::Text), optional: true, max_items: 4;
    }
    .unwrap()
}

// ============================================================================
// STAGE ORDER
// ============================================================================

#[test]
fn missing_required_never_co_reports_type_errors() {
    let schema = schema! {
        name: TypeSpec::Text;
        age: TypeSpec::Integer;
    }
    .unwrap();

    // `age` is present and mistyped, `name` is missing. Stage 2 stops the
    // pipeline, so the only error is the missing field.
    let errors = schema
        .validate(&value!({ "age" => "not a number" }), &ValidateOptions::new())
        .unwrap_err();

    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].code, "required");
    assert!(errors.iter().all(|e| e.code != "type"));
}

#[test]
fn two_missing_fields_give_exactly_two_required_errors() {
    let schema = schema! {
        name: TypeSpec::Text;
        age: TypeSpec::Integer;
    }
    .unwrap();

    let errors = schema.validate(&value!({}), &ValidateOptions::new()).unwrap_err();

    assert_eq!(errors.len(), 2);
    let paths: Vec<_> = errors.iter().map(|e| e.path.render(".")).collect();
    assert_eq!(paths, ["name", "age"]);
    assert!(errors.iter().all(|e| e.code == "required"));
}

#[test]
fn multiple_invalid_fields_report_together() {
    let schema = schema! {
        a: TypeSpec::Integer;
        b: TypeSpec::Boolean;
        c: TypeSpec::Text;
    }
    .unwrap();

    let errors = schema
        .validate(
            &value!({ "a" => "x", "b" => 0i64, "c" => "fine" }),
            &ValidateOptions::new(),
        )
        .unwrap_err();

    assert_eq!(errors.len(), 2);
    let paths: Vec<_> = errors.iter().map(|e| e.path.render(".")).collect();
    assert_eq!(paths, ["a", "b"]);
}

#[test]
fn non_map_input_is_one_global_error() {
    let schema = account_schema();
    for input in [value!(42i64), value!("x"), value!([1i64]), value!(null)] {
        let errors = schema.validate(&input, &ValidateOptions::new()).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code, "input_format");
        assert!(errors[0].path.is_empty());
    }
}

#[test]
fn strict_sweep_only_runs_after_clean_field_stage() {
    let schema = schema! {
        options: SchemaOptions::new().strict();
        name: TypeSpec::Text;
    }
    .unwrap();

    // Bad field value AND an extra key: the field error wins, the strict
    // error must not appear yet.
    let errors = schema
        .validate(
            &value!({ "name" => 1i64, "extra" => "x" }),
            &ValidateOptions::new(),
        )
        .unwrap_err();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].code, "type");
}

// ============================================================================
// TYPE SYSTEM THROUGH THE PIPELINE
// ============================================================================

#[test]
fn union_value_matching_no_alternative_is_one_type_error() {
    let schema = schema! {
        id: TypeSpec::union([TypeSpec::Text, TypeSpec::Integer]);
    }
    .unwrap();

    let errors = schema
        .validate(&value!({ "id" => true }), &ValidateOptions::new())
        .unwrap_err();

    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].code, "type");
    assert_eq!(errors[0].path.render("."), "id");
}

#[test]
fn union_first_match_applies_string_constraints() {
    // A text value must resolve to the text alternative, not fall through
    // to `any` — so text constraints still apply to it.
    let schema = schema! {
        id: TypeSpec::union([TypeSpec::Text, TypeSpec::Any]), min_length: 5;
    }
    .unwrap();

    let errors = schema
        .validate(&value!({ "id" => "abc" }), &ValidateOptions::new())
        .unwrap_err();
    assert_eq!(errors[0].code, "min_length");
}

#[test]
fn array_element_error_paths_are_precise() {
    let schema = schema! {
        nums: TypeSpec::array(TypeSpec::Integer);
    }
    .unwrap();

    let errors = schema
        .validate(&value!({ "nums" => [1i64, "two", 3i64] }), &ValidateOptions::new())
        .unwrap_err();

    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].code, "type");
    assert_eq!(errors[0].path.render("."), "nums.1");
}

#[rstest]
#[case::too_short(value!([ "x" ]), "tuple_size", "pair")]
#[case::too_long(value!([ "x", 1i64, 2i64 ]), "tuple_size", "pair")]
fn tuple_arity_mismatch_is_tuple_size(
    #[case] input: Value,
    #[case] code: &str,
    #[case] path: &str,
) {
    let schema = schema! {
        pair: TypeSpec::tuple([TypeSpec::Text, TypeSpec::Integer]);
    }
    .unwrap();

    let errors = schema
        .validate(&value!({ "pair" => (input) }), &ValidateOptions::new())
        .unwrap_err();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].code, code);
    assert_eq!(errors[0].path.render("."), path);
}

#[test]
fn tuple_element_errors_are_positional() {
    let schema = schema! {
        pair: TypeSpec::tuple([TypeSpec::Text, TypeSpec::Integer]);
    }
    .unwrap();

    let errors = schema
        .validate(&value!({ "pair" => [42i64, "x"] }), &ValidateOptions::new())
        .unwrap_err();

    assert_eq!(errors.len(), 2);
    assert_eq!(errors[0].code, "type");
    assert_eq!(errors[0].path.render("."), "pair.0");
    assert_eq!(errors[1].code, "type");
    assert_eq!(errors[1].path.render("."), "pair.1");
}

#[test]
fn typed_map_labels_key_and_value_failures_distinctly() {
    let schema = schema! {
        env: TypeSpec::typed_map(TypeSpec::Text, TypeSpec::Integer);
    }
    .unwrap();

    let errors = schema
        .validate(
            &value!({ "env" => { "PORT" => "8080", "TRIES" => 3i64 } }),
            &ValidateOptions::new(),
        )
        .unwrap_err();

    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].path.render("."), "env.PORT");
}

// ============================================================================
// COERCION
// ============================================================================

#[test]
fn coercion_runs_before_constraints() {
    let schema = schema! {
        age: TypeSpec::Integer, gt: 0i64;
    }
    .unwrap();

    // "0" coerces to 0, then gt rejects it — code `gt`, never `coercion`.
    let errors = schema
        .validate(&value!({ "age" => "0" }), &ValidateOptions::new().coercing())
        .unwrap_err();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].code, "gt");

    let output = schema
        .validate(&value!({ "age" => "7" }), &ValidateOptions::new().coercing())
        .unwrap();
    assert_eq!(output.get_field("age"), Some(&value!(7i64)));
}

#[test]
fn coercion_failure_propagates_with_field_path() {
    let schema = schema! {
        age: TypeSpec::Integer;
    }
    .unwrap();

    let errors = schema
        .validate(&value!({ "age" => "4.2" }), &ValidateOptions::new().coercing())
        .unwrap_err();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].code, "coercion");
    assert_eq!(errors[0].path.render("."), "age");
}

#[test]
fn array_coercion_failures_keep_index_paths() {
    let schema = schema! {
        nums: TypeSpec::array(TypeSpec::Integer);
    }
    .unwrap();

    let errors = schema
        .validate(
            &value!({ "nums" => ["1", "x", "3"] }),
            &ValidateOptions::new().coercing(),
        )
        .unwrap_err();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].code, "coercion");
    assert_eq!(errors[0].path.render("."), "nums.1");
}

#[test]
fn symbol_coercion_is_bounded_by_the_schema_table() {
    let schema = schema! {
        status: TypeSpec::Symbol,
            choices: vec![Value::symbol("active"), Value::symbol("archived")];
    }
    .unwrap();

    // "active" was registered via choices, so text coerces to it.
    let output = schema
        .validate(
            &value!({ "status" => "active" }),
            &ValidateOptions::new().coercing(),
        )
        .unwrap();
    assert_eq!(output.get_field("status"), Some(&Value::symbol("active")));

    // Unknown names fail instead of interning a new symbol.
    let before = schema.symbols().len();
    let errors = schema
        .validate(
            &value!({ "status" => "deleted" }),
            &ValidateOptions::new().coercing(),
        )
        .unwrap_err();
    assert_eq!(errors[0].code, "coercion");
    assert_eq!(schema.symbols().len(), before);
}

// ============================================================================
// DEFAULTS, STRICT MODE, HOOKS
// ============================================================================

#[test]
fn defaults_bypass_type_and_constraint_checks() {
    let schema = schema! {
        count: TypeSpec::Integer, default: 0i64, gt: 0i64;
    }
    .unwrap();

    let output = schema.validate(&value!({}), &ValidateOptions::new()).unwrap();
    assert_eq!(output.get_field("count"), Some(&value!(0i64)));
}

#[test]
fn absent_optional_fields_are_omitted_not_nulled() {
    let schema = account_schema();
    let output = schema
        .validate(&value!({ "name" => "Ada" }), &ValidateOptions::new())
        .unwrap();
    assert_eq!(output.len(), 1);
    assert!(!output.contains_field("age"));
    assert!(!output.contains_field("tags"));
}

#[test]
fn strict_mode_round_trip() {
    let schema = schema! {
        options: SchemaOptions::new().strict();
        name: TypeSpec::Text;
    }
    .unwrap();

    let errors = schema
        .validate(
            &value!({ "name" => "A", "extra" => "x" }),
            &ValidateOptions::new(),
        )
        .unwrap_err();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].code, "extra_fields");
    assert!(errors[0].path.is_empty());
    assert!(errors[0].message.contains("extra"));

    // Validated output round-trips cleanly under the same strict schema.
    let output = schema
        .validate(&value!({ "name" => "A" }), &ValidateOptions::new())
        .unwrap();
    let again = schema
        .validate(&Value::Map(output.clone()), &ValidateOptions::new())
        .unwrap();
    assert_eq!(output, again);
}

#[test]
fn hook_errors_do_not_crash_and_carry_post_validation_code() {
    let schema = Schema::define(
        [
            FieldSpec::new("start", TypeSpec::Integer),
            FieldSpec::new("end", TypeSpec::Integer),
        ],
        SchemaOptions::new().post_validate(|map: ValueMap| {
            let start = map.get_field("start").and_then(Value::as_integer);
            let end = map.get_field("end").and_then(Value::as_integer);
            if start <= end {
                Ok(map)
            } else {
                Err(HookRejection::from("start must not exceed end"))
            }
        }),
    )
    .unwrap();

    assert!(
        schema
            .validate(&value!({ "start" => 1i64, "end" => 2i64 }), &ValidateOptions::new())
            .is_ok()
    );

    let errors = schema
        .validate(&value!({ "start" => 9i64, "end" => 2i64 }), &ValidateOptions::new())
        .unwrap_err();
    assert_eq!(errors[0].code, "post_validation");
    assert_eq!(errors[0].message, "start must not exceed end");
}

// ============================================================================
// IDEMPOTENCE AND BATCH
// ============================================================================

#[test]
fn validated_output_revalidates_unchanged() {
    let schema = account_schema();
    let options = ValidateOptions::new();

    let once = schema
        .validate(
            &value!({ "name" => "Ada", "age" => 36i64, "tags" => ["ops"] }),
            &options,
        )
        .unwrap();
    let twice = schema.validate(&Value::Map(once.clone()), &options).unwrap();
    assert_eq!(once, twice);
}

#[test]
fn batch_attributes_errors_to_the_right_index() {
    let schema = account_schema();
    let inputs = vec![
        value!({ "name" => "Ada" }),
        value!({ "name" => "" }),
        value!({ "name" => "Grace" }),
    ];

    let failures = schema
        .validate_many(&inputs, &ValidateOptions::new())
        .unwrap_err();
    assert_eq!(failures.keys().copied().collect::<Vec<_>>(), [1]);
    assert_eq!(failures[&1][0].code, "min_length");
    assert_eq!(failures[&1][0].path.render("."), "1.name");
}

#[test]
fn batch_success_returns_everything_in_order() {
    let schema = account_schema();
    let inputs = vec![
        value!({ "name" => "Ada" }),
        value!({ "name" => "Grace", "age" => 85i64 }),
    ];
    let outputs = schema
        .validate_many(&inputs, &ValidateOptions::new())
        .unwrap();
    assert_eq!(outputs.len(), 2);
    assert_eq!(outputs[0].get_field("name"), Some(&value!("Ada")));
    assert_eq!(outputs[1].get_field("age"), Some(&value!(85i64)));
}

// ============================================================================
// ERROR SERIALIZATION
// ============================================================================

#[test]
fn every_pipeline_error_round_trips_through_portable_form() {
    let schema = schema! {
        options: SchemaOptions::new().strict();
        name: TypeSpec::Text, min_length: 1;
        nums: TypeSpec::array(TypeSpec::Integer), optional: true;
    }
    .unwrap();

    let failing_inputs = [
        value!(17i64),
        value!({}),
        value!({ "name" => "", "nums" => [1i64, "x"] }),
        value!({ "name" => "A", "surprise" => true }),
    ];

    for input in failing_inputs {
        let errors = schema.validate(&input, &ValidateOptions::new()).unwrap_err();
        for error in errors {
            let back = ValidationError::from_portable(&error.to_portable()).unwrap();
            assert_eq!(back, error);
        }
    }
}

#[test]
fn must_validate_renders_every_error_in_the_panic() {
    let schema = schema! {
        a: TypeSpec::Text;
        b: TypeSpec::Integer;
    }
    .unwrap();

    let panicked = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        schema.validator().must_validate(&value!({}), &ValidateOptions::new())
    }))
    .unwrap_err();
    let message = panicked.downcast_ref::<String>().unwrap();
    assert!(message.contains("a: required field `a` is missing"));
    assert!(message.contains("b: required field `b` is missing"));
}
