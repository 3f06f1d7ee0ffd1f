//! Declarative schema definition macro.

/// Defines a schema with minimal boilerplate.
///
/// Each line is `name: <type spec> [, option: value ...];`. Option names
/// map one-to-one onto [`FieldOption`](crate::FieldOption) constructors,
/// so the recognized set is exactly the documented option keys. An
/// optional leading `options: <SchemaOptions>;` line configures the
/// schema itself.
///
/// Expands to [`Schema::define`](crate::Schema::define) and returns its
/// `Result`.
///
/// # Examples
///
/// ```rust,ignore
/// use veld_schema::{TypeSpec, SchemaOptions, schema};
///
/// let user = schema! {
///     options: SchemaOptions::new().titled("User").strict();
///     name: TypeSpec::Text, min_length: 1;
///     age: TypeSpec::Integer, optional: true, gt: 0;
///     tags: TypeSpec::array(TypeSpec::Text), max_items: 8;
/// }?;
/// ```
#[macro_export]
macro_rules! schema {
    (
        options: $options:expr;
        $( $fname:ident : $fspec:expr $( , $okey:ident : $oval:expr )* ; )*
    ) => {
        $crate::Schema::define(
            [
                $(
                    $crate::FieldSpec::new(stringify!($fname), $fspec)
                        $( .with($crate::FieldOption::$okey($oval)) )*
                ),*
            ],
            $options,
        )
    };
    (
        $( $fname:ident : $fspec:expr $( , $okey:ident : $oval:expr )* ; )*
    ) => {
        $crate::schema! {
            options: $crate::SchemaOptions::default();
            $( $fname : $fspec $( , $okey : $oval )* ; )*
        }
    };
}
