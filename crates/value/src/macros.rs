//! Literal construction macro for [`Value`](crate::Value).

/// Builds a [`Value`](crate::Value) from a literal-ish expression.
///
/// # Examples
///
/// ```rust,ignore
/// use veld_value::value;
///
/// let v = value!({
///     "name" => "Ada",
///     "scores" => [1, 2, 3],
/// });
/// ```
///
/// Map keys are text-keyed; use [`ValueMapExt::insert_symbol`]
/// (crate::ValueMapExt::insert_symbol) when the symbol form is needed.
#[macro_export]
macro_rules! value {
    (null) => {
        $crate::Value::Null
    };
    ([ $( $item:tt ),* $(,)? ]) => {
        $crate::Value::Array(vec![ $( $crate::value!($item) ),* ])
    };
    ({ $( $key:expr => $val:tt ),* $(,)? }) => {{
        #[allow(unused_mut)]
        let mut map = $crate::ValueMap::new();
        $( map.insert($crate::Key::text($key), $crate::value!($val)); )*
        $crate::Value::Map(map)
    }};
    ($other:expr) => {
        $crate::Value::from($other)
    };
}
