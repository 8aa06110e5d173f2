/// Builds a [`LuaValue`](crate::LuaValue) from a literal-like syntax.
///
/// `nil`, `true` and `false` are the Lua literals, `[..]` builds a sequence and
/// `{key: value, ..}` builds a table keyed by string or number literals. Anything else
/// goes through [`to_value`](crate::to_value) and becomes `nil` if it cannot be converted.
///
/// Tables follow the same rules as parsed text: `nil` values are left out and an empty
/// table is the empty sequence.
///
/// ```rust
/// use serde_luatable::{lua, parse};
///
/// let value = lua!({ "name": "box", 1: [2, 3, nil] });
/// assert_eq!(value, parse("{name = 'box', [1] = {2, 3, nil}}").unwrap());
/// assert_eq!(lua!({}), parse("{}").unwrap());
/// ```
#[macro_export]
macro_rules! lua {
    (nil) => {
        $crate::LuaValue::Nil
    };

    (true) => {
        $crate::LuaValue::Bool(true)
    };

    (false) => {
        $crate::LuaValue::Bool(false)
    };

    ([]) => {
        $crate::LuaValue::Sequence(vec![])
    };

    ([ $($elem:tt),* $(,)? ]) => {
        $crate::LuaValue::Sequence(vec![$($crate::lua!($elem)),*])
    };

    ({}) => {
        $crate::LuaValue::Sequence(vec![])
    };

    ({ $($key:literal : $value:tt),* $(,)? }) => {{
        let mut table = $crate::LuaMap::new();
        $(
            let value = $crate::lua!($value);
            if !value.is_nil() {
                table.insert($crate::Key::from($key), value);
            }
        )*
        $crate::eval::merge_fields(vec![], table)
    }};

    ($other:expr) => {
        $crate::to_value(&$other).unwrap_or($crate::LuaValue::Nil)
    };
}
