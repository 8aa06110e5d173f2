use serde_luatable::{lua, parse, Key, LuaMap, LuaValue, Number};

#[test]
fn test_lua_macro_nil() {
    assert_eq!(lua!(nil), LuaValue::Nil);
}

#[test]
fn test_lua_macro_booleans() {
    assert_eq!(lua!(true), LuaValue::Bool(true));
    assert_eq!(lua!(false), LuaValue::Bool(false));
}

#[test]
fn test_lua_macro_numbers() {
    assert_eq!(lua!(42), LuaValue::Number(Number::Integer(42)));
    assert_eq!(lua!(3.5), LuaValue::Number(Number::Float(3.5)));
    assert_eq!(lua!(-123), LuaValue::Number(Number::Integer(-123)));
}

#[test]
fn test_lua_macro_strings() {
    assert_eq!(lua!("hello"), LuaValue::String("hello".to_string()));
    let owned = String::from("owned");
    assert_eq!(lua!(owned), LuaValue::from("owned"));
}

#[test]
fn test_lua_macro_sequence_with_holes() {
    let value = lua!([nil, 0, nil, 1]);
    assert_eq!(value, parse("{nil, 0, nil, 1}").unwrap());
}

#[test]
fn test_lua_macro_nested() {
    let value = lua!({
        "color": "blue",
        "npoints": 4,
        1: {"x": 0, "y": 0},
        2: [1, 2, 3]
    });
    assert_eq!(
        value,
        parse("{color = 'blue', npoints = 4, {x = 0, y = 0}, {1, 2, 3}}").unwrap()
    );
}

#[test]
fn test_lua_macro_key_order() {
    let value = lua!({"b": 1, "a": 2});
    let keys: Vec<Key> = value.as_table().unwrap().keys().cloned().collect();
    assert_eq!(keys, vec![Key::from("b"), Key::from("a")]);
}

#[test]
fn test_lua_macro_float_key() {
    let value = lua!({ 1.5: "half" });
    let mut expected = LuaMap::new();
    expected.insert(Key::Float(1.5), LuaValue::from("half"));
    assert_eq!(value, LuaValue::Table(expected));
}

#[test]
fn test_lua_macro_display() {
    assert_eq!(lua!({"k": [true, nil]}).to_string(), r#"{["k"]={true,nil}}"#);
}
