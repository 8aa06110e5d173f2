use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use serde_json::json;
use serde_luatable::{
    from_str, from_value, parse, to_string, to_string_compact, to_value, Error, LuaTableParser,
    LuaValue,
};

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct User {
    id: u32,
    name: String,
    active: bool,
    tags: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct Product {
    sku: String,
    price: f64,
    quantity: u32,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct Order {
    order_id: u32,
    customer: User,
    items: Vec<Product>,
    note: Option<String>,
}

fn sample_order() -> Order {
    Order {
        order_id: 12345,
        customer: User {
            id: 123,
            name: "Alice".to_string(),
            active: true,
            tags: vec!["vip".to_string()],
        },
        items: vec![
            Product {
                sku: "WIDGET-001".to_string(),
                price: 29.99,
                quantity: 2,
            },
            Product {
                sku: "GADGET-002".to_string(),
                price: 0.5,
                quantity: 10,
            },
        ],
        note: None,
    }
}

#[test]
fn test_nested_struct_round_trip() {
    let order = sample_order();
    let text = to_string(&order).unwrap();
    assert!(!text.contains("note"));
    let back: Order = from_str(&text).unwrap();
    assert_eq!(order, back);
}

#[test]
fn test_nested_struct_compact_round_trip() {
    let mut order = sample_order();
    order.note = Some("leave at door".to_string());
    let text = to_string_compact(&order).unwrap();
    assert!(!text.contains('\n'));
    let back: Order = from_str(&text).unwrap();
    assert_eq!(order, back);
}

#[test]
fn test_struct_from_handwritten_text() {
    let text = r#"
        -- customer record
        {
            id = 7; name = [[Bob]], active = false,
            tags = {"a", 'b'},
        }
    "#;
    let user: User = from_str(text).unwrap();
    assert_eq!(
        user,
        User {
            id: 7,
            name: "Bob".to_string(),
            active: false,
            tags: vec!["a".to_string(), "b".to_string()],
        }
    );
}

#[test]
fn test_missing_field_is_an_error() {
    let err = from_str::<User>("{id = 1, name = 'x', active = true}").unwrap_err();
    assert!(err.to_string().contains("tags"));
}

#[test]
fn test_empty_table_reads_as_empty_collections() {
    let list: Vec<i32> = from_str("{}").unwrap();
    assert!(list.is_empty());
    let map: HashMap<String, i32> = from_str("{}").unwrap();
    assert!(map.is_empty());
}

#[test]
fn test_enums() {
    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    enum Command {
        Stop,
        Move { x: i32, y: i32 },
        Say(String),
    }

    let commands = vec![
        Command::Stop,
        Command::Move { x: 1, y: -1 },
        Command::Say("hi".to_string()),
    ];
    let text = to_string_compact(&commands).unwrap();
    assert_eq!(
        text,
        r#"{"Stop",{["Move"]={["x"]=1,["y"]=-1}},{["Say"]="hi"}}"#
    );
    let back: Vec<Command> = from_str(&text).unwrap();
    assert_eq!(commands, back);
}

#[test]
fn test_tuples_and_unit() {
    let value: (i32, String, Option<bool>) = from_str("{1, 'two', nil}").unwrap();
    assert_eq!(value, (1, "two".to_string(), None));
    assert_eq!(to_string_compact(&(1, "two", ())).unwrap(), r#"{1,"two",nil}"#);
}

#[test]
fn test_integer_map_keys() {
    let mut scores = BTreeMap::new();
    scores.insert(3u8, "bronze".to_string());
    scores.insert(1u8, "gold".to_string());
    let text = to_string_compact(&scores).unwrap();
    assert_eq!(text, r#"{[1]="gold",[3]="bronze"}"#);
    let back: BTreeMap<u8, String> = from_str(&text).unwrap();
    assert_eq!(scores, back);
}

#[test]
fn test_sequence_read_as_integer_map() {
    let map: BTreeMap<i64, String> = from_str("{'a', nil, 'c'}").unwrap();
    let keys: Vec<i64> = map.keys().copied().collect();
    assert_eq!(keys, vec![1, 3]);
}

#[test]
fn test_unsupported_map_keys() {
    let mut map = HashMap::new();
    map.insert(vec![1], 1);
    assert!(matches!(to_value(&map), Err(Error::Serialization(_))));

    let mut parser = LuaTableParser::new();
    parser.load_from_mapping(&map).unwrap();
    assert_eq!(parser.dump().unwrap(), "{}");
}

#[test]
fn test_value_to_json() {
    let value = parse("{name = 'svc', ports = {80, 443}, debug = false}").unwrap();
    let json = serde_json::to_value(&value).unwrap();
    assert_eq!(
        json,
        json!({"name": "svc", "ports": [80, 443], "debug": false})
    );
}

#[test]
fn test_json_to_value() {
    let json = json!({"list": [1, null, 2.5], "empty": {}, "skip": null});
    let value = to_value(&json).unwrap();
    let table = value.as_table().unwrap();
    assert_eq!(table.len(), 2);
    assert_eq!(
        table.get(&"list".into()),
        Some(&LuaValue::Sequence(vec![
            LuaValue::from(1),
            LuaValue::Nil,
            LuaValue::from(2.5)
        ]))
    );
}

#[test]
fn test_json_value_from_table_text() {
    let json: serde_json::Value = from_str("{'a', 'b', x = 1}").unwrap();
    assert_eq!(json, json!({"x": 1, "1": "a", "2": "b"}));
}

#[test]
fn test_from_value_into_struct() {
    let value = parse("{sku = 'X', price = 1.25, quantity = 3}").unwrap();
    let product: Product = from_value(value).unwrap();
    assert_eq!(product.price, 1.25);
}

#[test]
fn test_integers_accepted_as_floats() {
    let product: Product = from_str("{sku = 'X', price = 2, quantity = 3}").unwrap();
    assert_eq!(product.price, 2.0);
}

#[test]
fn test_load_from_mapping_and_to_mapping() {
    let mut info = BTreeMap::new();
    info.insert("name", json!("William"));
    info.insert("age", json!(24));
    info.insert("description", json!(""));

    let mut parser = LuaTableParser::new();
    parser.load_from_mapping(&info).unwrap();
    assert_eq!(
        parser.dump().unwrap(),
        "{\n    [\"age\"]= 24,\n    [\"description\"]= \"\",\n    [\"name\"]= \"William\"\n}"
    );

    // The parser holds its own copy.
    info.insert("description", json!("blabla..."));
    assert_eq!(parser.get("description").unwrap(), &LuaValue::from(""));

    let mapping = parser.to_mapping().unwrap();
    assert_eq!(mapping.len(), 3);
}
