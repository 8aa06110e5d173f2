//! Property-based tests for the text round trip and the serde bridge.

use std::collections::BTreeMap;

use proptest::prelude::*;
use serde::{Deserialize, Serialize};
use serde_luatable::escape::{quote, unescape};
use serde_luatable::ser::dump;
use serde_luatable::{from_str, parse, to_string, DumpOptions, Key, LuaValue};

fn scalar() -> impl Strategy<Value = LuaValue> {
    prop_oneof![
        any::<bool>().prop_map(LuaValue::Bool),
        any::<i64>().prop_map(LuaValue::from),
        (-1.0e12f64..1.0e12).prop_map(LuaValue::from),
        any::<String>().prop_map(LuaValue::String),
    ]
}

fn key() -> impl Strategy<Value = Key> {
    prop_oneof![
        any::<i64>().prop_map(Key::Integer),
        "[a-z_][a-z0-9_]{0,8}".prop_map(Key::String),
        any::<String>().prop_map(Key::String),
    ]
}

/// Trees already in the shape parsing produces: `nil` only inside sequences and no
/// empty mappings.
fn value() -> impl Strategy<Value = LuaValue> {
    scalar().prop_recursive(4, 64, 8, |inner| {
        prop_oneof![
            prop::collection::vec(prop_oneof![1 => Just(LuaValue::Nil), 4 => inner.clone()], 0..8)
                .prop_map(LuaValue::Sequence),
            prop::collection::vec((key(), inner), 1..8)
                .prop_map(|entries| LuaValue::Table(entries.into_iter().collect())),
        ]
    })
}

fn table() -> impl Strategy<Value = LuaValue> {
    value().prop_map(|v| match v {
        LuaValue::Sequence(_) | LuaValue::Table(_) => v,
        scalar => LuaValue::Sequence(vec![scalar]),
    })
}

fn roundtrip<T: Serialize + for<'de> Deserialize<'de> + PartialEq + std::fmt::Debug>(
    value: &T,
) -> bool {
    match to_string(value) {
        Ok(serialized) => match from_str::<T>(&serialized) {
            Ok(deserialized) => *value == deserialized,
            Err(e) => {
                eprintln!("Deserialize failed: {}", e);
                eprintln!("Serialized was: {}", serialized);
                false
            }
        },
        Err(e) => {
            eprintln!("Serialize failed: {}", e);
            false
        }
    }
}

proptest! {
    #[test]
    fn prop_parse_dump_round_trip(v in table(), indent in 0usize..6) {
        let text = dump(&v, &DumpOptions::new().with_indent(indent)).unwrap();
        let back = parse(&text).unwrap();
        prop_assert_eq!(back, v);
    }

    #[test]
    fn prop_dump_is_idempotent(v in table()) {
        let options = DumpOptions::new();
        let once = dump(&v, &options).unwrap();
        let twice = dump(&parse(&once).unwrap(), &options).unwrap();
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn prop_quote_unescape(s in any::<String>()) {
        let quoted = quote(&s);
        prop_assert_eq!(unescape(&quoted[1..quoted.len() - 1]).unwrap(), s);
    }

    #[test]
    fn prop_vec_option_i64(v in prop::collection::vec(proptest::option::of(any::<i64>()), 0..20)) {
        prop_assert!(roundtrip(&v));
    }

    #[test]
    fn prop_string_map(m in prop::collection::btree_map("\\PC{0,12}", any::<i32>(), 0..10)) {
        prop_assert!(roundtrip(&m));
    }

    #[test]
    fn prop_integer_map(m in prop::collection::btree_map(any::<i64>(), "\\PC{0,12}", 0..10)) {
        prop_assert!(roundtrip(&m));
    }

    #[test]
    fn prop_struct(id in any::<u32>(), name in any::<String>(), score in -1.0e9f64..1.0e9, tags in prop::collection::vec("[a-z]{1,6}", 0..5)) {
        #[derive(Serialize, Deserialize, Debug, PartialEq)]
        struct Record {
            id: u32,
            name: String,
            score: f64,
            tags: Vec<String>,
        }

        let record = Record { id, name, score, tags };
        prop_assert!(roundtrip(&record));
    }

    #[test]
    fn prop_parse_never_panics(s in "\\PC{0,40}") {
        let _ = parse(&s);
    }

    #[test]
    fn prop_nested_vectors(v in prop::collection::vec(prop::collection::vec(any::<bool>(), 0..4), 0..6)) {
        prop_assert!(roundtrip(&v));
    }
}

#[test]
fn test_map_order_survives_round_trip() {
    let mut map = BTreeMap::new();
    map.insert("z".to_string(), 1);
    map.insert("a".to_string(), 2);
    assert!(roundtrip(&map));
}
