//! Plain JSON objects through serde.
//!
//! Keys have to serialize as JSON object keys (strings or integers). Decoding goes
//! entry by entry and stops at the first key or value that does not fit its type.

use std::hash::Hash;

use collections::Dictionary;
use log::debug;
use serde::{Serialize, de::DeserializeOwned};

use crate::CodecError;

pub fn to_json<K, V, S>(dict: &Dictionary<K, V, S>) -> Result<String, CodecError>
where
    K: Serialize,
    V: Serialize,
{
    Ok(serde_json::to_string(dict)?)
}

pub fn to_json_pretty<K, V, S>(dict: &Dictionary<K, V, S>) -> Result<String, CodecError>
where
    K: Serialize,
    V: Serialize,
{
    Ok(serde_json::to_string_pretty(dict)?)
}

/// Parses a JSON object. A key appearing twice keeps its last value.
pub fn from_json<K, V>(text: &str) -> Result<Dictionary<K, V>, CodecError>
where
    K: DeserializeOwned + Hash + Eq,
    V: DeserializeOwned,
{
    let dict: Dictionary<K, V> = serde_json::from_str(text)?;
    debug!(target: "json", "decoded {} entries", dict.size());
    Ok(dict)
}

pub fn from_value<K, V>(value: serde_json::Value) -> Result<Dictionary<K, V>, CodecError>
where
    K: DeserializeOwned + Hash + Eq,
    V: DeserializeOwned,
{
    Ok(serde_json::from_value(value)?)
}

#[cfg(test)]
mod test {
    use std::collections::HashMap;

    use collections::{Dictionary, dict};
    use serde_json::{Value, json};

    use super::{from_json, from_value, to_json, to_json_pretty};
    use crate::CodecError;

    #[test]
    fn empty_object() {
        let d: Dictionary<String, i32> = Dictionary::new();
        assert_eq!(to_json(&d).unwrap(), "{}");
        assert!(from_json::<String, i32>("{}").unwrap().is_empty());
    }

    #[test]
    fn standard_object_text() {
        let d = dict! { "username" => "alex", "role" => "admin" };
        let text = to_json(&d).unwrap();
        let parsed: HashMap<String, String> = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed["role"], "admin");

        let pretty = to_json_pretty(&d).unwrap();
        assert!(pretty.contains('\n'));
        assert_eq!(from_json::<String, String>(&pretty).unwrap(), from_json::<String, String>(&text).unwrap());
    }

    #[test]
    fn round_trip_keeps_types() {
        let mut d: Dictionary<String, Value> = Dictionary::new();
        d.put("n".into(), json!(3));
        d.put("list".into(), json!([1, "two", null]));
        d.put("nested".into(), json!({ "a": { "b": true } }));
        d.put("text".into(), json!("with, commas: and colons"));

        let back: Dictionary<String, Value> = from_json(&to_json(&d).unwrap()).unwrap();
        assert_eq!(back, d);
    }

    #[test]
    fn integer_keys() {
        let d = dict! { 7u64 => "seven", 11u64 => "eleven" };
        let text = to_json(&d).unwrap();
        assert!(text.contains("\"7\":\"seven\""));
        let back: Dictionary<u64, String> = from_json(&text).unwrap();
        assert_eq!(back.get(&11).map(String::as_str), Some("eleven"));
    }

    #[test]
    fn non_string_keys_fail_to_encode() {
        let d = dict! { (1, 2) => "pair" };
        assert!(matches!(to_json(&d), Err(CodecError::Json(_))));
    }

    #[test]
    fn wrong_value_type() {
        let res = from_json::<String, u8>(r#"{"ok": 1, "bad": 300}"#);
        assert!(matches!(res, Err(CodecError::Json(_))));
    }

    #[test]
    fn not_an_object() {
        assert!(from_json::<String, i32>("[1, 2]").is_err());
        assert!(from_json::<String, i32>("{\"a\": ").is_err());
    }

    #[test]
    fn duplicate_key_last_wins() {
        let d = from_json::<String, i32>(r#"{"a": 1, "a": 2}"#).unwrap();
        assert_eq!(d.size(), 1);
        assert_eq!(d.get("a"), Some(&2));
    }

    #[test]
    fn from_json_value() {
        let d: Dictionary<String, bool> = from_value(json!({ "x": true, "y": false })).unwrap();
        assert_eq!(d.get("x"), Some(&true));
        assert!(from_value::<String, bool>(json!({ "x": 1 })).is_err());
    }
}
