//! Flat persisted format.
//!
//! A dictionary becomes `{"k1": "v1", "k2": "v2"}`: every key and value is quoted
//! as its `Display` text, so type information is lost. That string is stored under
//! the [`FIELD`] key of a small outer object ([`PersistedDict`]) which gets embedded
//! into a configuration document.
//!
//! Nothing is escaped. Decoding splits entries on `, ` and halves on `:`, so a key
//! or value whose text contains either sequence does not survive the round trip.

use std::{fmt::Display, hash::Hash};

use collections::Dictionary;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::CodecError;

/// Field name of the outer object holding the flat string
pub const FIELD: &str = "json";

/// The outer object, `{"json": "{\"k\": \"v\"}"}` once serialized
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedDict {
    pub json: String,
}

/// Encodes the entries in bucket-scan order. An empty dictionary gives `{}`.
pub fn to_text<K, V, S>(dict: &Dictionary<K, V, S>) -> String
where
    K: Display,
    V: Display,
{
    let mut out = String::from("{");
    for (i, (k, v)) in dict.iter().enumerate() {
        let (k, v) = (k.to_string(), v.to_string());
        if is_ambiguous(&k) || is_ambiguous(&v) {
            warn!(target: "persist", "entry {k:?} contains ', ' or ':' and will not decode back as written");
        }
        if i > 0 {
            out.push_str(", ");
        }
        out.push('"');
        out.push_str(&k);
        out.push_str("\": \"");
        out.push_str(&v);
        out.push('"');
    }
    out.push('}');
    out
}

pub fn serialize<K, V, S>(dict: &Dictionary<K, V, S>) -> PersistedDict
where
    K: Display,
    V: Display,
{
    PersistedDict { json: to_text(dict) }
}

/// Decodes a flat string back into a text-keyed, text-valued dictionary.
///
/// # Errors
///
/// - [`CodecError::MissingBraces`] when the text is not wrapped in `{` and `}`
/// - [`CodecError::MalformedSegment`] when a segment does not split into exactly
///   one key and one value
pub fn from_text(text: &str) -> Result<Dictionary<String, String>, CodecError> {
    let inner = text
        .strip_prefix('{')
        .and_then(|t| t.strip_suffix('}'))
        .ok_or_else(|| CodecError::MissingBraces { input: text.into() })?;

    let mut dict = Dictionary::new();
    if inner.is_empty() {
        return Ok(dict);
    }

    for segment in inner.split(", ") {
        let (key, value) = split_segment(segment).ok_or_else(|| CodecError::MalformedSegment {
            segment: segment.into(),
        })?;
        dict.put(unquote(key).to_string(), unquote(value).to_string());
    }

    debug!(target: "persist", "decoded {} entries", dict.size());
    Ok(dict)
}

pub fn deserialize(persisted: &PersistedDict) -> Result<Dictionary<String, String>, CodecError> {
    from_text(&persisted.json)
}

/// Same as [`from_text`] but for any value shape, so a config document can be handed over
/// without first checking it holds a [`PersistedDict`]
pub fn from_value(value: &serde_json::Value) -> Result<Dictionary<String, String>, CodecError> {
    let persisted = PersistedDict::deserialize(value)?;
    deserialize(&persisted)
}

/// Re-keys a decoded dictionary, e.g. to get numbers back out of the text
pub fn parse_entries<K, V>(dict: Dictionary<String, String>) -> Result<Dictionary<K, V>, CodecError>
where
    K: std::str::FromStr + Hash + Eq,
    V: std::str::FromStr,
{
    let mut out = Dictionary::with_capacity(dict.capacity());
    for (k, v) in dict {
        let (Ok(key), Ok(value)) = (k.parse::<K>(), v.parse::<V>()) else {
            return Err(CodecError::MalformedSegment {
                segment: format!("\"{k}\": \"{v}\""),
            });
        };
        out.put(key, value);
    }
    Ok(out)
}

// [private]

/// `"k": "v"` -> (`"k"`, `"v"`), the space after the colon is optional
fn split_segment(segment: &str) -> Option<(&str, &str)> {
    let mut halves = segment.split(':');
    let key = halves.next()?;
    let value = halves.next()?;
    if halves.next().is_some() {
        return None;
    }
    Some((key, value.strip_prefix(' ').unwrap_or(value)))
}

fn unquote(s: &str) -> &str {
    let s = s.strip_prefix('"').unwrap_or(s);
    s.strip_suffix('"').unwrap_or(s)
}

fn is_ambiguous(s: &str) -> bool {
    s.contains(", ") || s.contains(':')
}

#[cfg(test)]
mod test {
    use collections::{Dictionary, dict};

    use super::{PersistedDict, from_text, from_value, parse_entries, serialize, to_text};
    use crate::CodecError;

    #[test]
    fn single_entry_text() {
        let d = dict! { "username" => "alex" };
        assert_eq!(to_text(&d), r#"{"username": "alex"}"#);
    }

    #[test]
    fn empty() {
        let d: Dictionary<String, String> = Dictionary::new();
        assert_eq!(to_text(&d), "{}");
        assert!(from_text("{}").unwrap().is_empty());
    }

    #[test]
    fn decode_documented_example() {
        let d = from_text(r#"{"username": "alex", "role": "admin"}"#).unwrap();
        assert_eq!(d.size(), 2);
        assert_eq!(d.get("username").map(String::as_str), Some("alex"));
        assert_eq!(d.get("role").map(String::as_str), Some("admin"));
    }

    #[test]
    fn colon_without_space() {
        let d = from_text(r#"{"a":"1", "b": "2"}"#).unwrap();
        assert_eq!(d.get("a").map(String::as_str), Some("1"));
        assert_eq!(d.get("b").map(String::as_str), Some("2"));
    }

    #[test]
    fn types_become_text() {
        let d = dict! { 1 => 2.5, 2 => -1.0 };
        let back = from_text(&to_text(&d)).unwrap();
        assert_eq!(back.get("1").map(String::as_str), Some("2.5"));

        let typed: Dictionary<i32, f64> = parse_entries(back).unwrap();
        assert_eq!(typed, d);
    }

    #[test]
    fn round_trip_plain_strings() {
        let mut d = Dictionary::new();
        for i in 0..40 {
            d.put(format!("key{i}"), format!("value {i}"));
        }
        assert_eq!(from_text(&to_text(&d)).unwrap(), d);
    }

    #[test]
    fn outer_object() {
        let d = dict! { "role" => "admin" };
        let persisted = serialize(&d);
        let value = serde_json::to_value(&persisted).unwrap();
        assert_eq!(value, serde_json::json!({ "json": "{\"role\": \"admin\"}" }));

        let back = from_value(&value).unwrap();
        assert_eq!(back.get("role").map(String::as_str), Some("admin"));

        let wrong = serde_json::json!({ "data": "{}" });
        assert!(matches!(from_value(&wrong), Err(CodecError::Json(_))));
        assert_eq!(persisted, PersistedDict { json: r#"{"role": "admin"}"#.into() });
    }

    #[test]
    fn missing_braces() {
        for bad in ["", "{", r#""a": "b""#, r#"{"a": "b""#] {
            assert!(
                matches!(from_text(bad), Err(CodecError::MissingBraces { .. })),
                "{bad}"
            );
        }
    }

    #[test]
    fn colon_in_value_is_rejected() {
        let d = dict! { "url" => "http://example.com" };
        let text = to_text(&d);
        match from_text(&text) {
            Err(CodecError::MalformedSegment { segment }) => assert!(segment.contains("url")),
            other => panic!("expected a malformed segment, got {other:?}"),
        }
    }

    #[test]
    fn comma_space_in_value_splits_entries() {
        let d = dict! { "k" => "a, b" };
        assert!(matches!(
            from_text(&to_text(&d)),
            Err(CodecError::MalformedSegment { .. })
        ));

        // here the tail happens to split into a valid pair, so the loss goes unnoticed
        let lossy = from_text(r#"{"k": "a, "b": "c"}"#).unwrap();
        assert_eq!(lossy.get("k").map(String::as_str), Some("a"));
    }

    #[test]
    fn bad_parse_entries() {
        let d = from_text(r#"{"x": "not a number"}"#).unwrap();
        let res: Result<Dictionary<String, i32>, _> = parse_entries(d);
        assert!(matches!(res, Err(CodecError::MalformedSegment { .. })));
    }
}
