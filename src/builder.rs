use std::hash::Hash;

use collections::Dictionary;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::CodecError;

/// Builds a dictionary from a flat `key, value, key, value, ...` sequence of untyped items.
///
/// Every item is decoded into its key or value type on its own, so a mistyped item is
/// reported with its position instead of surfacing later as a bad value.
///
/// # Errors
///
/// - [`CodecError::OddEntryCount`] if the sequence has a dangling key, checked before
///   anything is decoded
/// - [`CodecError::Entry`] for the first item that does not decode
pub fn create_dictionary<K, V, I>(items: I) -> Result<Dictionary<K, V>, CodecError>
where
    K: DeserializeOwned + Hash + Eq,
    V: DeserializeOwned,
    I: IntoIterator<Item = Value>,
{
    let items: Vec<Value> = items.into_iter().collect();
    if items.len() % 2 != 0 {
        return Err(CodecError::OddEntryCount { len: items.len() });
    }

    let mut dict = Dictionary::new();
    let mut items = items.into_iter().enumerate();
    while let (Some((ki, k)), Some((vi, v))) = (items.next(), items.next()) {
        let key = decode(ki, k)?;
        let value = decode(vi, v)?;
        dict.put(key, value);
    }
    Ok(dict)
}

fn decode<T: DeserializeOwned>(index: usize, item: Value) -> Result<T, CodecError> {
    serde_json::from_value(item).map_err(|source| CodecError::Entry { index, source })
}
