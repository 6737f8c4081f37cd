use std::{
    fmt,
    hash::{BuildHasher, Hash},
    marker::PhantomData,
};

use serde::{
    Deserialize, Deserializer, Serialize, Serializer,
    de::{MapAccess, Visitor},
    ser::SerializeMap,
};

use super::{DEFAULT_CAPACITY, DEFAULT_LOAD_FACTOR, Dictionary};

/// Serialized as a plain map, entries in bucket-scan order
impl<K, V, S> Serialize for Dictionary<K, V, S>
where
    K: Serialize,
    V: Serialize,
{
    fn serialize<Ser: Serializer>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error> {
        let mut map = serializer.serialize_map(Some(self.size()))?;
        for (k, v) in self.iter() {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

struct DictionaryVisitor<K, V, S> {
    marker: PhantomData<fn() -> Dictionary<K, V, S>>,
}

impl<'de, K, V, S> Visitor<'de> for DictionaryVisitor<K, V, S>
where
    K: Deserialize<'de> + Hash + Eq,
    V: Deserialize<'de>,
    S: BuildHasher + Default,
{
    type Value = Dictionary<K, V, S>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a map")
    }

    // every entry goes through its own fallible decode, the first bad one aborts the whole map
    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut dict = Dictionary::with_hasher(DEFAULT_CAPACITY, DEFAULT_LOAD_FACTOR, S::default())
            .map_err(serde::de::Error::custom)?;

        while let Some((k, v)) = access.next_entry()? {
            dict.try_put(k, v).map_err(serde::de::Error::custom)?;
        }
        Ok(dict)
    }
}

impl<'de, K, V, S> Deserialize<'de> for Dictionary<K, V, S>
where
    K: Deserialize<'de> + Hash + Eq,
    V: Deserialize<'de>,
    S: BuildHasher + Default,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(DictionaryVisitor {
            marker: PhantomData,
        })
    }
}

#[cfg(test)]
mod test {
    use crate::{Dictionary, dict};

    #[test]
    fn json_object_both_ways() {
        let d = dict! { "a".to_string() => 1, "b".to_string() => 2 };
        let text = serde_json::to_string(&d).unwrap();
        let back: Dictionary<String, i32> = serde_json::from_str(&text).unwrap();
        assert_eq!(d, back);
    }

    #[test]
    fn integer_keys() {
        let back: Dictionary<u32, String> = serde_json::from_str(r#"{"1": "one", "2": "two"}"#).unwrap();
        assert_eq!(back.get(&1).map(String::as_str), Some("one"));
        assert_eq!(back.size(), 2);
    }

    #[test]
    fn bad_entry_fails_whole_map() {
        let res: Result<Dictionary<String, i32>, _> = serde_json::from_str(r#"{"a": 1, "b": "two"}"#);
        assert!(res.is_err());
    }
}
