//! JSON configuration document holding persisted dictionaries at dotted paths.
//!
//! ```json
//! {
//!   "players": {
//!     "alex": { "json": "{\"role\": \"admin\"}" }
//!   }
//! }
//! ```

use std::{fmt::Display, fs, io, path::Path};

use collections::Dictionary;
use log::{debug, trace};
use serde_json::{Map, Value};

use crate::{
    CodecError,
    persist::{self, FIELD},
};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigDocument {
    root: Map<String, Value>,
}

impl ConfigDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads a document from disk, a missing file gives an empty document
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CodecError> {
        let path = path.as_ref();
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(target: "storage", "{} not found, starting empty", path.display());
                return Ok(Self::new());
            }
            Err(e) => return Err(e.into()),
        };
        Self::from_text(&text)
    }

    pub fn from_text(text: &str) -> Result<Self, CodecError> {
        if text.trim().is_empty() {
            return Ok(Self::new());
        }
        Ok(Self {
            root: serde_json::from_str(text)?,
        })
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), CodecError> {
        let path = path.as_ref();
        fs::write(path, self.to_text()?)?;
        debug!(target: "storage", "saved {}", path.display());
        Ok(())
    }

    pub fn to_text(&self) -> Result<String, CodecError> {
        Ok(serde_json::to_string_pretty(&self.root)?)
    }

    pub fn as_value(&self) -> &Map<String, Value> {
        &self.root
    }

    /// Stores `dict` in the persisted format at `path`, creating the objects along the way.
    /// Whatever was at `path` before is overwritten.
    pub fn set_dictionary<K, V, S>(&mut self, path: &str, dict: &Dictionary<K, V, S>) -> Result<(), CodecError>
    where
        K: Display,
        V: Display,
    {
        let (parents, leaf) = split_path(path)?;

        let mut node = &mut self.root;
        for (depth, part) in parents.iter().enumerate() {
            let child = node
                .entry(part.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            node = match child {
                Value::Object(map) => map,
                _ => {
                    return Err(CodecError::PathConflict {
                        path: parents[..=depth].join("."),
                    });
                }
            };
        }

        let value = serde_json::to_value(persist::serialize(dict))?;
        trace!(target: "storage", "set {path} ({} entries)", dict.size());
        node.insert(leaf.to_string(), value);
        Ok(())
    }

    /// Reads back a dictionary stored with [`set_dictionary`](Self::set_dictionary).
    /// `Ok(None)` when nothing is stored at `path`.
    pub fn get_dictionary(&self, path: &str) -> Result<Option<Dictionary<String, String>>, CodecError> {
        match self.lookup(path)? {
            Some(value) => persist::from_value(value).map(Some),
            None => Ok(None),
        }
    }

    /// Drops whatever sits at `path`, returns whether there was anything
    pub fn remove(&mut self, path: &str) -> Result<bool, CodecError> {
        let (parents, leaf) = split_path(path)?;

        let mut node = &mut self.root;
        for part in parents {
            match node.get_mut(part) {
                Some(Value::Object(map)) => node = map,
                _ => return Ok(false),
            }
        }
        Ok(node.remove(leaf).is_some())
    }

    /// Every dotted path holding a persisted dictionary, depth first in document order
    pub fn paths(&self) -> Vec<String> {
        let mut out = Vec::new();
        collect_paths(&self.root, &mut String::new(), &mut out);
        out
    }

    // [private]

    fn lookup(&self, path: &str) -> Result<Option<&Value>, CodecError> {
        let (parents, leaf) = split_path(path)?;

        let mut node = &self.root;
        for part in parents {
            match node.get(part) {
                Some(Value::Object(map)) => node = map,
                _ => return Ok(None),
            }
        }
        Ok(node.get(leaf))
    }
}

fn split_path(path: &str) -> Result<(Vec<&str>, &str), CodecError> {
    let mut parts: Vec<&str> = path.split('.').collect();
    if parts.iter().any(|p| p.is_empty()) {
        return Err(CodecError::PathConflict { path: path.into() });
    }
    match parts.pop() {
        Some(leaf) => Ok((parts, leaf)),
        None => Err(CodecError::PathConflict { path: path.into() }),
    }
}

fn is_persisted(map: &Map<String, Value>) -> bool {
    map.len() == 1 && map.get(FIELD).is_some_and(Value::is_string)
}

fn collect_paths(map: &Map<String, Value>, prefix: &mut String, out: &mut Vec<String>) {
    for (key, value) in map {
        let Value::Object(child) = value else {
            continue;
        };

        let len = prefix.len();
        if !prefix.is_empty() {
            prefix.push('.');
        }
        prefix.push_str(key);

        if is_persisted(child) {
            out.push(prefix.clone());
        } else {
            collect_paths(child, prefix, out);
        }
        prefix.truncate(len);
    }
}

#[cfg(test)]
mod test {
    use collections::dict;
    use serde_json::json;

    use super::ConfigDocument;
    use crate::CodecError;

    #[test]
    fn set_then_get() {
        let mut doc = ConfigDocument::new();
        doc.set_dictionary("players.alex", &dict! { "role" => "admin" }).unwrap();
        doc.set_dictionary("motd", &dict! { "line" => "hello" }).unwrap();

        let alex = doc.get_dictionary("players.alex").unwrap().unwrap();
        assert_eq!(alex.get("role").map(String::as_str), Some("admin"));
        assert!(doc.get_dictionary("players.bob").unwrap().is_none());
        assert!(doc.get_dictionary("nothing.here.at.all").unwrap().is_none());

        assert_eq!(
            doc.as_value()["players"],
            json!({ "alex": { "json": "{\"role\": \"admin\"}" } })
        );
    }

    #[test]
    fn paths_in_document_order() {
        let mut doc = ConfigDocument::new();
        doc.set_dictionary("a.b", &dict! { 1 => 2 }).unwrap();
        doc.set_dictionary("a.c.d", &dict! { 3 => 4 }).unwrap();
        doc.set_dictionary("e", &dict! { 5 => 6 }).unwrap();
        assert_eq!(doc.paths(), ["a.b", "a.c.d", "e"]);

        assert!(doc.remove("a.c.d").unwrap());
        assert!(!doc.remove("a.c.d").unwrap());
        assert!(!doc.remove("x.y").unwrap());
        assert_eq!(doc.paths(), ["a.b", "e"]);
    }

    #[test]
    fn path_through_scalar() {
        let mut doc = ConfigDocument::from_text(r#"{"a": 1}"#).unwrap();
        let res = doc.set_dictionary("a.b", &dict! { "k" => "v" });
        match res {
            Err(CodecError::PathConflict { path }) => assert_eq!(path, "a"),
            other => panic!("expected a path conflict, got {other:?}"),
        }
        assert!(doc.get_dictionary("a.b").unwrap().is_none());
    }

    #[test]
    fn bad_paths() {
        let mut doc = ConfigDocument::new();
        for bad in ["", "a..b", ".a", "a."] {
            assert!(matches!(
                doc.set_dictionary(bad, &dict! { "k" => "v" }),
                Err(CodecError::PathConflict { .. })
            ));
        }
    }

    #[test]
    fn non_dictionary_value() {
        let doc = ConfigDocument::from_text(r#"{"a": {"other": true}}"#).unwrap();
        assert!(matches!(doc.get_dictionary("a"), Err(CodecError::Json(_))));
        assert!(doc.paths().is_empty());
    }

    #[test]
    fn empty_text() {
        assert_eq!(ConfigDocument::from_text("  \n").unwrap(), ConfigDocument::new());
        assert!(ConfigDocument::from_text("[]").is_err());
    }
}
