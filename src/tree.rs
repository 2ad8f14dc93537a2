//! Ordered, recursive value tree for locale data.

use crate::php::{PhpKey, PhpValue};
use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Tree {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Tree>),
    Map(TreeMap),
}

/// String-keyed map that keeps insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TreeMap {
    entries: Vec<(String, Tree)>,
}

impl TreeMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Tree> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Insert or replace. A replaced key keeps its original position.
    pub fn insert(&mut self, key: impl Into<String>, value: Tree) -> Option<Tree> {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => Some(std::mem::replace(existing, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<Tree> {
        let pos = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(pos).1)
    }

    /// Insert every entry of `other`, replacing existing keys at this level only.
    pub fn extend_top_level(&mut self, other: TreeMap) {
        for (k, v) in other.entries {
            self.insert(k, v);
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Tree)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl IntoIterator for TreeMap {
    type Item = (String, Tree);
    type IntoIter = std::vec::IntoIter<(String, Tree)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl FromIterator<(String, Tree)> for TreeMap {
    fn from_iter<I: IntoIterator<Item = (String, Tree)>>(iter: I) -> Self {
        let mut map = TreeMap::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

impl Tree {
    pub fn as_map(&self) -> Option<&TreeMap> {
        match self {
            Tree::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn into_map(self) -> Option<TreeMap> {
        match self {
            Tree::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Convert an evaluated PHP value. Lists stay lists, every other array
    /// becomes a map keyed by the stringified PHP key.
    pub fn from_php(value: &PhpValue) -> Tree {
        match value {
            PhpValue::Null => Tree::Null,
            PhpValue::Bool(b) => Tree::Bool(*b),
            PhpValue::Int(n) => Tree::Int(*n),
            PhpValue::Float(f) => Tree::Float(*f),
            PhpValue::Str(s) => Tree::Str(s.clone()),
            PhpValue::Array(entries) if !entries.is_empty() && PhpValue::is_list(entries) => {
                Tree::List(entries.iter().map(|(_, v)| Tree::from_php(v)).collect())
            }
            PhpValue::Array(entries) => Tree::Map(
                entries
                    .iter()
                    .map(|(k, v)| (key_string(k), Tree::from_php(v)))
                    .collect(),
            ),
            // Case objects have no scalar form in locale data
            PhpValue::CaseRef { .. } => Tree::Null,
        }
    }

    /// Collapse nested maps and lists into one level of dot-joined keys.
    /// Empty containers are kept as leaves.
    pub fn flatten(self) -> TreeMap {
        let mut out = TreeMap::new();
        match self {
            Tree::Map(map) => flatten_into(&mut out, None, Tree::Map(map)),
            other => {
                out.insert(String::new(), other);
            }
        }
        out
    }
}

fn key_string(key: &PhpKey) -> String {
    key.to_string()
}

fn flatten_into(out: &mut TreeMap, prefix: Option<&str>, value: Tree) {
    let join = |key: &str| match prefix {
        Some(p) => format!("{}.{}", p, key),
        None => key.to_string(),
    };

    match value {
        Tree::Map(map) if !map.is_empty() => {
            for (k, v) in map {
                flatten_into(out, Some(&join(&k)), v);
            }
        }
        Tree::List(items) if !items.is_empty() => {
            for (i, v) in items.into_iter().enumerate() {
                flatten_into(out, Some(&join(&i.to_string())), v);
            }
        }
        leaf => {
            out.insert(prefix.unwrap_or_default(), leaf);
        }
    }
}

impl Serialize for Tree {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Tree::Null => serializer.serialize_unit(),
            Tree::Bool(b) => serializer.serialize_bool(*b),
            Tree::Int(n) => serializer.serialize_i64(*n),
            Tree::Float(f) => serializer.serialize_f64(*f),
            Tree::Str(s) => serializer.serialize_str(s),
            Tree::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Tree::Map(map) => map.serialize(serializer),
        }
    }
}

impl Serialize for TreeMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut out = serializer.serialize_map(Some(self.len()))?;
        for (k, v) in self.iter() {
            out.serialize_entry(k, v)?;
        }
        out.end()
    }
}

impl<'de> Deserialize<'de> for Tree {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(TreeVisitor)
    }
}

struct TreeVisitor;

impl<'de> Visitor<'de> for TreeVisitor {
    type Value = Tree;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a JSON value")
    }

    fn visit_unit<E: de::Error>(self) -> Result<Tree, E> {
        Ok(Tree::Null)
    }

    fn visit_none<E: de::Error>(self) -> Result<Tree, E> {
        Ok(Tree::Null)
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Tree, E> {
        Ok(Tree::Bool(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Tree, E> {
        Ok(Tree::Int(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Tree, E> {
        Ok(i64::try_from(v).map(Tree::Int).unwrap_or(Tree::Float(v as f64)))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Tree, E> {
        Ok(Tree::Float(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Tree, E> {
        Ok(Tree::Str(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Tree, E> {
        Ok(Tree::Str(v))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Tree, A::Error> {
        let mut items = Vec::new();
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }
        Ok(Tree::List(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Tree, A::Error> {
        let mut map = TreeMap::new();
        while let Some((k, v)) = access.next_entry::<String, Tree>()? {
            map.insert(k, v);
        }
        Ok(Tree::Map(map))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(entries: Vec<(&str, Tree)>) -> Tree {
        Tree::Map(entries.into_iter().map(|(k, v)| (k.to_string(), v)).collect())
    }

    #[test]
    fn test_insert_keeps_position() {
        let mut m = TreeMap::new();
        m.insert("a", Tree::Int(1));
        m.insert("b", Tree::Int(2));
        assert_eq!(m.insert("a", Tree::Int(3)), Some(Tree::Int(1)));
        let keys: Vec<_> = m.keys().collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(m.get("a"), Some(&Tree::Int(3)));
    }

    #[test]
    fn test_flatten() {
        let tree = map(vec![
            ("messages", map(vec![("welcome", Tree::Str("Hi".into()))])),
            ("list", Tree::List(vec![Tree::Str("x".into()), Tree::Null])),
            ("empty", Tree::Map(TreeMap::new())),
            ("top", Tree::Bool(true)),
        ]);
        let flat = tree.flatten();
        let keys: Vec<_> = flat.keys().collect();
        assert_eq!(keys, vec!["messages.welcome", "list.0", "list.1", "empty", "top"]);
        assert_eq!(flat.get("messages.welcome"), Some(&Tree::Str("Hi".into())));
        assert_eq!(flat.get("list.1"), Some(&Tree::Null));
    }

    #[test]
    fn test_json_keeps_document_order() {
        let tree: Tree = serde_json::from_str(r#"{"z": 1, "a": {"y": "b", "x": [true]}}"#).unwrap();
        let out = serde_json::to_string(&tree).unwrap();
        assert_eq!(out, r#"{"z":1,"a":{"y":"b","x":[true]}}"#);
    }

    #[test]
    fn test_from_php() {
        let value = PhpValue::Array(vec![
            (PhpKey::Str("a".into()), PhpValue::Str("x".into())),
            (
                PhpKey::Int(3),
                PhpValue::Array(vec![(PhpKey::Int(0), PhpValue::Int(1))]),
            ),
        ]);
        assert_eq!(
            Tree::from_php(&value),
            map(vec![
                ("a", Tree::Str("x".into())),
                ("3", Tree::List(vec![Tree::Int(1)])),
            ])
        );
        assert_eq!(Tree::from_php(&PhpValue::Array(vec![])), Tree::Map(TreeMap::new()));
    }
}
