use crate::NodeRecord;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashSet;
use std::fmt;

/// Insertion-ordered map of node id to record.
///
/// Serializes as a JSON object whose key order follows insertion order, so
/// exporting the same store twice yields identical text.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NodeMap(Vec<(String, NodeRecord)>);

impl NodeMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record, replacing any existing record under the same key
    /// in place.
    pub fn insert(&mut self, id: String, record: NodeRecord) {
        match self.0.iter_mut().find(|(key, _)| *key == id) {
            Some((_, existing)) => *existing = record,
            None => self.0.push((id, record)),
        }
    }

    pub fn get(&self, id: &str) -> Option<&NodeRecord> {
        self.0
            .iter()
            .find(|(key, _)| key == id)
            .map(|(_, record)| record)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut NodeRecord> {
        self.0
            .iter_mut()
            .find(|(key, _)| key == id)
            .map(|(_, record)| record)
    }

    pub fn contains_key(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &NodeRecord)> {
        self.0.iter().map(|(key, record)| (key.as_str(), record))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(key, _)| key.as_str())
    }
}

impl IntoIterator for NodeMap {
    type Item = (String, NodeRecord);
    type IntoIter = std::vec::IntoIter<(String, NodeRecord)>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl FromIterator<(String, NodeRecord)> for NodeMap {
    fn from_iter<I: IntoIterator<Item = (String, NodeRecord)>>(iter: I) -> Self {
        let mut map = NodeMap::new();
        for (id, record) in iter {
            map.insert(id, record);
        }
        map
    }
}

impl Serialize for NodeMap {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, record) in &self.0 {
            map.serialize_entry(key, record)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for NodeMap {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(NodeMapVisitor)
    }
}

struct NodeMapVisitor;

impl<'de> Visitor<'de> for NodeMapVisitor {
    type Value = NodeMap;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a map of node id to node record")
    }

    fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
        let mut seen = HashSet::new();
        while let Some((key, record)) = access.next_entry::<String, NodeRecord>()? {
            if !seen.insert(key.clone()) {
                return Err(serde::de::Error::custom(format!("duplicate node id {}", key)));
            }
            entries.push((key, record));
        }
        Ok(NodeMap(entries))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use node::NodeKind;

    fn record(x: f32) -> NodeRecord {
        NodeRecord::leaf(NodeKind::Rectangle, x, 0.0)
    }

    #[test]
    fn keeps_insertion_order_through_json() {
        let mut map = NodeMap::new();
        map.insert("b".into(), record(1.0));
        map.insert("a".into(), record(2.0));
        map.insert("c".into(), record(3.0));

        let text = serde_json::to_string(&map).unwrap();
        let parsed: NodeMap = serde_json::from_str(&text).unwrap();
        let keys: Vec<_> = parsed.keys().collect();
        assert_eq!(keys, vec!["b", "a", "c"]);
    }

    #[test]
    fn insert_replaces_in_place() {
        let mut map = NodeMap::new();
        map.insert("a".into(), record(1.0));
        map.insert("b".into(), record(2.0));
        map.insert("a".into(), record(9.0));
        assert_eq!(map.len(), 2);
        assert_eq!(map.keys().next(), Some("a"));
        assert_eq!(map.get("a").map(|r| r.x), Some(9.0));
    }

    #[test]
    fn duplicate_keys_are_rejected() {
        let text = r#"{"a": {"type": "ELLIPSE", "x": 0, "y": 0}, "a": {"type": "ELLIPSE", "x": 1, "y": 1}}"#;
        let err = serde_json::from_str::<NodeMap>(text).unwrap_err();
        assert!(err.to_string().contains("duplicate node id"));
    }
}
