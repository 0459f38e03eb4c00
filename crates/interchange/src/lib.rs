//! Document interchange format.
//!
//! A [`Document`] is a self-contained, versioned snapshot of a scene graph:
//! the ordered page list plus a flat map of node records keyed by node id.
//! Every record is fully self-describing, so no external references are
//! needed to rebuild the graph.
//!
//! # JSON
//!
//! ```json
//! {
//!   "formatVersion": 1,
//!   "pages": [{ "id": "…", "name": "Page 1", "children": ["…"] }],
//!   "nodes": {
//!     "…": { "type": "RECTANGLE", "x": 10.0, "y": 20.0, "width": 100.0, "height": 50.0 }
//!   }
//! }
//! ```
//!
//! A KDL rendering of the same document is available through
//! [`Document::to_kdl`] and [`Document::from_kdl`].
//!
//! Decoding never trusts its input: [`Document::into_parts`] checks the
//! version and every referential invariant before handing back nodes.

mod kdl_format;
mod node_map;
mod record;
mod validate;

pub use node_map::NodeMap;
pub use record::{NodeRecord, PageRecord};
pub use validate::DocumentParts;

use node::{Node, Page};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Highest format version this codec understands.
pub const FORMAT_VERSION: u32 = 1;

/// Size used when a record omits `width` or `height`.
pub const DEFAULT_SIZE: f32 = 100.0;

/// Error type for interchange operations.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("unsupported format version {found} (supported up to {supported})")]
    UnsupportedVersion { found: u32, supported: u32 },

    #[error("malformed document: {0}")]
    Malformed(String),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid KDL: {0}")]
    Kdl(String),
}

impl CodecError {
    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed(message.into())
    }
}

/// A versioned document snapshot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub format_version: u32,
    pub pages: Vec<PageRecord>,
    pub nodes: NodeMap,
}

impl Document {
    /// An empty document at the current format version.
    pub fn new() -> Self {
        Self {
            format_version: FORMAT_VERSION,
            pages: Vec::new(),
            nodes: NodeMap::new(),
        }
    }

    /// Build a document from live pages and nodes.
    ///
    /// Nodes keep the order the iterator yields them in.
    pub fn from_parts<'a>(pages: &[Page], nodes: impl IntoIterator<Item = &'a Node>) -> Self {
        let mut map = NodeMap::new();
        for node in nodes {
            map.insert(node.id.to_string(), NodeRecord::from_node(node));
        }
        Self {
            format_version: FORMAT_VERSION,
            pages: pages.iter().map(PageRecord::from_page).collect(),
            nodes: map,
        }
    }

    pub fn to_json(&self) -> Result<String, CodecError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String, CodecError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a document from JSON.
    ///
    /// Only the syntax is checked here; call [`Document::into_parts`] to
    /// validate the graph.
    pub fn from_json(input: &str) -> Result<Self, CodecError> {
        Ok(serde_json::from_str(input)?)
    }

    pub fn to_json_value(&self) -> Result<serde_json::Value, CodecError> {
        Ok(serde_json::to_value(self)?)
    }

    pub fn from_json_value(value: serde_json::Value) -> Result<Self, CodecError> {
        Ok(serde_json::from_value(value)?)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;
    use node::{Color, NodeKind};

    fn sample() -> (Vec<Page>, Vec<Node>) {
        let mut page = Page::new("Page 1");
        let rect = Node::rectangle(Vec2::new(10.0, 20.0), Vec2::new(100.0, 50.0))
            .with_fill(Color::rgb(255, 0, 0));
        page.children.push(rect.id);
        (vec![page], vec![rect])
    }

    #[test]
    fn export_has_version_pages_and_nodes() {
        let (pages, nodes) = sample();
        let doc = Document::from_parts(&pages, &nodes);
        assert_eq!(doc.format_version, 1);
        assert_eq!(doc.pages.len(), 1);
        assert_eq!(doc.node_count(), 1);
    }

    #[test]
    fn json_uses_interchange_field_names() {
        let (pages, nodes) = sample();
        let doc = Document::from_parts(&pages, &nodes);
        let json = doc.to_json_value().unwrap();

        assert_eq!(json["formatVersion"], 1);
        let key = nodes[0].id.to_string();
        let record = &json["nodes"][key.as_str()];
        assert_eq!(record["type"], "RECTANGLE");
        assert_eq!(record["x"], 10.0);
        assert_eq!(record["y"], 20.0);
        assert_eq!(record["width"], 100.0);
        assert_eq!(record["height"], 50.0);
        assert_eq!(record["fill"], "#FF0000");
        // Absent optional fields are omitted entirely
        assert!(record.get("parent").is_none());
        assert!(record.get("children").is_none());
    }

    #[test]
    fn json_round_trip_is_structurally_equal() {
        let (pages, nodes) = sample();
        let doc = Document::from_parts(&pages, &nodes);
        let text = doc.to_json_pretty().unwrap();
        let parsed = Document::from_json(&text).unwrap();
        assert_eq!(parsed, doc);
    }

    #[test]
    fn decoded_parts_match_source_geometry() {
        let (pages, nodes) = sample();
        let doc = Document::from_parts(&pages, &nodes);
        let parts = Document::from_json(&doc.to_json().unwrap())
            .unwrap()
            .into_parts()
            .unwrap();

        assert_eq!(parts.nodes.len(), 1);
        let node = &parts.nodes[0];
        assert_eq!(node.kind(), NodeKind::Rectangle);
        assert_eq!(node, &nodes[0]);
        assert_eq!(parts.pages, pages);
    }

    #[test]
    fn future_version_is_rejected() {
        let (pages, nodes) = sample();
        let mut doc = Document::from_parts(&pages, &nodes);
        doc.format_version = 2;
        let err = doc.into_parts().unwrap_err();
        assert!(matches!(
            err,
            CodecError::UnsupportedVersion {
                found: 2,
                supported: 1
            }
        ));
    }

    #[test]
    fn syntax_errors_surface_as_json_errors() {
        let err = Document::from_json("{ not json").unwrap_err();
        assert!(matches!(err, CodecError::Json(_)));
    }
}
