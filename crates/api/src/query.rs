//! Queries - read-only access to editor state.
//!
//! Queries allow inspecting the document without modifying it.
//! Useful for agents to understand current state before issuing commands.

use crate::Target;
use glam::Vec2;
use node::{Color, Node, NodeId, NodeKind, Page, PageId, Stroke};
use serde::{Deserialize, Serialize};

/// A query for editor state (read-only).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Query {
    /// Get the current selection.
    GetSelection,

    /// Get every node, in store order.
    GetAllNodes,

    /// Get nodes matching a target.
    GetNodes { target: Target },

    /// Get a specific node by ID.
    GetNode { id: NodeId },

    /// Get the bounding box of the active page's top-level nodes.
    GetCanvasBounds,

    /// Get node count.
    GetNodeCount,

    /// Get undo/redo availability.
    GetHistory,

    /// Get the page list and the active page.
    GetPages,
}

/// Response to a query.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QueryResult {
    /// Selection result.
    Selection { ids: Vec<NodeId> },

    /// Nodes result.
    Nodes { nodes: Vec<NodeInfo> },

    /// Single node result.
    Node { node: Option<NodeInfo> },

    /// Bounds result.
    Bounds {
        min: Option<Vec2>,
        max: Option<Vec2>,
    },

    /// Count result.
    Count { count: usize },

    /// History result.
    History {
        can_undo: bool,
        can_redo: bool,
        undo_count: usize,
        redo_count: usize,
    },

    /// Pages result.
    Pages { pages: Vec<PageInfo>, active: PageId },

    /// Error result.
    Error { message: String },
}

/// Serializable node information.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodeInfo {
    pub id: NodeId,
    pub kind: NodeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub position: Vec2,
    pub size: Vec2,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<Color>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke: Option<Stroke>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub corner_radius: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<NodeId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeId>,
    pub visible: bool,
    pub locked: bool,
}

impl From<&Node> for NodeInfo {
    fn from(node: &Node) -> Self {
        Self {
            id: node.id,
            kind: node.kind(),
            name: node.name.clone(),
            position: node.position.0,
            size: node.size.0,
            fill: node.fill(),
            stroke: node.stroke(),
            corner_radius: node.corner_radius(),
            parent: node.parent,
            children: node.children().to_vec(),
            visible: node.visible,
            locked: node.locked,
        }
    }
}

/// Serializable page information.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PageInfo {
    pub id: PageId,
    pub name: String,
    pub node_count: usize,
}

impl From<&Page> for PageInfo {
    fn from(page: &Page) -> Self {
        Self {
            id: page.id,
            name: page.name.clone(),
            node_count: page.children.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_info_copies_kind_specific_fields() {
        let node = Node::rectangle(Vec2::new(10.0, 20.0), Vec2::new(100.0, 50.0))
            .with_fill(Color::WHITE)
            .with_corner_radius(4.0);
        let info = NodeInfo::from(&node);

        assert_eq!(info.position, Vec2::new(10.0, 20.0));
        assert_eq!(info.size, Vec2::new(100.0, 50.0));
        assert_eq!(info.kind, NodeKind::Rectangle);
        assert_eq!(info.fill, Some(Color::WHITE));
        assert_eq!(info.corner_radius, Some(4.0));
        assert!(info.children.is_empty());
    }

    #[test]
    fn query_uses_snake_case_tags() {
        let query: Query = serde_json::from_str(r#"{ "type": "get_node_count" }"#).unwrap();
        assert_eq!(query, Query::GetNodeCount);

        let json = serde_json::to_value(QueryResult::Count { count: 3 }).unwrap();
        assert_eq!(json, serde_json::json!({ "type": "count", "count": 3 }));
    }
}
