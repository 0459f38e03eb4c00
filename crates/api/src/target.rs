//! Target specification for commands.
//!
//! Commands need to specify which nodes they operate on.
//! This module defines flexible targeting that works with
//! the current selection, specific IDs, or queries.

use node::{NodeId, NodeKind};
use serde::{Deserialize, Serialize};

/// Specifies which nodes a command targets.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Target {
    /// The current selection (most common for user actions).
    #[default]
    Selection,

    /// Specific node by ID.
    Shape(NodeId),

    /// Multiple specific nodes by ID.
    Shapes(Vec<NodeId>),

    /// Top-level nodes of the active page.
    All,

    /// Nodes matching a query.
    Query(ShapeQuery),
}

impl From<NodeId> for Target {
    fn from(id: NodeId) -> Self {
        Self::Shape(id)
    }
}

impl From<Vec<NodeId>> for Target {
    fn from(ids: Vec<NodeId>) -> Self {
        Self::Shapes(ids)
    }
}

/// Query to find nodes by properties.
///
/// Queries search every page, in document order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeQuery {
    /// Nodes of a specific kind.
    ByKind(NodeKind),

    /// Nodes with exactly this name.
    ByName(String),

    /// Nodes intersecting a bounding box.
    InBounds {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    },

    /// Direct children of a target.
    ChildrenOf(Box<Target>),

    /// Parents of a target.
    ParentOf(Box<Target>),
}
