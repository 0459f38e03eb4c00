//! Commands - all operations that modify the document.
//!
//! Commands are intent-based: they describe what the user wants,
//! not how to achieve it. The editor handles hierarchy upkeep,
//! selection pruning and redo invalidation.

use crate::Target;
use glam::Vec2;
use node::{Color, NodeId, NodeKind, NodePatch, PageId, Stroke};
use serde::{Deserialize, Serialize};

/// A command that modifies editor state.
///
/// Commands are serializable for:
/// - Recording macros/actions
/// - LLM generation
/// - Scripting
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    // === Nodes ===
    /// Create a new node on the active page.
    CreateShape {
        kind: NodeKind,
        position: Vec2,
        /// Falls back to the configured default size.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        size: Option<Vec2>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        fill: Option<Color>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        stroke: Option<Stroke>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        corner_radius: Option<f32>,
    },

    /// Apply a partial update to target nodes.
    UpdateNode {
        #[serde(default)]
        target: Target,
        patch: NodePatch,
    },

    /// Delete target nodes and their descendants.
    Delete {
        #[serde(default)]
        target: Target,
    },

    // === Selection ===
    /// Select nodes, optionally adding to the existing selection.
    Select {
        target: Target,
        #[serde(default)]
        add_to_selection: bool,
    },

    /// Clear the current selection.
    ClearSelection,

    /// Select all top-level nodes of the active page.
    SelectAll,

    // === Transform ===
    /// Move nodes (and their descendants) by a delta.
    Move {
        #[serde(default)]
        target: Target,
        delta: Vec2,
    },

    // === Hierarchy ===
    /// Wrap target nodes in a new group.
    Group {
        #[serde(default)]
        target: Target,
    },

    /// Dissolve every group in the target.
    Ungroup {
        #[serde(default)]
        target: Target,
    },

    /// Move a node under a new container, or to the top level when
    /// `parent` is absent.
    Reparent {
        id: NodeId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        parent: Option<NodeId>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        index: Option<usize>,
    },

    /// Raise target nodes to the top of their containers.
    BringToFront {
        #[serde(default)]
        target: Target,
    },

    /// Lower target nodes to the bottom of their containers.
    SendToBack {
        #[serde(default)]
        target: Target,
    },

    /// Raise target nodes one step within their containers.
    BringForward {
        #[serde(default)]
        target: Target,
    },

    /// Lower target nodes one step within their containers.
    SendBackward {
        #[serde(default)]
        target: Target,
    },

    // === Clipboard ===
    /// Copy target nodes to the clipboard.
    Copy {
        #[serde(default)]
        target: Target,
    },

    /// Copy target nodes to the clipboard, then delete them.
    Cut {
        #[serde(default)]
        target: Target,
    },

    /// Paste the clipboard onto the active page.
    Paste,

    /// Duplicate target nodes next to themselves.
    Duplicate {
        #[serde(default)]
        target: Target,
    },

    // === History ===
    /// Record an undo point.
    PushHistory,

    /// Undo to the previous undo point.
    Undo,

    /// Redo the last undone step.
    Redo,

    // === Pages ===
    AddPage {
        name: String,
    },

    SetActivePage {
        page: PageId,
    },

    // === Batch ===
    /// Execute multiple commands in sequence.
    Batch { commands: Vec<Command> },
}

/// Result of executing a command.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CommandResult {
    /// Command succeeded.
    Success {
        /// IDs of nodes created, if any.
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        created: Vec<NodeId>,
        /// IDs of nodes modified, if any.
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        modified: Vec<NodeId>,
        /// IDs of nodes deleted, if any.
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        deleted: Vec<NodeId>,
    },
    /// Command failed.
    Error { message: String },
}

impl CommandResult {
    pub fn success() -> Self {
        Self::Success {
            created: vec![],
            modified: vec![],
            deleted: vec![],
        }
    }

    pub fn created(ids: Vec<NodeId>) -> Self {
        Self::Success {
            created: ids,
            modified: vec![],
            deleted: vec![],
        }
    }

    pub fn modified(ids: Vec<NodeId>) -> Self {
        Self::Success {
            created: vec![],
            modified: ids,
            deleted: vec![],
        }
    }

    pub fn deleted(ids: Vec<NodeId>) -> Self {
        Self::Success {
            created: vec![],
            modified: vec![],
            deleted: ids,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}
