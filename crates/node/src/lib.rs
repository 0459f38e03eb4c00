//! Scene-graph node types.
//!
//! This crate provides the data model shared by the editor and the
//! interchange format: identifiers, node kinds with per-kind data,
//! partial updates, pages and typed canvas coordinates.
//!
//! Nodes live in a flat collection keyed by [`NodeId`]. Hierarchy is
//! expressed with a `parent` back-reference on every node and an ordered
//! `children` list on container kinds (groups and frames).

pub mod coords;
mod id;
mod node;
mod page;
mod patch;
mod style;

pub use coords::{Bounds, CanvasDelta, CanvasPoint, CanvasSize};
pub use id::{NodeId, PageId};
pub use node::{Node, NodeData, NodeKind};
pub use page::Page;
pub use patch::NodePatch;
pub use style::{Color, Stroke};
