use interchange::CodecError;
use node::{NodeId, NodeKind, PageId};
use thiserror::Error;

/// Errors returned by editor operations.
///
/// A failed operation leaves the document, selection and clipboard as
/// they were.
#[derive(Debug, Error)]
pub enum EditorError {
    #[error("node {0} not found")]
    NotFound(NodeId),

    #[error("page {0} not found")]
    PageNotFound(PageId),

    #[error("node {id} is a {found}, expected {expected}")]
    InvalidKind {
        id: NodeId,
        expected: &'static str,
        found: NodeKind,
    },

    #[error("invalid selection: {0}")]
    InvalidSelection(String),

    #[error("cannot move {node} into {target}: target is the node or one of its descendants")]
    CycleDetected { node: NodeId, target: NodeId },

    #[error(transparent)]
    Codec(#[from] CodecError),
}

pub type Result<T, E = EditorError> = std::result::Result<T, E>;
