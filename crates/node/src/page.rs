use crate::{NodeId, PageId};

/// A page of the document.
///
/// Pages are the roots of the scene graph. Each lists its top-level nodes
/// in z-order (back to front).
#[derive(Clone, Debug, PartialEq)]
pub struct Page {
    pub id: PageId,
    pub name: String,
    pub children: Vec<NodeId>,
}

impl Page {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: PageId::new(),
            name: name.into(),
            children: Vec::new(),
        }
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.children.contains(&id)
    }
}
