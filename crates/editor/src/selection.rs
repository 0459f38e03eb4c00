use node::NodeId;

/// Insertion-ordered set of selected node ids.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Selection {
    ids: Vec<NodeId>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ids(&self) -> &[NodeId] {
        &self.ids
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.ids.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Add ids not already selected, keeping first-seen order.
    pub fn extend(&mut self, ids: impl IntoIterator<Item = NodeId>) {
        for id in ids {
            if !self.ids.contains(&id) {
                self.ids.push(id);
            }
        }
    }

    /// Replace the selection.
    pub fn set(&mut self, ids: impl IntoIterator<Item = NodeId>) {
        self.ids.clear();
        self.extend(ids);
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Keep only ids matching `keep`. Returns whether anything was removed.
    pub fn retain(&mut self, mut keep: impl FnMut(NodeId) -> bool) -> bool {
        let before = self.ids.len();
        self.ids.retain(|id| keep(*id));
        self.ids.len() != before
    }
}
