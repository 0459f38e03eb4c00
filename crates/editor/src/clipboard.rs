//! Detached subtree copies for copy, paste and duplicate.

use node::{CanvasDelta, Node, NodeId};
use std::collections::HashMap;
use tracing::debug;

use crate::store::{NodeStore, Slot};
use crate::Result;

/// Deep copies of one or more subtrees.
///
/// Entries share nothing with the store they came from, so they stay valid
/// after the source nodes are edited or deleted.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Clipboard {
    roots: Vec<NodeId>,
    /// Every copied node, each root followed by its descendants in pre-order.
    nodes: Vec<Node>,
}

impl Clipboard {
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Ids of the copied roots, as they were in the source store.
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Total number of copied nodes, descendants included.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}

impl NodeStore {
    /// Deep-copy the subtrees rooted at `ids`.
    ///
    /// An id nested under another listed id is covered by its ancestor's
    /// subtree and does not become a root of its own.
    pub fn copy_subtrees(&self, ids: &[NodeId]) -> Result<Clipboard> {
        for id in ids {
            self.require(*id)?;
        }
        let mut clipboard = Clipboard::default();
        for &id in ids {
            if clipboard.roots.contains(&id) || ids.iter().any(|other| self.is_ancestor(*other, id)) {
                continue;
            }
            clipboard.roots.push(id);
            for member in std::iter::once(id).chain(self.descendants(id)) {
                if let Some(node) = self.get(member) {
                    let mut copy = node.clone();
                    if member == id {
                        copy.parent = None;
                    }
                    clipboard.nodes.push(copy);
                }
            }
        }
        Ok(clipboard)
    }

    /// Insert fresh copies of the clipboard's subtrees, moved by `offset`.
    ///
    /// Every node gets a new id and internal references are remapped. The
    /// new roots are added to the store but not linked into any container;
    /// the caller places them. Returns the new root ids in clipboard order.
    pub(crate) fn instantiate(&mut self, clipboard: &Clipboard, offset: CanvasDelta) -> Vec<NodeId> {
        let remap: HashMap<NodeId, NodeId> = clipboard
            .nodes
            .iter()
            .map(|node| (node.id, NodeId::new()))
            .collect();

        for node in &clipboard.nodes {
            let mut copy = node.clone();
            copy.id = remap[&node.id];
            copy.parent = node.parent.and_then(|parent| remap.get(&parent).copied());
            if let Some(children) = copy.children_mut() {
                for child in children.iter_mut() {
                    if let Some(fresh) = remap.get(child) {
                        *child = *fresh;
                    }
                }
            }
            copy.translate(offset);
            self.insert_detached(copy);
        }

        clipboard
            .roots
            .iter()
            .filter_map(|root| remap.get(root).copied())
            .collect()
    }

    /// Paste the clipboard on top of the active page.
    pub fn paste_subtrees(&mut self, clipboard: &Clipboard) -> Vec<NodeId> {
        if clipboard.is_empty() {
            return Vec::new();
        }
        let roots = self.instantiate(clipboard, CanvasDelta::default());
        let page = Slot::Page(self.active_page());
        for &root in &roots {
            self.attach(root, page, None);
        }
        self.touch();
        debug!(count = roots.len(), "pasted nodes");
        roots
    }

    /// Clone the subtrees at `ids`, each placed just above its source.
    pub fn duplicate_subtrees(&mut self, ids: &[NodeId], offset: CanvasDelta) -> Result<Vec<NodeId>> {
        let clipboard = self.copy_subtrees(ids)?;
        if clipboard.is_empty() {
            return Ok(Vec::new());
        }
        let copies = self.instantiate(&clipboard, offset);
        for (source, &copy) in clipboard.roots.iter().zip(&copies) {
            match self.position_of(*source) {
                Some((slot, index)) => self.attach(copy, slot, Some(index + 1)),
                None => self.attach(copy, Slot::Page(self.active_page()), None),
            }
        }
        self.touch();
        debug!(count = copies.len(), "duplicated nodes");
        Ok(copies)
    }
}
