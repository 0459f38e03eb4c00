//! The node store: nodes, their hierarchy and the pages that root it.

use node::{
    Bounds, CanvasDelta, CanvasPoint, CanvasSize, Node, NodeId, NodeKind, NodePatch, Page, PageId,
};
use std::collections::{HashMap, HashSet};
use tracing::debug;

use crate::{EditorError, Result};

/// The list a node lives in: a page's top level or a container's children.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Slot {
    Page(PageId),
    Node(NodeId),
}

/// All nodes of a document plus its pages.
///
/// Nodes are kept in a map for lookup and in a separate list for insertion
/// order, which is the order they are exported in. Every mutation keeps
/// `parent` and `children` in agreement and every node reachable from
/// exactly one page.
#[derive(Clone, Debug)]
pub struct NodeStore {
    nodes: HashMap<NodeId, Node>,
    order: Vec<NodeId>,
    pages: Vec<Page>,
    active_page: PageId,
    /// Bumped on every effective change. Not part of equality.
    revision: u64,
}

impl PartialEq for NodeStore {
    fn eq(&self, other: &Self) -> bool {
        self.order == other.order
            && self.nodes == other.nodes
            && self.pages == other.pages
            && self.active_page == other.active_page
    }
}

impl NodeStore {
    /// An empty store with a single page.
    pub fn new(page_name: impl Into<String>) -> Self {
        let page = Page::new(page_name);
        Self {
            nodes: HashMap::new(),
            active_page: page.id,
            pages: vec![page],
            order: Vec::new(),
            revision: 0,
        }
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&id)
    }

    pub(crate) fn require(&self, id: NodeId) -> Result<&Node> {
        self.nodes.get(&id).ok_or(EditorError::NotFound(id))
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Nodes in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.order.iter().filter_map(|id| self.nodes.get(id))
    }

    pub fn ids(&self) -> &[NodeId] {
        &self.order
    }

    /// Direct children of `id`, empty for leaves and unknown ids.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes.get(&id).map(Node::children).unwrap_or(&[])
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(&id).and_then(|node| node.parent)
    }

    /// All descendants of `id` in pre-order, excluding `id` itself.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            result.push(next);
            stack.extend(self.children(next).iter().rev().copied());
        }
        result
    }

    /// Whether `ancestor` is a strict ancestor of `id`.
    pub fn is_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut current = self.parent(id);
        while let Some(parent) = current {
            if parent == ancestor {
                return true;
            }
            current = self.parent(parent);
        }
        false
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn page(&self, id: PageId) -> Option<&Page> {
        self.pages.iter().find(|page| page.id == id)
    }

    pub fn active_page(&self) -> PageId {
        self.active_page
    }

    /// Top-level nodes of a page, back to front.
    pub fn top_level(&self, page: PageId) -> Result<&[NodeId]> {
        self.page(page)
            .map(|page| page.children.as_slice())
            .ok_or(EditorError::PageNotFound(page))
    }

    /// The page a node belongs to.
    pub fn page_of(&self, id: NodeId) -> Option<PageId> {
        let mut root = id;
        while let Some(parent) = self.parent(root) {
            root = parent;
        }
        self.pages
            .iter()
            .find(|page| page.contains(root))
            .map(|page| page.id)
    }

    /// Union of the bounds of `ids`. Unknown ids are skipped.
    pub fn bounds(&self, ids: &[NodeId]) -> Option<Bounds> {
        Bounds::union_all(ids.iter().filter_map(|id| self.get(*id)).map(Node::bounds))
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub(crate) fn touch(&mut self) {
        self.revision += 1;
    }

    /// Create a node of `kind` on top of the active page.
    pub fn create_shape(&mut self, kind: NodeKind, position: CanvasPoint, size: CanvasSize) -> NodeId {
        let node = Node::new(kind, position, size);
        let id = node.id;
        self.insert_detached(node);
        self.attach(id, Slot::Page(self.active_page), None);
        self.touch();
        debug!(id = %id, kind = %kind, "created node");
        id
    }

    /// Apply a patch to a node, returning the fields its kind ignored.
    pub fn update_node(&mut self, id: NodeId, patch: &NodePatch) -> Result<Vec<&'static str>> {
        let node = self.nodes.get_mut(&id).ok_or(EditorError::NotFound(id))?;
        let before = node.clone();
        let ignored = node.apply_patch(patch);
        if *node != before {
            self.touch();
            debug!(id = %id, "updated node");
        }
        Ok(ignored)
    }

    /// Delete nodes and all their descendants. Unknown ids are skipped.
    ///
    /// Returns every removed id, roots first in argument order, each
    /// followed by its descendants.
    pub fn delete_nodes(&mut self, ids: &[NodeId]) -> Vec<NodeId> {
        let mut removed = Vec::new();
        for &id in ids {
            if !self.nodes.contains_key(&id) {
                continue;
            }
            let mut subtree = vec![id];
            subtree.extend(self.descendants(id));
            self.detach(id);
            for gone in &subtree {
                self.nodes.remove(gone);
            }
            removed.extend(subtree);
        }
        if !removed.is_empty() {
            let gone: HashSet<NodeId> = removed.iter().copied().collect();
            self.order.retain(|id| !gone.contains(id));
            self.touch();
            debug!(count = removed.len(), "deleted nodes");
        }
        removed
    }

    /// Move nodes and their descendants by `delta`.
    ///
    /// A node listed together with one of its ancestors moves once.
    pub fn translate_nodes(&mut self, ids: &[NodeId], delta: CanvasDelta) -> Result<Vec<NodeId>> {
        for id in ids {
            self.require(*id)?;
        }
        let mut moved: Vec<NodeId> = Vec::new();
        let mut seen = HashSet::new();
        for &id in ids {
            for target in std::iter::once(id).chain(self.descendants(id)) {
                if seen.insert(target) {
                    moved.push(target);
                }
            }
        }
        if delta != CanvasDelta::default() {
            for id in &moved {
                if let Some(node) = self.nodes.get_mut(id) {
                    node.translate(delta);
                }
            }
            self.touch();
            debug!(count = moved.len(), dx = delta.x(), dy = delta.y(), "translated nodes");
        }
        Ok(moved)
    }

    pub fn add_page(&mut self, name: impl Into<String>) -> PageId {
        let page = Page::new(name);
        let id = page.id;
        self.pages.push(page);
        self.touch();
        debug!(page = %id, "added page");
        id
    }

    pub fn set_active_page(&mut self, page: PageId) -> Result<()> {
        if self.page(page).is_none() {
            return Err(EditorError::PageNotFound(page));
        }
        if self.active_page != page {
            self.active_page = page;
            self.touch();
        }
        Ok(())
    }

    pub fn rename_page(&mut self, page: PageId, name: impl Into<String>) -> Result<()> {
        let name = name.into();
        let entry = self
            .pages
            .iter_mut()
            .find(|p| p.id == page)
            .ok_or(EditorError::PageNotFound(page))?;
        if entry.name != name {
            entry.name = name;
            self.touch();
        }
        Ok(())
    }

    /// Remove a page and every node on it. The last page cannot be removed.
    pub fn remove_page(&mut self, page: PageId) -> Result<Vec<NodeId>> {
        let roots = self.top_level(page)?.to_vec();
        if self.pages.len() == 1 {
            return Err(EditorError::InvalidSelection(
                "cannot remove the only page".into(),
            ));
        }
        let removed = self.delete_nodes(&roots);
        self.pages.retain(|p| p.id != page);
        if self.active_page == page {
            if let Some(first) = self.pages.first() {
                self.active_page = first.id;
            }
        }
        self.touch();
        debug!(page = %page, nodes = removed.len(), "removed page");
        Ok(removed)
    }

    /// Replace the whole contents with validated pages and nodes.
    pub(crate) fn replace_parts(&mut self, pages: Vec<Page>, nodes: Vec<Node>) {
        self.order = nodes.iter().map(|node| node.id).collect();
        self.nodes = nodes.into_iter().map(|node| (node.id, node)).collect();
        if !pages.iter().any(|page| page.id == self.active_page) {
            if let Some(first) = pages.first() {
                self.active_page = first.id;
            }
        }
        self.pages = pages;
        self.touch();
    }

    /// Take over the contents of `other`, keeping this store's revision
    /// moving forward.
    pub(crate) fn restore(&mut self, other: NodeStore) {
        let revision = self.revision;
        *self = other;
        self.revision = revision + 1;
    }

    /// Add a node to the map without listing it anywhere.
    pub(crate) fn insert_detached(&mut self, node: Node) {
        let id = node.id;
        if self.nodes.insert(id, node).is_none() {
            self.order.push(id);
        }
    }

    /// Remove a node from the map and order list. The caller detaches it.
    pub(crate) fn remove_detached(&mut self, id: NodeId) -> Option<Node> {
        let node = self.nodes.remove(&id)?;
        self.order.retain(|other| *other != id);
        Some(node)
    }

    /// The list that holds `id`.
    pub(crate) fn slot_of(&self, id: NodeId) -> Option<Slot> {
        match self.parent(id) {
            Some(parent) => Some(Slot::Node(parent)),
            None => self.page_of(id).map(Slot::Page),
        }
    }

    pub(crate) fn slot_children(&self, slot: Slot) -> &[NodeId] {
        match slot {
            Slot::Page(page) => self.page(page).map(|p| p.children.as_slice()).unwrap_or(&[]),
            Slot::Node(id) => self.children(id),
        }
    }

    fn slot_children_mut(&mut self, slot: Slot) -> Option<&mut Vec<NodeId>> {
        match slot {
            Slot::Page(page) => self
                .pages
                .iter_mut()
                .find(|p| p.id == page)
                .map(|p| &mut p.children),
            Slot::Node(id) => self.nodes.get_mut(&id).and_then(Node::children_mut),
        }
    }

    /// Position of `id` in its list.
    pub(crate) fn position_of(&self, id: NodeId) -> Option<(Slot, usize)> {
        let slot = self.slot_of(id)?;
        let index = self.slot_children(slot).iter().position(|c| *c == id)?;
        Some((slot, index))
    }

    /// Unlink `id` from its list and clear its parent.
    pub(crate) fn detach(&mut self, id: NodeId) -> Option<(Slot, usize)> {
        let (slot, index) = self.position_of(id)?;
        if let Some(children) = self.slot_children_mut(slot) {
            children.remove(index);
        }
        if let Some(node) = self.nodes.get_mut(&id) {
            node.parent = None;
        }
        Some((slot, index))
    }

    /// Link `id` into `slot` at `index` (clamped), or on top when `None`.
    pub(crate) fn attach(&mut self, id: NodeId, slot: Slot, index: Option<usize>) {
        if let Some(children) = self.slot_children_mut(slot) {
            let index = index.unwrap_or(children.len()).min(children.len());
            children.insert(index, id);
        }
        if let Some(node) = self.nodes.get_mut(&id) {
            node.parent = match slot {
                Slot::Node(parent) => Some(parent),
                Slot::Page(_) => None,
            };
        }
    }

    /// Every node id in paint order: page by page, pre-order.
    pub(crate) fn paint_order(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.order.len());
        for page in &self.pages {
            for &root in &page.children {
                order.push(root);
                order.extend(self.descendants(root));
            }
        }
        order
    }
}
