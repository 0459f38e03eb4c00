//! The editor session.

use interchange::Document;
use node::{CanvasDelta, CanvasPoint, CanvasSize, NodeId, NodeKind, NodePatch, PageId};
use tracing::{debug, trace, warn};

use crate::clipboard::Clipboard;
use crate::events::{EditorEvent, Listeners, SubscriptionId};
use crate::history::{History, Snapshot};
use crate::selection::Selection;
use crate::store::NodeStore;
use crate::{EditorConfig, EditorError, Result};

/// One editing session: a document plus its selection, clipboard and
/// history.
///
/// Listeners registered with [`Editor::subscribe`] hear about every
/// committed change. Failed operations emit nothing.
#[derive(Debug)]
pub struct Editor {
    config: EditorConfig,
    store: NodeStore,
    selection: Selection,
    clipboard: Clipboard,
    history: History,
    listeners: Listeners,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new()
    }
}

impl Editor {
    pub fn new() -> Self {
        Self::with_config(EditorConfig::default())
    }

    pub fn with_config(config: EditorConfig) -> Self {
        Self {
            store: NodeStore::new(config.default_page_name.clone()),
            selection: Selection::new(),
            clipboard: Clipboard::default(),
            history: History::new(config.max_history),
            listeners: Listeners::default(),
            config,
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn store(&self) -> &NodeStore {
        &self.store
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn clipboard(&self) -> &Clipboard {
        &self.clipboard
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    // Notifications

    pub fn subscribe(&mut self, listener: impl FnMut(&EditorEvent) + 'static) -> SubscriptionId {
        self.listeners.add(Box::new(listener))
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.listeners.remove(id)
    }

    /// Finish a mutation: drop stale redo entries if the document moved
    /// since `before`, then notify listeners.
    fn commit(&mut self, before: u64, mut events: Vec<EditorEvent>) {
        if self.store.revision() != before && self.history.clear_redo() {
            trace!("redo stack cleared");
            events.push(EditorEvent::HistoryChanged);
        }
        for event in &events {
            self.listeners.emit(event);
        }
    }

    /// Drop selected ids that no longer exist.
    fn prune_selection(&mut self) -> bool {
        let store = &self.store;
        self.selection.retain(|id| store.contains(id))
    }

    // Nodes

    /// Create a shape on top of the active page. `None` uses the configured
    /// default size.
    pub fn create_shape(&mut self, kind: NodeKind, x: f32, y: f32, size: Option<CanvasSize>) -> NodeId {
        let before = self.store.revision();
        let size = size.unwrap_or(self.config.default_size);
        let id = self.store.create_shape(kind, CanvasPoint::new(x, y), size);
        self.commit(
            before,
            vec![EditorEvent::NodesAdded(vec![id]), EditorEvent::HierarchyChanged],
        );
        id
    }

    /// Patch a node. Fields its kind does not have are skipped and returned.
    pub fn update_node(&mut self, id: NodeId, patch: &NodePatch) -> Result<Vec<&'static str>> {
        let before = self.store.revision();
        let ignored = self.store.update_node(id, patch)?;
        if !ignored.is_empty() {
            warn!(id = %id, fields = ?ignored, "patch fields ignored for node kind");
        }
        let mut events = Vec::new();
        if self.store.revision() != before {
            events.push(EditorEvent::NodesChanged(vec![id]));
        }
        self.commit(before, events);
        Ok(ignored)
    }

    /// Delete nodes with their descendants. Unknown ids are skipped.
    pub fn delete_nodes(&mut self, ids: &[NodeId]) -> Vec<NodeId> {
        let before = self.store.revision();
        let removed = self.store.delete_nodes(ids);
        if removed.is_empty() {
            return removed;
        }
        let mut events = vec![
            EditorEvent::NodesRemoved(removed.clone()),
            EditorEvent::HierarchyChanged,
        ];
        if self.prune_selection() {
            events.push(EditorEvent::SelectionChanged);
        }
        self.commit(before, events);
        removed
    }

    pub fn translate_nodes(&mut self, ids: &[NodeId], delta: CanvasDelta) -> Result<Vec<NodeId>> {
        let before = self.store.revision();
        let moved = self.store.translate_nodes(ids, delta)?;
        let mut events = Vec::new();
        if self.store.revision() != before {
            events.push(EditorEvent::NodesChanged(moved.clone()));
        }
        self.commit(before, events);
        Ok(moved)
    }

    // Structure

    pub fn group_nodes(&mut self, ids: &[NodeId]) -> Result<NodeId> {
        let before = self.store.revision();
        let group = self.store.group_nodes(ids)?;
        self.commit(
            before,
            vec![EditorEvent::NodesAdded(vec![group]), EditorEvent::HierarchyChanged],
        );
        Ok(group)
    }

    pub fn ungroup_nodes(&mut self, group: NodeId) -> Result<Vec<NodeId>> {
        let before = self.store.revision();
        let children = self.store.ungroup_nodes(group)?;
        let mut events = vec![
            EditorEvent::NodesRemoved(vec![group]),
            EditorEvent::HierarchyChanged,
        ];
        if self.prune_selection() {
            events.push(EditorEvent::SelectionChanged);
        }
        self.commit(before, events);
        Ok(children)
    }

    pub fn reparent(&mut self, id: NodeId, parent: Option<NodeId>, index: Option<usize>) -> Result<()> {
        let before = self.store.revision();
        self.store.reparent(id, parent, index)?;
        self.commit(before, vec![EditorEvent::HierarchyChanged]);
        Ok(())
    }

    pub fn bring_to_front(&mut self, ids: &[NodeId]) -> Result<bool> {
        self.restack(ids, NodeStore::bring_to_front)
    }

    pub fn send_to_back(&mut self, ids: &[NodeId]) -> Result<bool> {
        self.restack(ids, NodeStore::send_to_back)
    }

    pub fn bring_forward(&mut self, ids: &[NodeId]) -> Result<bool> {
        self.restack(ids, NodeStore::bring_forward)
    }

    pub fn send_backward(&mut self, ids: &[NodeId]) -> Result<bool> {
        self.restack(ids, NodeStore::send_backward)
    }

    fn restack(
        &mut self,
        ids: &[NodeId],
        op: impl FnOnce(&mut NodeStore, &[NodeId]) -> Result<bool>,
    ) -> Result<bool> {
        let before = self.store.revision();
        let changed = op(&mut self.store, ids)?;
        let events = if changed {
            vec![EditorEvent::HierarchyChanged]
        } else {
            Vec::new()
        };
        self.commit(before, events);
        Ok(changed)
    }

    // Selection

    /// Select `ids`, replacing the selection unless `additive`.
    pub fn select(&mut self, ids: &[NodeId], additive: bool) -> Result<()> {
        for id in ids {
            self.store.require(*id)?;
        }
        let mut next = if additive {
            self.selection.clone()
        } else {
            Selection::new()
        };
        next.extend(ids.iter().copied());
        self.set_selection(next);
        Ok(())
    }

    /// Select every top-level node of the active page.
    pub fn select_all(&mut self) {
        let mut next = Selection::new();
        if let Ok(ids) = self.store.top_level(self.store.active_page()) {
            next.extend(ids.iter().copied());
        }
        self.set_selection(next);
    }

    pub fn clear_selection(&mut self) {
        self.set_selection(Selection::new());
    }

    fn set_selection(&mut self, next: Selection) {
        if next != self.selection {
            self.selection = next;
            self.listeners.emit(&EditorEvent::SelectionChanged);
        }
    }

    // Clipboard

    /// Copy the subtrees at `ids`, replacing the clipboard.
    pub fn copy_nodes(&mut self, ids: &[NodeId]) -> Result<()> {
        self.clipboard = self.store.copy_subtrees(ids)?;
        debug!(
            roots = self.clipboard.roots().len(),
            nodes = self.clipboard.node_count(),
            "copied nodes"
        );
        Ok(())
    }

    /// Copy then delete. Returns the deleted ids.
    pub fn cut_nodes(&mut self, ids: &[NodeId]) -> Result<Vec<NodeId>> {
        self.copy_nodes(ids)?;
        Ok(self.delete_nodes(ids))
    }

    /// Paste fresh copies of the clipboard on top of the active page and
    /// select them. Returns the new root ids.
    pub fn paste_nodes(&mut self) -> Vec<NodeId> {
        if self.clipboard.is_empty() {
            return Vec::new();
        }
        let before = self.store.revision();
        let roots = self.store.paste_subtrees(&self.clipboard);
        self.finish_insert(before, &roots);
        roots
    }

    /// Clone the subtrees at `ids` next to their sources, offset by the
    /// configured amount, and select the copies. The clipboard is untouched.
    pub fn duplicate_nodes(&mut self, ids: &[NodeId]) -> Result<Vec<NodeId>> {
        let before = self.store.revision();
        let copies = self
            .store
            .duplicate_subtrees(ids, self.config.duplicate_offset)?;
        if !copies.is_empty() {
            self.finish_insert(before, &copies);
        }
        Ok(copies)
    }

    fn finish_insert(&mut self, before: u64, roots: &[NodeId]) {
        let mut added = Vec::new();
        for &root in roots {
            added.push(root);
            added.extend(self.store.descendants(root));
        }
        let mut events = vec![EditorEvent::NodesAdded(added), EditorEvent::HierarchyChanged];
        let mut next = Selection::new();
        next.extend(roots.iter().copied());
        if next != self.selection {
            self.selection = next;
            events.push(EditorEvent::SelectionChanged);
        }
        self.commit(before, events);
    }

    // History

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            store: self.store.clone(),
            selection: self.selection.clone(),
        }
    }

    /// Record the current document and selection as an undo point.
    pub fn push_history(&mut self) {
        if self.history.push(self.snapshot()) {
            self.listeners.emit(&EditorEvent::HistoryChanged);
        }
    }

    /// Returns whether anything was undone.
    pub fn undo(&mut self) -> bool {
        let depth = self.history_depth();
        let snapshot = self.history.undo(self.snapshot());
        self.step(snapshot, depth)
    }

    /// Returns whether anything was redone.
    pub fn redo(&mut self) -> bool {
        let depth = self.history_depth();
        let snapshot = self.history.redo(self.snapshot());
        self.step(snapshot, depth)
    }

    fn history_depth(&self) -> (usize, usize) {
        (self.history.undo_count(), self.history.redo_count())
    }

    /// Restore the snapshot an undo or redo produced. Without one, stale
    /// entries may still have been discarded and listeners hear about it.
    fn step(&mut self, snapshot: Option<Snapshot>, depth: (usize, usize)) -> bool {
        match snapshot {
            Some(snapshot) => {
                self.restore(snapshot);
                true
            }
            None => {
                if self.history_depth() != depth {
                    self.listeners.emit(&EditorEvent::HistoryChanged);
                }
                false
            }
        }
    }

    fn restore(&mut self, snapshot: Snapshot) {
        self.store.restore(snapshot.store);
        let mut events = vec![EditorEvent::DocumentReplaced, EditorEvent::HistoryChanged];
        if snapshot.selection != self.selection {
            self.selection = snapshot.selection;
            events.push(EditorEvent::SelectionChanged);
        }
        for event in &events {
            self.listeners.emit(event);
        }
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
        self.listeners.emit(&EditorEvent::HistoryChanged);
    }

    // Pages

    pub fn add_page(&mut self, name: impl Into<String>) -> PageId {
        let before = self.store.revision();
        let page = self.store.add_page(name);
        self.commit(before, vec![EditorEvent::PagesChanged]);
        page
    }

    pub fn set_active_page(&mut self, page: PageId) -> Result<()> {
        let before = self.store.revision();
        self.store.set_active_page(page)?;
        let events = if self.store.revision() != before {
            vec![EditorEvent::PagesChanged]
        } else {
            Vec::new()
        };
        self.commit(before, events);
        Ok(())
    }

    pub fn rename_page(&mut self, page: PageId, name: impl Into<String>) -> Result<()> {
        let before = self.store.revision();
        self.store.rename_page(page, name)?;
        let events = if self.store.revision() != before {
            vec![EditorEvent::PagesChanged]
        } else {
            Vec::new()
        };
        self.commit(before, events);
        Ok(())
    }

    /// Remove a page with all of its nodes. Returns the removed node ids.
    pub fn remove_page(&mut self, page: PageId) -> Result<Vec<NodeId>> {
        let before = self.store.revision();
        let removed = self.store.remove_page(page)?;
        let mut events = vec![EditorEvent::PagesChanged];
        if !removed.is_empty() {
            events.push(EditorEvent::NodesRemoved(removed.clone()));
        }
        if self.prune_selection() {
            events.push(EditorEvent::SelectionChanged);
        }
        self.commit(before, events);
        Ok(removed)
    }

    // Documents

    /// Snapshot the document in interchange form.
    pub fn export_document(&self) -> Document {
        Document::from_parts(self.store.pages(), self.store.iter())
    }

    /// Replace the document. Validation happens before anything changes;
    /// history is not recorded.
    pub fn import_document(&mut self, document: Document) -> Result<()> {
        let parts = match document.into_parts() {
            Ok(parts) => parts,
            Err(err) => {
                warn!(error = %err, "rejected document import");
                return Err(EditorError::Codec(err));
            }
        };
        let before = self.store.revision();
        let count = parts.nodes.len();
        self.store.replace_parts(parts.pages, parts.nodes);
        let mut events = vec![EditorEvent::DocumentReplaced];
        if self.prune_selection() {
            events.push(EditorEvent::SelectionChanged);
        }
        debug!(nodes = count, pages = self.store.pages().len(), "imported document");
        self.commit(before, events);
        Ok(())
    }

    pub fn export_json(&self) -> Result<String> {
        Ok(self.export_document().to_json_pretty()?)
    }

    pub fn import_json(&mut self, input: &str) -> Result<()> {
        let document = Document::from_json(input).map_err(|err| {
            warn!(error = %err, "rejected document import");
            err
        })?;
        self.import_document(document)
    }

    pub fn export_kdl(&self) -> String {
        self.export_document().to_kdl()
    }

    pub fn import_kdl(&mut self, input: &str) -> Result<()> {
        let document = Document::from_kdl(input).map_err(|err| {
            warn!(error = %err, "rejected document import");
            err
        })?;
        self.import_document(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn recorded(editor: &mut Editor) -> Rc<RefCell<Vec<EditorEvent>>> {
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        editor.subscribe(move |event| sink.borrow_mut().push(event.clone()));
        events
    }

    #[test]
    fn create_uses_configured_default_size() {
        let config = EditorConfig {
            default_size: CanvasSize::new(40.0, 30.0),
            ..EditorConfig::default()
        };
        let mut editor = Editor::with_config(config);
        let id = editor.create_shape(NodeKind::Ellipse, 1.0, 2.0, None);
        let node = editor.store().get(id).unwrap();
        assert_eq!(node.size, CanvasSize::new(40.0, 30.0));
        assert_eq!(node.position, CanvasPoint::new(1.0, 2.0));
    }

    #[test]
    fn events_follow_committed_changes_only() {
        let mut editor = Editor::new();
        let events = recorded(&mut editor);

        let id = editor.create_shape(NodeKind::Rectangle, 0.0, 0.0, None);
        assert!(editor.update_node(NodeId::new(), &NodePatch::new()).is_err());
        editor.select(&[id], false).unwrap();
        editor.delete_nodes(&[id]);

        assert_eq!(
            *events.borrow(),
            vec![
                EditorEvent::NodesAdded(vec![id]),
                EditorEvent::HierarchyChanged,
                EditorEvent::SelectionChanged,
                EditorEvent::NodesRemoved(vec![id]),
                EditorEvent::HierarchyChanged,
                EditorEvent::SelectionChanged,
            ]
        );
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let mut editor = Editor::new();
        let count = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&count);
        let subscription = editor.subscribe(move |_| *sink.borrow_mut() += 1);
        editor.create_shape(NodeKind::Rectangle, 0.0, 0.0, None);
        assert!(editor.unsubscribe(subscription));
        editor.create_shape(NodeKind::Rectangle, 0.0, 0.0, None);
        assert_eq!(*count.borrow(), 2);
        assert!(!editor.unsubscribe(subscription));
    }

    #[test]
    fn select_rejects_unknown_ids() {
        let mut editor = Editor::new();
        let a = editor.create_shape(NodeKind::Rectangle, 0.0, 0.0, None);
        editor.select(&[a], false).unwrap();
        let err = editor.select(&[NodeId::new()], true).unwrap_err();
        assert!(matches!(err, EditorError::NotFound(_)));
        assert_eq!(editor.selection().ids(), &[a]);
    }

    #[test]
    fn additive_select_and_select_all() {
        let mut editor = Editor::new();
        let a = editor.create_shape(NodeKind::Rectangle, 0.0, 0.0, None);
        let b = editor.create_shape(NodeKind::Ellipse, 0.0, 0.0, None);
        editor.select(&[b], false).unwrap();
        editor.select(&[a], true).unwrap();
        assert_eq!(editor.selection().ids(), &[b, a]);

        editor.clear_selection();
        assert!(editor.selection().is_empty());
        editor.select_all();
        assert_eq!(editor.selection().ids(), &[a, b]);
    }

    #[test]
    fn new_edit_after_undo_clears_redo() {
        let mut editor = Editor::new();
        editor.push_history();
        editor.create_shape(NodeKind::Rectangle, 0.0, 0.0, None);
        assert!(editor.undo());
        assert!(editor.can_redo());

        // Selection changes keep redo available
        editor.select_all();
        assert!(editor.can_redo());

        editor.create_shape(NodeKind::Ellipse, 0.0, 0.0, None);
        assert!(!editor.can_redo());
    }

    #[test]
    fn undo_without_edits_reports_emptied_history() {
        let mut editor = Editor::new();
        editor.push_history();
        assert!(editor.can_undo());
        let events = recorded(&mut editor);

        assert!(!editor.undo());
        assert!(!editor.can_undo());
        assert!(!editor.can_redo());
        assert_eq!(*events.borrow(), vec![EditorEvent::HistoryChanged]);

        // Nothing left to discard, nothing to report
        assert!(!editor.undo());
        assert!(!editor.redo());
        assert_eq!(events.borrow().len(), 1);
    }

    #[test]
    fn redo_without_a_different_state_reports_emptied_history() {
        let mut editor = Editor::new();
        let a = editor.create_shape(NodeKind::Rectangle, 0.0, 0.0, None);
        editor.select(&[a], false).unwrap();
        editor.push_history();
        editor.clear_selection();

        assert!(editor.undo());
        assert_eq!(editor.selection().ids(), &[a]);
        assert!(editor.can_redo());

        // Back to the state the redo entry holds, without touching the document
        editor.clear_selection();
        let events = recorded(&mut editor);
        assert!(!editor.redo());
        assert!(!editor.can_redo());
        assert_eq!(*events.borrow(), vec![EditorEvent::HistoryChanged]);
    }

    #[test]
    fn undo_restores_selection() {
        let mut editor = Editor::new();
        let a = editor.create_shape(NodeKind::Rectangle, 0.0, 0.0, None);
        editor.select(&[a], false).unwrap();
        editor.push_history();
        editor.delete_nodes(&[a]);
        assert!(editor.selection().is_empty());

        assert!(editor.undo());
        assert_eq!(editor.selection().ids(), &[a]);
        assert!(editor.store().contains(a));
    }

    #[test]
    fn rejected_import_leaves_state_alone() {
        let mut editor = Editor::new();
        let a = editor.create_shape(NodeKind::Rectangle, 0.0, 0.0, None);
        let events = recorded(&mut editor);

        let mut document = editor.export_document();
        document.format_version = 9;
        assert!(matches!(
            editor.import_document(document),
            Err(EditorError::Codec(_))
        ));
        assert!(editor.import_json("{").is_err());
        assert_eq!(editor.store().ids(), &[a]);
        assert!(events.borrow().is_empty());
    }

    #[test]
    fn import_prunes_selection() {
        let mut editor = Editor::new();
        let empty = editor.export_document();
        let a = editor.create_shape(NodeKind::Rectangle, 0.0, 0.0, None);
        editor.select(&[a], false).unwrap();

        editor.import_document(empty).unwrap();
        assert!(editor.store().is_empty());
        assert!(editor.selection().is_empty());
    }

    #[test]
    fn remove_page_drops_its_nodes_from_selection() {
        let mut editor = Editor::new();
        let page = editor.add_page("Page 2");
        editor.set_active_page(page).unwrap();
        let a = editor.create_shape(NodeKind::Rectangle, 0.0, 0.0, None);
        editor.select(&[a], false).unwrap();

        assert_eq!(editor.remove_page(page).unwrap(), vec![a]);
        assert!(editor.selection().is_empty());
        assert_eq!(editor.store().pages().len(), 1);
    }

    #[test]
    fn kdl_export_round_trips_through_import() {
        let mut editor = Editor::new();
        let a = editor.create_shape(NodeKind::Rectangle, 10.0, 20.0, Some(CanvasSize::new(5.0, 6.0)));
        let b = editor.create_shape(NodeKind::Ellipse, 0.0, 0.0, None);
        editor.group_nodes(&[a, b]).unwrap();
        let text = editor.export_kdl();

        let mut other = Editor::new();
        other.import_kdl(&text).unwrap();
        assert_eq!(other.store().len(), 3);
        assert_eq!(other.export_kdl(), text);
    }
}
