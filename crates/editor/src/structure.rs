//! Structural operations: grouping, re-parenting and z-order.
//!
//! Each operation validates its whole input before touching the store, so a
//! failure leaves the hierarchy exactly as it was.

use node::{Node, NodeId, NodeKind};
use std::collections::{HashMap, HashSet};
use tracing::debug;

use crate::store::{NodeStore, Slot};
use crate::{EditorError, Result};

impl NodeStore {
    /// Wrap `ids` in a new group and return the group's id.
    ///
    /// The group takes the bounding box of its members and the place of the
    /// topmost member in that member's container. Members keep their paint
    /// order inside the group.
    pub fn group_nodes(&mut self, ids: &[NodeId]) -> Result<NodeId> {
        if ids.is_empty() {
            return Err(EditorError::InvalidSelection("nothing to group".into()));
        }
        let mut members = HashSet::with_capacity(ids.len());
        for &id in ids {
            if !self.contains(id) {
                return Err(EditorError::InvalidSelection(format!(
                    "node {} does not exist",
                    id
                )));
            }
            if !members.insert(id) {
                return Err(EditorError::InvalidSelection(format!(
                    "node {} is listed twice",
                    id
                )));
            }
        }
        for &id in ids {
            if let Some(ancestor) = ids.iter().find(|other| self.is_ancestor(**other, id)) {
                return Err(EditorError::InvalidSelection(format!(
                    "node {} is listed together with its ancestor {}",
                    id, ancestor
                )));
            }
        }

        let paint: HashMap<NodeId, usize> = self
            .paint_order()
            .into_iter()
            .enumerate()
            .map(|(index, id)| (id, index))
            .collect();
        let mut ordered = ids.to_vec();
        ordered.sort_by_key(|id| paint.get(id).copied().unwrap_or(usize::MAX));

        let topmost = ordered[ordered.len() - 1];
        let (slot, index) = self
            .position_of(topmost)
            .ok_or(EditorError::NotFound(topmost))?;
        let below_in_slot = ordered
            .iter()
            .filter(|id| **id != topmost && self.slot_of(**id) == Some(slot))
            .count();
        let bounds = self
            .bounds(&ordered)
            .ok_or_else(|| EditorError::InvalidSelection("nothing to group".into()))?;

        for &id in &ordered {
            self.detach(id);
        }

        let mut group = Node::new(NodeKind::Group, bounds.origin(), bounds.size());
        if let Some(children) = group.children_mut() {
            children.extend(ordered.iter().copied());
        }
        let group_id = group.id;
        self.insert_detached(group);
        for &id in &ordered {
            if let Some(node) = self.get_mut(id) {
                node.parent = Some(group_id);
            }
        }
        self.attach(group_id, slot, Some(index - below_in_slot));
        self.touch();

        debug!(group = %group_id, members = ordered.len(), "grouped nodes");
        Ok(group_id)
    }

    /// Dissolve a group, moving its children into the group's place.
    ///
    /// Returns the released children in their prior order.
    pub fn ungroup_nodes(&mut self, group_id: NodeId) -> Result<Vec<NodeId>> {
        let group = self.require(group_id)?;
        if group.kind() != NodeKind::Group {
            return Err(EditorError::InvalidKind {
                id: group_id,
                expected: "GROUP",
                found: group.kind(),
            });
        }
        let children = group.children().to_vec();
        let (slot, index) = self
            .detach(group_id)
            .ok_or(EditorError::NotFound(group_id))?;
        self.remove_detached(group_id);

        for (offset, &child) in children.iter().enumerate() {
            self.attach(child, slot, Some(index + offset));
        }
        self.touch();

        debug!(group = %group_id, children = children.len(), "ungrouped nodes");
        Ok(children)
    }

    /// Move `id` under `new_parent`, or to its page's top level when `None`.
    ///
    /// `index` is the position in the new container after `id` has been
    /// removed from its old one; `None` places it on top.
    pub fn reparent(
        &mut self,
        id: NodeId,
        new_parent: Option<NodeId>,
        index: Option<usize>,
    ) -> Result<()> {
        self.require(id)?;
        let slot = match new_parent {
            Some(target) => {
                let parent = self.require(target)?;
                if !parent.is_container() {
                    return Err(EditorError::InvalidKind {
                        id: target,
                        expected: "container",
                        found: parent.kind(),
                    });
                }
                if target == id || self.is_ancestor(id, target) {
                    return Err(EditorError::CycleDetected { node: id, target });
                }
                Slot::Node(target)
            }
            None => {
                let page = self.page_of(id).unwrap_or(self.active_page());
                Slot::Page(page)
            }
        };

        self.detach(id);
        self.attach(id, slot, index);
        self.touch();
        debug!(id = %id, parent = ?new_parent, "reparented node");
        Ok(())
    }

    /// Move each node to the top of its container, keeping their relative
    /// order.
    pub fn bring_to_front(&mut self, ids: &[NodeId]) -> Result<bool> {
        let ordered = self.stacking_order(ids)?;
        let mut changed = false;
        for &id in &ordered {
            changed |= self.restack(id, |_, len| len - 1);
        }
        Ok(self.finish_restack(changed, "brought to front"))
    }

    /// Move each node to the bottom of its container, keeping their relative
    /// order.
    pub fn send_to_back(&mut self, ids: &[NodeId]) -> Result<bool> {
        let ordered = self.stacking_order(ids)?;
        let mut changed = false;
        for &id in ordered.iter().rev() {
            changed |= self.restack(id, |_, _| 0);
        }
        Ok(self.finish_restack(changed, "sent to back"))
    }

    /// Move each node one step up, without jumping over another moved node.
    pub fn bring_forward(&mut self, ids: &[NodeId]) -> Result<bool> {
        let ordered = self.stacking_order(ids)?;
        let moving: HashSet<NodeId> = ordered.iter().copied().collect();
        let mut changed = false;
        for &id in ordered.iter().rev() {
            let blocked = self.sibling(id, 1).map_or(true, |next| moving.contains(&next));
            if !blocked {
                changed |= self.restack(id, |index, _| index + 1);
            }
        }
        Ok(self.finish_restack(changed, "brought forward"))
    }

    /// Move each node one step down, without jumping over another moved node.
    pub fn send_backward(&mut self, ids: &[NodeId]) -> Result<bool> {
        let ordered = self.stacking_order(ids)?;
        let moving: HashSet<NodeId> = ordered.iter().copied().collect();
        let mut changed = false;
        for &id in &ordered {
            let blocked = self.sibling(id, -1).map_or(true, |prev| moving.contains(&prev));
            if !blocked {
                changed |= self.restack(id, |index, _| index - 1);
            }
        }
        Ok(self.finish_restack(changed, "sent backward"))
    }

    /// Validate `ids` and sort them by their index within their container.
    fn stacking_order(&self, ids: &[NodeId]) -> Result<Vec<NodeId>> {
        let mut positioned = Vec::with_capacity(ids.len());
        let mut seen = HashSet::new();
        for &id in ids {
            self.require(id)?;
            if seen.insert(id) {
                let (_, index) = self.position_of(id).ok_or(EditorError::NotFound(id))?;
                positioned.push((index, id));
            }
        }
        positioned.sort_by_key(|(index, _)| *index);
        Ok(positioned.into_iter().map(|(_, id)| id).collect())
    }

    /// The sibling `step` places away from `id`, if any.
    fn sibling(&self, id: NodeId, step: isize) -> Option<NodeId> {
        let (slot, index) = self.position_of(id)?;
        let target = index.checked_add_signed(step)?;
        self.slot_children(slot).get(target).copied()
    }

    /// Move `id` to `to(index, len)` within its container.
    fn restack(&mut self, id: NodeId, to: impl FnOnce(usize, usize) -> usize) -> bool {
        let Some((slot, index)) = self.position_of(id) else {
            return false;
        };
        let len = self.slot_children(slot).len();
        let target = to(index, len).min(len - 1);
        if target == index {
            return false;
        }
        self.detach(id);
        self.attach(id, slot, Some(target));
        true
    }

    fn finish_restack(&mut self, changed: bool, what: &str) -> bool {
        if changed {
            self.touch();
            debug!(op = what, "restacked nodes");
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use node::{CanvasPoint, CanvasSize};

    fn store() -> NodeStore {
        NodeStore::new("Page 1")
    }

    fn shape(store: &mut NodeStore, kind: NodeKind, x: f32, y: f32, size: f32) -> NodeId {
        store.create_shape(kind, CanvasPoint::new(x, y), CanvasSize::new(size, size))
    }

    fn top(store: &NodeStore) -> Vec<NodeId> {
        store.top_level(store.active_page()).unwrap().to_vec()
    }

    #[test]
    fn group_takes_member_bounds_and_topmost_slot() {
        let mut store = store();
        let a = shape(&mut store, NodeKind::Rectangle, 0.0, 0.0, 10.0);
        let b = shape(&mut store, NodeKind::Ellipse, 50.0, 20.0, 10.0);
        let c = shape(&mut store, NodeKind::Rectangle, 100.0, 100.0, 10.0);
        let d = shape(&mut store, NodeKind::Rectangle, 200.0, 0.0, 10.0);

        // Argument order differs from paint order on purpose
        let group = store.group_nodes(&[c, a]).unwrap();

        assert_eq!(top(&store), vec![b, group, d]);
        assert_eq!(store.children(group), &[a, c]);
        assert_eq!(store.parent(a), Some(group));
        assert_eq!(store.parent(c), Some(group));

        let node = store.get(group).unwrap();
        assert_eq!(node.position, CanvasPoint::new(0.0, 0.0));
        assert_eq!(node.size, CanvasSize::new(110.0, 110.0));
    }

    #[test]
    fn group_rejects_bad_input_without_changes() {
        let mut store = store();
        let a = shape(&mut store, NodeKind::Rectangle, 0.0, 0.0, 10.0);
        let b = shape(&mut store, NodeKind::Rectangle, 0.0, 0.0, 10.0);
        let group = store.group_nodes(&[a, b]).unwrap();
        let snapshot = store.clone();

        for ids in [vec![], vec![a, a], vec![a, NodeId::new()], vec![group, a]] {
            let err = store.group_nodes(&ids).unwrap_err();
            assert!(matches!(err, EditorError::InvalidSelection(_)), "{:?}", ids);
            assert_eq!(store, snapshot);
        }
    }

    #[test]
    fn ungroup_restores_children_at_group_index() {
        let mut store = store();
        let a = shape(&mut store, NodeKind::Rectangle, 0.0, 0.0, 10.0);
        let b = shape(&mut store, NodeKind::Rectangle, 20.0, 0.0, 10.0);
        let c = shape(&mut store, NodeKind::Rectangle, 40.0, 0.0, 10.0);
        let group = store.group_nodes(&[a, b]).unwrap();
        assert_eq!(top(&store), vec![group, c]);

        let released = store.ungroup_nodes(group).unwrap();
        assert_eq!(released, vec![a, b]);
        assert_eq!(top(&store), vec![a, b, c]);
        assert!(!store.contains(group));
        assert_eq!(store.parent(a), None);
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn nested_group_ungroups_into_parent() {
        let mut store = store();
        let a = shape(&mut store, NodeKind::Rectangle, 0.0, 0.0, 10.0);
        let b = shape(&mut store, NodeKind::Rectangle, 20.0, 0.0, 10.0);
        let c = shape(&mut store, NodeKind::Rectangle, 40.0, 0.0, 10.0);
        let inner = store.group_nodes(&[a, b]).unwrap();
        let outer = store.group_nodes(&[inner, c]).unwrap();

        store.ungroup_nodes(inner).unwrap();
        assert_eq!(store.children(outer), &[a, b, c]);
        assert_eq!(store.parent(a), Some(outer));
    }

    #[test]
    fn ungroup_errors() {
        let mut store = store();
        let a = shape(&mut store, NodeKind::Rectangle, 0.0, 0.0, 10.0);
        let frame = shape(&mut store, NodeKind::Frame, 0.0, 0.0, 100.0);

        assert!(matches!(
            store.ungroup_nodes(NodeId::new()),
            Err(EditorError::NotFound(_))
        ));
        assert!(matches!(
            store.ungroup_nodes(a),
            Err(EditorError::InvalidKind { found: NodeKind::Rectangle, .. })
        ));
        assert!(matches!(
            store.ungroup_nodes(frame),
            Err(EditorError::InvalidKind { found: NodeKind::Frame, .. })
        ));
    }

    #[test]
    fn reparent_into_frame_and_back() {
        let mut store = store();
        let frame = shape(&mut store, NodeKind::Frame, 0.0, 0.0, 100.0);
        let a = shape(&mut store, NodeKind::Rectangle, 10.0, 10.0, 10.0);

        store.reparent(a, Some(frame), None).unwrap();
        assert_eq!(store.children(frame), &[a]);
        assert_eq!(top(&store), vec![frame]);

        store.reparent(a, None, Some(0)).unwrap();
        assert_eq!(top(&store), vec![a, frame]);
        assert!(store.children(frame).is_empty());
    }

    #[test]
    fn reparent_rejects_cycles_and_leaves() {
        let mut store = store();
        let outer = shape(&mut store, NodeKind::Frame, 0.0, 0.0, 100.0);
        let inner = shape(&mut store, NodeKind::Frame, 0.0, 0.0, 50.0);
        let leaf = shape(&mut store, NodeKind::Ellipse, 0.0, 0.0, 10.0);
        store.reparent(inner, Some(outer), None).unwrap();
        let snapshot = store.clone();

        assert!(matches!(
            store.reparent(outer, Some(inner), None),
            Err(EditorError::CycleDetected { .. })
        ));
        assert!(matches!(
            store.reparent(outer, Some(outer), None),
            Err(EditorError::CycleDetected { .. })
        ));
        assert!(matches!(
            store.reparent(inner, Some(leaf), None),
            Err(EditorError::InvalidKind { .. })
        ));
        assert!(matches!(
            store.reparent(inner, Some(NodeId::new()), None),
            Err(EditorError::NotFound(_))
        ));
        assert_eq!(store, snapshot);
    }

    #[test]
    fn z_order_moves_within_container() {
        let mut store = store();
        let a = shape(&mut store, NodeKind::Rectangle, 0.0, 0.0, 10.0);
        let b = shape(&mut store, NodeKind::Rectangle, 0.0, 0.0, 10.0);
        let c = shape(&mut store, NodeKind::Rectangle, 0.0, 0.0, 10.0);
        let d = shape(&mut store, NodeKind::Rectangle, 0.0, 0.0, 10.0);

        assert!(store.bring_to_front(&[b, a]).unwrap());
        assert_eq!(top(&store), vec![c, d, a, b]);

        assert!(store.send_to_back(&[b, a]).unwrap());
        assert_eq!(top(&store), vec![a, b, c, d]);

        assert!(store.bring_forward(&[a, b]).unwrap());
        assert_eq!(top(&store), vec![c, a, b, d]);

        assert!(!store.send_backward(&[c]).unwrap());
        assert!(store.send_backward(&[d]).unwrap());
        assert_eq!(top(&store), vec![c, a, d, b]);

        assert!(!store.bring_to_front(&[b]).unwrap());
    }
}
