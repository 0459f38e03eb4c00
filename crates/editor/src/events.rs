use node::NodeId;
use std::fmt;

/// Events emitted by the editor after a committed change.
#[derive(Clone, Debug, PartialEq)]
pub enum EditorEvent {
    NodesAdded(Vec<NodeId>),
    NodesRemoved(Vec<NodeId>),
    /// Properties or geometry of existing nodes changed.
    NodesChanged(Vec<NodeId>),
    /// Parent/child links or z-order changed.
    HierarchyChanged,
    SelectionChanged,
    HistoryChanged,
    /// The whole document was swapped out (undo, redo, import).
    DocumentReplaced,
    PagesChanged,
}

/// Handle returned by [`crate::Editor::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&EditorEvent)>;

/// Registered event listeners, called in subscription order.
#[derive(Default)]
pub(crate) struct Listeners {
    next_id: u64,
    entries: Vec<(SubscriptionId, Listener)>,
}

impl Listeners {
    pub fn add(&mut self, listener: Listener) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, listener));
        id
    }

    pub fn remove(&mut self, id: SubscriptionId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry, _)| *entry != id);
        self.entries.len() != before
    }

    pub fn emit(&mut self, event: &EditorEvent) {
        for (_, listener) in &mut self.entries {
            listener(event);
        }
    }
}

impl fmt::Debug for Listeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners")
            .field("count", &self.entries.len())
            .finish()
    }
}
