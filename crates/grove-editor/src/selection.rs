//! Single-node selection, fed by the view's selection changes.

use grove_core::{NodeChange, NodeId};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SelectionTracker {
    selected: Option<NodeId>,
}

impl SelectionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> Option<NodeId> {
        self.selected
    }

    /// Replace the selection (single-selection model).
    pub fn select(&mut self, id: NodeId) {
        self.selected = Some(id);
    }

    pub fn clear(&mut self) {
        self.selected = None;
    }

    /// Follow select/deselect/remove deltas in the order the view emitted them.
    pub fn observe(&mut self, changes: &[NodeChange]) {
        for change in changes {
            match *change {
                NodeChange::Select { id, selected: true } => self.select(id),
                NodeChange::Select {
                    id,
                    selected: false,
                }
                | NodeChange::Remove { id } => {
                    if self.selected == Some(id) {
                        self.clear();
                    }
                }
                NodeChange::Position { .. } | NodeChange::Dimensions { .. } => {}
            }
        }
    }
}
