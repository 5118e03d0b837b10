//! Drag-to-group orchestration.
//!
//! A two-state machine. While a node is dragged, every pointer sample is
//! projected and resolved to the innermost eligible group, which replaces the
//! store's highlight (or clears it). On release the target is resolved again
//! from the final pointer position, never taken from the last highlight, and
//! the expensive work runs once:
//!
//! 1. `move_into_scope(selected, target)`
//! 2. `layout_group(target)` so the dropped node lands inside it
//! 3. `layout_all()` to shrink the group it left and ripple through ancestors
//! 4. clear the highlight, then `update_view()`
//!
//! A highlight never outlives the drag that produced it.

use crate::projector::{CanvasHost, project_with};
use crate::selection::SelectionTracker;
use grove_core::{CanvasStore, HierarchyIssue, NodeId, Point};
use smallvec::{SmallVec, smallvec};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DragState {
    #[default]
    Idle,
    Dragging(NodeId),
}

/// What a completed drop did.
#[derive(Debug, Clone, PartialEq)]
pub struct DropOutcome {
    /// Nodes that were reparented.
    pub moved: SmallVec<[NodeId; 1]>,
    /// The group they now belong to, `None` for the root scope.
    pub target: Option<NodeId>,
    /// Hierarchy problems repaired by the global layout pass.
    pub issues: Vec<HierarchyIssue>,
}

#[derive(Debug, Clone, Default)]
pub struct DragOrchestrator {
    state: DragState,
}

impl DragOrchestrator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> DragState {
        self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging(_))
    }

    /// `Idle → Dragging(id)`. Starting over an active drag replaces it.
    pub fn drag_start(&mut self, store: &mut CanvasStore, id: NodeId) {
        if let DragState::Dragging(previous) = self.state
            && previous != id
        {
            log::debug!("drag of {previous} replaced by {id}");
        }
        store.clear_highlighted();
        self.state = DragState::Dragging(id);
        log::debug!("drag start {id}");
    }

    /// Resolve the group under the pointer and make it the only highlight.
    ///
    /// Returns the highlighted group. A move without a preceding start begins
    /// the drag implicitly. While the container is unmounted the sample is
    /// skipped and the previous highlight is left alone.
    pub fn drag_move(
        &mut self,
        store: &mut CanvasStore,
        host: &dyn CanvasHost,
        id: NodeId,
        pointer: Point,
    ) -> Option<NodeId> {
        if self.state != DragState::Dragging(id) {
            self.drag_start(store, id);
        }

        let Some(point) = project_with(host, pointer) else {
            log::debug!("drag sample for {id} deferred: container not mounted");
            return store.highlighted();
        };

        match store.group_at(point, Some(id)) {
            Some(group) => store.set_highlighted(group),
            None => store.clear_highlighted(),
        }
        store.highlighted()
    }

    /// Finish the drag: reparent, lay out, clear the highlight, refresh the view.
    ///
    /// The moved node is the selected one, falling back to `id` when nothing
    /// (or a removed node) is selected. The target is resolved excluding the
    /// moved node's subtree. Returns `None` if the drop could not be
    /// projected; the machine is back in `Idle` with no highlight either way.
    pub fn drag_stop(
        &mut self,
        store: &mut CanvasStore,
        host: &dyn CanvasHost,
        selection: &SelectionTracker,
        id: NodeId,
        pointer: Point,
    ) -> Option<DropOutcome> {
        self.state = DragState::Idle;

        let Some(point) = project_with(host, pointer) else {
            log::debug!("drop of {id} deferred: container not mounted");
            store.clear_highlighted();
            return None;
        };

        // The subtree being reparented is the one the resolver must skip.
        let subject = selection
            .selected()
            .filter(|&selected| store.contains(selected))
            .unwrap_or(id);
        let target = store.group_at(point, Some(subject));
        let moved: SmallVec<[NodeId; 1]> = smallvec![subject];

        if let Err(err) = store.move_into_scope(&moved, target) {
            log::error!("drop of {id} rejected: {err}");
        }
        if let Some(group) = target
            && let Err(err) = store.layout_group(group)
        {
            log::error!("layout of drop target {group} failed: {err}");
        }
        let issues = store.layout_all();

        store.clear_highlighted();
        store.update_view();

        log::info!("dropped {moved:?} into {target:?}");
        Some(DropOutcome {
            moved,
            target,
            issues,
        })
    }

    /// Abort an active drag without reparenting anything.
    pub fn cancel(&mut self, store: &mut CanvasStore) {
        if let DragState::Dragging(id) = self.state {
            log::debug!("drag of {id} cancelled");
        }
        self.state = DragState::Idle;
        store.clear_highlighted();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projector::{FixedHost, ViewTransform};
    use grove_core::{CanvasNode, NodeKind, Scope, Size};
    use kurbo::Rect;
    use pretty_assertions::assert_eq;

    fn host() -> FixedHost {
        FixedHost::mounted(Rect::new(0.0, 0.0, 1000.0, 1000.0), ViewTransform::default())
    }

    fn canvas() -> (CanvasStore, NodeId, NodeId, NodeId) {
        let mut store = CanvasStore::default();
        let left = store
            .insert_node(CanvasNode::group(
                NodeId::intern("drag_left"),
                Point::new(0.0, 0.0),
                Size::new(200.0, 200.0),
            ))
            .unwrap();
        let right = store
            .insert_node(CanvasNode::group(
                NodeId::intern("drag_right"),
                Point::new(400.0, 0.0),
                Size::new(200.0, 200.0),
            ))
            .unwrap();
        let leaf = store
            .add_node(NodeKind::Content, Point::new(700.0, 700.0), None)
            .unwrap();
        (store, left, right, leaf)
    }

    #[test]
    fn highlight_follows_latest_move() {
        let (mut store, left, right, leaf) = canvas();
        let mut drag = DragOrchestrator::new();
        drag.drag_start(&mut store, leaf);

        drag.drag_move(&mut store, &host(), leaf, Point::new(50.0, 50.0));
        assert_eq!(store.highlighted(), Some(left));
        drag.drag_move(&mut store, &host(), leaf, Point::new(450.0, 50.0));
        assert_eq!(store.highlighted(), Some(right));
        drag.drag_move(&mut store, &host(), leaf, Point::new(300.0, 50.0));
        assert_eq!(store.highlighted(), None);
        drag.drag_move(&mut store, &host(), leaf, Point::new(10.0, 10.0));
        assert_eq!(store.highlighted(), Some(left));
    }

    #[test]
    fn drop_resolves_from_final_pointer_not_stale_highlight() {
        let (mut store, left, right, leaf) = canvas();
        let mut drag = DragOrchestrator::new();
        drag.drag_start(&mut store, leaf);
        drag.drag_move(&mut store, &host(), leaf, Point::new(50.0, 50.0));
        assert_eq!(store.highlighted(), Some(left));

        // The release lands over `right` with no move in between.
        let outcome = drag
            .drag_stop(
                &mut store,
                &host(),
                &SelectionTracker::new(),
                leaf,
                Point::new(450.0, 50.0),
            )
            .unwrap();

        assert_eq!(outcome.target, Some(right));
        assert_eq!(store.node(leaf).unwrap().scope, Scope::Group(right));
        assert_eq!(store.highlighted(), None);
        assert_eq!(drag.state(), DragState::Idle);
    }

    #[test]
    fn drop_uses_selected_node() {
        let (mut store, left, _, leaf) = canvas();
        let other = store
            .add_node(NodeKind::Content, Point::new(800.0, 800.0), None)
            .unwrap();
        let mut selection = SelectionTracker::new();
        selection.select(other);
        let mut drag = DragOrchestrator::new();

        let outcome = drag
            .drag_stop(&mut store, &host(), &selection, leaf, Point::new(50.0, 50.0))
            .unwrap();

        assert_eq!(outcome.moved.as_slice(), &[other]);
        assert_eq!(store.node(other).unwrap().scope, Scope::Group(left));
        assert_eq!(store.node(leaf).unwrap().scope, Scope::Root);
    }

    #[test]
    fn drop_never_targets_selected_subtree() {
        let (mut store, left, _, leaf) = canvas();
        let mut selection = SelectionTracker::new();
        selection.select(left);
        let mut drag = DragOrchestrator::new();
        drag.drag_move(&mut store, &host(), leaf, Point::new(50.0, 50.0));
        assert_eq!(store.highlighted(), Some(left));

        let outcome = drag
            .drag_stop(&mut store, &host(), &selection, leaf, Point::new(50.0, 50.0))
            .unwrap();

        assert_eq!(outcome.moved.as_slice(), &[left]);
        assert_eq!(outcome.target, None);
        assert_eq!(store.node(left).unwrap().scope, Scope::Root);
    }

    #[test]
    fn removed_selection_falls_back_to_dragged_node() {
        let (mut store, left, _, leaf) = canvas();
        let gone = store
            .add_node(NodeKind::Content, Point::new(900.0, 900.0), None)
            .unwrap();
        let mut selection = SelectionTracker::new();
        selection.select(gone);
        store.remove_node(gone).unwrap();
        let mut drag = DragOrchestrator::new();

        let outcome = drag
            .drag_stop(&mut store, &host(), &selection, leaf, Point::new(50.0, 50.0))
            .unwrap();

        assert_eq!(outcome.moved.as_slice(), &[leaf]);
        assert_eq!(store.node(leaf).unwrap().scope, Scope::Group(left));
    }

    #[test]
    fn drop_refreshes_view_once() {
        let (mut store, _, _, leaf) = canvas();
        let mut drag = DragOrchestrator::new();
        let before = store.view_revision();

        drag.drag_stop(
            &mut store,
            &host(),
            &SelectionTracker::new(),
            leaf,
            Point::new(900.0, 900.0),
        );

        assert_eq!(store.view_revision(), before + 1);
    }

    #[test]
    fn cancel_clears_highlight_without_reparenting() {
        let (mut store, left, _, leaf) = canvas();
        let mut drag = DragOrchestrator::new();
        drag.drag_move(&mut store, &host(), leaf, Point::new(50.0, 50.0));
        assert!(drag.is_dragging());
        assert_eq!(store.highlighted(), Some(left));

        drag.cancel(&mut store);

        assert_eq!(drag.state(), DragState::Idle);
        assert_eq!(store.highlighted(), None);
        assert_eq!(store.node(leaf).unwrap().scope, Scope::Root);
    }

    #[test]
    fn new_drag_starts_without_previous_highlight() {
        let (mut store, left, right, leaf) = canvas();
        let mut drag = DragOrchestrator::new();
        drag.drag_move(&mut store, &host(), leaf, Point::new(50.0, 50.0));
        assert_eq!(store.highlighted(), Some(left));

        drag.drag_start(&mut store, right);

        assert_eq!(drag.state(), DragState::Dragging(right));
        assert_eq!(store.highlighted(), None);
    }

    #[test]
    fn unmounted_drop_returns_to_idle() {
        let (mut store, left, _, leaf) = canvas();
        let mut drag = DragOrchestrator::new();
        drag.drag_move(&mut store, &host(), leaf, Point::new(50.0, 50.0));
        assert_eq!(store.highlighted(), Some(left));

        let outcome = drag.drag_stop(
            &mut store,
            &FixedHost::unmounted(),
            &SelectionTracker::new(),
            leaf,
            Point::new(50.0, 50.0),
        );

        assert_eq!(outcome, None);
        assert_eq!(drag.state(), DragState::Idle);
        assert_eq!(store.highlighted(), None);
        assert_eq!(store.node(leaf).unwrap().scope, Scope::Root);
    }
}
