//! Canvas session: the single owner of editor state.
//!
//! The session holds the authoritative `CanvasStore` together with the
//! transient interaction state around it (drag machine, selection, context
//! menu) and the persistence sink. Views feed it `CanvasEvent`s through
//! [`CanvasSession::handle`] and re-render when `store().view_revision()`
//! moves.

use crate::drag::{DragOrchestrator, DragState, DropOutcome};
use crate::input::CanvasEvent;
use crate::menu::{ContextMenu, MenuAction};
use crate::projector::CanvasHost;
use crate::selection::SelectionTracker;
use grove_core::{
    CanvasConfig, CanvasError, CanvasPersistence, CanvasSnapshot, CanvasStore, HierarchyIssue,
    NodeChange, NodeId,
};

/// What handling one event did, for the view to react to.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Nothing changed.
    Ignored,
    /// A drag sample was resolved; the highlighted group, if any.
    Highlight(Option<NodeId>),
    /// A drag finished and its node was reparented.
    Dropped(DropOutcome),
    /// An active drag was abandoned without reparenting.
    Cancelled,
    /// The context menu is now showing.
    MenuOpened,
    /// The context menu was closed (and any stray drag cancelled).
    Dismissed,
    /// A node was created from the context menu.
    Created(NodeId),
    /// Generic node deltas were applied.
    Changed,
}

pub struct CanvasSession<P: CanvasPersistence> {
    store: CanvasStore,
    drag: DragOrchestrator,
    selection: SelectionTracker,
    menu: ContextMenu,
    persistence: P,
    /// Set by edits that were not followed by a save.
    unsaved: bool,
}

impl<P: CanvasPersistence> CanvasSession<P> {
    pub fn new(store: CanvasStore, persistence: P) -> Self {
        Self {
            store,
            drag: DragOrchestrator::new(),
            selection: SelectionTracker::new(),
            menu: ContextMenu::new(),
            persistence,
            unsaved: false,
        }
    }

    /// Restore a session from a saved snapshot, repairing the hierarchy and
    /// laying every group out once.
    ///
    /// # Errors
    /// `ReservedId` / `DuplicateId` from an unusable snapshot.
    pub fn from_snapshot(
        snapshot: CanvasSnapshot,
        config: CanvasConfig,
        persistence: P,
    ) -> Result<(Self, Vec<HierarchyIssue>), CanvasError> {
        let (store, mut issues) = CanvasStore::from_snapshot(snapshot, config)?;
        let mut session = Self::new(store, persistence);
        issues.extend(session.store.layout_all());
        session.store.update_view();
        Ok((session, issues))
    }

    pub fn store(&self) -> &CanvasStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut CanvasStore {
        &mut self.store
    }

    pub fn selection(&self) -> &SelectionTracker {
        &self.selection
    }

    pub fn menu(&self) -> &ContextMenu {
        &self.menu
    }

    pub fn drag_state(&self) -> DragState {
        self.drag.state()
    }

    pub fn persistence(&self) -> &P {
        &self.persistence
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.unsaved
    }

    // ─── Event routing ───────────────────────────────────────────────────

    /// Route one view event. The host is consulted for the container rect
    /// and pan/zoom on every call.
    pub fn handle(&mut self, host: &dyn CanvasHost, event: CanvasEvent) -> Outcome {
        match event {
            CanvasEvent::NodeDragStart { id, .. } => {
                if !self.store.contains(id) {
                    log::debug!("drag start on unknown node {id} ignored");
                    return Outcome::Ignored;
                }
                self.drag.drag_start(&mut self.store, id);
                self.selection.select(id);
                Outcome::Highlight(None)
            }
            CanvasEvent::NodeDrag { id, pointer } => {
                if !self.store.contains(id) {
                    log::debug!("drag of unknown node {id} ignored");
                    return Outcome::Ignored;
                }
                // A move without a start begins the drag, so it selects too.
                if self.drag.state() != DragState::Dragging(id) {
                    self.selection.select(id);
                }
                let hit = self.drag.drag_move(&mut self.store, host, id, pointer);
                Outcome::Highlight(hit)
            }
            CanvasEvent::NodeDragStop { id, pointer } => {
                if !self.store.contains(id) {
                    log::debug!("drop of unknown node {id} ignored");
                    self.drag.cancel(&mut self.store);
                    return Outcome::Cancelled;
                }
                if self.drag.state() != DragState::Dragging(id) {
                    self.selection.select(id);
                }
                match self
                    .drag
                    .drag_stop(&mut self.store, host, &self.selection, id, pointer)
                {
                    Some(outcome) => {
                        self.unsaved = true;
                        Outcome::Dropped(outcome)
                    }
                    None => Outcome::Cancelled,
                }
            }
            CanvasEvent::PointerUpOutside => {
                if self.drag.is_dragging() {
                    self.drag.cancel(&mut self.store);
                    Outcome::Cancelled
                } else {
                    Outcome::Ignored
                }
            }
            CanvasEvent::GlobalClick => {
                self.menu.dismiss();
                if self.drag.is_dragging() {
                    self.drag.cancel(&mut self.store);
                }
                Outcome::Dismissed
            }
            CanvasEvent::PaneContextMenu { page, client } => {
                self.menu.open_on_pane(page, client);
                Outcome::MenuOpened
            }
            CanvasEvent::NodeContextMenu { id, page, client } => {
                if self.menu.open_on_node(&self.store, id, page, client) {
                    Outcome::MenuOpened
                } else {
                    Outcome::Ignored
                }
            }
            CanvasEvent::Menu(action) => match self.create_from_menu(host, action) {
                Ok(Some(id)) => Outcome::Created(id),
                Ok(None) => Outcome::Ignored,
                Err(err) => {
                    log::error!("{action:?} failed: {err}");
                    Outcome::Ignored
                }
            },
            CanvasEvent::NodesChange(changes) => {
                self.on_nodes_change(&changes);
                Outcome::Changed
            }
        }
    }

    /// Create a node from the open context menu. Content is saved right away;
    /// a new group only marks the canvas as unsaved.
    ///
    /// # Errors
    /// Propagates store failures from creation or layout.
    pub fn create_from_menu(
        &mut self,
        host: &dyn CanvasHost,
        action: MenuAction,
    ) -> Result<Option<NodeId>, CanvasError> {
        if !self.menu.is_visible() {
            log::debug!("{action:?} ignored: menu not open");
            return Ok(None);
        }
        let Some(id) = self.menu.create(&mut self.store, host, action)? else {
            return Ok(None);
        };
        self.store.update_view();
        match action {
            MenuAction::AddContent => self.save_canvas(),
            MenuAction::AddGroup => self.unsaved = true,
        }
        Ok(Some(id))
    }

    /// Apply view-reported deltas to the store and the selection.
    pub fn on_nodes_change(&mut self, changes: &[NodeChange]) {
        self.store.apply_changes(changes);
        self.selection.observe(changes);

        for change in changes {
            match *change {
                NodeChange::Remove { id } => {
                    if self.drag.state() == DragState::Dragging(id) {
                        self.drag.cancel(&mut self.store);
                    }
                    self.unsaved = true;
                }
                NodeChange::Position { .. } | NodeChange::Dimensions { .. } => {
                    self.unsaved = true;
                }
                NodeChange::Select { .. } => {}
            }
        }
    }

    /// Hand the current snapshot to the persistence sink. Failures are logged
    /// and leave the unsaved flag set.
    pub fn save_canvas(&mut self) {
        let snapshot = self.store.snapshot();
        match self.persistence.save(&snapshot) {
            Ok(()) => {
                self.unsaved = false;
                log::info!("canvas saved ({} nodes)", snapshot.nodes.len());
            }
            Err(err) => {
                self.unsaved = true;
                log::error!("canvas save failed: {err}");
            }
        }
    }
}
