//! Context-menu state and the node creation flow behind it.
//!
//! The menu remembers where it was opened: `page` for positioning the popup
//! and `client` for projecting the new node's position, plus the group it was
//! opened on (if any).

use crate::projector::{CanvasHost, project_with};
use grove_core::{CanvasError, CanvasStore, NodeId, NodeKind, Point};

/// An entry of the canvas context menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MenuAction {
    AddContent,
    AddGroup,
}

impl MenuAction {
    pub fn kind(self) -> NodeKind {
        match self {
            Self::AddContent => NodeKind::Content,
            Self::AddGroup => NodeKind::Group,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ContextMenu {
    visible: bool,
    page: Point,
    client: Point,
    parent: Option<NodeId>,
}

impl ContextMenu {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Where the popup should be drawn.
    pub fn page(&self) -> Point {
        self.page
    }

    pub fn client(&self) -> Point {
        self.client
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Right click on empty canvas.
    pub fn open_on_pane(&mut self, page: Point, client: Point) {
        self.show(page, client, None);
    }

    /// Right click on a node. Only groups get a menu; returns whether it opened.
    pub fn open_on_node(
        &mut self,
        store: &CanvasStore,
        id: NodeId,
        page: Point,
        client: Point,
    ) -> bool {
        if store.group(id).is_err() {
            log::debug!("no context menu for {id}: not a group");
            return false;
        }
        self.show(page, client, Some(id));
        true
    }

    pub fn dismiss(&mut self) {
        if self.visible {
            log::debug!("context menu dismissed");
        }
        self.visible = false;
    }

    fn show(&mut self, page: Point, client: Point, parent: Option<NodeId>) {
        self.visible = true;
        self.page = page;
        self.client = client;
        self.parent = parent;
        log::debug!("context menu opened at {page:?} (parent {parent:?})");
    }

    /// Create a node for `action` at the stored click point.
    ///
    /// When the menu was opened on a group the node is created inside it and
    /// the group is laid out, followed by a global pass so ancestors grow.
    /// Returns `Ok(None)` while the container is unmounted; the menu then
    /// stays open.
    ///
    /// # Errors
    /// Propagates `add_node` / `layout_group` failures.
    pub fn create(
        &mut self,
        store: &mut CanvasStore,
        host: &dyn CanvasHost,
        action: MenuAction,
    ) -> Result<Option<NodeId>, CanvasError> {
        let Some(position) = project_with(host, self.client) else {
            log::debug!("{action:?} deferred: container not mounted");
            return Ok(None);
        };

        // The group may have been removed or replaced since the menu opened.
        let parent = self.parent.filter(|&parent| {
            let valid = store.group(parent).is_ok();
            if !valid {
                log::warn!("menu parent {parent} is gone; creating at root");
            }
            valid
        });

        self.visible = false;
        let id = store.add_node(action.kind(), position, parent)?;
        if let Some(parent) = parent {
            store.layout_group(parent)?;
            store.layout_all();
        }
        log::info!("created {id} from menu");
        Ok(Some(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projector::{FixedHost, ViewTransform};
    use grove_core::{CanvasNode, Scope, Size};
    use kurbo::Rect;
    use pretty_assertions::assert_eq;

    fn host() -> FixedHost {
        FixedHost::mounted(
            Rect::new(100.0, 0.0, 1100.0, 800.0),
            ViewTransform::default(),
        )
    }

    #[test]
    fn pane_menu_creates_at_projected_point() {
        let mut store = CanvasStore::default();
        let mut menu = ContextMenu::new();
        menu.open_on_pane(Point::new(300.0, 250.0), Point::new(300.0, 200.0));
        assert!(menu.is_visible());

        let id = menu
            .create(&mut store, &host(), MenuAction::AddContent)
            .unwrap()
            .unwrap();

        let node = store.node(id).unwrap();
        assert_eq!(node.position, Point::new(200.0, 200.0));
        assert_eq!(node.scope, Scope::Root);
        assert_eq!(node.kind, NodeKind::Content);
        assert!(!menu.is_visible());
    }

    #[test]
    fn content_node_gets_no_menu() {
        let mut store = CanvasStore::default();
        let leaf = store
            .add_node(NodeKind::Content, Point::ZERO, None)
            .unwrap();
        let mut menu = ContextMenu::new();

        assert!(!menu.open_on_node(&store, leaf, Point::ZERO, Point::ZERO));
        assert!(!menu.is_visible());
    }

    #[test]
    fn group_menu_creates_inside_and_lays_out() {
        let mut store = CanvasStore::default();
        let g = store
            .insert_node(CanvasNode::group(
                NodeId::intern("menu_parent"),
                Point::new(0.0, 0.0),
                Size::new(200.0, 200.0),
            ))
            .unwrap();
        let mut menu = ContextMenu::new();
        assert!(menu.open_on_node(&store, g, Point::ZERO, Point::new(150.0, 50.0)));

        let id = menu
            .create(&mut store, &host(), MenuAction::AddContent)
            .unwrap()
            .unwrap();

        assert_eq!(store.node(id).unwrap().scope, Scope::Group(g));
        assert_eq!(store.node(id).unwrap().position, Point::new(20.0, 20.0));
        assert_eq!(store.node(g).unwrap().size, Size::new(280.0, 160.0));
    }

    #[test]
    fn removed_parent_falls_back_to_root() {
        let mut store = CanvasStore::default();
        let g = store
            .add_node(NodeKind::Group, Point::ZERO, None)
            .unwrap();
        let mut menu = ContextMenu::new();
        menu.open_on_node(&store, g, Point::ZERO, Point::new(150.0, 50.0));
        store.remove_node(g).unwrap();

        let id = menu
            .create(&mut store, &host(), MenuAction::AddGroup)
            .unwrap()
            .unwrap();

        assert_eq!(store.node(id).unwrap().scope, Scope::Root);
        assert_eq!(store.node(id).unwrap().kind, NodeKind::Group);
    }

    #[test]
    fn unmounted_host_keeps_menu_open() {
        let mut store = CanvasStore::default();
        let mut menu = ContextMenu::new();
        menu.open_on_pane(Point::ZERO, Point::ZERO);

        let created = menu
            .create(&mut store, &FixedHost::unmounted(), MenuAction::AddContent)
            .unwrap();

        assert_eq!(created, None);
        assert!(menu.is_visible());
        assert!(store.is_empty());
    }
}
