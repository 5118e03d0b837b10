//! Input abstraction layer.
//!
//! Normalizes the callbacks a canvas view fires (node drag, context menus,
//! document clicks, generic node deltas) into one `CanvasEvent` enum consumed
//! by `CanvasSession::handle`. Pointer coordinates are screen (client) pixels;
//! projection into canvas space happens later, per event.

use crate::menu::MenuAction;
use grove_core::{NodeChange, NodeId, Point};

#[derive(Debug, Clone, PartialEq)]
pub enum CanvasEvent {
    /// A node started moving under the pointer.
    NodeDragStart { id: NodeId, pointer: Point },

    /// The pointer moved while a node is being dragged.
    NodeDrag { id: NodeId, pointer: Point },

    /// The pointer was released over the canvas, ending the drag.
    NodeDragStop { id: NodeId, pointer: Point },

    /// The pointer was released outside the canvas container.
    PointerUpOutside,

    /// A click anywhere in the document (dismisses menus).
    GlobalClick,

    /// Right click on empty canvas. `page` positions the menu, `client` is
    /// projected when a node is created from it.
    PaneContextMenu { page: Point, client: Point },

    /// Right click on a node. Only groups open the menu.
    NodeContextMenu {
        id: NodeId,
        page: Point,
        client: Point,
    },

    /// An entry of the open context menu was chosen.
    Menu(MenuAction),

    /// Position/size/selection/removal deltas reported by the view.
    NodesChange(Vec<NodeChange>),
}

impl CanvasEvent {
    pub fn drag_start(id: NodeId, x: f64, y: f64) -> Self {
        Self::NodeDragStart {
            id,
            pointer: Point::new(x, y),
        }
    }

    pub fn drag(id: NodeId, x: f64, y: f64) -> Self {
        Self::NodeDrag {
            id,
            pointer: Point::new(x, y),
        }
    }

    pub fn drag_stop(id: NodeId, x: f64, y: f64) -> Self {
        Self::NodeDragStop {
            id,
            pointer: Point::new(x, y),
        }
    }
}
