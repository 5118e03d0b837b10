//! Grove editor: interaction state on top of `grove-core`.
//!
//! Pointer events from a canvas view come in as [`CanvasEvent`]s, are
//! projected into canvas space through a [`CanvasHost`], and drive the drag
//! machine, the selection and the context menu. [`CanvasSession`] wires them
//! all to one store and a persistence sink.

pub mod drag;
pub mod input;
pub mod menu;
pub mod projector;
pub mod selection;
pub mod session;

pub use drag::{DragOrchestrator, DragState, DropOutcome};
pub use input::CanvasEvent;
pub use menu::{ContextMenu, MenuAction};
pub use projector::{CanvasHost, FixedHost, ViewTransform, project, project_with};
pub use selection::SelectionTracker;
pub use session::{CanvasSession, Outcome};
