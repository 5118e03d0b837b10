//! Grove core: the canvas node store and the algorithms that keep its scope
//! hierarchy consistent.
//!
//! - [`CanvasStore`] owns node records plus transient view state.
//! - [`CanvasStore::group_at`] resolves drop targets.
//! - [`CanvasStore::move_into_scope`] reparents nodes.
//! - [`CanvasStore::layout_group`] / [`CanvasStore::layout_all`] refit groups.

pub mod config;
pub mod error;
pub mod hit;
pub mod id;
pub mod layout;
pub mod model;
pub mod persist;
pub mod scope;
pub mod store;

pub use config::{CanvasConfig, LayoutConfig};
pub use error::CanvasError;
pub use id::NodeId;
pub use layout::{Packing, pack};
pub use model::*;
pub use persist::{CanvasPersistence, MsgpackBuffer};
pub use store::CanvasStore;

// Re-export geometry types so downstream crates share one kurbo version.
pub use kurbo::{Point, Size, Vec2};
