//! Canvas data model.
//!
//! A canvas is a flat set of `CanvasNode` records. Each node names its parent
//! through `scope`; the parent→children relation is derived from those fields
//! by the store. Positions are absolute canvas coordinates (top-left corner),
//! so a group's box and its children's boxes live in the same space.

use crate::id::NodeId;
use kurbo::{Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

// ─── Kind & Scope ────────────────────────────────────────────────────────

/// What a node is. Closed set, matched exhaustively by hit testing and layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// Leaf node with an intrinsic size (rich text, code, media).
    Content,
    /// Container whose box bounds its children.
    Group,
}

impl NodeKind {
    /// Prefix used for generated ids.
    pub fn id_prefix(self) -> &'static str {
        match self {
            NodeKind::Content => "content",
            NodeKind::Group => "group",
        }
    }
}

/// The parent of a node: the canvas root or exactly one group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    #[default]
    Root,
    Group(NodeId),
}

impl Scope {
    pub fn group(self) -> Option<NodeId> {
        match self {
            Scope::Root => None,
            Scope::Group(id) => Some(id),
        }
    }
}

impl From<Option<NodeId>> for Scope {
    fn from(target: Option<NodeId>) -> Self {
        target.map_or(Scope::Root, Scope::Group)
    }
}

// ─── Node ────────────────────────────────────────────────────────────────

/// A single node on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanvasNode {
    pub id: NodeId,
    pub kind: NodeKind,
    /// Top-left corner in canvas coordinates.
    pub position: Point,
    pub size: Size,
    pub scope: Scope,
    /// Insertion sequence. Stable ordering key for layout and tie-breaks;
    /// assigned by the store on insert.
    #[serde(default)]
    pub seq: u64,
}

impl CanvasNode {
    pub fn new(id: NodeId, kind: NodeKind, position: Point, size: Size) -> Self {
        Self {
            id,
            kind,
            position,
            size,
            scope: Scope::Root,
            seq: 0,
        }
    }

    pub fn content(id: NodeId, position: Point, size: Size) -> Self {
        Self::new(id, NodeKind::Content, position, size)
    }

    pub fn group(id: NodeId, position: Point, size: Size) -> Self {
        Self::new(id, NodeKind::Group, position, size)
    }

    /// Builder-style scope assignment.
    pub fn in_scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }

    pub fn is_group(&self) -> bool {
        matches!(self.kind, NodeKind::Group)
    }

    pub fn bounds(&self) -> Rect {
        Rect::from_origin_size(self.position, self.size)
    }

    /// Edge-inclusive containment test.
    pub fn contains(&self, point: Point) -> bool {
        let b = self.bounds();
        point.x >= b.x0 && point.x <= b.x1 && point.y >= b.y0 && point.y <= b.y1
    }

    pub fn translate(&mut self, delta: Vec2) {
        self.position += delta;
    }
}

// ─── Changes emitted by the rendering layer ──────────────────────────────

/// A generic node delta reported by the view (drag, resize, select, delete).
#[derive(Debug, Clone, PartialEq)]
pub enum NodeChange {
    Position { id: NodeId, position: Point },
    Dimensions { id: NodeId, size: Size },
    Select { id: NodeId, selected: bool },
    Remove { id: NodeId },
}

impl NodeChange {
    pub fn id(&self) -> NodeId {
        match self {
            NodeChange::Position { id, .. }
            | NodeChange::Dimensions { id, .. }
            | NodeChange::Select { id, .. }
            | NodeChange::Remove { id } => *id,
        }
    }
}

// ─── Hierarchy diagnostics ───────────────────────────────────────────────

/// An inconsistency found (and repaired) in the scope forest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HierarchyIssue {
    /// `node` pointed at `scope`, which is missing or not a group.
    Dangling { node: NodeId, scope: NodeId },
    /// `node` sat on a scope cycle.
    Cycle { node: NodeId },
}

impl HierarchyIssue {
    pub fn node(&self) -> NodeId {
        match self {
            HierarchyIssue::Dangling { node, .. } | HierarchyIssue::Cycle { node } => *node,
        }
    }
}

// ─── Snapshot ────────────────────────────────────────────────────────────

/// The persisted part of a canvas: node records only, no transient state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CanvasSnapshot {
    pub nodes: Vec<CanvasNode>,
}
