//! Hit testing: logical point → drop-target group.
//!
//! Runs on every pointer-move during a drag, so it only reads the store.

use crate::id::NodeId;
use crate::model::*;
use crate::store::CanvasStore;
use kurbo::Point;
use std::collections::HashSet;

impl CanvasStore {
    /// Find the group whose box contains `point`.
    ///
    /// `exclude` (the node being dragged) and everything scoped under it are
    /// never returned, so a group cannot be dropped into its own subtree.
    /// When several boxes match, the smallest wins (innermost group); equal
    /// areas prefer the deeper group, then the most recently added one.
    pub fn group_at(&self, point: Point, exclude: Option<NodeId>) -> Option<NodeId> {
        let excluded: HashSet<NodeId> = match exclude {
            Some(id) => std::iter::once(id).chain(self.descendants(id)).collect(),
            None => HashSet::new(),
        };

        let hit = self
            .nodes
            .values()
            .filter(|n| match n.kind {
                NodeKind::Group => !excluded.contains(&n.id) && n.contains(point),
                NodeKind::Content => false,
            })
            .map(|n| (n, n.size.area(), self.ancestors(n.id).len()))
            .min_by(|a, b| {
                a.1.total_cmp(&b.1)
                    .then_with(|| b.2.cmp(&a.2))
                    .then_with(|| b.0.seq.cmp(&a.0.seq))
            })
            .map(|(n, ..)| n.id);

        log::trace!("group_at({}, {}) -> {hit:?}", point.x, point.y);
        hit
    }
}
