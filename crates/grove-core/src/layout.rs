//! Auto-layout for groups.
//!
//! `layout_group` packs one group's direct children on a shelf grid and fits
//! the group's box around them. `layout_all` repairs the hierarchy, then runs
//! `layout_group` for every group in post-order (descendants before
//! ancestors) so each ancestor sees the final size of its nested groups.
//!
//! The packing depends only on the group's anchor (top-left corner) and the
//! ordered child sizes, so repeated passes without structural changes are
//! idempotent.

use crate::config::LayoutConfig;
use crate::error::CanvasError;
use crate::id::NodeId;
use crate::model::*;
use crate::store::CanvasStore;
use kurbo::{Size, Vec2};
use petgraph::stable_graph::StableDiGraph;
use petgraph::visit::DfsPostOrder;
use std::collections::HashMap;

/// Result of packing a child list: offsets from the group's top-left corner
/// plus the group extent that encloses them.
#[derive(Debug, Clone, PartialEq)]
pub struct Packing {
    pub offsets: Vec<Vec2>,
    pub extent: Size,
}

/// Shelf-grid packing.
///
/// Children fill rows of `ceil(sqrt(n))` columns in order. Each child starts
/// where the previous one ended plus `gap`; a row is as tall as its tallest
/// child. The extent adds `margin` on every side and never drops below
/// `min_group_size`.
pub fn pack(sizes: &[Size], config: &LayoutConfig) -> Packing {
    let margin = config.margin;
    let gap = config.gap;
    let min = config.min_group_size;

    if sizes.is_empty() {
        return Packing {
            offsets: Vec::new(),
            extent: min,
        };
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let columns = ((sizes.len() as f64).sqrt().ceil() as usize).max(1);

    let mut offsets = Vec::with_capacity(sizes.len());
    let mut x = margin;
    let mut y = margin;
    let mut row_height = 0.0f64;
    let mut right = 0.0f64;

    for (i, size) in sizes.iter().enumerate() {
        if i > 0 && i % columns == 0 {
            x = margin;
            y += row_height + gap;
            row_height = 0.0;
        }
        offsets.push(Vec2::new(x, y));
        right = right.max(x + size.width);
        row_height = row_height.max(size.height);
        x += size.width + gap;
    }

    let bottom = y + row_height;
    Packing {
        offsets,
        extent: Size::new(
            (right + margin).max(min.width),
            (bottom + margin).max(min.height),
        ),
    }
}

impl CanvasStore {
    /// Lay out the direct children of one group and refit its box.
    ///
    /// The group's own position is the anchor and does not change. Child
    /// groups move together with everything scoped under them.
    ///
    /// # Errors
    /// `UnknownNode` or `NotAGroup`.
    pub fn layout_group(&mut self, id: NodeId) -> Result<(), CanvasError> {
        let origin = self.group(id)?.position;

        let children: Vec<(NodeId, Size)> = self
            .children(Scope::Group(id))
            .iter()
            .filter_map(|c| self.node(*c).map(|n| (n.id, n.size)))
            .collect();
        let sizes: Vec<Size> = children.iter().map(|(_, size)| *size).collect();
        let packing = pack(&sizes, &self.config.layout);

        for ((child, _), offset) in children.iter().zip(&packing.offsets) {
            self.set_position(*child, origin + *offset)?;
        }
        if let Some(group) = self.nodes.get_mut(&id) {
            group.size = packing.extent;
        }
        self.dirty.remove(&Scope::Group(id));

        log::debug!(
            "laid out {id}: {} children, extent {}x{}",
            children.len(),
            packing.extent.width,
            packing.extent.height
        );
        Ok(())
    }

    /// Repair the hierarchy, then lay out every group descendants-first.
    ///
    /// Returns the inconsistencies that were repaired along the way.
    pub fn layout_all(&mut self) -> Vec<HierarchyIssue> {
        let issues = self.check_hierarchy();
        for id in self.groups_post_order() {
            if let Err(err) = self.layout_group(id) {
                log::warn!("layout of {id} skipped: {err}");
            }
        }
        self.dirty.clear();
        issues
    }

    /// Groups ordered so every group comes after all groups nested in it.
    ///
    /// Groups whose scope cannot be followed are hung off the root so the
    /// traversal always visits every group exactly once.
    pub fn groups_post_order(&self) -> Vec<NodeId> {
        let mut forest: StableDiGraph<Option<NodeId>, ()> = StableDiGraph::new();
        let root = forest.add_node(None);

        let groups: Vec<&CanvasNode> = self
            .nodes_in_order()
            .into_iter()
            .filter(|n| n.is_group())
            .collect();
        let index: HashMap<NodeId, _> = groups
            .iter()
            .map(|n| (n.id, forest.add_node(Some(n.id))))
            .collect();

        for group in &groups {
            let parent = group
                .scope
                .group()
                .and_then(|p| index.get(&p).copied())
                .unwrap_or(root);
            if let Some(&child) = index.get(&group.id) {
                forest.add_edge(parent, child, ());
            }
        }

        let mut order = Vec::with_capacity(groups.len());
        let mut dfs = DfsPostOrder::new(&forest, root);
        while let Some(ix) = dfs.next(&forest) {
            if let Some(id) = forest[ix] {
                order.push(id);
            }
        }
        order
    }
}
