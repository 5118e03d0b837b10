//! The canvas store: single owner of node records and transient view state.
//!
//! Node records live in one `HashMap<NodeId, CanvasNode>`. The parent→children
//! relation is a derived index keyed by `Scope`, kept in `seq` order and
//! updated incrementally on insert, remove, and reparent. Nothing here is
//! recomputed per pointer-move.
//!
//! Transient state (highlighted drop target, dirty scopes, view revision) is
//! kept beside the records and never appears in a `CanvasSnapshot`.

use crate::config::CanvasConfig;
use crate::error::CanvasError;
use crate::id::NodeId;
use crate::model::*;
use kurbo::{Point, Size};
use smallvec::SmallVec;
use std::collections::{HashMap, HashSet, VecDeque};

pub(crate) type ChildList = SmallVec<[NodeId; 8]>;

#[derive(Debug, Clone)]
pub struct CanvasStore {
    pub(crate) nodes: HashMap<NodeId, CanvasNode>,
    pub(crate) children: HashMap<Scope, ChildList>,
    pub(crate) config: CanvasConfig,
    pub(crate) dirty: HashSet<Scope>,
    next_seq: u64,
    highlighted: Option<NodeId>,
    view_revision: u64,
}

impl Default for CanvasStore {
    fn default() -> Self {
        Self::new(CanvasConfig::default())
    }
}

impl CanvasStore {
    #[must_use]
    pub fn new(config: CanvasConfig) -> Self {
        Self {
            nodes: HashMap::new(),
            children: HashMap::new(),
            config,
            dirty: HashSet::new(),
            next_seq: 0,
            highlighted: None,
            view_revision: 0,
        }
    }

    /// Rebuild a store from persisted records.
    ///
    /// Records are re-sequenced in their snapshot `seq` order. Dangling or
    /// cyclic scopes are repaired to root and returned.
    ///
    /// # Errors
    /// `ReservedId` or `DuplicateId` if the snapshot contains an unusable id.
    pub fn from_snapshot(
        snapshot: CanvasSnapshot,
        config: CanvasConfig,
    ) -> Result<(Self, Vec<HierarchyIssue>), CanvasError> {
        let mut store = Self::new(config);
        let mut records = snapshot.nodes;
        records.sort_by_key(|n| n.seq);
        for node in records {
            if node.id.is_reserved() {
                return Err(CanvasError::ReservedId(node.id));
            }
            if store.nodes.contains_key(&node.id) {
                return Err(CanvasError::DuplicateId(node.id));
            }
            store.insert_unchecked(node);
        }
        let issues = store.check_hierarchy();
        Ok((store, issues))
    }

    /// Persistable copy of all node records, in `seq` order.
    pub fn snapshot(&self) -> CanvasSnapshot {
        CanvasSnapshot {
            nodes: self.nodes_in_order().into_iter().cloned().collect(),
        }
    }

    // ─── Queries ─────────────────────────────────────────────────────────

    pub fn config(&self) -> &CanvasConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> Option<&CanvasNode> {
        self.nodes.get(&id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// All nodes sorted by insertion sequence.
    pub fn nodes_in_order(&self) -> Vec<&CanvasNode> {
        let mut all: Vec<&CanvasNode> = self.nodes.values().collect();
        all.sort_by_key(|n| n.seq);
        all
    }

    /// Direct children of a scope, in insertion order.
    pub fn children(&self, scope: Scope) -> &[NodeId] {
        self.children.get(&scope).map_or(&[], |c| c.as_slice())
    }

    /// Look up a node that must be a group.
    ///
    /// # Errors
    /// `UnknownNode` or `NotAGroup`.
    pub fn group(&self, id: NodeId) -> Result<&CanvasNode, CanvasError> {
        let node = self.nodes.get(&id).ok_or(CanvasError::UnknownNode(id))?;
        match node.kind {
            NodeKind::Group => Ok(node),
            NodeKind::Content => Err(CanvasError::NotAGroup(id)),
        }
    }

    /// Every node transitively scoped under `id` (breadth-first, excluding `id`).
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut seen: HashSet<NodeId> = HashSet::from([id]);
        let mut queue: VecDeque<NodeId> = VecDeque::from([id]);
        while let Some(current) = queue.pop_front() {
            for &child in self.children(Scope::Group(current)) {
                if seen.insert(child) {
                    out.push(child);
                    queue.push_back(child);
                }
            }
        }
        out
    }

    /// Check if `ancestor` is a parent/grandparent/etc. of `node`.
    pub fn is_ancestor_of(&self, ancestor: NodeId, node: NodeId) -> bool {
        if ancestor == node {
            return false;
        }
        self.ancestors(node).contains(&ancestor)
    }

    /// Scope chain from the direct parent outwards. Stops on a repeated id,
    /// so a corrupted chain still terminates.
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut seen: HashSet<NodeId> = HashSet::from([id]);
        let mut current = self.nodes.get(&id).map(|n| n.scope);
        while let Some(Scope::Group(parent)) = current {
            if !seen.insert(parent) {
                break;
            }
            out.push(parent);
            current = self.nodes.get(&parent).map(|n| n.scope);
        }
        out
    }

    // ─── Creation & removal ──────────────────────────────────────────────

    /// Create a node of `kind` at `position`, sized from the config, optionally
    /// directly inside `parent`. Returns the generated id.
    ///
    /// # Errors
    /// `UnknownNode` / `NotAGroup` if `parent` is not an existing group.
    pub fn add_node(
        &mut self,
        kind: NodeKind,
        position: Point,
        parent: Option<NodeId>,
    ) -> Result<NodeId, CanvasError> {
        let size = match kind {
            NodeKind::Content => self.config.content_size,
            NodeKind::Group => self.config.group_size,
        };
        let id = NodeId::with_prefix(kind.id_prefix());
        let node = CanvasNode::new(id, kind, position, size).in_scope(parent.into());
        self.insert_node(node)
    }

    /// Insert a fully specified node. Its `seq` is reassigned.
    ///
    /// # Errors
    /// `ReservedId`, `DuplicateId`, or an invalid parent scope.
    pub fn insert_node(&mut self, node: CanvasNode) -> Result<NodeId, CanvasError> {
        if node.id.is_reserved() {
            return Err(CanvasError::ReservedId(node.id));
        }
        if self.nodes.contains_key(&node.id) {
            return Err(CanvasError::DuplicateId(node.id));
        }
        if let Scope::Group(parent) = node.scope {
            self.group(parent)?;
        }
        let id = node.id;
        let scope = node.scope;
        self.insert_unchecked(node);
        self.dirty.insert(scope);
        log::debug!("added {id} in {scope:?}");
        Ok(id)
    }

    fn insert_unchecked(&mut self, mut node: CanvasNode) {
        node.seq = self.next_seq;
        self.next_seq += 1;
        let (id, scope) = (node.id, node.scope);
        self.nodes.insert(id, node);
        self.children.entry(scope).or_default().push(id);
    }

    /// Remove a node. A removed group's children are lifted into the group's
    /// own scope first, so no scope reference dangles.
    ///
    /// # Errors
    /// `UnknownNode`.
    pub fn remove_node(&mut self, id: NodeId) -> Result<CanvasNode, CanvasError> {
        let scope = self.nodes.get(&id).ok_or(CanvasError::UnknownNode(id))?.scope;

        let orphans: Vec<NodeId> = self.children(Scope::Group(id)).to_vec();
        for child in orphans {
            self.rescope(child, scope);
        }
        self.children.remove(&Scope::Group(id));
        self.dirty.remove(&Scope::Group(id));

        self.index_remove(scope, id);
        self.dirty.insert(scope);
        if self.highlighted == Some(id) {
            self.highlighted = None;
        }
        let removed = self.nodes.remove(&id).ok_or(CanvasError::UnknownNode(id))?;
        log::debug!("removed {id}");
        Ok(removed)
    }

    // ─── Geometry edits ──────────────────────────────────────────────────

    /// Move a node's top-left corner. Descendants of a group move with it.
    ///
    /// # Errors
    /// `UnknownNode`.
    pub fn set_position(&mut self, id: NodeId, position: Point) -> Result<(), CanvasError> {
        let current = self.nodes.get(&id).ok_or(CanvasError::UnknownNode(id))?.position;
        let delta = position - current;
        if delta.x == 0.0 && delta.y == 0.0 {
            return Ok(());
        }
        for moved in std::iter::once(id).chain(self.descendants(id)) {
            if let Some(node) = self.nodes.get_mut(&moved) {
                node.translate(delta);
            }
        }
        Ok(())
    }

    /// # Errors
    /// `UnknownNode`.
    pub fn set_size(&mut self, id: NodeId, size: Size) -> Result<(), CanvasError> {
        let node = self.nodes.get_mut(&id).ok_or(CanvasError::UnknownNode(id))?;
        node.size = size;
        let scope = node.scope;
        self.dirty.insert(scope);
        Ok(())
    }

    /// Apply deltas reported by the view. Unknown ids are skipped.
    /// Selection changes carry no store state and are ignored here.
    pub fn apply_changes(&mut self, changes: &[NodeChange]) {
        for change in changes {
            let result = match change {
                NodeChange::Position { id, position } => self.set_position(*id, *position),
                NodeChange::Dimensions { id, size } => self.set_size(*id, *size),
                NodeChange::Remove { id } => self.remove_node(*id).map(|_| ()),
                NodeChange::Select { .. } => Ok(()),
            };
            if let Err(err) = result {
                log::debug!("skipped change for {}: {err}", change.id());
            }
        }
    }

    // ─── Highlight ───────────────────────────────────────────────────────

    /// The group currently shown as drop target, if any.
    pub fn highlighted(&self) -> Option<NodeId> {
        self.highlighted
    }

    /// Replace the highlighted drop target. Unknown ids clear the highlight.
    pub fn set_highlighted(&mut self, id: NodeId) {
        self.highlighted = self.nodes.contains_key(&id).then_some(id);
    }

    pub fn clear_highlighted(&mut self) {
        self.highlighted = None;
    }

    // ─── Dirty tracking & view refresh ───────────────────────────────────

    pub fn is_dirty(&self, scope: Scope) -> bool {
        self.dirty.contains(&scope)
    }

    pub fn dirty_scopes(&self) -> impl Iterator<Item = Scope> + '_ {
        self.dirty.iter().copied()
    }

    /// Ask the view to refresh (re-fit) from the current records.
    pub fn update_view(&mut self) {
        self.view_revision += 1;
    }

    pub fn view_revision(&self) -> u64 {
        self.view_revision
    }

    // ─── Child index maintenance ─────────────────────────────────────────

    /// Point `id` at a new scope and move it between child lists.
    /// No validation: callers check the target first.
    pub(crate) fn rescope(&mut self, id: NodeId, scope: Scope) {
        let Some(node) = self.nodes.get_mut(&id) else {
            return;
        };
        let old = std::mem::replace(&mut node.scope, scope);
        if old == scope {
            return;
        }
        self.index_remove(old, id);
        self.index_insert(scope, id);
        self.dirty.insert(old);
        self.dirty.insert(scope);
    }

    fn index_remove(&mut self, scope: Scope, id: NodeId) {
        if let Some(list) = self.children.get_mut(&scope) {
            list.retain(|c| *c != id);
            if list.is_empty() {
                self.children.remove(&scope);
            }
        }
    }

    fn index_insert(&mut self, scope: Scope, id: NodeId) {
        let seq_of = |c: &NodeId| self.nodes.get(c).map_or(u64::MAX, |n| n.seq);
        let seq = seq_of(&id);
        let list = self.children.get(&scope);
        if list.is_some_and(|l| l.contains(&id)) {
            return;
        }
        let at = list.map_or(0, |l| l.partition_point(|c| seq_of(c) < seq));
        self.children.entry(scope).or_default().insert(at, id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn pt(x: f64, y: f64) -> Point {
        Point::new(x, y)
    }

    #[test]
    fn add_node_uses_configured_sizes() {
        let mut store = CanvasStore::default();
        let c = store.add_node(NodeKind::Content, pt(5.0, 5.0), None).unwrap();
        let g = store.add_node(NodeKind::Group, pt(0.0, 0.0), None).unwrap();

        assert_eq!(store.node(c).unwrap().size, Size::new(240.0, 120.0));
        assert_eq!(store.node(g).unwrap().size, Size::new(400.0, 300.0));
        assert!(c.as_str().starts_with("content_"));
        assert!(g.as_str().starts_with("group_"));
    }

    #[test]
    fn add_node_under_parent_indexes_child() {
        let mut store = CanvasStore::default();
        let g = store.add_node(NodeKind::Group, pt(0.0, 0.0), None).unwrap();
        let c = store.add_node(NodeKind::Content, pt(10.0, 10.0), Some(g)).unwrap();

        assert_eq!(store.node(c).unwrap().scope, Scope::Group(g));
        assert_eq!(store.children(Scope::Group(g)), &[c]);
        assert!(store.is_dirty(Scope::Group(g)));
    }

    #[test]
    fn add_node_rejects_content_parent() {
        let mut store = CanvasStore::default();
        let c = store.add_node(NodeKind::Content, pt(0.0, 0.0), None).unwrap();
        let err = store
            .add_node(NodeKind::Content, pt(0.0, 0.0), Some(c))
            .unwrap_err();
        assert!(matches!(err, CanvasError::NotAGroup(id) if id == c));
    }

    #[test]
    fn insert_rejects_reserved_and_duplicate_ids() {
        let mut store = CanvasStore::default();
        let size = Size::new(10.0, 10.0);
        let root = CanvasNode::content(NodeId::intern("root"), Point::ZERO, size);
        assert!(matches!(
            store.insert_node(root),
            Err(CanvasError::ReservedId(_))
        ));

        let a = NodeId::intern("store_dup");
        store
            .insert_node(CanvasNode::content(a, Point::ZERO, size))
            .unwrap();
        assert!(matches!(
            store.insert_node(CanvasNode::content(a, Point::ZERO, size)),
            Err(CanvasError::DuplicateId(_))
        ));
    }

    #[test]
    fn removing_group_lifts_children_into_its_scope() {
        let mut store = CanvasStore::default();
        let outer = store.add_node(NodeKind::Group, pt(0.0, 0.0), None).unwrap();
        let inner = store
            .add_node(NodeKind::Group, pt(10.0, 10.0), Some(outer))
            .unwrap();
        let leaf = store
            .add_node(NodeKind::Content, pt(20.0, 20.0), Some(inner))
            .unwrap();

        store.remove_node(inner).unwrap();

        assert_eq!(store.node(leaf).unwrap().scope, Scope::Group(outer));
        assert_eq!(store.children(Scope::Group(outer)), &[leaf]);
        assert!(store.children(Scope::Group(inner)).is_empty());
    }

    #[test]
    fn moving_group_drags_descendants_along() {
        let mut store = CanvasStore::default();
        let g = store.add_node(NodeKind::Group, pt(0.0, 0.0), None).unwrap();
        let c = store.add_node(NodeKind::Content, pt(20.0, 30.0), Some(g)).unwrap();

        store.set_position(g, pt(100.0, 50.0)).unwrap();

        assert_eq!(store.node(g).unwrap().position, pt(100.0, 50.0));
        assert_eq!(store.node(c).unwrap().position, pt(120.0, 80.0));
    }

    #[test]
    fn child_index_stays_in_insertion_order_after_reparent() {
        let mut store = CanvasStore::default();
        let g = store.add_node(NodeKind::Group, pt(0.0, 0.0), None).unwrap();
        let a = store.add_node(NodeKind::Content, pt(0.0, 0.0), Some(g)).unwrap();
        let b = store.add_node(NodeKind::Content, pt(0.0, 0.0), None).unwrap();
        let c = store.add_node(NodeKind::Content, pt(0.0, 0.0), Some(g)).unwrap();

        store.rescope(b, Scope::Group(g));

        assert_eq!(store.children(Scope::Group(g)), &[a, b, c]);
    }

    #[test]
    fn apply_changes_skips_unknown_ids() {
        let mut store = CanvasStore::default();
        let c = store.add_node(NodeKind::Content, pt(0.0, 0.0), None).unwrap();
        store.apply_changes(&[
            NodeChange::Position {
                id: NodeId::intern("store_missing"),
                position: pt(1.0, 1.0),
            },
            NodeChange::Position {
                id: c,
                position: pt(7.0, 8.0),
            },
            NodeChange::Dimensions {
                id: c,
                size: Size::new(50.0, 60.0),
            },
        ]);
        let node = store.node(c).unwrap();
        assert_eq!(node.position, pt(7.0, 8.0));
        assert_eq!(node.size, Size::new(50.0, 60.0));
    }

    #[test]
    fn removing_highlighted_node_clears_highlight() {
        let mut store = CanvasStore::default();
        let g = store.add_node(NodeKind::Group, pt(0.0, 0.0), None).unwrap();
        store.set_highlighted(g);
        assert_eq!(store.highlighted(), Some(g));

        store.apply_changes(&[NodeChange::Remove { id: g }]);
        assert_eq!(store.highlighted(), None);
    }

    #[test]
    fn snapshot_roundtrip_preserves_order_and_scopes() {
        let mut store = CanvasStore::default();
        let g = store.add_node(NodeKind::Group, pt(0.0, 0.0), None).unwrap();
        let c = store.add_node(NodeKind::Content, pt(5.0, 5.0), Some(g)).unwrap();

        let (restored, issues) =
            CanvasStore::from_snapshot(store.snapshot(), CanvasConfig::default()).unwrap();

        assert!(issues.is_empty());
        assert_eq!(restored.snapshot(), store.snapshot());
        assert_eq!(restored.children(Scope::Group(g)), &[c]);
    }
}
