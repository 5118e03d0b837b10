//! Scope mutation and hierarchy consistency.
//!
//! `move_into_scope` is a pure hierarchy edit: it never repositions nodes,
//! only rewrites `scope` and marks the old and new scopes layout-dirty.
//! `check_hierarchy` finds dangling and cyclic scope references and repairs
//! them to root.

use crate::error::CanvasError;
use crate::id::NodeId;
use crate::model::*;
use crate::store::CanvasStore;
use petgraph::algo::tarjan_scc;
use petgraph::stable_graph::StableDiGraph;
use std::collections::{HashMap, HashSet};

impl CanvasStore {
    /// Reparent every node in `ids` into `target` (or root when `None`).
    ///
    /// The whole batch is validated before anything changes, so a rejected
    /// call leaves the store untouched.
    ///
    /// # Errors
    /// - `UnknownNode` if any id (or the target) does not exist.
    /// - `NotAGroup` if the target is a content node.
    /// - `InvalidTarget` if the target is one of the nodes or a descendant of one.
    pub fn move_into_scope(
        &mut self,
        ids: &[NodeId],
        target: Option<NodeId>,
    ) -> Result<(), CanvasError> {
        if let Some(target) = target {
            self.group(target)?;
        }

        let mut unique: Vec<NodeId> = Vec::with_capacity(ids.len());
        for &id in ids {
            if !self.contains(id) {
                return Err(CanvasError::UnknownNode(id));
            }
            if let Some(target) = target
                && (target == id || self.is_ancestor_of(id, target))
            {
                return Err(CanvasError::InvalidTarget { node: id, target });
            }
            if !unique.contains(&id) {
                unique.push(id);
            }
        }

        let scope = Scope::from(target);
        for id in unique {
            self.rescope(id, scope);
            log::debug!("moved {id} into {scope:?}");
        }
        Ok(())
    }

    /// Repair the scope forest: dangling references and cycles become root.
    ///
    /// Returns one issue per repaired node, ordered by insertion sequence.
    pub fn check_hierarchy(&mut self) -> Vec<HierarchyIssue> {
        let mut issues = Vec::new();

        // Scopes pointing at a missing node or at a content node.
        let dangling: Vec<(NodeId, NodeId)> = self
            .nodes_in_order()
            .into_iter()
            .filter_map(|n| {
                let parent = n.scope.group()?;
                let valid = self.nodes.get(&parent).is_some_and(CanvasNode::is_group);
                (!valid).then_some((n.id, parent))
            })
            .collect();
        for (node, scope) in dangling {
            log::warn!("{node} is scoped to missing group {scope}; moving to root");
            self.rescope(node, Scope::Root);
            issues.push(HierarchyIssue::Dangling { node, scope });
        }

        // Cycles: strongly connected components of the child → parent graph.
        let mut forest: StableDiGraph<NodeId, ()> = StableDiGraph::new();
        let mut index = HashMap::new();
        for node in self.nodes_in_order() {
            index.insert(node.id, forest.add_node(node.id));
        }
        for node in self.nodes.values() {
            if let Some(parent) = node.scope.group()
                && let (Some(&from), Some(&to)) = (index.get(&node.id), index.get(&parent))
            {
                forest.add_edge(from, to, ());
            }
        }

        let mut cyclic: HashSet<NodeId> = HashSet::new();
        for component in tarjan_scc(&forest) {
            let looped = component.len() > 1
                || component
                    .first()
                    .is_some_and(|&ix| forest.contains_edge(ix, ix));
            if looped {
                cyclic.extend(component.into_iter().map(|ix| forest[ix]));
            }
        }

        let mut members: Vec<(u64, NodeId)> = cyclic
            .into_iter()
            .filter_map(|id| self.nodes.get(&id).map(|n| (n.seq, id)))
            .collect();
        members.sort_by_key(|(seq, _)| *seq);
        for (_, node) in members {
            log::warn!("{node} is part of a scope cycle; moving to root");
            self.rescope(node, Scope::Root);
            issues.push(HierarchyIssue::Cycle { node });
        }

        issues
    }
}
