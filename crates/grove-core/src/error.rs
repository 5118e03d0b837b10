//! Error types shared by the store, mutator, and layout engine.

use crate::id::NodeId;

/// Errors returned by fallible canvas operations.
#[derive(Debug, thiserror::Error)]
pub enum CanvasError {
    /// No node with this id exists in the store.
    #[error("node not found: {0}")]
    UnknownNode(NodeId),

    /// The node exists but is not a group.
    #[error("node is not a group: {0}")]
    NotAGroup(NodeId),

    /// Reparenting `node` into `target` would nest it inside itself.
    #[error("cannot move {node} into {target}: target is the node or one of its descendants")]
    InvalidTarget { node: NodeId, target: NodeId },

    /// The id is reserved for the root scope.
    #[error("id is reserved: {0}")]
    ReservedId(NodeId),

    /// A node with this id already exists.
    #[error("duplicate node id: {0}")]
    DuplicateId(NodeId),

    #[error("snapshot encode failed: {0}")]
    Encode(#[from] rmp_serde::encode::Error),

    #[error("snapshot decode failed: {0}")]
    Decode(#[from] rmp_serde::decode::Error),

    #[error("invalid config: {0}")]
    Config(#[from] serde_json::Error),
}
