//! Error types for the revision tree.

use std::path::PathBuf;

use crate::node::NodeId;

/// Structural and contract errors. Every failing operation leaves the tree
/// exactly as it was.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TreeError {
    /// The handle does not refer to a live node (never allocated, or removed).
    #[error("node not found: {0}")]
    NodeNotFound(NodeId),

    /// A node name is empty, a relative marker, or contains a separator.
    #[error("invalid node name: {0:?}")]
    InvalidName(String),

    /// The parent already has a child with this name.
    #[error("name collision: {parent} already has a child named {name:?}")]
    NameCollision {
        /// The parent that owns the existing child.
        parent: NodeId,
        /// The contested name.
        name: String,
    },

    /// The move would make a node its own ancestor.
    #[error("cycle: cannot move {node} under {new_parent}")]
    Cycle {
        /// The node being moved.
        node: NodeId,
        /// The requested parent, which is the node itself or one of its
        /// descendants.
        new_parent: NodeId,
    },

    /// The tree root cannot be removed or moved under another node.
    #[error("operation not allowed on the tree root")]
    RootImmutable,

    /// A path could not be mapped onto tree segments.
    #[error("invalid tree path: {0}")]
    InvalidPath(PathBuf),

    /// A path crosses a file where a directory is required, or ends at a
    /// directory where a file is required.
    #[error("file/directory conflict at {0}")]
    KindConflict(PathBuf),
}

/// Convenience alias for tree results.
pub type TreeResult<T> = Result<T, TreeError>;
