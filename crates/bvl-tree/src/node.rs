//! Node handles and node data for the revision tree.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use bvl_types::ContentHash;

use crate::error::{TreeError, TreeResult};

/// Stable handle to a node in a [`RevisionTree`](crate::RevisionTree).
///
/// The generation makes handles to removed nodes detectably stale even
/// after their arena slot is reused.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId {
    pub(crate) index: usize,
    pub(crate) generation: u32,
}

impl NodeId {
    pub(crate) fn new(index: usize, generation: u32) -> Self {
        Self { index, generation }
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({}v{})", self.index, self.generation)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}v{}", self.index, self.generation)
    }
}

/// One path segment of a revision snapshot.
///
/// A node is a file iff it carries a content hash. Whether it has children
/// plays no part in that.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevisionNode {
    pub(crate) name: String,
    pub(crate) content_hash: Option<ContentHash>,
    pub(crate) parent: Option<NodeId>,
    /// Children keyed by name; the map enforces sibling uniqueness.
    pub(crate) children: BTreeMap<String, NodeId>,
}

impl RevisionNode {
    pub(crate) fn new(
        name: String,
        content_hash: Option<ContentHash>,
        parent: Option<NodeId>,
    ) -> Self {
        Self {
            name,
            content_hash,
            parent,
            children: BTreeMap::new(),
        }
    }

    /// The segment this node contributes to its path.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Blob hash of a file node, `None` for directories.
    pub fn content_hash(&self) -> Option<&ContentHash> {
        self.content_hash.as_ref()
    }

    /// `true` iff the node carries a content hash.
    pub fn is_file(&self) -> bool {
        self.content_hash.is_some()
    }

    /// Parent handle, `None` for the root and for detached nodes.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Live number of direct children.
    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    /// Direct children in name order.
    pub fn children(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.children.values().copied()
    }

    /// Child with the given name, if any.
    pub fn child(&self, name: &str) -> Option<NodeId> {
        self.children.get(name).copied()
    }
}

/// Check that `name` can be used as a single path segment.
pub(crate) fn validate_name(name: &str) -> TreeResult<()> {
    if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
        return Err(TreeError::InvalidName(name.to_string()));
    }
    Ok(())
}
