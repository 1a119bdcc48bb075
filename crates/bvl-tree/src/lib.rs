//! Revision tree for binvcs snapshots.
//!
//! A [`RevisionTree`] records the directory structure of one revision: which
//! files exist, where they live, and which blob holds each file's content.
//! Nodes live in an arena and refer to each other through copyable
//! [`NodeId`] handles, so subtrees can be moved in constant time while
//! every node path stays derivable from the parent chain.
//!
//! The tree converts to and from a [`WorkspaceHash`], which is what the
//! blob store consumes when storing or extracting a revision.
//!
//! [`WorkspaceHash`]: bvl_types::WorkspaceHash

pub mod error;
pub mod node;
pub mod tree;

pub use error::{TreeError, TreeResult};
pub use node::{NodeId, RevisionNode};
pub use tree::RevisionTree;
