//! The revision tree: an arena of [`RevisionNode`]s addressed by [`NodeId`].
//!
//! Each node stores its parent handle and a name-keyed map of child
//! handles, so no ownership cycles exist. Reparenting touches exactly the
//! old parent's child map, the new parent's child map and the moved node's
//! parent field. Paths are not stored; they are derived by walking parent
//! handles up to the top, so they can never go stale.
//!
//! # Invariants
//!
//! - The root has no parent and cannot be moved or removed.
//! - Every attached node has exactly one parent, and no node is its own
//!   ancestor.
//! - Sibling names are unique.
//! - Every mutation validates first and then commits; a failing call
//!   changes nothing.
//!
//! Nodes created without a parent are *detached*: they head their own
//! subtree until attached with [`RevisionTree::add_child`] or
//! [`RevisionTree::set_parent`].

use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use bvl_types::{ContentHash, Event, NoopObserver, Observer, WorkspaceEntry, WorkspaceHash};

use crate::error::{TreeError, TreeResult};
use crate::node::{validate_name, NodeId, RevisionNode};

#[derive(Clone, Debug)]
struct Slot {
    generation: u32,
    node: Option<RevisionNode>,
}

/// Directory structure of one revision snapshot.
///
/// Mutation needs `&mut self`, so a tree shared across threads must sit
/// behind a lock; moves are then atomic with respect to path queries.
#[derive(Clone)]
pub struct RevisionTree {
    slots: Vec<Slot>,
    free: Vec<usize>,
    root: NodeId,
    live: usize,
    observer: Arc<dyn Observer>,
}

impl RevisionTree {
    /// Create a tree holding only a root directory named `root_name`.
    pub fn new(root_name: impl Into<String>) -> TreeResult<Self> {
        let name = root_name.into();
        validate_name(&name)?;
        Ok(Self {
            slots: vec![Slot {
                generation: 0,
                node: Some(RevisionNode::new(name, None, None)),
            }],
            free: Vec::new(),
            root: NodeId::new(0, 0),
            live: 1,
            observer: Arc::new(NoopObserver),
        })
    }

    /// Build a tree from a workspace scan: every key becomes a file node,
    /// with intermediate directories created as needed.
    pub fn from_workspace_hash(
        root_name: impl Into<String>,
        workspace_hash: &WorkspaceHash,
    ) -> TreeResult<Self> {
        let mut tree = Self::new(root_name)?;
        for (key, entry) in workspace_hash {
            tree.insert_path(key, entry.content_hash.clone())?;
        }
        Ok(tree)
    }

    /// Report events to `observer` instead of discarding them.
    pub fn with_observer(mut self, observer: Arc<dyn Observer>) -> Self {
        self.observer = observer;
        self
    }

    /// Handle of the root directory.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of live nodes, detached ones included.
    pub fn node_count(&self) -> usize {
        self.live
    }

    /// Whether `id` refers to a live node.
    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_ok()
    }

    /// Borrow a node.
    pub fn get(&self, id: NodeId) -> TreeResult<&RevisionNode> {
        self.slots
            .get(id.index)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_ref())
            .ok_or(TreeError::NodeNotFound(id))
    }

    fn get_mut(&mut self, id: NodeId) -> TreeResult<&mut RevisionNode> {
        self.slots
            .get_mut(id.index)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_mut())
            .ok_or(TreeError::NodeNotFound(id))
    }

    // ---------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------

    /// Name of the node, the last segment of its path.
    pub fn name(&self, id: NodeId) -> TreeResult<&str> {
        Ok(self.get(id)?.name())
    }

    /// Blob hash of a file node, `None` for directories.
    pub fn content_hash(&self, id: NodeId) -> TreeResult<Option<&ContentHash>> {
        Ok(self.get(id)?.content_hash())
    }

    /// `true` iff the node carries a content hash.
    pub fn is_file(&self, id: NodeId) -> TreeResult<bool> {
        Ok(self.get(id)?.is_file())
    }

    /// Parent handle, `None` for the root and detached nodes.
    pub fn parent(&self, id: NodeId) -> TreeResult<Option<NodeId>> {
        Ok(self.get(id)?.parent())
    }

    /// Number of direct children.
    pub fn child_count(&self, id: NodeId) -> TreeResult<usize> {
        Ok(self.get(id)?.child_count())
    }

    /// Direct children in name order.
    pub fn children(&self, id: NodeId) -> TreeResult<Vec<NodeId>> {
        Ok(self.get(id)?.children().collect())
    }

    /// Child of `parent` named `name`, if any.
    pub fn child(&self, parent: NodeId, name: &str) -> TreeResult<Option<NodeId>> {
        Ok(self.get(parent)?.child(name))
    }

    /// Names from the top of the node's subtree down to the node.
    fn segments(&self, id: NodeId) -> TreeResult<Vec<&str>> {
        let mut names = Vec::new();
        let mut current = Some(id);
        while let Some(cur) = current {
            let node = self.get(cur)?;
            names.push(node.name.as_str());
            current = node.parent;
        }
        names.reverse();
        Ok(names)
    }

    /// Join of every ancestor name down to this node, top included.
    ///
    /// For an attached node the first segment is the root's name:
    /// `last/medRes/asset.ma`.
    pub fn node_path(&self, id: NodeId) -> TreeResult<PathBuf> {
        Ok(self.segments(id)?.into_iter().collect())
    }

    /// [`node_path`](Self::node_path) without the top segment, i.e. the
    /// path relative to the root. Empty for the root itself.
    pub fn relative_path(&self, id: NodeId) -> TreeResult<PathBuf> {
        Ok(self.segments(id)?.into_iter().skip(1).collect())
    }

    /// Relative path joined with `/`, the form used for workspace keys.
    fn relative_key(&self, id: NodeId) -> TreeResult<String> {
        Ok(self.segments(id)?[1..].join("/"))
    }

    /// Whether `ancestor` is a strict ancestor of `node`.
    pub fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> TreeResult<bool> {
        self.get(ancestor)?;
        let mut current = self.get(node)?.parent;
        while let Some(id) = current {
            if id == ancestor {
                return Ok(true);
            }
            current = self.get(id)?.parent;
        }
        Ok(false)
    }

    /// All nodes below `id` in pre-order, siblings in name order.
    pub fn descendants(&self, id: NodeId) -> TreeResult<Vec<NodeId>> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.get(id)?.children.values().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.get(next)?.children.values().rev().copied());
        }
        Ok(out)
    }

    /// Resolve a path relative to the root. The empty path is the root.
    pub fn lookup(&self, path: impl AsRef<Path>) -> Option<NodeId> {
        let mut current = self.root;
        for component in path.as_ref().components() {
            match component {
                Component::CurDir => continue,
                Component::Normal(segment) => {
                    current = self.get(current).ok()?.child(segment.to_str()?)?;
                }
                _ => return None,
            }
        }
        Some(current)
    }

    /// Every file node under the root as `(relative path, hash)`.
    pub fn files(&self) -> TreeResult<Vec<(PathBuf, ContentHash)>> {
        let mut files = Vec::new();
        for id in self.descendants(self.root)? {
            if let Some(hash) = self.get(id)?.content_hash() {
                files.push((self.relative_path(id)?, hash.clone()));
            }
        }
        Ok(files)
    }

    /// Mapping that materialises this revision under `checkout_dir` when
    /// handed to `BlobStore::extract`.
    pub fn to_workspace_hash(&self, checkout_dir: &Path) -> TreeResult<WorkspaceHash> {
        let mut workspace_hash = WorkspaceHash::new();
        for id in self.descendants(self.root)? {
            if let Some(hash) = self.get(id)?.content_hash() {
                let absolute = checkout_dir.join(self.relative_path(id)?);
                workspace_hash.insert(
                    self.relative_key(id)?,
                    WorkspaceEntry::new(hash.clone(), absolute),
                );
            }
        }
        Ok(workspace_hash)
    }

    // ---------------------------------------------------------------
    // Mutation
    // ---------------------------------------------------------------

    /// Create a node, attached under `parent` right away when one is given.
    ///
    /// A `None` content hash makes a directory node.
    pub fn create(
        &mut self,
        name: impl Into<String>,
        content_hash: Option<ContentHash>,
        parent: Option<NodeId>,
    ) -> TreeResult<NodeId> {
        let name = name.into();
        validate_name(&name)?;
        if let Some(parent) = parent {
            if self.get(parent)?.children.contains_key(&name) {
                return Err(TreeError::NameCollision { parent, name });
            }
        }

        let is_file = content_hash.is_some();
        let id = self.alloc(RevisionNode::new(name.clone(), content_hash, parent));
        if let Some(parent) = parent {
            self.get_mut(parent)?.children.insert(name, id);
        }

        if self.observer.enabled() {
            let path = self.node_path(id)?;
            self.observer.observe(&Event::NodeCreated {
                path: &path,
                is_file,
            });
        }
        Ok(id)
    }

    /// Move `node` (with its whole subtree) under `parent`.
    ///
    /// Fails with [`TreeError::Cycle`] when `parent` is `node` or one of its
    /// descendants, and with [`TreeError::NameCollision`] when `parent`
    /// already has a child of the same name. Attaching to the current
    /// parent is a no-op.
    pub fn add_child(&mut self, parent: NodeId, node: NodeId) -> TreeResult<()> {
        let moving = self.get(node)?;
        let old_parent = moving.parent;
        let name = moving.name.clone();
        self.get(parent)?;

        if node == parent || self.is_ancestor(node, parent)? {
            return Err(TreeError::Cycle {
                node,
                new_parent: parent,
            });
        }
        if node == self.root {
            return Err(TreeError::RootImmutable);
        }
        if old_parent == Some(parent) {
            return Ok(());
        }
        if self.get(parent)?.children.contains_key(&name) {
            return Err(TreeError::NameCollision { parent, name });
        }

        let from = if self.observer.enabled() {
            Some(self.node_path(node)?)
        } else {
            None
        };

        if let Some(old) = old_parent {
            self.get_mut(old)?.children.remove(&name);
        }
        self.get_mut(node)?.parent = Some(parent);
        self.get_mut(parent)?.children.insert(name, node);

        if let Some(from) = from {
            let to = self.node_path(node)?;
            self.observer.observe(&Event::NodeMoved {
                from: &from,
                to: &to,
            });
        }
        Ok(())
    }

    /// [`add_child`](Self::add_child) from the child's side.
    pub fn set_parent(&mut self, node: NodeId, new_parent: NodeId) -> TreeResult<()> {
        self.add_child(new_parent, node)
    }

    /// Cut `node` loose from its parent. It keeps its subtree and can be
    /// attached again later. No-op for the root and for detached nodes.
    ///
    /// Detached nodes stay in the arena and count towards
    /// [`node_count`](Self::node_count). Call [`remove`](Self::remove) on a
    /// detached subtree that will not be reattached to free its slots.
    pub fn detach(&mut self, node: NodeId) -> TreeResult<()> {
        let from = if self.observer.enabled() && self.get(node)?.parent.is_some() {
            Some(self.node_path(node)?)
        } else {
            None
        };

        self.unlink(node)?;

        if let Some(from) = from {
            let to = self.node_path(node)?;
            self.observer.observe(&Event::NodeMoved {
                from: &from,
                to: &to,
            });
        }
        Ok(())
    }

    /// Drop `node` and its subtree, returning how many nodes went away.
    /// Handles to them become stale.
    pub fn remove(&mut self, node: NodeId) -> TreeResult<usize> {
        self.get(node)?;
        if node == self.root {
            return Err(TreeError::RootImmutable);
        }

        let path = if self.observer.enabled() {
            Some(self.node_path(node)?)
        } else {
            None
        };
        let mut doomed = vec![node];
        doomed.extend(self.descendants(node)?);

        self.unlink(node)?;
        for id in &doomed {
            self.release(*id);
        }

        if let Some(path) = path {
            self.observer.observe(&Event::NodeRemoved {
                path: &path,
                count: doomed.len(),
            });
        }
        Ok(doomed.len())
    }

    /// Replace a node's content hash, turning a directory into a file or
    /// back. Returns the previous hash.
    ///
    /// The root always stays a directory; giving it a hash fails with
    /// [`TreeError::RootImmutable`].
    pub fn set_content_hash(
        &mut self,
        id: NodeId,
        content_hash: Option<ContentHash>,
    ) -> TreeResult<Option<ContentHash>> {
        if id == self.root && content_hash.is_some() {
            return Err(TreeError::RootImmutable);
        }
        let node = self.get_mut(id)?;
        Ok(std::mem::replace(&mut node.content_hash, content_hash))
    }

    /// Insert a file at `rel_path` below the root, creating missing
    /// directories. An existing file at that path gets the new hash.
    ///
    /// Fails with [`TreeError::KindConflict`] when the path runs through a
    /// file or ends at a directory.
    pub fn insert_path(
        &mut self,
        rel_path: impl AsRef<Path>,
        content_hash: ContentHash,
    ) -> TreeResult<NodeId> {
        let rel_path = rel_path.as_ref();
        let segments = path_segments(rel_path)?;
        let Some((leaf, dirs)) = segments.split_last() else {
            return Err(TreeError::InvalidPath(rel_path.to_path_buf()));
        };

        // Walk the existing prefix without touching anything.
        let mut current = self.root;
        let mut depth = 0;
        for dir in dirs {
            let Some(existing) = self.get(current)?.child(dir) else {
                break;
            };
            if self.get(existing)?.is_file() {
                return Err(TreeError::KindConflict(rel_path.to_path_buf()));
            }
            current = existing;
            depth += 1;
        }

        if depth == dirs.len() {
            if let Some(existing) = self.get(current)?.child(leaf) {
                if !self.get(existing)?.is_file() {
                    return Err(TreeError::KindConflict(rel_path.to_path_buf()));
                }
                self.set_content_hash(existing, Some(content_hash))?;
                return Ok(existing);
            }
        }

        for dir in &dirs[depth..] {
            current = self.create(dir.as_str(), None, Some(current))?;
        }
        self.create(leaf.as_str(), Some(content_hash), Some(current))
    }

    // ---------------------------------------------------------------
    // Arena bookkeeping
    // ---------------------------------------------------------------

    fn alloc(&mut self, node: RevisionNode) -> NodeId {
        self.live += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index];
            slot.node = Some(node);
            NodeId::new(index, slot.generation)
        } else {
            self.slots.push(Slot {
                generation: 0,
                node: Some(node),
            });
            NodeId::new(self.slots.len() - 1, 0)
        }
    }

    fn release(&mut self, id: NodeId) {
        if let Some(slot) = self.slots.get_mut(id.index) {
            if slot.generation == id.generation && slot.node.take().is_some() {
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(id.index);
                self.live -= 1;
            }
        }
    }

    /// Remove the edge between `node` and its parent, if any.
    fn unlink(&mut self, node: NodeId) -> TreeResult<()> {
        let moving = self.get(node)?;
        let Some(old) = moving.parent else {
            return Ok(());
        };
        let name = moving.name.clone();
        self.get_mut(old)?.children.remove(&name);
        self.get_mut(node)?.parent = None;
        Ok(())
    }
}

/// Split a relative path into validated node names.
fn path_segments(path: &Path) -> TreeResult<Vec<String>> {
    let mut segments = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::Normal(segment) => {
                let segment = segment
                    .to_str()
                    .ok_or_else(|| TreeError::InvalidPath(path.to_path_buf()))?;
                validate_name(segment)?;
                segments.push(segment.to_string());
            }
            _ => return Err(TreeError::InvalidPath(path.to_path_buf())),
        }
    }
    Ok(segments)
}

impl fmt::Debug for RevisionTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let root_name = self.name(self.root).unwrap_or("?");
        f.debug_struct("RevisionTree")
            .field("root", &root_name)
            .field("node_count", &self.live)
            .finish()
    }
}
