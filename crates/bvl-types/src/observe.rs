//! Explicit logging seam for the blob store and revision tree.
//!
//! Components hold an `Arc<dyn Observer>` configured at construction time
//! and report what they do as [`Event`]s. The default is [`NoopObserver`];
//! [`TracingObserver`] forwards events to the `tracing` facade.

use std::fmt;
use std::path::Path;

use crate::hash::ContentHash;

/// Which batch operation an event belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BatchKind {
    /// Workspace → blob root.
    Store,
    /// Blob root → workspace.
    Extract,
}

impl fmt::Display for BatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Store => write!(f, "store"),
            Self::Extract => write!(f, "extract"),
        }
    }
}

/// Something a component did that an observer may want to record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event<'a> {
    /// A workspace file was copied into the blob root.
    BlobStored {
        hash: &'a ContentHash,
        source: &'a Path,
        address: &'a Path,
    },
    /// The blob was already present; nothing was copied.
    BlobCacheHit {
        hash: &'a ContentHash,
        address: &'a Path,
    },
    /// A blob was materialised into the workspace.
    BlobExtracted {
        hash: &'a ContentHash,
        target: &'a Path,
    },
    /// A batch item was left out of the result.
    ItemSkipped {
        batch: BatchKind,
        key: &'a str,
        path: &'a Path,
        reason: &'a str,
    },
    /// A batch operation finished.
    BatchFinished {
        batch: BatchKind,
        requested: usize,
        succeeded: usize,
    },
    /// A tree node was created.
    NodeCreated { path: &'a Path, is_file: bool },
    /// A subtree moved under a new parent.
    NodeMoved { from: &'a Path, to: &'a Path },
    /// A subtree was dropped from the tree.
    NodeRemoved { path: &'a Path, count: usize },
}

/// Receiver of component events.
pub trait Observer: Send + Sync {
    /// Record an event.
    fn observe(&self, event: &Event<'_>);

    /// Whether events are wanted at all. Components skip building events
    /// (path derivation in particular) when this returns `false`.
    fn enabled(&self) -> bool {
        true
    }
}

/// Observer that discards everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopObserver;

impl Observer for NoopObserver {
    fn observe(&self, _event: &Event<'_>) {}

    fn enabled(&self) -> bool {
        false
    }
}

/// Observer that forwards events to `tracing`.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingObserver;

impl Observer for TracingObserver {
    fn observe(&self, event: &Event<'_>) {
        match event {
            Event::BlobStored {
                hash,
                source,
                address,
            } => tracing::debug!(
                hash = %hash.short(),
                source = %source.display(),
                address = %address.display(),
                "stored blob"
            ),
            Event::BlobCacheHit { hash, address } => tracing::debug!(
                hash = %hash.short(),
                address = %address.display(),
                "blob already present"
            ),
            Event::BlobExtracted { hash, target } => tracing::debug!(
                hash = %hash.short(),
                target = %target.display(),
                "extracted blob"
            ),
            Event::ItemSkipped {
                batch,
                key,
                path,
                reason,
            } => tracing::warn!(
                %batch,
                key = %key,
                path = %path.display(),
                reason = %reason,
                "skipped item"
            ),
            Event::BatchFinished {
                batch,
                requested,
                succeeded,
            } => tracing::info!(%batch, requested, succeeded, "batch finished"),
            Event::NodeCreated { path, is_file } => {
                tracing::trace!(path = %path.display(), is_file, "created node")
            }
            Event::NodeMoved { from, to } => tracing::debug!(
                from = %from.display(),
                to = %to.display(),
                "moved node"
            ),
            Event::NodeRemoved { path, count } => {
                tracing::debug!(path = %path.display(), count, "removed subtree")
            }
        }
    }
}
