//! Foundation types for binvcs, a version-control engine for large binary
//! assets.
//!
//! Every other `bvl-*` crate depends on `bvl-types`. The types here describe
//! the boundary between the workspace hasher, the blob store and the
//! revision tree.
//!
//! # Key Types
//!
//! - [`ContentHash`]: opaque, validated digest string identifying file content
//! - [`BlobAddress`]: shard/name split of a hash, the on-disk blob layout
//! - [`WorkspaceHash`]: logical path → `{hash, absolute_path}` scan result
//! - [`Observer`]: explicit logging seam, [`NoopObserver`] by default

pub mod error;
pub mod hash;
pub mod observe;
pub mod workspace;

pub use error::TypeError;
pub use hash::{BlobAddress, ContentHash, SHARD_PREFIX_LEN};
pub use observe::{BatchKind, Event, NoopObserver, Observer, TracingObserver};
pub use workspace::{WorkspaceEntry, WorkspaceHash};
