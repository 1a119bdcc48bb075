//! Content-addressed blob storage for binvcs.
//!
//! File content is stored whole, keyed by its [`ContentHash`], under a blob
//! root laid out in two-character shard directories:
//!
//! ```text
//! <root>/
//!   2a/
//!     ae6c35c94fcfb415dbe95f408b9ce91ee846ed
//! ```
//!
//! # Design Rules
//!
//! 1. The logical workspace path is never part of the storage key.
//! 2. A blob that already exists is never overwritten or recopied.
//! 3. Extraction always overwrites the workspace file.
//! 4. Batches continue on error; a failed item is reported by omission
//!    (and by [`SkipReason`] in the [`TransferReport`]).
//! 5. Presence is checked on the filesystem; nothing is cached in memory.
//!
//! [`ContentHash`]: bvl_types::ContentHash

pub mod blob;
pub mod config;
mod copy;
pub mod error;
pub mod report;

pub use blob::BlobStore;
pub use config::BlobStoreConfig;
pub use error::{StoreError, StoreResult};
pub use report::{ItemOutcome, SkipReason, TransferReport};
