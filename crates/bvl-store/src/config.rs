use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};

/// Blob store settings, loadable from TOML.
///
/// ```toml
/// root = "/projects/show/.bvl/blobs"
/// verify_existing = false
/// parallel = true
/// max_threads = 8
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlobStoreConfig {
    /// Directory holding the shard subdirectories.
    pub root: PathBuf,
    /// Compare an already-present blob against the source before counting
    /// it as stored. Off by default: an existing address is trusted.
    pub verify_existing: bool,
    /// Run per-item copies on a worker pool.
    pub parallel: bool,
    /// Pool size when `parallel` is set. `None` lets rayon decide.
    pub max_threads: Option<usize>,
}

impl Default for BlobStoreConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from(".bvl/blobs"),
            verify_existing: false,
            parallel: false,
            max_threads: None,
        }
    }
}

impl BlobStoreConfig {
    /// Config with defaults for everything but the root.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }

    /// Parse from a TOML document. Missing keys take their defaults.
    pub fn from_toml_str(s: &str) -> StoreResult<Self> {
        toml::from_str(s).map_err(|e| StoreError::Config(e.to_string()))
    }

    /// Read and parse a TOML file.
    pub fn load(path: &Path) -> StoreResult<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }
}
