//! The workspace scan result consumed by the blob store and tree builder.
//!
//! A [`WorkspaceHash`] maps each tracked file's logical relative path to the
//! digest of its content and its absolute location on disk. Keys are never
//! interpreted by the blob store; only the entries are.

use std::collections::btree_map;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::hash::ContentHash;

/// One tracked file at scan time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceEntry {
    /// Digest of the file content.
    #[serde(rename = "hash")]
    pub content_hash: ContentHash,
    /// Location of the file in the workspace.
    pub absolute_path: PathBuf,
}

impl WorkspaceEntry {
    /// Create a new entry.
    pub fn new(content_hash: ContentHash, absolute_path: impl Into<PathBuf>) -> Self {
        Self {
            content_hash,
            absolute_path: absolute_path.into(),
        }
    }
}

/// Logical relative path → [`WorkspaceEntry`], ordered by path.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkspaceHash {
    entries: BTreeMap<String, WorkspaceEntry>,
}

impl WorkspaceHash {
    /// Create an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the entry for `key`, returning the previous one.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        entry: WorkspaceEntry,
    ) -> Option<WorkspaceEntry> {
        self.entries.insert(key.into(), entry)
    }

    /// Hash the file at `absolute_path` and record it under `key`.
    pub fn insert_file(
        &mut self,
        key: impl Into<String>,
        absolute_path: impl AsRef<Path>,
    ) -> Result<ContentHash, TypeError> {
        let absolute_path = absolute_path.as_ref();
        let hash = ContentHash::digest_file(absolute_path)?;
        self.insert(key, WorkspaceEntry::new(hash.clone(), absolute_path));
        Ok(hash)
    }

    /// Entry recorded under `key`.
    pub fn get(&self, key: &str) -> Option<&WorkspaceEntry> {
        self.entries.get(key)
    }

    /// Drop the entry under `key` and return it.
    pub fn remove(&mut self, key: &str) -> Option<WorkspaceEntry> {
        self.entries.remove(key)
    }

    /// Whether `key` is tracked.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of tracked files.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no file is tracked.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate `(key, entry)` pairs in key order.
    pub fn iter(&self) -> btree_map::Iter<'_, String, WorkspaceEntry> {
        self.entries.iter()
    }

    /// Iterate entries in key order.
    pub fn entries(&self) -> btree_map::Values<'_, String, WorkspaceEntry> {
        self.entries.values()
    }
}

impl FromIterator<(String, WorkspaceEntry)> for WorkspaceHash {
    fn from_iter<I: IntoIterator<Item = (String, WorkspaceEntry)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a WorkspaceHash {
    type Item = (&'a String, &'a WorkspaceEntry);
    type IntoIter = btree_map::Iter<'a, String, WorkspaceEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
