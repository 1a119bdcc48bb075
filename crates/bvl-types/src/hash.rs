use std::fmt;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Number of leading hash characters that select a blob's shard directory.
pub const SHARD_PREFIX_LEN: usize = 2;

/// Content-addressed identifier for a file version.
///
/// A `ContentHash` is the digest string produced by the workspace hasher.
/// The store treats it as opaque: equal content is assumed to produce an
/// equal hash, and the string is used verbatim to derive a [`BlobAddress`].
///
/// Construction is the only validation point. A hash must be longer than
/// [`SHARD_PREFIX_LEN`] and consist solely of ASCII alphanumerics, so a
/// digest can never name a location outside the blob root.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContentHash(String);

impl ContentHash {
    /// Validate and wrap a digest string.
    pub fn new(value: impl Into<String>) -> Result<Self, TypeError> {
        let value = value.into();
        if value.is_empty() {
            return Err(TypeError::EmptyHash);
        }
        if let Some(ch) = value.chars().find(|c| !c.is_ascii_alphanumeric()) {
            return Err(TypeError::InvalidHashChar { hash: value, ch });
        }
        if value.len() <= SHARD_PREFIX_LEN {
            return Err(TypeError::HashTooShort {
                len: value.len(),
                min: SHARD_PREFIX_LEN + 1,
            });
        }
        Ok(Self(value))
    }

    /// BLAKE3 hex digest of raw bytes.
    pub fn digest(data: &[u8]) -> Self {
        Self(hex::encode(blake3::hash(data).as_bytes()))
    }

    /// BLAKE3 hex digest of a file, streamed from disk.
    pub fn digest_file(path: &Path) -> Result<Self, TypeError> {
        let mut reader = BufReader::new(File::open(path)?);
        let mut hasher = blake3::Hasher::new();
        io::copy(&mut reader, &mut hasher)?;
        Ok(Self(hex::encode(hasher.finalize().as_bytes())))
    }

    /// The digest string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short representation (first 8 characters) for log lines.
    pub fn short(&self) -> &str {
        &self.0[..self.0.len().min(8)]
    }

    /// The blob address this hash maps to.
    pub fn address(&self) -> BlobAddress {
        BlobAddress::from_hash(self)
    }
}

impl fmt::Debug for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentHash({})", self.short())
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ContentHash {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for ContentHash {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ContentHash> for String {
    fn from(hash: ContentHash) -> Self {
        hash.0
    }
}

impl AsRef<str> for ContentHash {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Storage location of a blob, derived purely from its hash.
///
/// The first [`SHARD_PREFIX_LEN`] characters pick the shard directory and
/// the remainder is the file name inside it. The address carries no
/// identity of its own.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct BlobAddress {
    /// Shard directory name.
    pub shard: String,
    /// Blob file name within the shard.
    pub name: String,
}

impl BlobAddress {
    /// Split a hash into shard prefix and remainder.
    pub fn from_hash(hash: &ContentHash) -> Self {
        // ContentHash is ASCII and longer than the prefix, so this never
        // splits inside a character or yields an empty name.
        let (shard, name) = hash.as_str().split_at(SHARD_PREFIX_LEN);
        Self {
            shard: shard.to_string(),
            name: name.to_string(),
        }
    }

    /// Absolute location of this blob under `root`.
    pub fn path_under(&self, root: &Path) -> PathBuf {
        root.join(&self.shard).join(&self.name)
    }
}

impl From<&ContentHash> for BlobAddress {
    fn from(hash: &ContentHash) -> Self {
        Self::from_hash(hash)
    }
}

impl fmt::Display for BlobAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.shard, self.name)
    }
}
