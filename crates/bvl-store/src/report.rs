//! Per-item results of a batch transfer.
//!
//! The plain `store`/`extract` API returns only the paths that made it.
//! [`TransferReport`] keeps the full picture, including why each omitted
//! item was skipped.

use std::fmt;
use std::path::{Path, PathBuf};

use bvl_types::BatchKind;

/// Why a batch item was left out of the result.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SkipReason {
    /// The workspace file named by the entry does not exist.
    SourceMissing,
    /// No blob exists at the entry's address.
    BlobMissing,
    /// The destination directory could not be created.
    CreateDir(String),
    /// Copying or publishing the file failed.
    Copy(String),
    /// Reading an existing blob for verification failed.
    Verify(String),
    /// An existing blob differs from the source it should match.
    ContentMismatch,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SourceMissing => write!(f, "source file missing"),
            Self::BlobMissing => write!(f, "blob missing"),
            Self::CreateDir(e) => write!(f, "cannot create directory: {e}"),
            Self::Copy(e) => write!(f, "copy failed: {e}"),
            Self::Verify(e) => write!(f, "cannot verify existing blob: {e}"),
            Self::ContentMismatch => write!(f, "existing blob differs from source"),
        }
    }
}

/// Outcome of one entry of a batch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ItemOutcome {
    /// Content was written to `path`.
    Copied { key: String, path: PathBuf },
    /// `path` already held the blob; nothing was written.
    CacheHit { key: String, path: PathBuf },
    /// The item was skipped. `path` is the file the operation could not
    /// read or write.
    Skipped {
        key: String,
        path: PathBuf,
        reason: SkipReason,
    },
}

impl ItemOutcome {
    /// Logical key of the workspace entry.
    pub fn key(&self) -> &str {
        match self {
            Self::Copied { key, .. } | Self::CacheHit { key, .. } | Self::Skipped { key, .. } => {
                key
            }
        }
    }

    /// Blob address (store) or workspace file (extract) the item touched.
    pub fn path(&self) -> &Path {
        match self {
            Self::Copied { path, .. }
            | Self::CacheHit { path, .. }
            | Self::Skipped { path, .. } => path,
        }
    }

    /// `true` for copied and cache-hit items.
    pub fn is_success(&self) -> bool {
        !matches!(self, Self::Skipped { .. })
    }

    /// Why the item was skipped, `None` on success.
    pub fn skip_reason(&self) -> Option<&SkipReason> {
        match self {
            Self::Skipped { reason, .. } => Some(reason),
            _ => None,
        }
    }
}

/// All outcomes of one `store` or `extract` call, ordered by key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransferReport {
    kind: BatchKind,
    outcomes: Vec<ItemOutcome>,
}

impl TransferReport {
    /// Build a report. Outcomes are sorted by key so the result does not
    /// depend on the order items finished in.
    pub fn new(kind: BatchKind, mut outcomes: Vec<ItemOutcome>) -> Self {
        outcomes.sort_by(|a, b| a.key().cmp(b.key()));
        Self { kind, outcomes }
    }

    /// Whether this was a store or an extract.
    pub fn kind(&self) -> BatchKind {
        self.kind
    }

    /// Number of entries the batch was asked to process.
    pub fn requested(&self) -> usize {
        self.outcomes.len()
    }

    /// Every outcome, in key order.
    pub fn outcomes(&self) -> &[ItemOutcome] {
        &self.outcomes
    }

    /// Copied and cache-hit items.
    pub fn succeeded(&self) -> impl Iterator<Item = &ItemOutcome> {
        self.outcomes.iter().filter(|o| o.is_success())
    }

    /// Items left out of the result.
    pub fn skipped(&self) -> impl Iterator<Item = &ItemOutcome> {
        self.outcomes.iter().filter(|o| !o.is_success())
    }

    /// Number of copied and cache-hit items.
    pub fn succeeded_count(&self) -> usize {
        self.succeeded().count()
    }

    /// Items that reused an existing blob.
    pub fn cache_hits(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, ItemOutcome::CacheHit { .. }))
            .count()
    }

    /// `true` when no item was skipped.
    pub fn is_complete(&self) -> bool {
        self.outcomes.iter().all(ItemOutcome::is_success)
    }

    /// Paths of every successful item, in key order.
    pub fn paths(&self) -> Vec<PathBuf> {
        self.succeeded().map(|o| o.path().to_path_buf()).collect()
    }

    /// Consume the report into [`paths`](Self::paths).
    pub fn into_paths(self) -> Vec<PathBuf> {
        self.outcomes
            .into_iter()
            .filter_map(|o| match o {
                ItemOutcome::Copied { path, .. } | ItemOutcome::CacheHit { path, .. } => Some(path),
                ItemOutcome::Skipped { .. } => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn copied(key: &str) -> ItemOutcome {
        ItemOutcome::Copied {
            key: key.into(),
            path: PathBuf::from(format!("/blobs/{key}")),
        }
    }

    fn skipped(key: &str, reason: SkipReason) -> ItemOutcome {
        ItemOutcome::Skipped {
            key: key.into(),
            path: PathBuf::from(format!("/ws/{key}")),
            reason,
        }
    }

    #[test]
    fn outcomes_are_sorted_by_key() {
        let report = TransferReport::new(
            BatchKind::Store,
            vec![copied("c"), skipped("a", SkipReason::SourceMissing), copied("b")],
        );
        let keys: Vec<&str> = report.outcomes().iter().map(ItemOutcome::key).collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
    }

    #[test]
    fn paths_omit_skipped_items() {
        let report = TransferReport::new(
            BatchKind::Store,
            vec![
                copied("a"),
                skipped("b", SkipReason::SourceMissing),
                ItemOutcome::CacheHit {
                    key: "c".into(),
                    path: PathBuf::from("/blobs/c"),
                },
            ],
        );
        assert_eq!(report.requested(), 3);
        assert_eq!(report.succeeded_count(), 2);
        assert_eq!(report.cache_hits(), 1);
        assert!(!report.is_complete());
        assert_eq!(
            report.paths(),
            vec![PathBuf::from("/blobs/a"), PathBuf::from("/blobs/c")]
        );
        assert_eq!(report.clone().into_paths(), report.paths());
    }

    #[test]
    fn empty_report_is_complete() {
        let report = TransferReport::new(BatchKind::Extract, Vec::new());
        assert!(report.is_complete());
        assert!(report.paths().is_empty());
        assert_eq!(report.kind(), BatchKind::Extract);
    }

    #[test]
    fn skip_reason_accessor_and_display() {
        let o = skipped("x", SkipReason::Copy("permission denied".into()));
        assert_eq!(
            o.skip_reason(),
            Some(&SkipReason::Copy("permission denied".into()))
        );
        assert_eq!(
            o.skip_reason().unwrap().to_string(),
            "copy failed: permission denied"
        );
        assert!(copied("y").skip_reason().is_none());
        assert_eq!(SkipReason::BlobMissing.to_string(), "blob missing");
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn report_partitions_outcomes(
                items in prop::collection::vec(("[a-z]{1,6}", any::<bool>()), 0..32),
            ) {
                let outcomes: Vec<ItemOutcome> = items
                    .iter()
                    .map(|(key, ok)| {
                        if *ok {
                            copied(key)
                        } else {
                            skipped(key, SkipReason::SourceMissing)
                        }
                    })
                    .collect();
                let report = TransferReport::new(BatchKind::Store, outcomes);

                let ok = items.iter().filter(|(_, ok)| *ok).count();
                prop_assert_eq!(report.requested(), items.len());
                prop_assert_eq!(report.succeeded_count(), ok);
                prop_assert_eq!(report.skipped().count(), items.len() - ok);
                prop_assert_eq!(report.paths().len(), ok);
                prop_assert!(report.outcomes().windows(2).all(|w| w[0].key() <= w[1].key()));
            }
        }
    }
}
