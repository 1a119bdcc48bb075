//! Filesystem blob store.
//!
//! Blobs live at `<root>/<shard>/<name>` where shard and name come from
//! [`BlobAddress`]. Presence is always checked against the filesystem; no
//! in-memory index is kept.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use bvl_types::{
    BatchKind, BlobAddress, ContentHash, Event, NoopObserver, Observer, WorkspaceEntry,
    WorkspaceHash, SHARD_PREFIX_LEN,
};
use rayon::prelude::*;
use rayon::ThreadPool;

use crate::config::BlobStoreConfig;
use crate::copy::{copy_file, same_content, CopyError, Publish, Published};
use crate::error::{StoreError, StoreResult};
use crate::report::{ItemOutcome, SkipReason, TransferReport};

/// Content-addressed store of whole file blobs.
///
/// Batch operations are best effort: a failing item never aborts the batch
/// and is left out of the returned list. Compare the result against the
/// input (or inspect [`TransferReport`]) to detect partial failure.
///
/// The blob root is assumed to be owned by the caller for the duration of
/// a call. There is no locking against other writers.
pub struct BlobStore {
    config: BlobStoreConfig,
    pool: Option<ThreadPool>,
    observer: Arc<dyn Observer>,
}

impl BlobStore {
    /// Sequential store rooted at `blob_dir` with default settings.
    pub fn open(blob_dir: impl Into<PathBuf>) -> Self {
        Self {
            config: BlobStoreConfig::new(blob_dir),
            pool: None,
            observer: Arc::new(NoopObserver),
        }
    }

    /// Store built from a full configuration.
    ///
    /// Fails only if `parallel` is set and the worker pool cannot be built.
    pub fn with_config(config: BlobStoreConfig) -> StoreResult<Self> {
        let pool = if config.parallel {
            let mut builder = rayon::ThreadPoolBuilder::new()
                .thread_name(|i| format!("bvl-blob-{i}"));
            if let Some(n) = config.max_threads {
                builder = builder.num_threads(n);
            }
            Some(
                builder
                    .build()
                    .map_err(|e| StoreError::ThreadPool(e.to_string()))?,
            )
        } else {
            None
        };
        tracing::debug!(
            root = %config.root.display(),
            threads = pool.as_ref().map_or(1, ThreadPool::current_num_threads),
            verify_existing = config.verify_existing,
            "opened blob store"
        );
        Ok(Self {
            config,
            pool,
            observer: Arc::new(NoopObserver),
        })
    }

    /// Report events to `observer` instead of discarding them.
    pub fn with_observer(mut self, observer: Arc<dyn Observer>) -> Self {
        self.observer = observer;
        self
    }

    /// Root directory holding the shards.
    pub fn blob_dir(&self) -> &Path {
        &self.config.root
    }

    /// Settings the store was built with.
    pub fn config(&self) -> &BlobStoreConfig {
        &self.config
    }

    /// Where the blob for `hash` lives (whether or not it exists).
    pub fn address_of(&self, hash: &ContentHash) -> PathBuf {
        BlobAddress::from_hash(hash).path_under(&self.config.root)
    }

    /// Whether a blob for `hash` is present on disk.
    pub fn contains(&self, hash: &ContentHash) -> bool {
        self.address_of(hash).is_file()
    }

    /// Every hash with a blob under the root, sorted.
    ///
    /// Entries that do not look like blobs (stray files, leftover temp
    /// files) are ignored.
    pub fn hashes(&self) -> StoreResult<Vec<ContentHash>> {
        let mut hashes = Vec::new();
        let root = &self.config.root;
        if !root.exists() {
            return Ok(hashes);
        }
        for shard in fs::read_dir(root)? {
            let shard = shard?;
            if !shard.file_type()?.is_dir() {
                continue;
            }
            let shard_name = shard.file_name();
            let Some(prefix) = shard_name.to_str() else {
                continue;
            };
            if prefix.len() != SHARD_PREFIX_LEN {
                continue;
            }
            for blob in fs::read_dir(shard.path())? {
                let blob = blob?;
                if !blob.file_type()?.is_file() {
                    continue;
                }
                let Some(rest) = blob.file_name().to_str().map(str::to_owned) else {
                    continue;
                };
                if let Ok(hash) = ContentHash::new(format!("{prefix}{rest}")) {
                    hashes.push(hash);
                }
            }
        }
        hashes.sort();
        Ok(hashes)
    }

    // ---------------------------------------------------------------
    // Batch operations
    // ---------------------------------------------------------------

    /// Copy workspace files into the store.
    ///
    /// Returns the blob address of every entry that is now stored, including
    /// entries whose blob was already present. Entries whose source file is
    /// missing or could not be copied are omitted.
    pub fn store(&self, workspace_hash: &WorkspaceHash) -> Vec<PathBuf> {
        self.store_report(workspace_hash).into_paths()
    }

    /// Materialise blobs into the workspace, overwriting existing files.
    ///
    /// Returns every workspace path that now holds its revision content.
    /// Entries whose blob is missing or could not be copied are omitted.
    pub fn extract(&self, workspace_hash: &WorkspaceHash) -> Vec<PathBuf> {
        self.extract_report(workspace_hash).into_paths()
    }

    /// [`store`](Self::store) with per-item outcomes.
    pub fn store_report(&self, workspace_hash: &WorkspaceHash) -> TransferReport {
        self.run_batch(BatchKind::Store, workspace_hash, |key, entry| {
            self.store_item(key, entry)
        })
    }

    /// [`extract`](Self::extract) with per-item outcomes.
    pub fn extract_report(&self, workspace_hash: &WorkspaceHash) -> TransferReport {
        self.run_batch(BatchKind::Extract, workspace_hash, |key, entry| {
            self.extract_item(key, entry)
        })
    }

    fn run_batch<F>(
        &self,
        kind: BatchKind,
        workspace_hash: &WorkspaceHash,
        item: F,
    ) -> TransferReport
    where
        F: Fn(&str, &WorkspaceEntry) -> ItemOutcome + Sync,
    {
        let outcomes: Vec<ItemOutcome> = match &self.pool {
            Some(pool) => {
                let items: Vec<(&String, &WorkspaceEntry)> = workspace_hash.iter().collect();
                pool.install(|| {
                    items
                        .par_iter()
                        .map(|(key, entry)| item(key, entry))
                        .collect::<Vec<_>>()
                })
            }
            None => workspace_hash
                .iter()
                .map(|(key, entry)| item(key, entry))
                .collect(),
        };

        let report = TransferReport::new(kind, outcomes);
        if self.observer.enabled() {
            for outcome in report.skipped() {
                if let Some(reason) = outcome.skip_reason() {
                    self.observer.observe(&Event::ItemSkipped {
                        batch: kind,
                        key: outcome.key(),
                        path: outcome.path(),
                        reason: &reason.to_string(),
                    });
                }
            }
            self.observer.observe(&Event::BatchFinished {
                batch: kind,
                requested: report.requested(),
                succeeded: report.succeeded_count(),
            });
        }
        report
    }

    fn store_item(&self, key: &str, entry: &WorkspaceEntry) -> ItemOutcome {
        let hash = &entry.content_hash;
        let source = &entry.absolute_path;
        let address = self.address_of(hash);

        if !source.exists() {
            return skipped(key, source, SkipReason::SourceMissing);
        }

        if address.exists() {
            return self.cache_hit(key, hash, source, address);
        }

        match copy_file(source, &address, Publish::NoClobber) {
            Ok(Published::Written) => {
                if self.observer.enabled() {
                    self.observer.observe(&Event::BlobStored {
                        hash,
                        source,
                        address: &address,
                    });
                }
                ItemOutcome::Copied {
                    key: key.to_string(),
                    path: address,
                }
            }
            // Lost a race with another writer of the same content.
            Ok(Published::AlreadyPresent) => self.cache_hit(key, hash, source, address),
            Err(e) => skipped(key, source, copy_reason(e)),
        }
    }

    fn cache_hit(
        &self,
        key: &str,
        hash: &ContentHash,
        source: &Path,
        address: PathBuf,
    ) -> ItemOutcome {
        if self.config.verify_existing {
            match same_content(source, &address) {
                Ok(true) => {}
                Ok(false) => return skipped(key, source, SkipReason::ContentMismatch),
                Err(e) => return skipped(key, source, SkipReason::Verify(e.to_string())),
            }
        }
        if self.observer.enabled() {
            self.observer.observe(&Event::BlobCacheHit {
                hash,
                address: &address,
            });
        }
        ItemOutcome::CacheHit {
            key: key.to_string(),
            path: address,
        }
    }

    fn extract_item(&self, key: &str, entry: &WorkspaceEntry) -> ItemOutcome {
        let hash = &entry.content_hash;
        let target = &entry.absolute_path;
        let address = self.address_of(hash);

        if !address.exists() {
            return skipped(key, target, SkipReason::BlobMissing);
        }

        match copy_file(&address, target, Publish::Replace) {
            Ok(_) => {
                if self.observer.enabled() {
                    self.observer.observe(&Event::BlobExtracted { hash, target });
                }
                ItemOutcome::Copied {
                    key: key.to_string(),
                    path: target.clone(),
                }
            }
            Err(e) => skipped(key, target, copy_reason(e)),
        }
    }
}

fn skipped(key: &str, path: &Path, reason: SkipReason) -> ItemOutcome {
    ItemOutcome::Skipped {
        key: key.to_string(),
        path: path.to_path_buf(),
        reason,
    }
}

fn copy_reason(e: CopyError) -> SkipReason {
    match e {
        CopyError::CreateDir(e) => SkipReason::CreateDir(e.to_string()),
        CopyError::Copy(e) => SkipReason::Copy(e.to_string()),
    }
}

impl fmt::Debug for BlobStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlobStore")
            .field("root", &self.config.root)
            .field("verify_existing", &self.config.verify_existing)
            .field("parallel", &self.pool.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::time::SystemTime;

    use tempfile::TempDir;

    struct Fixture {
        _dir: TempDir,
        blobs: PathBuf,
        ws: PathBuf,
    }

    fn fixture() -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let blobs = dir.path().join("blobs");
        let ws = dir.path().join("workspace");
        fs::create_dir_all(&ws).unwrap();
        Fixture {
            _dir: dir,
            blobs,
            ws,
        }
    }

    /// Write `content` under the workspace and record it in `wh`.
    fn add_file(wh: &mut WorkspaceHash, ws: &Path, rel: &str, content: &[u8]) -> ContentHash {
        let path = ws.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, content).unwrap();
        wh.insert_file(rel, &path).unwrap()
    }

    fn sample(fx: &Fixture) -> WorkspaceHash {
        let mut wh = WorkspaceHash::new();
        add_file(&mut wh, &fx.ws, "medRes/asset.ma", b"med asset");
        add_file(&mut wh, &fx.ws, "medRes/asset.rig.ma", b"med rig");
        add_file(&mut wh, &fx.ws, "medRes/textures/tex_1.tif", b"tex one");
        add_file(&mut wh, &fx.ws, "proxyRes/asset.ma", b"proxy asset");
        wh
    }

    #[derive(Default)]
    struct Recorder(Mutex<Vec<String>>);

    impl Observer for Recorder {
        fn observe(&self, event: &Event<'_>) {
            let tag = match event {
                Event::BlobStored { .. } => "stored",
                Event::BlobCacheHit { .. } => "hit",
                Event::BlobExtracted { .. } => "extracted",
                Event::ItemSkipped { .. } => "skipped",
                Event::BatchFinished { .. } => "finished",
                _ => "other",
            };
            self.0.lock().unwrap().push(tag.to_string());
        }
    }

    // -----------------------------------------------------------------------
    // Addressing
    // -----------------------------------------------------------------------

    #[test]
    fn address_uses_shard_layout() {
        let store = BlobStore::open("/blobs");
        let hash = ContentHash::new("2aae6c35c94fcfb415dbe95f408b9ce91ee846ed").unwrap();
        assert_eq!(
            store.address_of(&hash),
            Path::new("/blobs/2a/ae6c35c94fcfb415dbe95f408b9ce91ee846ed")
        );
    }

    // -----------------------------------------------------------------------
    // store
    // -----------------------------------------------------------------------

    #[test]
    fn store_copies_every_present_file() {
        let fx = fixture();
        let wh = sample(&fx);
        let store = BlobStore::open(&fx.blobs);

        let stored = store.store(&wh);
        assert_eq!(stored.len(), 4);
        for entry in wh.entries() {
            let address = store.address_of(&entry.content_hash);
            assert!(stored.contains(&address));
            assert_eq!(fs::read(&address).unwrap(), fs::read(&entry.absolute_path).unwrap());
            assert!(store.contains(&entry.content_hash));
        }
    }

    #[test]
    fn store_empty_batch_returns_empty() {
        let fx = fixture();
        let store = BlobStore::open(&fx.blobs);
        assert!(store.store(&WorkspaceHash::new()).is_empty());
        assert!(store.extract(&WorkspaceHash::new()).is_empty());
    }

    #[test]
    fn store_skips_missing_sources() {
        let fx = fixture();
        let mut wh = sample(&fx);
        for i in 0..3 {
            wh.insert(
                format!("ghost_{i}.ma"),
                WorkspaceEntry::new(
                    ContentHash::digest(format!("ghost {i}").as_bytes()),
                    fx.ws.join(format!("ghost_{i}.ma")),
                ),
            );
        }
        let store = BlobStore::open(&fx.blobs);

        let report = store.store_report(&wh);
        assert_eq!(report.requested(), 7);
        assert_eq!(report.paths().len(), 4);
        assert_eq!(report.skipped().count(), 3);
        assert!(report
            .skipped()
            .all(|o| o.skip_reason() == Some(&SkipReason::SourceMissing)));
        assert_eq!(store.store(&wh).len(), 7 - 3);
    }

    #[test]
    fn store_is_idempotent_and_does_not_rewrite() {
        let fx = fixture();
        let wh = sample(&fx);
        let store = BlobStore::open(&fx.blobs);

        let first = store.store(&wh);
        let mtimes: Vec<SystemTime> = first
            .iter()
            .map(|p| fs::metadata(p).unwrap().modified().unwrap())
            .collect();

        let report = store.store_report(&wh);
        assert_eq!(report.cache_hits(), 4);
        assert_eq!(report.paths(), first);
        let again: Vec<SystemTime> = first
            .iter()
            .map(|p| fs::metadata(p).unwrap().modified().unwrap())
            .collect();
        assert_eq!(mtimes, again);
    }

    #[test]
    fn existing_blob_is_trusted_by_default() {
        let fx = fixture();
        let mut wh = WorkspaceHash::new();
        let hash = add_file(&mut wh, &fx.ws, "a.ma", b"real content");
        let store = BlobStore::open(&fx.blobs);

        let address = store.address_of(&hash);
        fs::create_dir_all(address.parent().unwrap()).unwrap();
        fs::write(&address, b"something else").unwrap();

        assert_eq!(store.store(&wh), vec![address.clone()]);
        assert_eq!(fs::read(&address).unwrap(), b"something else");
    }

    #[test]
    fn verify_existing_reports_mismatch_without_overwriting() {
        let fx = fixture();
        let mut wh = WorkspaceHash::new();
        let hash = add_file(&mut wh, &fx.ws, "a.ma", b"real content");
        add_file(&mut wh, &fx.ws, "b.ma", b"fine");
        let mut config = BlobStoreConfig::new(&fx.blobs);
        config.verify_existing = true;
        let store = BlobStore::with_config(config).unwrap();
        store.store(&wh);

        let address = store.address_of(&hash);
        fs::write(&address, b"corrupted").unwrap();

        let report = store.store_report(&wh);
        assert_eq!(report.paths().len(), 1);
        let bad: Vec<&ItemOutcome> = report.skipped().collect();
        assert_eq!(bad.len(), 1);
        assert_eq!(bad[0].key(), "a.ma");
        assert_eq!(bad[0].skip_reason(), Some(&SkipReason::ContentMismatch));
        assert_eq!(fs::read(&address).unwrap(), b"corrupted");
    }

    #[cfg(unix)]
    #[test]
    fn verify_existing_reports_unreadable_blob() {
        let fx = fixture();
        let mut wh = WorkspaceHash::new();
        let hash = add_file(&mut wh, &fx.ws, "a.ma", b"real content");
        add_file(&mut wh, &fx.ws, "b.ma", b"fine");
        let mut config = BlobStoreConfig::new(&fx.blobs);
        config.verify_existing = true;
        let store = BlobStore::with_config(config).unwrap();

        // A dangling link occupies the address but cannot be read back.
        let address = store.address_of(&hash);
        fs::create_dir_all(address.parent().unwrap()).unwrap();
        std::os::unix::fs::symlink(fx.ws.join("gone"), &address).unwrap();

        let report = store.store_report(&wh);
        assert_eq!(report.paths().len(), 1);
        let bad: Vec<&ItemOutcome> = report.skipped().collect();
        assert_eq!(bad.len(), 1);
        assert_eq!(bad[0].key(), "a.ma");
        assert!(matches!(bad[0].skip_reason(), Some(SkipReason::Verify(_))));
        assert!(fs::symlink_metadata(&address).unwrap().file_type().is_symlink());
    }

    #[test]
    fn duplicate_content_shares_one_blob() {
        let fx = fixture();
        let mut wh = WorkspaceHash::new();
        let h1 = add_file(&mut wh, &fx.ws, "medRes/asset.ma", b"same bytes");
        let h2 = add_file(&mut wh, &fx.ws, "proxyRes/asset.ma", b"same bytes");
        assert_eq!(h1, h2);
        let store = BlobStore::open(&fx.blobs);

        let report = store.store_report(&wh);
        assert_eq!(report.paths().len(), 2);
        assert_eq!(report.cache_hits(), 1);
        assert_eq!(store.hashes().unwrap(), vec![h1]);
    }

    #[test]
    fn shard_blocked_by_file_skips_only_that_item() {
        let fx = fixture();
        let wh = sample(&fx);
        let store = BlobStore::open(&fx.blobs);

        let victim = wh.get("medRes/asset.ma").unwrap().content_hash.clone();
        let shard = store.address_of(&victim).parent().unwrap().to_path_buf();
        fs::create_dir_all(&fx.blobs).unwrap();
        fs::write(&shard, b"blocks the shard directory").unwrap();

        let report = store.store_report(&wh);
        let blocked: Vec<&ItemOutcome> = report.skipped().collect();
        assert!(!blocked.is_empty());
        assert!(blocked
            .iter()
            .all(|o| matches!(o.skip_reason(), Some(SkipReason::CreateDir(_)))));
        assert!(blocked.iter().any(|o| o.key() == "medRes/asset.ma"));
        assert_eq!(report.paths().len() + blocked.len(), 4);
    }

    // -----------------------------------------------------------------------
    // extract
    // -----------------------------------------------------------------------

    #[test]
    fn store_then_extract_roundtrip() {
        let fx = fixture();
        let wh = sample(&fx);
        let store = BlobStore::open(&fx.blobs);
        store.store(&wh);

        let checkout = fx.ws.parent().unwrap().join("checkout");
        let retargeted: WorkspaceHash = wh
            .iter()
            .map(|(key, entry)| {
                (
                    key.clone(),
                    WorkspaceEntry::new(entry.content_hash.clone(), checkout.join(key)),
                )
            })
            .collect();

        let extracted = store.extract(&retargeted);
        assert_eq!(extracted.len(), 4);
        for (key, entry) in wh.iter() {
            assert_eq!(
                fs::read(checkout.join(key)).unwrap(),
                fs::read(&entry.absolute_path).unwrap()
            );
        }
    }

    #[test]
    fn extract_overwrites_workspace_content() {
        let fx = fixture();
        let wh = sample(&fx);
        let store = BlobStore::open(&fx.blobs);
        store.store(&wh);

        let target = fx.ws.join("medRes/asset.ma");
        fs::write(&target, b"local edits that must be discarded").unwrap();

        let extracted = store.extract(&wh);
        assert!(extracted.contains(&target));
        assert_eq!(fs::read(&target).unwrap(), b"med asset");
    }

    #[test]
    fn extract_skips_missing_blobs() {
        let fx = fixture();
        let wh = sample(&fx);
        let store = BlobStore::open(&fx.blobs);

        let mut partial = WorkspaceHash::new();
        let (key, entry) = wh.iter().next().unwrap();
        partial.insert(key.clone(), entry.clone());
        store.store(&partial);

        let report = store.extract_report(&wh);
        assert_eq!(report.paths(), vec![entry.absolute_path.clone()]);
        assert_eq!(report.skipped().count(), 3);
        assert!(report
            .skipped()
            .all(|o| o.skip_reason() == Some(&SkipReason::BlobMissing)));
    }

    #[test]
    fn extract_blocked_target_dir_skips_only_that_item() {
        let fx = fixture();
        let mut wh = WorkspaceHash::new();
        add_file(&mut wh, &fx.ws, "a.ma", b"scene a");
        add_file(&mut wh, &fx.ws, "sub/b.ma", b"scene b");
        BlobStore::open(&fx.blobs).store(&wh);

        let out = fx.ws.parent().unwrap().join("out");
        fs::create_dir_all(&out).unwrap();
        fs::write(out.join("sub"), b"blocks the sub directory").unwrap();
        let retargeted: WorkspaceHash = wh
            .iter()
            .map(|(key, entry)| {
                (
                    key.clone(),
                    WorkspaceEntry::new(entry.content_hash.clone(), out.join(key)),
                )
            })
            .collect();

        let mut config = BlobStoreConfig::new(&fx.blobs);
        config.parallel = true;
        config.max_threads = Some(2);
        let parallel = BlobStore::with_config(config).unwrap();
        let sequential = BlobStore::open(&fx.blobs);

        for store in [&sequential, &parallel] {
            let report = store.extract_report(&retargeted);
            assert_eq!(report.paths(), vec![out.join("a.ma")]);
            let blocked: Vec<&ItemOutcome> = report.skipped().collect();
            assert_eq!(blocked.len(), 1);
            assert_eq!(blocked[0].key(), "sub/b.ma");
            assert!(matches!(blocked[0].skip_reason(), Some(SkipReason::CreateDir(_))));
        }
        assert_eq!(fs::read(out.join("a.ma")).unwrap(), b"scene a");
        assert_eq!(sequential.extract(&retargeted), parallel.extract(&retargeted));
    }

    // -----------------------------------------------------------------------
    // Parallel mode
    // -----------------------------------------------------------------------

    #[test]
    fn parallel_matches_sequential() {
        let fx = fixture();
        let mut wh = WorkspaceHash::new();
        for i in 0..64 {
            let content = format!("texture {}", i % 40);
            add_file(&mut wh, &fx.ws, &format!("tex/tex_{i:03}.tif"), content.as_bytes());
        }
        wh.insert(
            "missing.tif",
            WorkspaceEntry::new(ContentHash::digest(b"nope"), fx.ws.join("missing.tif")),
        );

        let mut config = BlobStoreConfig::new(&fx.blobs);
        config.parallel = true;
        config.max_threads = Some(4);
        let parallel = BlobStore::with_config(config).unwrap();
        let par_report = parallel.store_report(&wh);

        let sequential = BlobStore::open(&fx.blobs);
        let seq_report = sequential.store_report(&wh);

        assert_eq!(par_report.paths(), seq_report.paths());
        assert_eq!(par_report.paths().len(), 64);
        assert_eq!(seq_report.cache_hits(), 64);
        assert_eq!(parallel.hashes().unwrap().len(), 40);
    }

    // -----------------------------------------------------------------------
    // Observer and listing
    // -----------------------------------------------------------------------

    #[test]
    fn observer_sees_each_item_and_summary() {
        let fx = fixture();
        let mut wh = sample(&fx);
        wh.insert(
            "ghost.ma",
            WorkspaceEntry::new(ContentHash::digest(b"ghost"), fx.ws.join("ghost.ma")),
        );
        let recorder = Arc::new(Recorder::default());
        let store = BlobStore::open(&fx.blobs).with_observer(recorder.clone());

        store.store(&wh);
        store.extract(&wh);

        let seen = recorder.0.lock().unwrap();
        assert_eq!(seen.iter().filter(|t| *t == "stored").count(), 4);
        assert_eq!(seen.iter().filter(|t| *t == "extracted").count(), 4);
        assert_eq!(seen.iter().filter(|t| *t == "skipped").count(), 2);
        assert_eq!(seen.iter().filter(|t| *t == "finished").count(), 2);
    }

    #[test]
    fn hashes_of_empty_or_missing_root() {
        let fx = fixture();
        let store = BlobStore::open(&fx.blobs);
        assert!(store.hashes().unwrap().is_empty());
    }

    #[test]
    fn hashes_ignore_foreign_entries() {
        let fx = fixture();
        let wh = sample(&fx);
        let store = BlobStore::open(&fx.blobs);
        store.store(&wh);
        fs::write(fx.blobs.join("README"), b"not a shard").unwrap();
        fs::create_dir_all(fx.blobs.join("zzz")).unwrap();
        fs::write(fx.blobs.join("zzz").join("abc"), b"wrong shard width").unwrap();

        let mut expected: Vec<ContentHash> =
            wh.entries().map(|e| e.content_hash.clone()).collect();
        expected.sort();
        assert_eq!(store.hashes().unwrap(), expected);
    }

    #[test]
    fn debug_format() {
        let store = BlobStore::open("/blobs");
        let debug = format!("{store:?}");
        assert!(debug.contains("BlobStore"));
        assert!(debug.contains("parallel: false"));
    }
}
