/// Errors from blob store setup.
///
/// Batch operations (`store`/`extract`) never return these: per-item
/// failures are reported by omission and in the
/// [`TransferReport`](crate::TransferReport).
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The configuration could not be parsed.
    #[error("invalid blob store config: {0}")]
    Config(String),

    /// The worker pool for parallel transfers could not be built.
    #[error("failed to build transfer pool: {0}")]
    ThreadPool(String),

    /// I/O error while reading configuration or inspecting a blob.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
