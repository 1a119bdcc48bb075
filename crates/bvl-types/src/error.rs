use thiserror::Error;

/// Contract errors raised when a value of the wrong shape crosses the
/// hasher boundary.
#[derive(Debug, Error)]
pub enum TypeError {
    #[error("content hash is empty")]
    EmptyHash,

    #[error("content hash too short: got {len} characters, need at least {min}")]
    HashTooShort { len: usize, min: usize },

    #[error("content hash {hash:?} contains invalid character {ch:?}")]
    InvalidHashChar { hash: String, ch: char },

    #[error("I/O error while hashing: {0}")]
    Io(#[from] std::io::Error),
}
