//! Error type shared by [`SplayTree`](crate::SplayTree) and
//! [`AdaptiveHashMap`](crate::AdaptiveHashMap).
//!
//! Every variant is a caller precondition violation. An operation that
//! returns an error has not modified the structure.

/// Error type for tree and map operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Error {
    /// `insert` found the key already present.
    DuplicateKey,
    /// `peek` or `extract` did not find the key.
    NonexistentKey,
    /// `minimum_key` or `maximum_key` was called on an empty tree.
    EmptyTree,
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::DuplicateKey => f.write_str("duplicate key"),
            Error::NonexistentKey => f.write_str("key does not exist"),
            Error::EmptyTree => f.write_str("tree is empty"),
        }
    }
}

impl std::error::Error for Error {}

/// Result type for tree and map operations.
pub type Result<T> = std::result::Result<T, Error>;
