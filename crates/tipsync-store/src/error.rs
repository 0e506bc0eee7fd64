//! Error types for repository and mailbox operations.

use thiserror::Error;

/// Errors reported by a [`RepositoryPort`](crate::RepositoryPort) or
/// [`NotificationPort`](crate::NotificationPort).
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The commit is not part of the branch history.
    #[error("commit {commit} not found on branch {branch}")]
    UnknownCommit { branch: String, commit: String },

    /// The backend cannot resolve this kind of tip reference.
    #[error("unsupported tip reference: {0}")]
    UnsupportedRef(String),

    /// `from` lies after `to` in the branch history.
    #[error("{from} is not an ancestor of {to} on branch {branch}")]
    NotAncestor { branch: String, from: String, to: String },

    /// The pack bytes could not be interpreted.
    #[error("corrupt pack: {0}")]
    CorruptPack(String),

    /// The pack does not lead to the announced last commit.
    #[error("pack ends at {actual}, expected {expected}")]
    TipMismatch { expected: String, actual: String },

    /// Storage backend failure.
    #[error("backend error: {0}")]
    Backend(String),
}

/// Convenience type alias for repository operations.
pub type RepositoryResult<T> = std::result::Result<T, RepositoryError>;
