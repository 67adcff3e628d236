use crate::digest::Digest;

/// Errors returned by the object store and the repository built on top of it.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A path or object id does not exist. Callers are expected to decide on a fallback.
    #[error("not found: {0}")]
    NotFound(String),

    /// The path was empty or contained a segment that cannot be stored in a tree.
    #[error("invalid path: {0:?}")]
    InvalidPath(String),

    /// A commit was requested for something that does not resolve to a stored tree.
    #[error("object {0:x} is not a tree")]
    InvalidTree(Digest),

    /// The branch moved underneath a commit, so advancing it would not be linear.
    #[error("branch {branch} is at {actual}, expected {expected}")]
    InvalidParent {
        branch: String,
        expected: String,
        actual: String,
    },

    /// Another writer holds the lock on a reference.
    #[error("could not acquire lock file `{0}`")]
    Locked(String),

    /// An object on disk could not be decoded.
    #[error("corrupt object {oid:x}: {reason}")]
    Corrupt { oid: Digest, reason: String },

    #[error("storage I/O: {0}")]
    StorageIO(#[from] std::io::Error),

    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn corrupt(oid: &Digest, reason: impl Into<String>) -> Self {
        Self::Corrupt {
            oid: oid.clone(),
            reason: reason.into(),
        }
    }

    /// Returns `true` if this is [`Error::NotFound`].
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(..))
    }
}

pub type Result<T, E = Error> = core::result::Result<T, E>;
