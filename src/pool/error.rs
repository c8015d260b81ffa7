//! Pool error taxonomy

use std::fmt;

use super::PooledHandle;

/// How a caller addressed a Kind that turned out not to exist
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KindKey {
    Index(i64),
    Name(String),
}

impl fmt::Display for KindKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KindKey::Index(i) => write!(f, "index {i}"),
            KindKey::Name(name) => write!(f, "name {name:?}"),
        }
    }
}

/// Errors reported by [`PoolCatalog`](super::PoolCatalog).
///
/// Every variant is returned before the catalog mutates anything, so a
/// failed call leaves queues, slots and the selection memo untouched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PoolError {
    #[error("no kind with {0} in catalog")]
    InvalidKind(KindKey),
    #[error("random acquisition on a catalog with no kinds")]
    EmptyCatalog,
    #[error("handle {0:?} is already available")]
    AlreadyReleased(PooledHandle),
    #[error("handle {0:?} was not created by this catalog")]
    UnknownHandle(PooledHandle),
    #[error("handle {handle:?} released as kind {released_as}")]
    KindMismatch {
        handle: PooledHandle,
        released_as: usize,
    },
}

pub type Result<T> = std::result::Result<T, PoolError>;
