//! Kind identifiers and definitions

use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::{KindKey, PoolError};

/// Index of a Kind in the catalog's ordered list
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct KindId(pub usize);

impl KindId {
    #[inline]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for KindId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<usize> for KindId {
    fn from(index: usize) -> Self {
        KindId(index)
    }
}

/// Signed indexes come from scripts and tuning files; negatives never name a Kind.
impl TryFrom<i64> for KindId {
    type Error = PoolError;

    fn try_from(index: i64) -> Result<Self, Self::Error> {
        usize::try_from(index)
            .map(KindId)
            .map_err(|_| PoolError::InvalidKind(KindKey::Index(index)))
    }
}

type Factory<T> = Box<dyn FnMut() -> T>;
type Hook<T> = Box<dyn FnMut(&mut T)>;

/// Everything the catalog needs to build and recycle instances of one Kind
pub struct KindDef<T> {
    pub(crate) name: String,
    pub(crate) factory: Factory<T>,
    /// Runs when a previously used instance is checked out again
    pub(crate) reset: Option<Hook<T>>,
    /// Runs whenever an instance becomes available (deactivate, reparent)
    pub(crate) park: Option<Hook<T>>,
}

impl<T> KindDef<T> {
    pub fn new(name: impl Into<String>, factory: impl FnMut() -> T + 'static) -> Self {
        Self {
            name: name.into(),
            factory: Box::new(factory),
            reset: None,
            park: None,
        }
    }

    pub fn with_reset(mut self, reset: impl FnMut(&mut T) + 'static) -> Self {
        self.reset = Some(Box::new(reset));
        self
    }

    pub fn with_park(mut self, park: impl FnMut(&mut T) + 'static) -> Self {
        self.park = Some(Box::new(park));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn build(&mut self) -> T {
        (self.factory)()
    }
}

impl<T> fmt::Debug for KindDef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KindDef")
            .field("name", &self.name)
            .field("reset", &self.reset.is_some())
            .field("park", &self.park.is_some())
            .finish()
    }
}
