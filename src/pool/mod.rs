//! Spawn pool
//!
//! A fixed, ordered catalog of spawnable Kinds. Each Kind owns a FIFO queue
//! of parked instances that grows on demand and never shrinks. Instances are
//! handed out by Kind or by random Kind selection that never repeats the
//! previous random pick.

pub mod catalog;
pub mod error;
pub mod kind;

pub use catalog::{PoolCatalog, PooledHandle};
pub use error::{KindKey, PoolError, Result};
pub use kind::{KindDef, KindId};
