//! Arcade Pool - gameplay spawn layer for a vertical arcade game
//!
//! Core modules:
//! - `pool`: Per-kind instance pools with non-repeating random selection
//! - `rng`: Seeded random source shared across the session
//! - `events`: Synchronous publish/subscribe bus
//! - `spawn`: Places pooled objects in the playfield and sweeps them back
//! - `lives`: Life total driven by bus events
//! - `tuning`: Data-driven game balance

pub mod events;
pub mod lives;
pub mod pool;
pub mod rng;
pub mod spawn;
pub mod tuning;

pub use events::{EventArgs, EventBus, GameBus, GameEvent};
pub use pool::{KindDef, KindId, PoolCatalog, PoolError, PooledHandle};
pub use rng::{RandomSource, SharedRng};
pub use spawn::{Bounds, SpawnChance, Spawner};
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (120 Hz)
    pub const SIM_DT: f32 = 1.0 / 120.0;

    /// Redraws allowed when random kind selection lands on the previous kind
    pub const REPEAT_RETRY_BUDGET: u32 = 8;

    /// Seed used when tuning doesn't name one
    pub const DEFAULT_SEED: u64 = 0x5EED_B10C;
}
