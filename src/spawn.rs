//! Spawn orchestration on top of the pool
//!
//! Places pooled objects in the playfield, moves them, and returns them to
//! the pool when they are killed or leave the bounds. Also rolls the heart
//! pickup chance.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::events::{EventArgs, GameBus, GameEvent};
use crate::pool::{KindDef, KindId, PoolCatalog, PoolError, PooledHandle, Result};
use crate::rng::SharedRng;
use crate::tuning::Tuning;

/// Chance gate with an optional pity counter
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnChance {
    chance: f64,
    /// Failed rolls after which the next roll always succeeds (0 = never)
    pity_after: u32,
    misses: u32,
}

impl SpawnChance {
    pub fn new(chance: f64, pity_after: u32) -> Self {
        Self {
            chance: if chance.is_nan() {
                0.0
            } else {
                chance.clamp(0.0, 1.0)
            },
            pity_after,
            misses: 0,
        }
    }

    pub fn chance(&self) -> f64 {
        self.chance
    }

    /// Consecutive failed rolls so far
    pub fn misses(&self) -> u32 {
        self.misses
    }

    pub fn roll(&mut self, rng: &mut SharedRng) -> bool {
        let forced = self.pity_after > 0 && self.misses >= self.pity_after;
        if forced || rng.chance(self.chance) {
            self.misses = 0;
            true
        } else {
            self.misses = self.misses.saturating_add(1);
            false
        }
    }
}

/// Playfield rectangle; objects are kept while any part is within `margin` of it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: Vec2,
    pub max: Vec2,
    pub margin: f32,
}

impl Default for Bounds {
    fn default() -> Self {
        Self {
            min: Vec2::new(-240.0, -400.0),
            max: Vec2::new(240.0, 400.0),
            margin: 32.0,
        }
    }
}

impl Bounds {
    pub fn contains(&self, pos: Vec2, radius: f32) -> bool {
        let lo = self.min - Vec2::splat(self.margin + radius);
        let hi = self.max + Vec2::splat(self.margin + radius);
        pos.cmpge(lo).all() && pos.cmple(hi).all()
    }
}

/// A pooled object currently placed in the world
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActiveSpawn {
    pub handle: PooledHandle,
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
}

impl ActiveSpawn {
    pub fn kind(&self) -> KindId {
        self.handle.kind()
    }
}

#[derive(Debug)]
pub struct Spawner<T> {
    catalog: PoolCatalog<T, SharedRng>,
    /// Oldest spawn first
    active: Vec<ActiveSpawn>,
    heart: SpawnChance,
    rng: SharedRng,
}

impl<T> Spawner<T> {
    pub fn new(catalog: PoolCatalog<T, SharedRng>, heart: SpawnChance, rng: SharedRng) -> Self {
        Self {
            catalog,
            active: Vec::new(),
            heart,
            rng,
        }
    }

    /// Build the catalog and heart gate from tuning, sharing `rng` between them
    pub fn from_tuning(kinds: Vec<KindDef<T>>, tuning: &Tuning, rng: &SharedRng) -> Self {
        let catalog =
            PoolCatalog::new(kinds, rng.clone()).with_retry_budget(tuning.repeat_retry_budget);
        let heart = SpawnChance::new(tuning.heart_spawn_chance, tuning.heart_pity_after);
        Self::new(catalog, heart, rng.clone())
    }

    pub fn catalog(&self) -> &PoolCatalog<T, SharedRng> {
        &self.catalog
    }

    pub fn catalog_mut(&mut self) -> &mut PoolCatalog<T, SharedRng> {
        &mut self.catalog
    }

    pub fn active(&self) -> &[ActiveSpawn] {
        &self.active
    }

    pub fn spawn(
        &mut self,
        kind: KindId,
        pos: Vec2,
        vel: Vec2,
        radius: f32,
        bus: &mut GameBus,
    ) -> Result<PooledHandle> {
        let handle = self.catalog.acquire(kind)?;
        self.place(handle, pos, vel, radius, bus);
        Ok(handle)
    }

    /// Spawn a random Kind, never the same Kind as the previous random spawn
    pub fn spawn_random(
        &mut self,
        pos: Vec2,
        vel: Vec2,
        radius: f32,
        bus: &mut GameBus,
    ) -> Result<PooledHandle> {
        let (handle, _) = self.catalog.acquire_random()?;
        self.place(handle, pos, vel, radius, bus);
        Ok(handle)
    }

    pub fn advance(&mut self, dt: f32) {
        for spawn in &mut self.active {
            spawn.pos += spawn.vel * dt;
        }
    }

    /// Return everything outside `bounds` to the pool, raising `EnemyMissed` for each.
    ///
    /// Every out-of-bounds spawn is processed even if one release fails. A spawn
    /// whose handle the catalog no longer has checked out is dropped without an
    /// event, and the first such error is returned after the sweep completes.
    pub fn sweep_out_of_bounds(&mut self, bounds: &Bounds, bus: &mut GameBus) -> Result<usize> {
        let mut outside = Vec::new();
        self.active.retain(|s| {
            let keep = bounds.contains(s.pos, s.radius);
            if !keep {
                outside.push(*s);
            }
            keep
        });

        let mut missed = 0;
        let mut first_err = None;
        for spawn in &outside {
            match self.catalog.release(spawn.handle, spawn.kind()) {
                Ok(()) => {
                    missed += 1;
                    bus.trigger_event(
                        GameEvent::EnemyMissed,
                        EventArgs::at(spawn.kind(), spawn.pos),
                    );
                }
                Err(e) => {
                    log::warn!("Dropping stale spawn {:?}: {}", spawn.handle, e);
                    first_err.get_or_insert(e);
                }
            }
        }
        if missed > 0 {
            log::debug!("Swept {} objects out of bounds", missed);
        }
        match first_err {
            Some(e) => Err(e),
            None => Ok(missed),
        }
    }

    /// Player destroyed `handle`: back to the pool, raising `EnemyKilled`
    pub fn despawn(&mut self, handle: PooledHandle, bus: &mut GameBus) -> Result<()> {
        let index = self
            .active
            .iter()
            .position(|s| s.handle == handle)
            .ok_or(PoolError::UnknownHandle(handle))?;
        self.catalog.release(handle, handle.kind())?;
        let spawn = self.active.remove(index);
        bus.trigger_event(GameEvent::EnemyKilled, EventArgs::at(spawn.kind(), spawn.pos));
        Ok(())
    }

    /// Whether a heart pickup should spawn this time
    pub fn roll_heart(&mut self) -> bool {
        self.heart.roll(&mut self.rng)
    }

    fn place(
        &mut self,
        handle: PooledHandle,
        pos: Vec2,
        vel: Vec2,
        radius: f32,
        bus: &mut GameBus,
    ) {
        self.active.push(ActiveSpawn {
            handle,
            pos,
            vel,
            radius,
        });
        bus.trigger_event(GameEvent::BlockerSpawned, EventArgs::at(handle.kind(), pos));
    }
}
