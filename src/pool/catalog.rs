//! Pool catalog: per-Kind instance queues and repeat-avoiding random selection

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use super::error::{KindKey, PoolError, Result};
use super::kind::{KindDef, KindId};
use crate::consts::REPEAT_RETRY_BUDGET;
use crate::rng::{RandomSource, SharedRng};

/// Reference to one pooled instance.
///
/// Copyable so game code can stash it alongside transforms; the catalog
/// tracks whether it is currently checked out and rejects stale use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PooledHandle {
    kind: KindId,
    slot: u32,
}

impl PooledHandle {
    #[inline]
    pub fn kind(&self) -> KindId {
        self.kind
    }

    /// Catalog-wide slot number (unique per created instance)
    #[inline]
    pub fn slot(&self) -> u32 {
        self.slot
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SlotState {
    Available,
    CheckedOut,
}

#[derive(Debug)]
struct Slot<T> {
    kind: KindId,
    state: SlotState,
    /// Times this instance has been checked out
    uses: u32,
    value: T,
}

/// Fixed catalog of Kinds, each backed by a reusable instance queue
pub struct PoolCatalog<T, R = SharedRng> {
    kinds: Vec<KindDef<T>>,
    /// Available slots per Kind, oldest release first
    queues: Vec<VecDeque<u32>>,
    /// Created instances per Kind
    created: Vec<usize>,
    slots: Vec<Slot<T>>,
    rng: R,
    last_selected: Option<KindId>,
    retry_budget: u32,
}

impl<T, R: RandomSource> PoolCatalog<T, R> {
    /// Build the catalog and park one instance of every Kind
    pub fn new(kinds: Vec<KindDef<T>>, rng: R) -> Self {
        let count = kinds.len();
        let mut catalog = Self {
            kinds,
            queues: (0..count).map(|_| VecDeque::new()).collect(),
            created: vec![0; count],
            slots: Vec::with_capacity(count),
            rng,
            last_selected: None,
            retry_budget: REPEAT_RETRY_BUDGET,
        };

        for index in 0..count {
            let slot = catalog.grow(KindId(index));
            catalog.park(slot);
        }

        log::info!(
            "Pool catalog ready: {} kinds [{}]",
            count,
            catalog
                .kinds
                .iter()
                .map(KindDef::name)
                .collect::<Vec<_>>()
                .join(", ")
        );
        catalog
    }

    /// Redraws allowed before falling back to a direct pick among the other Kinds
    pub fn with_retry_budget(mut self, budget: u32) -> Self {
        self.retry_budget = budget;
        self
    }

    pub fn retry_budget(&self) -> u32 {
        self.retry_budget
    }

    pub fn kind_count(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    pub fn kind_name(&self, kind: KindId) -> Result<&str> {
        self.check_kind(kind)?;
        Ok(self.kinds[kind.0].name())
    }

    /// Resolve a symbolic key to its index
    pub fn kind_id(&self, name: &str) -> Result<KindId> {
        self.kinds
            .iter()
            .position(|k| k.name() == name)
            .map(KindId)
            .ok_or_else(|| PoolError::InvalidKind(KindKey::Name(name.to_string())))
    }

    /// Parked instances of `kind`
    pub fn available(&self, kind: KindId) -> Result<usize> {
        self.check_kind(kind)?;
        Ok(self.queues[kind.0].len())
    }

    /// Instances of `kind` ever created (eager one included)
    pub fn created(&self, kind: KindId) -> Result<usize> {
        self.check_kind(kind)?;
        Ok(self.created[kind.0])
    }

    /// Instances of `kind` currently checked out
    pub fn outstanding(&self, kind: KindId) -> Result<usize> {
        self.check_kind(kind)?;
        Ok(self.created[kind.0] - self.queues[kind.0].len())
    }

    /// Kind picked by the most recent random acquisition
    pub fn last_selected(&self) -> Option<KindId> {
        self.last_selected
    }

    /// Forget the previous random pick (next random acquisition is unconstrained)
    pub fn reset_selection_memo(&mut self) {
        self.last_selected = None;
    }

    pub fn rng_mut(&mut self) -> &mut R {
        &mut self.rng
    }

    /// Check out an instance of `kind`, building one if the queue is empty
    pub fn acquire(&mut self, kind: KindId) -> Result<PooledHandle> {
        self.check_kind(kind)?;

        let slot = match self.queues[kind.0].pop_front() {
            Some(slot) => slot,
            None => {
                let slot = self.grow(kind);
                log::debug!(
                    "Pool '{}' grew to {} instances",
                    self.kinds[kind.0].name(),
                    self.created[kind.0]
                );
                slot
            }
        };

        let entry = &mut self.slots[slot as usize];
        entry.state = SlotState::CheckedOut;
        if entry.uses > 0 {
            if let Some(reset) = self.kinds[kind.0].reset.as_mut() {
                reset(&mut entry.value);
            }
        }
        entry.uses += 1;

        log::trace!("acquire {} -> slot {}", kind, slot);
        Ok(PooledHandle { kind, slot })
    }

    pub fn acquire_by_name(&mut self, name: &str) -> Result<PooledHandle> {
        let kind = self.kind_id(name)?;
        self.acquire(kind)
    }

    /// Return a checked-out instance to the tail of its Kind's queue
    pub fn release(&mut self, handle: PooledHandle, kind: KindId) -> Result<()> {
        self.check_kind(kind)?;
        let entry = self
            .slots
            .get(handle.slot as usize)
            .filter(|s| s.kind == handle.kind)
            .ok_or(PoolError::UnknownHandle(handle))?;
        if handle.kind != kind {
            return Err(PoolError::KindMismatch {
                handle,
                released_as: kind.0,
            });
        }
        if entry.state == SlotState::Available {
            return Err(PoolError::AlreadyReleased(handle));
        }

        self.park(handle.slot);
        log::trace!("release {} <- slot {}", kind, handle.slot);
        Ok(())
    }

    /// Check out an instance of a random Kind, never the Kind picked by the
    /// previous random call when another Kind exists
    pub fn acquire_random(&mut self) -> Result<(PooledHandle, KindId)> {
        if self.kinds.is_empty() {
            return Err(PoolError::EmptyCatalog);
        }

        let kind = self.pick_kind();
        let handle = self.acquire(kind)?;
        self.last_selected = Some(kind);
        Ok((handle, kind))
    }

    pub fn get(&self, handle: PooledHandle) -> Option<&T> {
        self.slots
            .get(handle.slot as usize)
            .filter(|s| s.kind == handle.kind && s.state == SlotState::CheckedOut)
            .map(|s| &s.value)
    }

    pub fn get_mut(&mut self, handle: PooledHandle) -> Option<&mut T> {
        self.slots
            .get_mut(handle.slot as usize)
            .filter(|s| s.kind == handle.kind && s.state == SlotState::CheckedOut)
            .map(|s| &mut s.value)
    }

    pub fn is_checked_out(&self, handle: PooledHandle) -> bool {
        self.get(handle).is_some()
    }

    fn check_kind(&self, kind: KindId) -> Result<()> {
        if kind.0 < self.kinds.len() {
            Ok(())
        } else {
            Err(PoolError::InvalidKind(KindKey::Index(kind.0 as i64)))
        }
    }

    /// Rejection sampling against the memo, bounded by `retry_budget`.
    /// Out-of-range draws from a misbehaving source are folded into range.
    fn pick_kind(&mut self) -> KindId {
        let n = self.kinds.len();
        let mut index = self.rng.below(n) % n;

        let Some(last) = self.last_selected.filter(|_| n > 1) else {
            return KindId(index);
        };

        let mut retries = 0;
        while index == last.0 {
            if retries >= self.retry_budget {
                log::warn!(
                    "Kind selection hit retry budget ({}), picking among the other {} kinds",
                    self.retry_budget,
                    n - 1
                );
                let offset = self.rng.below(n - 1) % (n - 1);
                index = (last.0 + 1 + offset) % n;
                break;
            }
            index = self.rng.below(n) % n;
            retries += 1;
        }
        KindId(index)
    }

    /// Build a new instance of `kind`; caller decides its initial state
    fn grow(&mut self, kind: KindId) -> u32 {
        let value = self.kinds[kind.0].build();
        let slot = self.slots.len() as u32;
        self.slots.push(Slot {
            kind,
            state: SlotState::CheckedOut,
            uses: 0,
            value,
        });
        self.created[kind.0] += 1;
        slot
    }

    fn park(&mut self, slot: u32) {
        let entry = &mut self.slots[slot as usize];
        let kind = entry.kind;
        if let Some(park) = self.kinds[kind.0].park.as_mut() {
            park(&mut entry.value);
        }
        entry.state = SlotState::Available;
        self.queues[kind.0].push_back(slot);
    }
}

impl<T, R> std::fmt::Debug for PoolCatalog<T, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PoolCatalog")
            .field("kinds", &self.kinds)
            .field("created", &self.created)
            .field(
                "available",
                &self.queues.iter().map(VecDeque::len).collect::<Vec<_>>(),
            )
            .field("last_selected", &self.last_selected)
            .finish()
    }
}
