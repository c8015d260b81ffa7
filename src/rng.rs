//! Random source shared by the whole game
//!
//! One seeded `Pcg32` stream drives every random decision in a session
//! (pool kind selection, pickup spawn chance). Consumers receive it
//! explicitly so tests can substitute their own sequences.

use std::cell::RefCell;
use std::rc::Rc;

use rand::{Rng, RngCore, SeedableRng};
use rand_pcg::Pcg32;

/// Uniform integer source used by the pool and spawn gates
pub trait RandomSource {
    /// Uniform integer in `[0, n)`. Returns 0 when `n <= 1`.
    fn below(&mut self, n: usize) -> usize;
}

impl<R: RngCore> RandomSource for R {
    fn below(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        self.random_range(0..n)
    }
}

/// Cloneable handle to the session's generator.
///
/// Clones share one stream, so drawing through any clone advances all of
/// them. Single-threaded by construction (`Rc<RefCell<_>>`), matching the
/// frame loop the game runs on.
#[derive(Debug, Clone)]
pub struct SharedRng {
    seed: u64,
    inner: Rc<RefCell<Pcg32>>,
}

impl SharedRng {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            inner: Rc::new(RefCell::new(Pcg32::seed_from_u64(seed))),
        }
    }

    /// Seed the stream was created from
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Bernoulli roll. `p` outside `[0, 1]` (or NaN) saturates.
    pub fn chance(&mut self, p: f64) -> bool {
        if p.is_nan() || p <= 0.0 {
            return false;
        }
        if p >= 1.0 {
            return true;
        }
        self.random_bool(p)
    }
}

impl RngCore for SharedRng {
    fn next_u32(&mut self) -> u32 {
        self.inner.borrow_mut().next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.inner.borrow_mut().next_u64()
    }

    fn fill_bytes(&mut self, dst: &mut [u8]) {
        self.inner.borrow_mut().fill_bytes(dst)
    }
}
