//! Thread-safe uniform sampling for shadow traffic decisions.
//!
//! Each thread owns a `SmallRng`; sampling never takes a lock. A thread's
//! generator is seeded from one shared generator the first time that thread
//! samples, so no two threads share a sequence.

use once_cell::sync::Lazy;
use rand::rngs::{SmallRng, StdRng};
use rand::{Rng, SeedableRng};
use std::cell::RefCell;
use std::sync::Mutex;

static SEED_SOURCE: Lazy<Mutex<StdRng>> = Lazy::new(|| Mutex::new(StdRng::from_entropy()));

thread_local! {
    static THREAD_RNG: RefCell<SmallRng> = RefCell::new(seeded_rng());
}

fn seeded_rng() -> SmallRng {
    let seed = match SEED_SOURCE.lock() {
        Ok(mut source) => source.gen::<u64>(),
        // A poisoned lock still holds a usable generator.
        Err(poisoned) => poisoned.into_inner().gen::<u64>(),
    };
    SmallRng::seed_from_u64(seed)
}

/// Returns a uniformly distributed value in [0, 1).
#[inline]
pub fn next_f32() -> f32 {
    THREAD_RNG.with(|rng| rng.borrow_mut().gen::<f32>())
}
