//! Seedable random number generation.
//!
//! Every sampling routine in the crate takes `&mut R where R: Rng`; this
//! module only fixes the concrete generator used by hosts and tests.

use rand::rngs::StdRng;
use rand::SeedableRng;

/// A reproducible generator for `seed`.
///
/// ```
/// use glp_routing::rng::create_rng;
/// use rand::Rng;
///
/// let a: u64 = create_rng(42).random();
/// let b: u64 = create_rng(42).random();
/// assert_eq!(a, b);
/// ```
pub fn create_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}
