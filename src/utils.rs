//! Random-number helpers shared by environments, agents and opponents

use rand::{Rng, SeedableRng, rngs::StdRng};

/// Build the random source for one component.
///
/// A seed gives a reproducible stream; `None` draws entropy from the thread RNG.
///
/// # Examples
///
/// ```
/// use pong_rl::utils::build_rng;
/// use rand::Rng;
///
/// let mut a = build_rng(Some(7));
/// let mut b = build_rng(Some(7));
/// assert_eq!(a.random::<u64>(), b.random::<u64>());
/// ```
pub fn build_rng(seed: Option<u64>) -> StdRng {
    if let Some(seed) = seed {
        StdRng::seed_from_u64(seed)
    } else {
        StdRng::from_rng(&mut rand::rng())
    }
}

/// Derive the seed for a sub-component from a run-level seed.
///
/// Every component of a run (environment, left agent, right agent) gets a
/// distinct stream so that a single seed reproduces the whole run.
pub fn derive_seed(seed: Option<u64>, offset: u64) -> Option<u64> {
    seed.map(|s| s.wrapping_add(offset))
}

/// Uniform perturbation in `[-magnitude, magnitude]`; zero when magnitude is not positive.
pub fn jitter<R: Rng + ?Sized>(rng: &mut R, magnitude: f64) -> f64 {
    if magnitude > 0.0 {
        rng.random_range(-magnitude..=magnitude)
    } else {
        0.0
    }
}
