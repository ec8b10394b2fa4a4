//! Spawn context for particle initialization.
//!
//! Every particle is spawned through a [`SpawnContext`] that carries a
//! per-particle RNG. The RNG is seeded from the field's base seed and the
//! particle index, so a field constructed with an explicit seed regenerates
//! the exact same particle set every time, which the determinism tests in
//! `field.rs` rely on.
//!
//! ```ignore
//! Backdrop::new().with_spawner(|ctx| Particle {
//!     position: ctx.scatter_position(),
//!     velocity: ctx.drift_velocity(0.25),
//!     radius: ctx.random_range(1.0, 3.0),
//!     opacity: ctx.random_range(0.2, 0.7),
//! })
//! ```

use glam::Vec2;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Context provided to spawner functions with helpers for common patterns.
pub struct SpawnContext {
    /// Index of the particle being spawned (0 to count-1).
    pub index: u32,
    /// Total number of particles being spawned.
    pub count: u32,
    /// Surface width in pixels.
    pub width: f32,
    /// Surface height in pixels.
    pub height: f32,
    /// Internal RNG - use helper methods instead of accessing directly.
    rng: SmallRng,
}

impl SpawnContext {
    /// Create a spawn context for one particle.
    ///
    /// The per-particle seed mixes the field seed with the index so that
    /// neighboring indices do not produce correlated streams.
    pub(crate) fn new(index: u32, count: u32, width: f32, height: f32, base_seed: u64) -> Self {
        let seed = base_seed ^ (u64::from(index)).wrapping_mul(0x9E37_79B9_7F4A_7C15);

        Self {
            index,
            count,
            width,
            height,
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Normalized progress through the spawn (0.0 to 1.0).
    #[inline]
    pub fn progress(&self) -> f32 {
        self.index as f32 / self.count as f32
    }

    /// Random f32 between 0.0 and 1.0.
    #[inline]
    pub fn random(&mut self) -> f32 {
        self.rng.gen()
    }

    /// Random f32 in `[min, max)`.
    #[inline]
    pub fn random_range(&mut self, min: f32, max: f32) -> f32 {
        self.rng.gen_range(min..max)
    }

    /// Random position uniformly distributed over the surface,
    /// `[0, width) x [0, height)`.
    pub fn scatter_position(&mut self) -> Vec2 {
        Vec2::new(
            self.rng.gen_range(0.0..self.width),
            self.rng.gen_range(0.0..self.height),
        )
    }

    /// Random per-frame drift velocity with both components independently
    /// uniform in `[-limit, limit)`.
    pub fn drift_velocity(&mut self, limit: f32) -> Vec2 {
        Vec2::new(
            self.rng.gen_range(-limit..limit),
            self.rng.gen_range(-limit..limit),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_context_progress() {
        let ctx = SpawnContext::new(50, 100, 800.0, 600.0, 0);
        assert!((ctx.progress() - 0.5).abs() < 0.001);
    }

    #[test]
    fn test_scatter_position_stays_in_bounds() {
        let mut ctx = SpawnContext::new(0, 1, 800.0, 600.0, 7);
        for _ in 0..200 {
            let pos = ctx.scatter_position();
            assert!(pos.x >= 0.0 && pos.x < 800.0);
            assert!(pos.y >= 0.0 && pos.y < 600.0);
        }
    }

    #[test]
    fn test_drift_velocity_honors_limit() {
        let mut ctx = SpawnContext::new(3, 10, 800.0, 600.0, 7);
        for _ in 0..200 {
            let vel = ctx.drift_velocity(0.25);
            assert!(vel.x >= -0.25 && vel.x < 0.25);
            assert!(vel.y >= -0.25 && vel.y < 0.25);
        }
    }

    #[test]
    fn test_same_seed_same_stream() {
        let mut a = SpawnContext::new(4, 10, 800.0, 600.0, 42);
        let mut b = SpawnContext::new(4, 10, 800.0, 600.0, 42);
        for _ in 0..32 {
            assert_eq!(a.random(), b.random());
        }
    }

    #[test]
    fn test_different_indices_diverge() {
        let mut a = SpawnContext::new(0, 10, 800.0, 600.0, 42);
        let mut b = SpawnContext::new(1, 10, 800.0, 600.0, 42);
        // A shared prefix of identical draws would mean the index is not
        // mixed into the seed.
        let draws_a: Vec<f32> = (0..8).map(|_| a.random()).collect();
        let draws_b: Vec<f32> = (0..8).map(|_| b.random()).collect();
        assert_ne!(draws_a, draws_b);
    }
}
