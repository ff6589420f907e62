//! Per-worker random sampling.
//!
//! Each render worker owns its own `Sampler` so there is no shared RNG
//! state to race on, and no cross-pixel sample correlation. PCG32 keeps
//! generation cheap and lets every worker run an independent stream of
//! the same generator.

use std::process;
use std::time::{SystemTime, UNIX_EPOCH};

use ember_math::{Vec2, Vec3};
use rand::{Rng, RngCore, SeedableRng};
use rand_pcg::Pcg32;

/// Deterministic random source for one render worker.
#[derive(Debug, Clone)]
pub struct Sampler {
    rng: Pcg32,
}

impl Sampler {
    /// Create a sampler with an explicit seed and stream.
    ///
    /// Samplers built from the same seed but different streams produce
    /// independent sequences, which is how per-bucket workers avoid
    /// correlating with each other.
    pub fn new(seed: u64, stream: u64) -> Self {
        Self {
            rng: Pcg32::new(seed, stream),
        }
    }

    /// Create a sampler seeded from the wall clock and process identity.
    pub fn from_entropy() -> Self {
        Self {
            rng: Pcg32::seed_from_u64(entropy_seed()),
        }
    }

    /// Uniform u32 over the full range.
    #[inline]
    pub fn next_u32(&mut self) -> u32 {
        self.rng.next_u32()
    }

    /// Uniform float in [0, 1).
    #[inline]
    pub fn next_f32(&mut self) -> f32 {
        self.rng.gen::<f32>()
    }

    /// Vector with each component uniform in [0, 1).
    #[inline]
    pub fn vec3(&mut self) -> Vec3 {
        Vec3::new(self.next_f32(), self.next_f32(), self.next_f32())
    }

    /// Uniform point within the unit sphere.
    ///
    /// Built from spherical coordinates with a cube-root radial term so
    /// the volume density is uniform. Normalizing an axis-aligned cube
    /// sample would cluster points toward the cube corners.
    pub fn in_unit_sphere(&mut self) -> Vec3 {
        let theta = self.next_f32() * 2.0 * std::f32::consts::PI;
        let phi = (2.0 * self.next_f32() - 1.0).clamp(-1.0, 1.0).acos();
        let r = self.next_f32().cbrt();

        let sin_phi = phi.sin();
        Vec3::new(
            r * sin_phi * theta.cos(),
            r * sin_phi * theta.sin(),
            r * phi.cos(),
        )
    }

    /// Uniform direction on the unit sphere surface.
    pub fn unit_vector(&mut self) -> Vec3 {
        let z = 1.0 - 2.0 * self.next_f32();
        let phi = self.next_f32() * 2.0 * std::f32::consts::PI;
        let xy = (1.0 - z * z).max(0.0).sqrt();
        Vec3::new(xy * phi.cos(), xy * phi.sin(), z)
    }

    /// Uniform point within the unit disk (z = 0 plane).
    pub fn in_unit_disk(&mut self) -> Vec2 {
        loop {
            let p = Vec2::new(
                self.next_f32() * 2.0 - 1.0,
                self.next_f32() * 2.0 - 1.0,
            );
            if p.length_squared() < 1.0 {
                return p;
            }
        }
    }
}

/// A seed derived from the wall clock and process identity, for runs
/// where reproducibility is not needed.
pub fn entropy_seed() -> u64 {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0);
    nanos ^ ((process::id() as u64) << 32)
}
