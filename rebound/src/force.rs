// Copyright 2025 John Brosnihan
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//! Force evaluation, the first half of the Force/Integrator interface (C3).
//!
//! A [`ForceEvaluator`] reads particle positions and masses and writes
//! accelerations to a caller-owned scratch buffer; it never aliases the
//! particle array, matching the "own their scratch memory" requirement of
//! the concurrency model.
//!
//! # Physics Background
//!
//! Newton's law of universal gravitation: every pair of point masses
//! attracts with force `F = G * m1 * m2 / r²`, directed along the line
//! connecting them. [`DirectSummation`] computes this exactly for every
//! pair (`O(N²)`); tree and mesh approximations are out of scope (spec
//! §1) and are expressed only as the same trait boundary.
//!
//! An optional softening length `ε` avoids the singularity as `r → 0`:
//! `F = G * m1 * m2 / (r² + ε²)`. Direct summation defaults to `ε = 0`
//! (unsoftened), matching the convention the spec's own worked examples
//! assume in units with `G = 1`.

use crate::store::Particle;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// A Cartesian acceleration vector.
pub type Accel = [f64; 3];

/// Produces accelerations on every particle from the current state.
///
/// Implementations must not mutate `particles`; they read positions and
/// masses and write into `out`, which always has the same length as
/// `particles`.
pub trait ForceEvaluator: Send + Sync {
    /// Human-readable identifier, e.g. `"direct"`.
    fn name(&self) -> &str;

    /// Compute the acceleration on every particle into `out`.
    ///
    /// # Panics
    ///
    /// Implementations may panic if `out.len() != particles.len()`.
    fn accelerations(&self, particles: &[Particle], g: f64, out: &mut [Accel]);
}

/// Direct O(N²) pairwise summation of Newtonian gravity.
#[derive(Debug, Clone, Copy)]
pub struct DirectSummation {
    softening: f64,
}

impl DirectSummation {
    /// A direct-summation evaluator with no softening.
    pub fn new() -> Self {
        DirectSummation { softening: 0.0 }
    }

    /// A direct-summation evaluator with the given softening length.
    ///
    /// # Panics
    ///
    /// Panics if `softening` is negative or not finite.
    pub fn with_softening(softening: f64) -> Self {
        assert!(
            softening >= 0.0 && softening.is_finite(),
            "softening must be non-negative and finite"
        );
        DirectSummation { softening }
    }

    /// The current softening length.
    pub fn softening(&self) -> f64 {
        self.softening
    }

    fn accel_on(&self, target: usize, particles: &[Particle], g: f64) -> Accel {
        let p = &particles[target];
        let eps2 = self.softening * self.softening;
        let mut ax = 0.0;
        let mut ay = 0.0;
        let mut az = 0.0;

        for (j, other) in particles.iter().enumerate() {
            if j == target || other.m == 0.0 {
                continue;
            }
            let dx = other.x - p.x;
            let dy = other.y - p.y;
            let dz = other.z - p.z;
            let r2 = dx * dx + dy * dy + dz * dz + eps2;
            if r2 == 0.0 {
                continue;
            }
            let inv_r3 = r2.sqrt().recip() / r2;
            let scale = g * other.m * inv_r3;
            ax += scale * dx;
            ay += scale * dy;
            az += scale * dz;
        }

        [ax, ay, az]
    }
}

impl Default for DirectSummation {
    fn default() -> Self {
        Self::new()
    }
}

impl ForceEvaluator for DirectSummation {
    fn name(&self) -> &str {
        "direct"
    }

    fn accelerations(&self, particles: &[Particle], g: f64, out: &mut [Accel]) {
        assert_eq!(particles.len(), out.len());

        #[cfg(feature = "parallel")]
        {
            out.par_iter_mut().enumerate().for_each(|(i, a)| {
                *a = self.accel_on(i, particles, g);
            });
        }

        #[cfg(not(feature = "parallel"))]
        {
            for (i, a) in out.iter_mut().enumerate() {
                *a = self.accel_on(i, particles, g);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::ParticleHash;

    fn particle(m: f64, x: f64, y: f64) -> Particle {
        Particle::new(m, None, x, y, 0.0, 0.0, 0.0, 0.0, ParticleHash(0), None)
    }

    #[test]
    fn two_body_acceleration_points_toward_the_other_mass() {
        let particles = vec![particle(1.0, 0.0, 0.0), particle(1.0, 1.0, 0.0)];
        let mut out = vec![[0.0; 3]; 2];
        DirectSummation::new().accelerations(&particles, 1.0, &mut out);

        assert!(out[0][0] > 0.0);
        assert_eq!(out[0][1], 0.0);
        assert!(out[1][0] < 0.0);
    }

    #[test]
    fn massless_test_particle_exerts_no_force() {
        let particles = vec![particle(0.0, 0.0, 0.0), particle(1.0, 1.0, 0.0)];
        let mut out = vec![[0.0; 3]; 2];
        DirectSummation::new().accelerations(&particles, 1.0, &mut out);

        // particle 1 feels nothing from the massless particle 0
        assert_eq!(out[1], [0.0, 0.0, 0.0]);
        // particle 0 still feels particle 1's gravity
        assert!(out[0][0] > 0.0);
    }

    #[test]
    fn softening_keeps_coincident_particles_finite() {
        let particles = vec![particle(1.0, 0.0, 0.0), particle(1.0, 0.0, 0.0)];
        let mut out = vec![[0.0; 3]; 2];
        DirectSummation::with_softening(1.0).accelerations(&particles, 1.0, &mut out);
        assert!(out[0].iter().all(|v| v.is_finite()));
    }
}
