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
//! The particle value type.

use super::ParticleHash;

/// A single point mass: position, velocity, mass, optional radius, and a
/// stable hash identity.
///
/// A particle with `m == 0.0` is a massless test particle: forces act on
/// it but it contributes none to the field felt by others.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    /// Mass. Non-negative; `0.0` marks a test particle.
    pub m: f64,
    /// Physical radius, if tracked (used only by collision detection,
    /// which is out of scope here; stored for round-trip fidelity).
    pub r: Option<f64>,
    /// Position, x component.
    pub x: f64,
    /// Position, y component.
    pub y: f64,
    /// Position, z component.
    pub z: f64,
    /// Velocity, x component.
    pub vx: f64,
    /// Velocity, y component.
    pub vy: f64,
    /// Velocity, z component.
    pub vz: f64,
    hash: ParticleHash,
    name: Option<Box<str>>,
}

impl Particle {
    /// Construct a particle from full Cartesian state and a resolved hash.
    pub(crate) fn new(
        m: f64,
        r: Option<f64>,
        x: f64,
        y: f64,
        z: f64,
        vx: f64,
        vy: f64,
        vz: f64,
        hash: ParticleHash,
        name: Option<String>,
    ) -> Self {
        Particle {
            m,
            r,
            x,
            y,
            z,
            vx,
            vy,
            vz,
            hash,
            name: name.map(String::into_boxed_str),
        }
    }

    /// This particle's stable hash identity.
    pub fn hash(&self) -> ParticleHash {
        self.hash
    }

    /// The caller-assigned label, if any.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Whether this is a massless test particle.
    pub fn is_test_particle(&self) -> bool {
        self.m == 0.0
    }

    /// Squared distance from the inertial origin.
    pub fn distance_squared(&self) -> f64 {
        self.x * self.x + self.y * self.y + self.z * self.z
    }

    /// Distance from the inertial origin.
    pub fn distance(&self) -> f64 {
        self.distance_squared().sqrt()
    }

    /// Kinetic energy, `0.5 * m * v^2`.
    pub fn kinetic_energy(&self) -> f64 {
        0.5 * self.m * (self.vx * self.vx + self.vy * self.vy + self.vz * self.vz)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_particle_is_test_particle() {
        let p = Particle::new(0.0, None, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0, ParticleHash(1), None);
        assert!(p.is_test_particle());
    }

    #[test]
    fn test_distance_squared() {
        let p = Particle::new(1.0, None, 3.0, 4.0, 0.0, 0.0, 0.0, 0.0, ParticleHash(1), None);
        assert_eq!(p.distance_squared(), 25.0);
        assert_eq!(p.distance(), 5.0);
    }
}
