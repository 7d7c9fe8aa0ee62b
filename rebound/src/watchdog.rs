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
//! Escape/encounter watchdog (C5): a per-step bounded-domain check.
//!
//! Distance is measured from the inertial origin of the particle array's
//! own coordinates, not from a freshly recomputed center of mass — an
//! implementation convention the spec documents as an open question and
//! asks an implementer to preserve. Callers who want the check centered
//! on the barycenter must call [`crate::com::move_to_com`] first.
//!
//! The offending particle (or pair) is never removed automatically: the
//! caller's own bookkeeping, often keyed by hash, must be updated
//! atomically with the removal, so the engine only reports and leaves
//! state untouched beyond the time advance that already happened.

use crate::store::{ParticleHash, ParticleStore};

/// Scan for any particle whose distance from the origin exceeds
/// `exit_max_distance`. Returns the hash of the first offender found, in
/// index order.
///
/// `exit_max_distance` of `f64::INFINITY` disables the check.
pub fn check_escape(store: &ParticleStore, exit_max_distance: f64) -> Option<ParticleHash> {
    if !exit_max_distance.is_finite() {
        return None;
    }
    let limit_sq = exit_max_distance * exit_max_distance;
    store
        .iter()
        .find(|p| p.distance_squared() > limit_sq)
        .map(|p| p.hash())
}

/// Scan for any pair of particles closer together than
/// `exit_min_distance`. Returns the hashes of the first offending pair
/// found, in index order.
///
/// `exit_min_distance` of `0.0` disables the check.
pub fn check_encounter(store: &ParticleStore, exit_min_distance: f64) -> Option<(ParticleHash, ParticleHash)> {
    if exit_min_distance <= 0.0 {
        return None;
    }
    let limit_sq = exit_min_distance * exit_min_distance;
    let particles = store.as_slice();
    for i in 0..particles.len() {
        for j in (i + 1)..particles.len() {
            let dx = particles[i].x - particles[j].x;
            let dy = particles[i].y - particles[j].y;
            let dz = particles[i].z - particles[j].z;
            let d2 = dx * dx + dy * dy + dz * dz;
            if d2 < limit_sq {
                return Some((particles[i].hash(), particles[j].hash()));
            }
        }
    }
    None
}
