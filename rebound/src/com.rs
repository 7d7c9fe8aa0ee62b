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
//! Center-of-mass transform (C6).

use crate::store::ParticleStore;

/// Shift every particle so the mass-weighted position and velocity sums
/// are zero: `R = Σ m_i r_i / Σ m_i`, `V = Σ m_i v_i / Σ m_i`, subtracted
/// from every particle.
///
/// A no-op (beyond floating-point noise) if the store is already in the
/// barycentric frame or holds only massless test particles.
pub fn move_to_com(store: &mut ParticleStore) {
    let mut total_mass = 0.0;
    let (mut rx, mut ry, mut rz) = (0.0, 0.0, 0.0);
    let (mut vx, mut vy, mut vz) = (0.0, 0.0, 0.0);

    for p in store.iter() {
        total_mass += p.m;
        rx += p.m * p.x;
        ry += p.m * p.y;
        rz += p.m * p.z;
        vx += p.m * p.vx;
        vy += p.m * p.vy;
        vz += p.m * p.vz;
    }

    if total_mass == 0.0 {
        return;
    }

    let (rx, ry, rz) = (rx / total_mass, ry / total_mass, rz / total_mass);
    let (vx, vy, vz) = (vx / total_mass, vy / total_mass, vz / total_mass);

    for p in store.iter_mut() {
        p.x -= rx;
        p.y -= ry;
        p.z -= rz;
        p.vx -= vx;
        p.vy -= vy;
        p.vz -= vz;
    }
}
