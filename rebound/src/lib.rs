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
//! # rebound
//!
//! An N-body gravitational dynamics runtime: a particle store with stable
//! hash-based identity, an orbital-element/Cartesian converter, pluggable
//! force and integrator backends, and an integration driver with
//! bounded-domain escape/encounter monitoring and exact-finish semantics.
//!
//! ## Example
//!
//! ```rust
//! use rebound::{AddParticle, OrbitalElements, Simulation};
//!
//! let mut sim = Simulation::new();
//! sim.add(AddParticle::cartesian(1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0)).unwrap();
//! sim.add(
//!     AddParticle::orbital(
//!         0.0,
//!         OrbitalElements { a: 1.0, e: 0.0, inc: 0.0, omega_cap: 0.0, omega: 0.0, f: 0.0 },
//!     )
//!     .with_hash_str("earth"),
//! )
//! .unwrap();
//! sim.move_to_com();
//! sim.integrate(std::f64::consts::TAU, true).unwrap();
//! assert!((sim.particle_by_name_key("earth").unwrap().x - 1.0).abs() < 1e-2);
//! ```
//!
//! The specific force kernels (direct summation here; tree and mesh are out
//! of scope), the specific integrator algorithms (a symplectic leapfrog and
//! an adaptive step-doubling approximation of IAS15 are provided; the real
//! WHFast/IAS15/Gauss-Radau algorithms are out of scope), collision
//! detection, visualization, and shared-library export are not implemented
//! here; the crate covers the Simulation runtime around those interfaces.

#![warn(missing_docs)]

/// Center-of-mass (barycenter) transform.
pub mod com;
/// Error kinds surfaced by simulation operations.
pub mod error;
/// Pluggable force evaluation.
pub mod force;
/// Pluggable integrators.
pub mod integrator;
/// Orbital-element / Cartesian conversion.
pub mod orbit;
/// The simulation runtime: particle ownership and the integration driver.
pub mod simulation;
/// The particle store: stable hash identity over a dense, ordered list.
pub mod store;
/// The escape/encounter watchdog.
pub mod watchdog;

pub use error::SimError;
pub use force::{DirectSummation, ForceEvaluator};
pub use integrator::{Ias15Like, Integrator, Leapfrog};
pub use orbit::{OrbitalElements, RelativeState};
pub use simulation::{AddParticle, CancelHandle, HashSpec, ParticleOrigin, RemoveSelector, Simulation};
pub use store::{Particle, ParticleHash};
