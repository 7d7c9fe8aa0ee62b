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
//! Error kinds surfaced by the simulation runtime.
//!
//! Errors fall into three families:
//!
//! - **Configuration**: rejected before any mutation takes effect
//!   ([`SimError::InvalidOrbit`], [`SimError::DuplicateHash`],
//!   [`SimError::NoParticles`], [`SimError::UnknownIntegrator`]).
//! - **Runtime**: surfaced after `t` has already advanced to the failing
//!   step boundary ([`SimError::EscapeDetected`],
//!   [`SimError::EncounterDetected`], [`SimError::CollisionDetected`],
//!   [`SimError::Interrupted`]).
//! - **Programmer**: stale-handle misuse ([`SimError::NotFound`],
//!   [`SimError::IndexInvalidated`]).

use crate::store::ParticleHash;

/// The error type returned by simulation operations.
#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum SimError {
    /// Orbital elements describe a geometrically impossible orbit
    /// (`e < 0`, `a == 0` for a bound orbit, or `e == 1`).
    #[error("Invalid orbital elements: {reason}")]
    InvalidOrbit {
        /// Human-readable explanation of which element failed validation.
        reason: String,
    },

    /// An explicit or string-derived hash collides with a live particle.
    #[error("A particle with hash {0:?} already exists.")]
    DuplicateHash(ParticleHash),

    /// An operation that requires at least one particle was attempted on
    /// an empty store (e.g. adding orbital elements with no primary).
    #[error("The simulation has no particles.")]
    NoParticles,

    /// The requested integrator identifier is not recognized.
    #[error("Unknown integrator: {0:?}")]
    UnknownIntegrator(String),

    /// A particle exceeded `exit_max_distance` from the inertial origin.
    #[error("A particle escaped (r>exit_max_distance) at t={time}.")]
    EscapeDetected {
        /// Simulation time at which the violation was detected.
        time: f64,
        /// Hash of the offending particle.
        hash: ParticleHash,
    },

    /// Two particles came within `exit_min_distance` of each other.
    #[error("Two particles had a close encounter (r<exit_min_distance) at t={time}.")]
    EncounterDetected {
        /// Simulation time at which the violation was detected.
        time: f64,
        /// Hash of the first particle in the pair.
        hash_a: ParticleHash,
        /// Hash of the second particle in the pair.
        hash_b: ParticleHash,
    },

    /// Two particles' physical radii overlapped. The watchdog in this
    /// runtime only checks point-mass separation against
    /// `exit_min_distance` ([`SimError::EncounterDetected`]); radius-aware
    /// collision detection is out of scope (spec Non-goals), so this
    /// variant is never raised by [`crate::Simulation`] today. It is kept
    /// in the taxonomy so a future radius-aware watchdog has a variant to
    /// return without widening the enum downstream.
    #[error("Two particles collided at t={time}.")]
    CollisionDetected {
        /// Simulation time at which the collision was detected.
        time: f64,
        /// Hash of the first particle in the pair.
        hash_a: ParticleHash,
        /// Hash of the second particle in the pair.
        hash_b: ParticleHash,
    },

    /// Integration was interrupted by a caller-set cancellation flag at
    /// the next step boundary.
    #[error("Integration was interrupted at t={time}.")]
    Interrupted {
        /// Simulation time at which the interruption took effect.
        time: f64,
    },

    /// An index or hash lookup did not resolve to a live particle.
    #[error("No particle found for the given index or hash.")]
    NotFound,

    /// A previously obtained index was used after a mutation invalidated it.
    #[error("Index was invalidated by an intervening mutation.")]
    IndexInvalidated,
}
