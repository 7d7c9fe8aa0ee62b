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
//! The simulation runtime (C4/C7): owns a [`ParticleStore`] plus the
//! pluggable force/integrator pair, and drives `integrate` to a caller-
//! specified target time.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::com;
use crate::error::SimError;
use crate::force::{DirectSummation, ForceEvaluator};
use crate::integrator::{Ias15Like, Integrator, Leapfrog};
use crate::orbit::{self, OrbitalElements};
use crate::store::{Particle, ParticleHash, ParticleStore};
use crate::watchdog;

/// The default relative tolerance used when `"ias15"` is selected by name.
/// Callers who need a different tolerance construct an [`Ias15Like`]
/// directly and install it with [`Simulation::set_integrator_impl`].
const DEFAULT_IAS15_TOLERANCE: f64 = 1e-9;

/// Where a new particle's Cartesian state comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum ParticleOrigin {
    /// Full absolute Cartesian state, already in the simulation's frame.
    Cartesian {
        /// Position, x component.
        x: f64,
        /// Position, y component.
        y: f64,
        /// Position, z component.
        z: f64,
        /// Velocity, x component.
        vx: f64,
        /// Velocity, y component.
        vy: f64,
        /// Velocity, z component.
        vz: f64,
    },
    /// Classical orbital elements, resolved relative to a primary.
    Orbital {
        /// The elements to convert.
        elements: OrbitalElements,
        /// The primary to convert relative to. `None` resolves to the
        /// current [`ParticleStore::primary`] at the time `add` is called.
        primary: Option<ParticleHash>,
    },
}

/// How a particle's hash identity is chosen.
#[derive(Debug, Clone, PartialEq)]
pub enum HashSpec {
    /// A caller-supplied raw 64-bit identity.
    Explicit(u64),
    /// A short string, hashed deterministically with [`crate::store::fnv1a_64`].
    Named(String),
}

/// Describes a particle to be appended to a [`Simulation`].
///
/// Constructed with [`AddParticle::cartesian`] or [`AddParticle::orbital`]
/// and refined with the `with_*` builder methods.
#[derive(Debug, Clone, PartialEq)]
pub struct AddParticle {
    /// Mass. `0.0` marks a massless test particle.
    pub m: f64,
    /// Physical radius, if tracked.
    pub r: Option<f64>,
    /// Where the Cartesian state comes from.
    pub origin: ParticleOrigin,
    /// Identity selection; `None` draws a fresh auto-assigned hash.
    pub hash: Option<HashSpec>,
    /// Caller-assigned display label, independent of `hash`.
    pub name: Option<String>,
}

impl AddParticle {
    /// A particle at a full, absolute Cartesian state.
    pub fn cartesian(m: f64, x: f64, y: f64, z: f64, vx: f64, vy: f64, vz: f64) -> Self {
        AddParticle {
            m,
            r: None,
            origin: ParticleOrigin::Cartesian { x, y, z, vx, vy, vz },
            hash: None,
            name: None,
        }
    }

    /// A particle described by orbital elements, relative to the default
    /// primary (the first live particle) unless [`AddParticle::with_primary`]
    /// overrides it.
    pub fn orbital(m: f64, elements: OrbitalElements) -> Self {
        AddParticle {
            m,
            r: None,
            origin: ParticleOrigin::Orbital { elements, primary: None },
            hash: None,
            name: None,
        }
    }

    /// Name an explicit primary for an orbital descriptor. No effect on a
    /// Cartesian descriptor.
    pub fn with_primary(mut self, primary: ParticleHash) -> Self {
        if let ParticleOrigin::Orbital { primary: slot, .. } = &mut self.origin {
            *slot = Some(primary);
        }
        self
    }

    /// Assign an explicit raw hash identity.
    pub fn with_hash(mut self, hash: u64) -> Self {
        self.hash = Some(HashSpec::Explicit(hash));
        self
    }

    /// Assign a hash identity derived from a short string.
    pub fn with_hash_str(mut self, key: impl Into<String>) -> Self {
        self.hash = Some(HashSpec::Named(key.into()));
        self
    }

    /// Attach a display label, independent of the hash identity.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Track a physical radius.
    pub fn with_radius(mut self, r: f64) -> Self {
        self.r = Some(r);
        self
    }
}

/// Selects a particle to remove by whichever handle the caller has.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveSelector {
    /// The dense index at the time of the call. Invalidated by any prior
    /// mutation.
    Index(usize),
    /// The stable hash identity.
    Hash(ParticleHash),
}

/// A cooperative cancellation flag, cloneable and shareable across threads.
///
/// Setting it requests that the next `integrate` step boundary return
/// [`SimError::Interrupted`] instead of taking another step. The flag is
/// consumed (reset to false) once observed.
#[derive(Debug, Clone)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    /// Request cancellation at the next step boundary.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }
}

/// Owns particle state and drives integration (C4), with read-only status
/// accessors (C7).
pub struct Simulation {
    store: ParticleStore,
    t: f64,
    /// Requested step size. An integrator-defined default; adaptive
    /// integrators may override it per step via [`Integrator::suggest_next_dt`],
    /// and the achieved magnitude is written back here after each
    /// non-shortened step.
    pub dt: f64,
    /// Gravitational constant.
    pub g: f64,
    /// Escape-distance threshold, measured from the inertial origin of the
    /// stored coordinates. `f64::INFINITY` disables the check.
    pub exit_max_distance: f64,
    /// Minimum pairwise separation threshold. `0.0` disables the check.
    pub exit_min_distance: f64,
    integrator: Box<dyn Integrator>,
    integrator_name: String,
    force: Box<dyn ForceEvaluator>,
    steps_taken: u64,
    cancel: Arc<AtomicBool>,
}

impl Simulation {
    /// An empty simulation: `leapfrog` integrator, direct-summation
    /// gravity, `G = 1`, escape/encounter checks disabled.
    pub fn new() -> Self {
        Simulation {
            store: ParticleStore::new(),
            t: 0.0,
            dt: 0.01,
            g: 1.0,
            exit_max_distance: f64::INFINITY,
            exit_min_distance: 0.0,
            integrator: Box::new(Leapfrog::new()),
            integrator_name: "leapfrog".to_string(),
            force: Box::new(DirectSummation::new()),
            steps_taken: 0,
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Select an integrator by symbolic identifier, discarding any private
    /// scratch state the previous integrator held.
    ///
    /// Recognized identifiers: `"leapfrog"` and `"whfast"` (both answer to
    /// [`Leapfrog`], documented in [`crate::integrator`] as an
    /// approximation), `"ias15"` ([`Ias15Like`] with a default tolerance).
    /// `"mercurius"` and `"saba"` are recognized names in the spec's
    /// variant list but have no implementation here; selecting them fails
    /// with [`SimError::UnknownIntegrator`], as does any unrecognized
    /// string.
    pub fn set_integrator(&mut self, name: &str) -> Result<(), SimError> {
        let integrator: Box<dyn Integrator> = match name {
            "leapfrog" | "whfast" => Box::new(Leapfrog::new()),
            "ias15" => Box::new(Ias15Like::new(DEFAULT_IAS15_TOLERANCE)),
            _ => return Err(SimError::UnknownIntegrator(name.to_string())),
        };
        self.integrator = integrator;
        self.integrator_name = name.to_string();
        Ok(())
    }

    /// Install a pre-configured integrator directly, bypassing the named
    /// presets (e.g. an [`Ias15Like`] with a non-default tolerance).
    pub fn set_integrator_impl(&mut self, name: &str, integrator: Box<dyn Integrator>) {
        self.integrator = integrator;
        self.integrator_name = name.to_string();
    }

    /// Install a force evaluator directly, e.g. [`DirectSummation::with_softening`].
    pub fn set_force_evaluator(&mut self, force: Box<dyn ForceEvaluator>) {
        self.force = force;
    }

    /// Append a particle. Transactional: on error the simulation is left
    /// exactly as it was.
    ///
    /// # Errors
    ///
    /// - [`SimError::InvalidOrbit`] if `descriptor.origin` is orbital and
    ///   geometrically impossible.
    /// - [`SimError::NoParticles`] if an orbital descriptor names no
    ///   primary and the store is empty.
    /// - [`SimError::NotFound`] if an orbital descriptor names an explicit
    ///   primary hash that does not resolve.
    /// - [`SimError::DuplicateHash`] if the resolved hash is live or was
    ///   used by a since-removed particle.
    pub fn add(&mut self, descriptor: AddParticle) -> Result<ParticleHash, SimError> {
        let (x, y, z, vx, vy, vz) = match &descriptor.origin {
            ParticleOrigin::Cartesian { x, y, z, vx, vy, vz } => (*x, *y, *z, *vx, *vy, *vz),
            ParticleOrigin::Orbital { elements, primary } => {
                let primary_particle = match primary {
                    Some(hash) => self.store.get_by_hash(*hash).ok_or(SimError::NotFound)?,
                    None => self.store.primary().ok_or(SimError::NoParticles)?,
                };
                let mu = self.g * (primary_particle.m + descriptor.m);
                let relative = orbit::elements_to_cartesian(elements, mu)?;
                (
                    primary_particle.x + relative.x,
                    primary_particle.y + relative.y,
                    primary_particle.z + relative.z,
                    primary_particle.vx + relative.vx,
                    primary_particle.vy + relative.vy,
                    primary_particle.vz + relative.vz,
                )
            }
        };

        let hash = match &descriptor.hash {
            Some(HashSpec::Explicit(raw)) => ParticleHash::from_raw(*raw),
            Some(HashSpec::Named(key)) => ParticleHash::from_name(key),
            None => self.store.next_auto_hash(),
        };

        let particle = Particle::new(descriptor.m, descriptor.r, x, y, z, vx, vy, vz, hash, descriptor.name);
        let hash = self.store.push(particle)?;
        self.integrator.reset();
        log::debug!("added particle {hash} (n={})", self.store.len());
        Ok(hash)
    }

    /// Remove a particle, compacting the store while preserving the
    /// relative order and hashes of the rest.
    ///
    /// # Errors
    ///
    /// [`SimError::NotFound`] if the selector does not resolve to a live
    /// particle.
    pub fn remove(&mut self, selector: RemoveSelector) -> Result<Particle, SimError> {
        let removed = match selector {
            RemoveSelector::Index(index) => self.store.remove_by_index(index),
            RemoveSelector::Hash(hash) => self.store.remove_by_hash(hash),
        }
        .ok_or(SimError::NotFound)?;
        self.integrator.reset();
        log::debug!("removed particle {} (n={})", removed.hash(), self.store.len());
        Ok(removed)
    }

    /// Shift every particle into the barycentric frame (C6).
    pub fn move_to_com(&mut self) {
        com::move_to_com(&mut self.store);
    }

    /// Advance the simulation to `t_target`.
    ///
    /// A no-op if `t_target == self.t`. If `exact_finish` is true the final
    /// step is shortened so `self.t` lands on `t_target` bit-identically,
    /// and the integrator's scratch state is restored immediately
    /// afterward so later calls behave as if the short step had never
    /// happened. If `exact_finish` is false, the driver stops at the first
    /// step whose end is at or past `t_target`.
    ///
    /// After every completed step the escape/encounter watchdog (C5) runs;
    /// on a violation, `self.t` is left at the violating step's end and the
    /// corresponding error is returned. The caller may resolve the
    /// situation (typically `remove`) and call `integrate` again with the
    /// same `t_target`.
    ///
    /// # Errors
    ///
    /// [`SimError::Interrupted`] if [`Simulation::cancel_handle`] was
    /// signalled, [`SimError::EscapeDetected`] / [`SimError::EncounterDetected`]
    /// on a watchdog violation.
    pub fn integrate(&mut self, t_target: f64, exact_finish: bool) -> Result<(), SimError> {
        if t_target == self.t {
            return Ok(());
        }
        let direction = (t_target - self.t).signum();

        loop {
            if self.cancel.swap(false, Ordering::Relaxed) {
                log::warn!("integration interrupted at t={}", self.t);
                return Err(SimError::Interrupted { time: self.t });
            }

            let remaining = t_target - self.t;
            let magnitude_dt = self.integrator.suggest_next_dt(self.dt.abs()).abs().max(f64::MIN_POSITIVE);
            let mut signed_dt = magnitude_dt * direction;
            let overshoots = signed_dt.abs() >= remaining.abs();
            let shortened = overshoots && exact_finish;
            if shortened {
                signed_dt = remaining;
            }

            let snapshot = shortened.then(|| self.integrator.clone_box());
            self.integrator
                .step(self.store.as_mut_slice(), self.force.as_ref(), self.g, signed_dt);

            if let Some(snapshot) = snapshot {
                self.integrator = snapshot;
                self.t = t_target;
            } else {
                self.dt = signed_dt.abs();
                self.t += signed_dt;
            }
            self.steps_taken += 1;

            if let Some(hash) = watchdog::check_escape(&self.store, self.exit_max_distance) {
                log::warn!("escape detected at t={}", self.t);
                return Err(SimError::EscapeDetected { time: self.t, hash });
            }
            if let Some((hash_a, hash_b)) = watchdog::check_encounter(&self.store, self.exit_min_distance) {
                log::warn!("encounter detected at t={}", self.t);
                return Err(SimError::EncounterDetected { time: self.t, hash_a, hash_b });
            }

            log::trace!("t={} dt={} steps_taken={}", self.t, self.dt, self.steps_taken);

            if overshoots {
                break;
            }
        }
        Ok(())
    }

    /// A handle another thread can use to request cancellation at the next
    /// step boundary.
    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle(Arc::clone(&self.cancel))
    }

    /// Current simulation time.
    pub fn t(&self) -> f64 {
        self.t
    }

    /// Current live particle count.
    pub fn n(&self) -> usize {
        self.store.len()
    }

    /// The selected integrator's symbolic identifier.
    pub fn integrator_name(&self) -> &str {
        &self.integrator_name
    }

    /// The selected force evaluator's symbolic identifier.
    pub fn force_name(&self) -> &str {
        self.force.name()
    }

    /// Total number of internal steps taken across all `integrate` calls.
    pub fn steps_taken(&self) -> u64 {
        self.steps_taken
    }

    /// A read view by dense index. Valid only until the next mutation.
    pub fn particle_by_index(&self, index: usize) -> Option<&Particle> {
        self.store.get_by_index(index)
    }

    /// A read view by stable hash identity.
    pub fn particle_by_hash(&self, hash: ParticleHash) -> Option<&Particle> {
        self.store.get_by_hash(hash)
    }

    /// A read view by a string key, hashed the same way [`HashSpec::Named`]
    /// hashes it.
    pub fn particle_by_name_key(&self, key: &str) -> Option<&Particle> {
        self.store.get_by_hash(ParticleHash::from_name(key))
    }

    /// Iterate live particles in index order.
    pub fn particles(&self) -> impl Iterator<Item = &Particle> {
        self.store.iter()
    }

    /// Crate version, for a build-time status banner.
    pub fn version() -> &'static str {
        env!("CARGO_PKG_VERSION")
    }
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Simulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulation")
            .field("t", &self.t)
            .field("n", &self.n())
            .field("dt", &self.dt)
            .field("g", &self.g)
            .field("integrator", &self.integrator_name)
            .field("steps_taken", &self.steps_taken)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn three_body_kepler() -> Simulation {
        let mut sim = Simulation::new();
        sim.add(AddParticle::cartesian(1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0))
            .unwrap();
        sim.add(
            AddParticle::orbital(
                0.0,
                OrbitalElements {
                    a: 1.0,
                    e: 0.0,
                    inc: 0.0,
                    omega_cap: 0.0,
                    omega: 0.0,
                    f: 0.0,
                },
            )
            .with_hash_str("earth"),
        )
        .unwrap();
        sim.add(
            AddParticle::orbital(
                0.0,
                OrbitalElements {
                    a: 1.52,
                    e: 0.0,
                    inc: 0.0,
                    omega_cap: 0.0,
                    omega: 0.0,
                    f: 0.0,
                },
            )
            .with_hash_str("mars"),
        )
        .unwrap();
        sim.move_to_com();
        sim.dt = 0.001;
        sim
    }

    #[test]
    fn scenario_one_three_body_kepler_returns_to_start_after_one_orbit() {
        let mut sim = three_body_kepler();
        sim.integrate(std::f64::consts::TAU, true).unwrap();

        let earth = sim.particle_by_name_key("earth").unwrap();
        assert!((0.999..=1.001).contains(&earth.x), "x={}", earth.x);
        assert!((-0.001..=0.001).contains(&earth.y), "y={}", earth.y);
    }

    #[test]
    fn scenario_four_monotonic_integration_determinism() {
        let mut direct = three_body_kepler();
        direct.integrate(10.0, true).unwrap();

        let mut staged = three_body_kepler();
        staged.integrate(5.0, true).unwrap();
        staged.integrate(10.0, true).unwrap();

        for (a, b) in direct.particles().zip(staged.particles()) {
            assert_eq!(a.x, b.x);
            assert_eq!(a.y, b.y);
            assert_eq!(a.z, b.z);
        }
    }

    #[test]
    fn scenario_three_hash_stability_under_removal() {
        let mut sim = Simulation::new();
        sim.add(AddParticle::cartesian(1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0).with_hash_str("a"))
            .unwrap();
        sim.add(AddParticle::cartesian(1.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0).with_hash_str("b"))
            .unwrap();
        sim.add(AddParticle::cartesian(1.0, 2.0, 0.0, 0.0, 0.0, 0.0, 0.0).with_hash_str("c"))
            .unwrap();
        sim.add(AddParticle::cartesian(1.0, 3.0, 0.0, 0.0, 0.0, 0.0, 0.0).with_hash_str("d"))
            .unwrap();

        let hash_b = ParticleHash::from_name("b");
        sim.remove(RemoveSelector::Hash(hash_b)).unwrap();

        let hash_c = ParticleHash::from_name("c");
        let hash_d = ParticleHash::from_name("d");
        assert_eq!(sim.particle_by_index(1).unwrap().hash(), hash_c);
        assert_eq!(sim.particle_by_index(2).unwrap().hash(), hash_d);
        assert!(sim.particle_by_hash(hash_b).is_none());
    }

    #[test]
    fn scenario_five_com_idempotence() {
        let mut sim = three_body_kepler();
        sim.move_to_com();
        let before: Vec<(f64, f64, f64)> = sim.particles().map(|p| (p.x, p.y, p.z)).collect();
        sim.move_to_com();
        for (p, (x, y, z)) in sim.particles().zip(before) {
            assert_relative_eq!(p.x, x, epsilon = 1e-14);
            assert_relative_eq!(p.y, y, epsilon = 1e-14);
            assert_relative_eq!(p.z, z, epsilon = 1e-14);
        }
    }

    #[test]
    fn escape_past_the_boundary_reports_the_offending_hash_and_preserves_state() {
        let mut sim = Simulation::new();
        sim.add(AddParticle::cartesian(1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0))
            .unwrap();
        sim.add(AddParticle::cartesian(0.0, 0.4, 0.0, 0.0, 0.0, 5.0, 0.0).with_hash_str("mercury"))
            .unwrap();
        sim.exit_max_distance = 50.0;
        sim.dt = 0.01;

        let err = sim.integrate(10.0, true).unwrap_err();
        match err {
            SimError::EscapeDetected { hash, .. } => {
                assert_eq!(hash, ParticleHash::from_name("mercury"));
            }
            other => panic!("expected EscapeDetected, got {other:?}"),
        }
        // state was preserved at the violating step boundary, not rolled back
        assert!(sim.t() > 0.0);
        assert_eq!(sim.n(), 2);
    }

    #[test]
    fn integrate_to_current_time_is_a_no_op() {
        let mut sim = three_body_kepler();
        let before: Vec<(f64, f64, f64)> = sim.particles().map(|p| (p.x, p.y, p.z)).collect();
        sim.integrate(sim.t(), true).unwrap();
        for (p, (x, y, z)) in sim.particles().zip(before) {
            assert_eq!(p.x, x);
            assert_eq!(p.y, y);
            assert_eq!(p.z, z);
        }
    }

    #[test]
    fn unknown_integrator_name_is_rejected() {
        let mut sim = Simulation::new();
        assert_eq!(
            sim.set_integrator("mercurius").unwrap_err(),
            SimError::UnknownIntegrator("mercurius".to_string())
        );
        // unchanged: still the default
        assert_eq!(sim.integrator_name(), "leapfrog");
    }

    #[test]
    fn orbital_add_with_no_particles_fails_without_mutation() {
        let mut sim = Simulation::new();
        let err = sim
            .add(AddParticle::orbital(
                1.0,
                OrbitalElements {
                    a: 1.0,
                    e: 0.0,
                    inc: 0.0,
                    omega_cap: 0.0,
                    omega: 0.0,
                    f: 0.0,
                },
            ))
            .unwrap_err();
        assert_eq!(err, SimError::NoParticles);
        assert_eq!(sim.n(), 0);
    }

    #[test]
    fn cancel_handle_interrupts_at_the_next_step_boundary() {
        let mut sim = three_body_kepler();
        let handle = sim.cancel_handle();
        handle.cancel();
        let err = sim.integrate(100.0, true).unwrap_err();
        assert!(matches!(err, SimError::Interrupted { .. }));
    }
}
