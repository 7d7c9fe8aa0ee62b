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
//! Integrators, the second half of the Force/Integrator interface (C3).
//!
//! An [`Integrator`] advances particle state by one internal step given a
//! requested `dt` and a [`ForceEvaluator`], and reports the `dt` it
//! actually achieved (adaptive variants may shrink it). Selection happens
//! by symbolic identifier on [`crate::Simulation`]; switching identifiers
//! re-initializes the integrator's private scratch state via [`Integrator::reset`].
//!
//! Two reference implementations are provided. Neither is a faithful port
//! of REBOUND's actual `WHFast`/`IAS15` algorithms — those remain out of
//! scope (spec §1) — they exist so the driver has something concrete to
//! exercise against the testable properties in spec §8.
//!
//! - [`Leapfrog`]: fixed-step, symplectic kick-drift-kick. Also answers to
//!   the `whfast` identifier, as a documented approximation.
//! - [`Ias15Like`]: adaptive step, local-truncation-error estimated by
//!   step-doubling, step ratio clamped to `[0.5, 2.0]`.

use crate::force::{Accel, ForceEvaluator};
use crate::store::Particle;

/// Advances particle state by one internal step.
pub trait Integrator: Send + Sync {
    /// Human-readable identifier, e.g. `"leapfrog"`.
    fn name(&self) -> &str;

    /// Advance `particles` by approximately `dt`, returning the `dt`
    /// actually achieved.
    fn step(&mut self, particles: &mut [Particle], force: &dyn ForceEvaluator, g: f64, dt: f64) -> f64;

    /// Discard private scratch state. Called when the selected integrator
    /// or the particle topology (an add/remove) changes.
    fn reset(&mut self);

    /// Adjust the caller-requested step size before taking it. Fixed-step
    /// integrators return `requested` unchanged; [`Ias15Like`] substitutes
    /// the step it suggested after its previous call.
    fn suggest_next_dt(&self, requested: f64) -> f64 {
        requested
    }

    /// Clone behind a trait object, used to snapshot/restore scratch
    /// state around a shortened `exact_finish` final step.
    fn clone_box(&self) -> Box<dyn Integrator>;
}

/// Fixed-step symplectic kick-drift-kick (leapfrog) integrator.
///
/// ```text
/// v(t + dt/2) = v(t) + 0.5*a(t)*dt
/// x(t + dt)   = x(t) + v(t + dt/2)*dt
/// v(t + dt)   = v(t + dt/2) + 0.5*a(t + dt)*dt
/// ```
///
/// Symplectic and time-reversible, matching the velocity-Verlet family's
/// energy-conservation behavior over long integrations.
#[derive(Debug, Clone, Default)]
pub struct Leapfrog;

impl Leapfrog {
    /// Construct a leapfrog integrator.
    pub fn new() -> Self {
        Leapfrog
    }
}

impl Integrator for Leapfrog {
    fn name(&self) -> &str {
        "leapfrog"
    }

    fn step(&mut self, particles: &mut [Particle], force: &dyn ForceEvaluator, g: f64, dt: f64) -> f64 {
        kick_drift_kick(particles, force, g, dt);
        dt
    }

    fn reset(&mut self) {}

    fn clone_box(&self) -> Box<dyn Integrator> {
        Box::new(self.clone())
    }
}

fn kick_drift_kick(particles: &mut [Particle], force: &dyn ForceEvaluator, g: f64, dt: f64) {
    let mut accel = vec![[0.0_f64; 3]; particles.len()];
    force.accelerations(particles, g, &mut accel);
    kick(particles, &accel, 0.5 * dt);

    for p in particles.iter_mut() {
        p.x += p.vx * dt;
        p.y += p.vy * dt;
        p.z += p.vz * dt;
    }

    force.accelerations(particles, g, &mut accel);
    kick(particles, &accel, 0.5 * dt);
}

fn kick(particles: &mut [Particle], accel: &[Accel], half_dt: f64) {
    for (p, a) in particles.iter_mut().zip(accel) {
        p.vx += a[0] * half_dt;
        p.vy += a[1] * half_dt;
        p.vz += a[2] * half_dt;
    }
}

/// Adaptive-timestep integrator using step-doubling error control.
///
/// Each call advances with one kick-drift-kick step of size `dt` and,
/// separately, two kick-drift-kick steps of size `dt/2` from the same
/// starting state; the difference between the two results estimates the
/// local truncation error. The finer (two-half-step) trajectory is
/// committed. The suggested step for the *next* call is scaled by the
/// ratio of the error tolerance to the observed error, clamped to
/// `[0.5, 2.0]` to avoid oscillating step sizes.
#[derive(Debug, Clone)]
pub struct Ias15Like {
    tolerance: f64,
    min_dt: f64,
    max_dt: f64,
    suggested_dt: Option<f64>,
}

impl Ias15Like {
    /// Construct an adaptive integrator with the given relative position
    /// tolerance per step.
    pub fn new(tolerance: f64) -> Self {
        Ias15Like {
            tolerance,
            min_dt: 1e-12,
            max_dt: f64::INFINITY,
            suggested_dt: None,
        }
    }

    /// Clamp the range of step sizes this integrator will choose.
    pub fn with_dt_bounds(mut self, min_dt: f64, max_dt: f64) -> Self {
        self.min_dt = min_dt;
        self.max_dt = max_dt;
        self
    }

    /// The step size suggested for the next call, if one has been
    /// computed yet.
    pub fn suggested_dt(&self) -> Option<f64> {
        self.suggested_dt
    }
}

impl Integrator for Ias15Like {
    fn name(&self) -> &str {
        "ias15"
    }

    fn step(&mut self, particles: &mut [Particle], force: &dyn ForceEvaluator, g: f64, dt: f64) -> f64 {
        let coarse: Vec<Particle> = particles.to_vec();
        let mut coarse = coarse;
        kick_drift_kick(&mut coarse, force, g, dt);

        kick_drift_kick(particles, force, g, dt * 0.5);
        kick_drift_kick(particles, force, g, dt * 0.5);

        let mut max_err = 0.0_f64;
        for (fine, coarse) in particles.iter().zip(&coarse) {
            let dx = fine.x - coarse.x;
            let dy = fine.y - coarse.y;
            let dz = fine.z - coarse.z;
            let err = (dx * dx + dy * dy + dz * dz).sqrt();
            max_err = max_err.max(err);
        }

        let ratio = if max_err > 0.0 {
            (self.tolerance / max_err).powf(1.0 / 3.0).clamp(0.5, 2.0)
        } else {
            2.0
        };
        let next_dt = (dt * ratio).clamp(self.min_dt, self.max_dt);
        self.suggested_dt = Some(next_dt);

        dt
    }

    fn reset(&mut self) {
        self.suggested_dt = None;
    }

    fn suggest_next_dt(&self, requested: f64) -> f64 {
        self.suggested_dt.unwrap_or(requested)
    }

    fn clone_box(&self) -> Box<dyn Integrator> {
        Box::new(self.clone())
    }
}
