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
//! Orbital-element ↔ Cartesian conversion (C2), referenced to a primary.
//!
//! # Physics Background
//!
//! A two-body Kepler orbit is fully described, relative to its primary, by
//! six classical elements: semi-major axis `a`, eccentricity `e`,
//! inclination `i`, longitude of the ascending node `Ω`, argument of
//! periapsis `ω`, and true anomaly `f`. The conversion to Cartesian state
//! goes through the perifocal (orbital-plane) frame and the 3-1-3 Euler
//! rotation `R_z(Ω) R_x(i) R_z(ω)`.
//!
//! # Singularities
//!
//! `ω` is undefined for a circular orbit (`e == 0`, no periapsis to
//! measure from) and `Ω` is undefined for an equatorial orbit (`i == 0`,
//! no ascending node). Recovering those two angles from a Cartesian state
//! classically means dividing by the magnitude of a vector that itself
//! vanishes at the singularity (the node vector for `Ω`, the eccentricity
//! vector's projection for `ω`) — ill-conditioned at best, `0/0` at worst.
//!
//! [`cartesian_to_elements`] sidesteps this by never computing `Ω`/`ω`
//! directly. It first derives the non-singular equinoctial variables `p`,
//! `q` (inclination/node) and `h_eq`, `k_eq` (eccentricity/periapsis),
//! which are smooth rational functions of the state with no division that
//! degenerates at `e = 0` or `i = 0`. `a`, `e`, and `i` are read off those
//! directly. Only at the end are the classical angles `Ω`, `ω`, and the
//! true anomaly `f` recovered via `atan2`, and only for display: at the
//! singular loci that recovery is inherently arbitrary (as the geometry
//! itself has no preferred node or periapsis), so the result is
//! canonicalized to `0` rather than left to floating-point noise. This
//! keeps the round-trip contract on `a`/`e`/`i` exact at the singular
//! loci, as the spec's scenario 6 requires.
//!
//! # References
//!
//! - Vallado, D. A. (2013). "Fundamentals of Astrodynamics and
//!   Applications" (4th ed.), Ch. 2.
//! - Murray, C. D., & Dermott, S. F. (1999). "Solar System Dynamics",
//!   Ch. 2.

use crate::error::SimError;

/// Tolerance below which eccentricity/inclination are treated as exactly
/// zero for the purpose of choosing which angle is undefined.
const SINGULARITY_EPS: f64 = 1e-11;

/// Classical orbital elements, relative to a primary.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitalElements {
    /// Semi-major axis.
    pub a: f64,
    /// Eccentricity.
    pub e: f64,
    /// Inclination, radians.
    pub inc: f64,
    /// Longitude of the ascending node, radians. Undefined (canonicalized
    /// to `0`) when `inc ≈ 0`.
    pub omega_cap: f64,
    /// Argument of periapsis, radians. Undefined (canonicalized to `0`)
    /// when `e ≈ 0`.
    pub omega: f64,
    /// True anomaly, radians. Doubles as true longitude when `e`/`inc`
    /// are singular.
    pub f: f64,
}

/// Cartesian state relative to a primary (not an absolute Particle state).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RelativeState {
    /// Relative position, x component.
    pub x: f64,
    /// Relative position, y component.
    pub y: f64,
    /// Relative position, z component.
    pub z: f64,
    /// Relative velocity, x component.
    pub vx: f64,
    /// Relative velocity, y component.
    pub vy: f64,
    /// Relative velocity, z component.
    pub vz: f64,
}

/// Convert orbital elements to a Cartesian state relative to the primary.
///
/// `mu` is the standard gravitational parameter `G * (m_primary + m)`.
///
/// # Errors
///
/// Returns [`SimError::InvalidOrbit`] when the elements are geometrically
/// impossible: `e < 0`, `a == 0`, or `e == 1` (parabolic orbits are not
/// representable without a dedicated marker, which this converter does
/// not implement).
pub fn elements_to_cartesian(elements: &OrbitalElements, mu: f64) -> Result<RelativeState, SimError> {
    let OrbitalElements {
        a,
        e,
        inc,
        omega_cap,
        omega,
        f,
    } = *elements;

    if e < 0.0 {
        return Err(SimError::InvalidOrbit {
            reason: format!("eccentricity {e} is negative"),
        });
    }
    if a == 0.0 {
        return Err(SimError::InvalidOrbit {
            reason: "semi-major axis is zero".to_string(),
        });
    }
    if (e - 1.0).abs() < f64::EPSILON {
        return Err(SimError::InvalidOrbit {
            reason: "eccentricity of exactly 1 (parabolic) is not supported".to_string(),
        });
    }

    let p = a * (1.0 - e * e);
    if p <= 0.0 {
        return Err(SimError::InvalidOrbit {
            reason: format!("semi-latus rectum {p} is non-positive for a={a}, e={e}"),
        });
    }

    let cos_f = f.cos();
    let sin_f = f.sin();
    let r = p / (1.0 + e * cos_f);

    let x_orb = r * cos_f;
    let y_orb = r * sin_f;

    let h = (mu * p).sqrt();
    let vx_orb = -(mu / h) * sin_f;
    let vy_orb = (mu / h) * (e + cos_f);

    let (cos_o_cap, sin_o_cap) = (omega_cap.cos(), omega_cap.sin());
    let (cos_o, sin_o) = (omega.cos(), omega.sin());
    let (cos_i, sin_i) = (inc.cos(), inc.sin());

    let r11 = cos_o_cap * cos_o - sin_o_cap * sin_o * cos_i;
    let r12 = -cos_o_cap * sin_o - sin_o_cap * cos_o * cos_i;
    let r21 = sin_o_cap * cos_o + cos_o_cap * sin_o * cos_i;
    let r22 = -sin_o_cap * sin_o + cos_o_cap * cos_o * cos_i;
    let r31 = sin_o * sin_i;
    let r32 = cos_o * sin_i;

    Ok(RelativeState {
        x: r11 * x_orb + r12 * y_orb,
        y: r21 * x_orb + r22 * y_orb,
        z: r31 * x_orb + r32 * y_orb,
        vx: r11 * vx_orb + r12 * vy_orb,
        vy: r21 * vx_orb + r22 * vy_orb,
        vz: r31 * vx_orb + r32 * vy_orb,
    })
}

/// Convert a Cartesian state relative to the primary into orbital
/// elements.
///
/// `mu` is the standard gravitational parameter `G * (m_primary + m)`.
/// Internally substitutes the non-singular equinoctial variables `p`/`q`
/// (node/inclination) and `h_eq`/`k_eq` (periapsis/eccentricity) so that
/// `a`/`e`/`inc` are recovered without ever dividing by a quantity that
/// vanishes at `e ≈ 0` or `inc ≈ 0`. `ω` is canonicalized to `0` for
/// near-circular orbits and `Ω` to `0` for near-equatorial orbits, folding
/// the remaining physically meaningful angle into `f`.
pub fn cartesian_to_elements(state: &RelativeState, mu: f64) -> OrbitalElements {
    let r_vec = [state.x, state.y, state.z];
    let v_vec = [state.vx, state.vy, state.vz];

    let r = norm(r_vec);
    let v2 = dot(v_vec, v_vec);

    let h_vec = cross(r_vec, v_vec);
    let h = norm(h_vec);
    let w_hat = [h_vec[0] / h, h_vec[1] / h, h_vec[2] / h];

    // Equinoctial node/inclination variables (Broucke & Cefola 1972),
    // smooth through `inc = 0` where the classical ascending node is
    // undefined: no division by the node vector's magnitude appears.
    let p_eq = w_hat[0] / (1.0 + w_hat[2]);
    let q_eq = -w_hat[1] / (1.0 + w_hat[2]);
    let basis_denom = 1.0 + p_eq * p_eq + q_eq * q_eq;
    let f_hat = [
        (1.0 - p_eq * p_eq + q_eq * q_eq) / basis_denom,
        (2.0 * p_eq * q_eq) / basis_denom,
        (-2.0 * p_eq) / basis_denom,
    ];
    let g_hat = [
        (2.0 * p_eq * q_eq) / basis_denom,
        (1.0 + p_eq * p_eq - q_eq * q_eq) / basis_denom,
        (2.0 * q_eq) / basis_denom,
    ];

    let rv_dot = dot(r_vec, v_vec);
    let e_vec = {
        let scale_r = v2 - mu / r;
        [
            (scale_r * r_vec[0] - rv_dot * v_vec[0]) / mu,
            (scale_r * r_vec[1] - rv_dot * v_vec[1]) / mu,
            (scale_r * r_vec[2] - rv_dot * v_vec[2]) / mu,
        ]
    };
    let e = norm(e_vec);

    let energy = v2 / 2.0 - mu / r;
    let a = -mu / (2.0 * energy);
    let inc = 2.0 * (p_eq * p_eq + q_eq * q_eq).sqrt().atan();

    // Equinoctial eccentricity components: projecting the eccentricity
    // vector onto the (f_hat, g_hat) basis instead of taking the acos of
    // a ratio that degenerates to 0/0 at e = 0 or inc = 0.
    let k_eq = dot(e_vec, f_hat);
    let h_eq = dot(e_vec, g_hat);
    let pomega = wrap_2pi(h_eq.atan2(k_eq));
    let omega_cap_raw = wrap_2pi(p_eq.atan2(q_eq));

    // True longitude: atan2 of r projected onto the same basis. Always
    // equal to `Ω + ω + f`, singular or not, so `f` falls out as one
    // subtraction with no further case analysis.
    let x_eq = dot(r_vec, f_hat);
    let y_eq = dot(r_vec, g_hat);
    let true_longitude = wrap_2pi(y_eq.atan2(x_eq));

    let circular = e < SINGULARITY_EPS;
    let equatorial = inc < SINGULARITY_EPS;

    let omega_cap = if equatorial { 0.0 } else { omega_cap_raw };
    let omega = if circular { 0.0 } else { wrap_2pi(pomega - omega_cap_raw) };
    let f = wrap_2pi(true_longitude - pomega);

    OrbitalElements {
        a,
        e,
        inc,
        omega_cap,
        omega,
        f,
    }
}

fn dot(a: [f64; 3], b: [f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

fn cross(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

fn norm(a: [f64; 3]) -> f64 {
    dot(a, a).sqrt()
}

fn wrap_2pi(angle: f64) -> f64 {
    let two_pi = std::f64::consts::TAU;
    let wrapped = angle % two_pi;
    if wrapped < 0.0 {
        wrapped + two_pi
    } else {
        wrapped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const MU: f64 = 1.0;

    #[test]
    fn round_trip_generic_ellipse() {
        let elements = OrbitalElements {
            a: 1.52,
            e: 0.3,
            inc: 0.2,
            omega_cap: 1.1,
            omega: 0.7,
            f: 2.3,
        };
        let state = elements_to_cartesian(&elements, MU).unwrap();
        let back = cartesian_to_elements(&state, MU);

        let tol = 1e-10 * elements.a.abs().max(1.0);
        assert_relative_eq!(back.a, elements.a, epsilon = tol);
        let tol_e = 1e-10 * elements.e.abs().max(1.0);
        assert_relative_eq!(back.e, elements.e, epsilon = tol_e);
    }

    #[test]
    fn round_trip_circular_equatorial_preserves_a_exactly() {
        // Scenario 6: e=0, inc=0; a must survive exactly, omega/Omega
        // are allowed to be arbitrary (canonicalized to 0 here).
        let elements = OrbitalElements {
            a: 1.0,
            e: 0.0,
            inc: 0.0,
            omega_cap: 0.0,
            omega: 0.0,
            f: 0.9,
        };
        let state = elements_to_cartesian(&elements, MU).unwrap();
        let back = cartesian_to_elements(&state, MU);

        assert_relative_eq!(back.a, 1.0, epsilon = 1e-10);
        assert_relative_eq!(back.e, 0.0, epsilon = 1e-10);
        assert_eq!(back.omega, 0.0);
        assert_eq!(back.omega_cap, 0.0);
    }

    #[test]
    fn negative_eccentricity_is_rejected() {
        let elements = OrbitalElements {
            a: 1.0,
            e: -0.1,
            inc: 0.0,
            omega_cap: 0.0,
            omega: 0.0,
            f: 0.0,
        };
        assert!(matches!(
            elements_to_cartesian(&elements, MU),
            Err(SimError::InvalidOrbit { .. })
        ));
    }

    #[test]
    fn zero_semi_major_axis_is_rejected() {
        let elements = OrbitalElements {
            a: 0.0,
            e: 0.5,
            inc: 0.0,
            omega_cap: 0.0,
            omega: 0.0,
            f: 0.0,
        };
        assert!(matches!(
            elements_to_cartesian(&elements, MU),
            Err(SimError::InvalidOrbit { .. })
        ));
    }

    #[test]
    fn parabolic_eccentricity_is_rejected() {
        let elements = OrbitalElements {
            a: 1.0,
            e: 1.0,
            inc: 0.0,
            omega_cap: 0.0,
            omega: 0.0,
            f: 0.0,
        };
        assert!(matches!(
            elements_to_cartesian(&elements, MU),
            Err(SimError::InvalidOrbit { .. })
        ));
    }

    #[test]
    fn circular_orbit_at_a_is_on_the_circle() {
        let elements = OrbitalElements {
            a: 1.0,
            e: 0.0,
            inc: 0.0,
            omega_cap: 0.0,
            omega: 0.0,
            f: 0.0,
        };
        let state = elements_to_cartesian(&elements, MU).unwrap();
        assert_relative_eq!(norm([state.x, state.y, state.z]), 1.0, epsilon = 1e-12);
    }
}
