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
//! Solar System N-Body Simulation Example
//!
//! Demonstrates the `rebound` Simulation runtime with realistic solar
//! system parameters:
//!
//! - Newton's law of universal gravitation via direct summation
//! - Selectable integrator (`leapfrog`/`whfast`, or `ias15`)
//! - Energy conservation tracking
//! - Deterministic simulation results
//!
//! # Physical Constants
//!
//! All values use SI units (meters, kilograms, seconds) based on:
//! - NASA Planetary Fact Sheet: https://nssdc.gsfc.nasa.gov/planetary/factsheet/
//! - JPL Solar System Dynamics: https://ssd.jpl.nasa.gov/
//!
//! # Running
//!
//! ```bash
//! cargo run --example solar_system --release
//! cargo run --example solar_system --release -- --integrator ias15
//! cargo run --example solar_system --release -- --years 10 --timestep 3600
//! ```

use rebound::{AddParticle, Simulation};

/// Astronomical Unit in meters (average Earth-Sun distance).
const AU: f64 = 1.495978707e11;

/// One Earth day in seconds.
const DAY: f64 = 86400.0;

/// One Earth year in seconds (365.25 days).
const YEAR: f64 = 365.25 * DAY;

/// Newtonian gravitational constant, SI units.
const GRAVITATIONAL_CONSTANT: f64 = 6.674e-11;

/// Celestial body data, for building the initial state.
struct CelestialBody {
    name: &'static str,
    mass: f64,
    distance: f64,
    orbital_velocity: f64,
}

/// Source: https://nssdc.gsfc.nasa.gov/planetary/factsheet/
const SOLAR_BODIES: &[CelestialBody] = &[
    CelestialBody {
        name: "Sun",
        mass: 1.989e30,
        distance: 0.0,
        orbital_velocity: 0.0,
    },
    CelestialBody {
        name: "Mercury",
        mass: 3.301e23,
        distance: 0.387 * AU,
        orbital_velocity: 47870.0,
    },
    CelestialBody {
        name: "Venus",
        mass: 4.867e24,
        distance: 0.723 * AU,
        orbital_velocity: 35020.0,
    },
    CelestialBody {
        name: "Earth",
        mass: 5.972e24,
        distance: 1.0 * AU,
        orbital_velocity: 29780.0,
    },
    CelestialBody {
        name: "Mars",
        mass: 6.417e23,
        distance: 1.524 * AU,
        orbital_velocity: 24070.0,
    },
];

struct SimulationConfig {
    integrator_name: String,
    timestep: f64,
    duration: f64,
    output_interval: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            integrator_name: "leapfrog".to_string(),
            timestep: DAY,
            duration: YEAR,
            output_interval: 30.0 * DAY,
        }
    }
}

fn build_solar_system(sim: &mut Simulation) {
    for body in SOLAR_BODIES {
        let hash = sim
            .add(
                AddParticle::cartesian(body.mass, body.distance, 0.0, 0.0, 0.0, body.orbital_velocity, 0.0)
                    .with_hash_str(body.name.to_ascii_lowercase()),
            )
            .expect("solar system bodies have distinct names");
        println!(
            "Created {} (hash {hash}) - mass: {:.3e} kg, distance: {:.3e} m ({:.3} AU), v: {:.0} m/s",
            body.name,
            body.mass,
            body.distance,
            body.distance / AU,
            body.orbital_velocity
        );
    }
}

/// Total kinetic energy, summed over live particles.
fn kinetic_energy(sim: &Simulation) -> f64 {
    sim.particles().map(|p| p.kinetic_energy()).sum()
}

/// Total potential energy, pairwise over live particles.
fn potential_energy(sim: &Simulation) -> f64 {
    let particles: Vec<_> = sim.particles().collect();
    let mut pe = 0.0;
    for i in 0..particles.len() {
        for j in (i + 1)..particles.len() {
            let dx = particles[j].x - particles[i].x;
            let dy = particles[j].y - particles[i].y;
            let dz = particles[j].z - particles[i].z;
            let r = (dx * dx + dy * dy + dz * dz).sqrt();
            if r > 0.0 {
                pe -= GRAVITATIONAL_CONSTANT * particles[i].m * particles[j].m / r;
            }
        }
    }
    pe
}

fn print_state(sim: &Simulation) {
    let ke = kinetic_energy(sim);
    let pe = potential_energy(sim);
    println!("\n=== t = {:.2} years ({:.2e} s) ===", sim.t() / YEAR, sim.t());
    println!("Kinetic Energy:   {ke:.6e} J");
    println!("Potential Energy: {pe:.6e} J");
    println!("Total Energy:     {:.6e} J", ke + pe);

    if let Some(earth) = sim.particle_by_name_key("earth") {
        let r = (earth.x * earth.x + earth.y * earth.y + earth.z * earth.z).sqrt();
        println!("Earth distance from Sun: {r:.3e} m ({:.3} AU)", r / AU);
    }
}

fn main() {
    println!("==========================================================");
    println!("       Solar System N-Body Simulation (rebound)");
    println!("==========================================================\n");
    println!("G = {GRAVITATIONAL_CONSTANT:.5e} m^3/(kg*s^2)");
    println!("1 AU = {AU:.5e} m");
    println!("1 year = {YEAR:.5e} s\n");

    let args: Vec<String> = std::env::args().collect();
    let mut config = SimulationConfig::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--integrator" => {
                if i + 1 < args.len() {
                    config.integrator_name = args[i + 1].clone();
                    i += 2;
                } else {
                    eprintln!("Error: --integrator requires an argument");
                    std::process::exit(1);
                }
            }
            "--timestep" => {
                if i + 1 < args.len() {
                    match args[i + 1].parse::<f64>() {
                        Ok(value) => config.timestep = value,
                        Err(_) => eprintln!("Warning: invalid --timestep '{}', keeping default", args[i + 1]),
                    }
                    i += 2;
                } else {
                    eprintln!("Error: --timestep requires an argument");
                    std::process::exit(1);
                }
            }
            "--years" => {
                if i + 1 < args.len() {
                    match args[i + 1].parse::<f64>() {
                        Ok(years) => config.duration = years * YEAR,
                        Err(_) => eprintln!("Warning: invalid --years '{}', keeping default", args[i + 1]),
                    }
                    i += 2;
                } else {
                    eprintln!("Error: --years requires an argument");
                    std::process::exit(1);
                }
            }
            _ => i += 1,
        }
    }

    println!("Configuration:");
    println!("  Integrator: {}", config.integrator_name);
    println!("  Timestep: {:.0} s ({:.2} days)", config.timestep, config.timestep / DAY);
    println!("  Duration: {:.2} years\n", config.duration / YEAR);

    let mut sim = Simulation::new();
    sim.g = GRAVITATIONAL_CONSTANT;
    sim.dt = config.timestep;
    sim.set_integrator(&config.integrator_name).unwrap_or_else(|err| {
        eprintln!("Warning: {err}; falling back to leapfrog");
        sim.set_integrator("leapfrog").unwrap();
    });

    println!("Creating solar system bodies...\n");
    build_solar_system(&mut sim);
    sim.move_to_com();

    println!("\nStarting simulation with {} integrator...", sim.integrator_name());

    let initial_energy = kinetic_energy(&sim) + potential_energy(&sim);
    print_state(&sim);

    let mut next_output = config.output_interval;
    while sim.t() < config.duration {
        let target = (sim.t() + config.output_interval).min(config.duration);
        if let Err(err) = sim.integrate(target, true) {
            eprintln!("Integration stopped early: {err}");
            break;
        }
        if sim.t() >= next_output {
            print_state(&sim);
            next_output += config.output_interval;
        }
    }

    println!("\n==========================================================");
    println!("                  SIMULATION COMPLETE");
    println!("==========================================================");
    print_state(&sim);

    let final_energy = kinetic_energy(&sim) + potential_energy(&sim);
    let drift = ((final_energy - initial_energy) / initial_energy).abs();
    println!("\nEnergy Conservation:");
    println!("  Initial Energy: {initial_energy:.6e} J");
    println!("  Final Energy:   {final_energy:.6e} J");
    println!("  Relative Drift: {drift:.6e} ({:.4}%)", drift * 100.0);
    println!("\nCompleted {} integrator steps over {:.2} years", sim.steps_taken(), sim.t() / YEAR);
}
