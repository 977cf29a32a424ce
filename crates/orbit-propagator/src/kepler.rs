//! Kepler's equation solver
//!
//! Newton–Raphson on f(E) = E − e·sin E − M. Non-convergence is not an
//! error: the last iterate is returned and `converged` is false.

use std::f64::consts::{PI, TAU};
use tracing::debug;

pub const KEPLER_TOLERANCE: f64 = 1e-10;
pub const KEPLER_MAX_ITERATIONS: u32 = 100;

/// At or above this eccentricity the first guess is E₀ = π
pub const HIGH_ECCENTRICITY_GUESS_THRESHOLD: f64 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeplerSolution {
    /// Eccentric anomaly in radians
    pub eccentric_anomaly: f64,
    pub iterations: u32,
    pub converged: bool,
}

/// Eccentric anomaly (radians) for a mean anomaly (radians)
pub fn solve_kepler_equation(mean_anomaly_rad: f64, eccentricity: f64) -> f64 {
    solve_kepler_equation_with(
        mean_anomaly_rad,
        eccentricity,
        KEPLER_TOLERANCE,
        KEPLER_MAX_ITERATIONS,
    )
    .eccentric_anomaly
}

pub fn solve_kepler_equation_with(
    mean_anomaly_rad: f64,
    eccentricity: f64,
    tolerance: f64,
    max_iterations: u32,
) -> KeplerSolution {
    let mean_anomaly = mean_anomaly_rad.rem_euclid(TAU);

    let mut e_anom = if eccentricity < HIGH_ECCENTRICITY_GUESS_THRESHOLD {
        mean_anomaly
    } else {
        PI
    };

    for iteration in 1..=max_iterations {
        let f = e_anom - eccentricity * e_anom.sin() - mean_anomaly;
        let f_prime = 1.0 - eccentricity * e_anom.cos();
        let next = e_anom - f / f_prime;

        if (next - e_anom).abs() < tolerance {
            return KeplerSolution {
                eccentric_anomaly: next,
                iterations: iteration,
                converged: true,
            };
        }
        e_anom = next;
    }

    debug!(
        mean_anomaly,
        eccentricity, max_iterations, "Kepler solver hit iteration cap, returning last estimate"
    );

    KeplerSolution {
        eccentric_anomaly: e_anom,
        iterations: max_iterations,
        converged: false,
    }
}
