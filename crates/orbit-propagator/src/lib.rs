//! Orbit Propagator Library
//!
//! Two-body Keplerian propagation for Earth satellites: element-set validation,
//! Kepler's equation, perifocal-to-inertial transforms and time sampling for
//! trajectory renderers.
//!
//! # Propagation chain
//!
//! ```text
//! M(t) = M₀ + n·t          n = √(μ/a³)
//! M = E − e·sin E          (Newton–Raphson)
//! ν = 2·atan2(√((1+e)/(1−e))·sin(E/2), cos(E/2))
//! r = a(1 − e²) / (1 + e·cos ν)
//! r_eci = R_z(Ω)·R_x(i)·R_z(ω)·(r cos ν, r sin ν, 0)
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod elements;
pub mod kepler;
pub mod propagation;
pub mod sampling;

pub use elements::{parse_epoch, ElementInput, OrbitalElementSet};
pub use kepler::{solve_kepler_equation, solve_kepler_equation_with, KeplerSolution};
pub use propagation::{
    calculate_orbital_period, calculate_velocity, semi_major_axis_from_mean_motion,
    InertialPosition, OrbitState, OrbitalPropagator,
};
pub use sampling::{
    predict_positions, predict_positions_parallel, PositionStream, TimeSampling, Trajectory,
    TrajectorySample,
};

/// Earth gravitational parameter μ (km³/s²)
pub const MU_EARTH_KM3_S2: f64 = 398600.4418;

/// Earth mean radius (km)
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Below this eccentricity the orbit is treated as circular (ν = E)
pub const CIRCULAR_ECCENTRICITY_THRESHOLD: f64 = 1e-10;

pub const SECONDS_PER_DAY: f64 = 86400.0;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum OrbitalError {
    #[error("Invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },
    #[error("Elapsed time must be finite and non-negative, got {0} s")]
    InvalidElapsedTime(f64),
    #[error("Cannot compare orbital element set with {0}")]
    ComparisonType(String),
    #[error("Invalid time sampling: {0}")]
    InvalidSampling(String),
    #[error("Could not start prediction workers: {0}")]
    WorkerPool(String),
}

impl OrbitalError {
    pub(crate) fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        OrbitalError::Validation {
            field,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, OrbitalError>;

/// Spherical sub-point of an inertial position
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SphericalPosition {
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    pub altitude_km: f64,
}

pub mod transforms {
    //! Frame transforms
    //!
    //! Perifocal (PQW) to Earth-centred inertial, plus a spherical-Earth
    //! sub-point for altitude plots. No Earth rotation is applied.

    use super::*;

    /// True anomaly from eccentric anomaly (radians)
    pub fn true_anomaly_from_eccentric(eccentric_anomaly: f64, eccentricity: f64) -> f64 {
        if eccentricity < CIRCULAR_ECCENTRICITY_THRESHOLD {
            return eccentric_anomaly;
        }

        let scale = ((1.0 + eccentricity) / (1.0 - eccentricity)).sqrt();
        2.0 * (scale * (eccentric_anomaly / 2.0).sin()).atan2((eccentric_anomaly / 2.0).cos())
    }

    /// Conic radius r = a(1 − e²) / (1 + e·cos ν) in km
    pub fn orbital_radius(semi_major_axis_km: f64, eccentricity: f64, true_anomaly: f64) -> f64 {
        semi_major_axis_km * (1.0 - eccentricity * eccentricity)
            / (1.0 + eccentricity * true_anomaly.cos())
    }

    /// Rotate an in-plane perifocal point into the inertial frame.
    ///
    /// Applied as three 2D rotations: argument of perigee about z, then
    /// inclination about x, then RAAN about z. All angles in radians.
    pub fn perifocal_to_inertial(
        x_pqw: f64,
        y_pqw: f64,
        raan_rad: f64,
        inclination_rad: f64,
        arg_perigee_rad: f64,
    ) -> (f64, f64, f64) {
        let (sin_w, cos_w) = arg_perigee_rad.sin_cos();
        let (sin_i, cos_i) = inclination_rad.sin_cos();
        let (sin_o, cos_o) = raan_rad.sin_cos();

        // R_z(ω)
        let x1 = x_pqw * cos_w - y_pqw * sin_w;
        let y1 = x_pqw * sin_w + y_pqw * cos_w;
        let z1 = 0.0;

        // R_x(i)
        let x2 = x1;
        let y2 = y1 * cos_i - z1 * sin_i;
        let z2 = y1 * sin_i + z1 * cos_i;

        // R_z(Ω)
        let x = x2 * cos_o - y2 * sin_o;
        let y = x2 * sin_o + y2 * cos_o;

        (x, y, z2)
    }

    /// Latitude/longitude/altitude of an inertial vector over a spherical Earth
    pub fn inertial_to_spherical(x: f64, y: f64, z: f64) -> SphericalPosition {
        let r_xy = (x * x + y * y).sqrt();
        SphericalPosition {
            latitude_deg: z.atan2(r_xy).to_degrees(),
            longitude_deg: y.atan2(x).to_degrees(),
            altitude_km: (x * x + y * y + z * z).sqrt() - EARTH_RADIUS_KM,
        }
    }
}
