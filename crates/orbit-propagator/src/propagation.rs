//! Position queries and derived orbit quantities

use crate::kepler::solve_kepler_equation;
use crate::transforms::{
    inertial_to_spherical, orbital_radius, perifocal_to_inertial, true_anomaly_from_eccentric,
};
use crate::{
    OrbitalElementSet, OrbitalError, Result, SphericalPosition, MU_EARTH_KM3_S2, SECONDS_PER_DAY,
};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

/// Earth-centred inertial position in km
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct InertialPosition {
    pub x_km: f64,
    pub y_km: f64,
    pub z_km: f64,
}

impl InertialPosition {
    pub fn as_vector(&self) -> Vector3<f64> {
        Vector3::new(self.x_km, self.y_km, self.z_km)
    }

    pub fn radius_km(&self) -> f64 {
        self.as_vector().norm()
    }

    pub fn is_finite(&self) -> bool {
        self.x_km.is_finite() && self.y_km.is_finite() && self.z_km.is_finite()
    }

    pub fn to_spherical(&self) -> SphericalPosition {
        inertial_to_spherical(self.x_km, self.y_km, self.z_km)
    }
}

impl From<InertialPosition> for (f64, f64, f64) {
    fn from(p: InertialPosition) -> Self {
        (p.x_km, p.y_km, p.z_km)
    }
}

/// Snapshot of an orbit at one elapsed time
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct OrbitState {
    pub elapsed_seconds: f64,
    pub position: InertialPosition,
    pub altitude_km: f64,
    pub speed_km_s: f64,
}

/// Two-body propagator over a validated element set.
///
/// Holds no mutable state, so one instance can be queried from many threads.
#[derive(Debug, Clone)]
pub struct OrbitalPropagator {
    elements: OrbitalElementSet,
    mean_motion_rad_s: f64,
    mean_anomaly_epoch_rad: f64,
    raan_rad: f64,
    inclination_rad: f64,
    arg_perigee_rad: f64,
}

impl From<OrbitalElementSet> for OrbitalPropagator {
    fn from(elements: OrbitalElementSet) -> Self {
        Self::new(elements)
    }
}

impl OrbitalPropagator {
    pub fn new(elements: OrbitalElementSet) -> Self {
        let a = elements.semi_major_axis_km();
        Self {
            mean_motion_rad_s: (MU_EARTH_KM3_S2 / (a * a * a)).sqrt(),
            mean_anomaly_epoch_rad: elements.mean_anomaly_deg().to_radians(),
            raan_rad: elements.raan_deg().to_radians(),
            inclination_rad: elements.inclination_deg().to_radians(),
            arg_perigee_rad: elements.argument_of_perigee_deg().to_radians(),
            elements,
        }
    }

    pub fn elements(&self) -> &OrbitalElementSet {
        &self.elements
    }

    /// Mean motion n = √(μ/a³) in rad/s
    pub fn mean_motion_rad_s(&self) -> f64 {
        self.mean_motion_rad_s
    }

    /// Inertial position `elapsed_seconds` after epoch.
    ///
    /// Negative or non-finite elapsed time is a domain error.
    pub fn calculate_position(&self, elapsed_seconds: f64) -> Result<InertialPosition> {
        if !elapsed_seconds.is_finite() || elapsed_seconds < 0.0 {
            return Err(OrbitalError::InvalidElapsedTime(elapsed_seconds));
        }

        let a = self.elements.semi_major_axis_km();
        let e = self.elements.eccentricity();

        // Left unnormalized, the solver wraps it
        let mean_anomaly = self.mean_anomaly_epoch_rad + self.mean_motion_rad_s * elapsed_seconds;

        let eccentric_anomaly = solve_kepler_equation(mean_anomaly, e);
        let nu = true_anomaly_from_eccentric(eccentric_anomaly, e);
        let r = orbital_radius(a, e, nu);

        let (x, y, z) = perifocal_to_inertial(
            r * nu.cos(),
            r * nu.sin(),
            self.raan_rad,
            self.inclination_rad,
            self.arg_perigee_rad,
        );

        Ok(InertialPosition {
            x_km: x,
            y_km: y,
            z_km: z,
        })
    }

    /// Kepler's third law T = 2π√(a³/μ), seconds
    pub fn orbital_period_seconds(&self) -> f64 {
        TAU / self.mean_motion_rad_s
    }

    /// Vis-viva speed v = √(μ(2/r − 1/a)) in km/s
    pub fn velocity_km_s(&self, elapsed_seconds: f64) -> Result<f64> {
        let r = self.calculate_position(elapsed_seconds)?.radius_km();
        let a = self.elements.semi_major_axis_km();
        Ok((MU_EARTH_KM3_S2 * (2.0 / r - 1.0 / a)).sqrt())
    }

    pub fn mean_altitude_km(&self) -> f64 {
        self.elements.mean_altitude_km()
    }

    pub fn perigee_altitude_km(&self) -> f64 {
        self.elements.perigee_altitude_km()
    }

    pub fn apogee_altitude_km(&self) -> f64 {
        self.elements.apogee_altitude_km()
    }

    pub fn state_at(&self, elapsed_seconds: f64) -> Result<OrbitState> {
        let position = self.calculate_position(elapsed_seconds)?;
        let r = position.radius_km();
        let a = self.elements.semi_major_axis_km();
        Ok(OrbitState {
            elapsed_seconds,
            position,
            altitude_km: position.to_spherical().altitude_km,
            speed_km_s: (MU_EARTH_KM3_S2 * (2.0 / r - 1.0 / a)).sqrt(),
        })
    }
}

/// Orbital period of an element set in seconds
pub fn calculate_orbital_period(elements: &OrbitalElementSet) -> f64 {
    let a = elements.semi_major_axis_km();
    TAU * (a * a * a / MU_EARTH_KM3_S2).sqrt()
}

/// Vis-viva speed of an element set `elapsed_seconds` after epoch
pub fn calculate_velocity(elements: &OrbitalElementSet, elapsed_seconds: f64) -> Result<f64> {
    OrbitalPropagator::new(elements.clone()).velocity_km_s(elapsed_seconds)
}

/// Semi-major axis (km) from mean motion in revolutions per day
pub fn semi_major_axis_from_mean_motion(rev_per_day: f64) -> f64 {
    let n = rev_per_day * TAU / SECONDS_PER_DAY;
    (MU_EARTH_KM3_S2 / (n * n)).cbrt()
}
