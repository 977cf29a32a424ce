//! Classical orbital element sets
//!
//! `OrbitalElementSet` is validated once and never mutated. Identity (`id`)
//! drives equality; mean altitude drives the named ordering comparator.

use crate::{OrbitalError, Result, EARTH_RADIUS_KM};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Epoch layout used by tabular element sources
pub const EPOCH_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Parse an epoch as `YYYY-MM-DD HH:MM:SS` (UTC) or RFC 3339
pub fn parse_epoch(raw: &str) -> Result<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, EPOCH_FORMAT) {
        return Ok(naive.and_utc());
    }
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| {
            OrbitalError::validation(
                "epoch",
                format!("'{}' is not 'YYYY-MM-DD HH:MM:SS' or RFC 3339", raw),
            )
        })
}

/// Unvalidated element fields as they arrive from a loader
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ElementInput {
    pub name: String,
    pub id: String,
    pub inclination_deg: f64,
    pub eccentricity: f64,
    pub semi_major_axis_km: f64,
    pub mean_anomaly_deg: f64,
    #[serde(default)]
    pub raan_deg: f64,
    #[serde(default)]
    pub argument_of_perigee_deg: f64,
    pub epoch: DateTime<Utc>,
}

/// Validated, immutable Keplerian element set
#[derive(Debug, Clone, Serialize)]
pub struct OrbitalElementSet {
    name: String,
    id: String,
    inclination_deg: f64,
    eccentricity: f64,
    semi_major_axis_km: f64,
    mean_anomaly_deg: f64,
    raan_deg: f64,
    argument_of_perigee_deg: f64,
    epoch: DateTime<Utc>,
}

fn require_finite(field: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(OrbitalError::validation(field, format!("must be a finite number, got {}", value)))
    }
}

fn require_non_empty(field: &'static str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(OrbitalError::validation(field, "must be a non-empty string"));
    }
    Ok(())
}

impl TryFrom<ElementInput> for OrbitalElementSet {
    type Error = OrbitalError;

    fn try_from(input: ElementInput) -> Result<Self> {
        require_non_empty("name", &input.name)?;
        require_non_empty("id", &input.id)?;

        let inclination = require_finite("inclination", input.inclination_deg)?;
        if !(0.0..=180.0).contains(&inclination) {
            return Err(OrbitalError::validation(
                "inclination",
                format!("must be between 0 and 180 degrees, got {}", inclination),
            ));
        }

        let eccentricity = require_finite("eccentricity", input.eccentricity)?;
        if !(0.0..1.0).contains(&eccentricity) {
            return Err(OrbitalError::validation(
                "eccentricity",
                format!("must be in [0, 1), got {}", eccentricity),
            ));
        }

        let sma = require_finite("semi_major_axis", input.semi_major_axis_km)?;
        if sma <= 0.0 {
            return Err(OrbitalError::validation(
                "semi_major_axis",
                format!("must be positive, got {} km", sma),
            ));
        }

        let mean_anomaly = require_finite("mean_anomaly", input.mean_anomaly_deg)?;

        let raan = require_finite("raan", input.raan_deg)?;
        if !(0.0..360.0).contains(&raan) {
            return Err(OrbitalError::validation(
                "raan",
                format!("must be in [0, 360) degrees, got {}", raan),
            ));
        }

        let aop = require_finite("argument_of_perigee", input.argument_of_perigee_deg)?;
        if !(0.0..360.0).contains(&aop) {
            return Err(OrbitalError::validation(
                "argument_of_perigee",
                format!("must be in [0, 360) degrees, got {}", aop),
            ));
        }

        Ok(Self {
            name: input.name,
            id: input.id,
            inclination_deg: inclination,
            eccentricity,
            semi_major_axis_km: sma,
            mean_anomaly_deg: mean_anomaly,
            raan_deg: raan,
            argument_of_perigee_deg: aop,
            epoch: input.epoch,
        })
    }
}

impl OrbitalElementSet {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn inclination_deg(&self) -> f64 {
        self.inclination_deg
    }

    pub fn eccentricity(&self) -> f64 {
        self.eccentricity
    }

    pub fn semi_major_axis_km(&self) -> f64 {
        self.semi_major_axis_km
    }

    /// Mean anomaly at epoch, as supplied (not normalized)
    pub fn mean_anomaly_deg(&self) -> f64 {
        self.mean_anomaly_deg
    }

    pub fn raan_deg(&self) -> f64 {
        self.raan_deg
    }

    pub fn argument_of_perigee_deg(&self) -> f64 {
        self.argument_of_perigee_deg
    }

    pub fn epoch(&self) -> DateTime<Utc> {
        self.epoch
    }

    /// Mean altitude a − R⊕ (km)
    pub fn mean_altitude_km(&self) -> f64 {
        self.semi_major_axis_km - EARTH_RADIUS_KM
    }

    /// Perigee altitude a(1 − e) − R⊕ (km)
    pub fn perigee_altitude_km(&self) -> f64 {
        self.semi_major_axis_km * (1.0 - self.eccentricity) - EARTH_RADIUS_KM
    }

    /// Apogee altitude a(1 + e) − R⊕ (km)
    pub fn apogee_altitude_km(&self) -> f64 {
        self.semi_major_axis_km * (1.0 + self.eccentricity) - EARTH_RADIUS_KM
    }

    /// Same satellite identity, regardless of element values
    pub fn equals_by_id(&self, other: &OrbitalElementSet) -> bool {
        self.id == other.id
    }

    /// Total order by mean altitude
    pub fn compare_by_altitude(&self, other: &OrbitalElementSet) -> Ordering {
        self.mean_altitude_km().total_cmp(&other.mean_altitude_km())
    }

    /// Altitude comparison against a dynamically typed value.
    ///
    /// Fails with `ComparisonType` unless `other` is an `OrbitalElementSet`.
    pub fn try_compare_by_altitude(&self, other: &dyn Any) -> Result<Ordering> {
        match other.downcast_ref::<OrbitalElementSet>() {
            Some(set) => Ok(self.compare_by_altitude(set)),
            None => Err(OrbitalError::ComparisonType(describe_any(other))),
        }
    }

    /// Sort ascending by mean altitude
    pub fn sort_by_altitude(sets: &mut [OrbitalElementSet]) {
        sets.sort_by(|a, b| a.compare_by_altitude(b));
    }
}

fn describe_any(value: &dyn Any) -> String {
    if let Some(s) = value.downcast_ref::<String>() {
        format!("String({:?})", s)
    } else if let Some(s) = value.downcast_ref::<&str>() {
        format!("&str({:?})", s)
    } else if let Some(v) = value.downcast_ref::<f64>() {
        format!("f64({})", v)
    } else if let Some(v) = value.downcast_ref::<i32>() {
        format!("i32({})", v)
    } else {
        "a non element-set value".to_string()
    }
}

impl PartialEq for OrbitalElementSet {
    fn eq(&self, other: &Self) -> bool {
        self.equals_by_id(other)
    }
}

impl Eq for OrbitalElementSet {}

impl Hash for OrbitalElementSet {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for OrbitalElementSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Satellite(name='{}', id='{}', inclination={:.2}°, eccentricity={:.6}, altitude={:.2} km)",
            self.name,
            self.id,
            self.inclination_deg,
            self.eccentricity,
            self.mean_altitude_km()
        )
    }
}
