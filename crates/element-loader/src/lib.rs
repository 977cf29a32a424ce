//! Orbital Element Loader
//!
//! Collaborators around the propagation engine: reads element sets from CSV
//! tables or simplified element dictionaries, writes summaries and sampled
//! trajectories, and plans animation frames for external viewers.
//!
//! # CSV layout
//!
//! ```text
//! name,id,inclination,eccentricity,semi_major_axis,mean_anomaly,raan,argument_of_perigee,epoch
//! ISS,25544,51.6444,0.0001647,6778.14,45.2,238.5,112.0,2024-01-01 00:00:00
//! ```
//!
//! `raan` and `argument_of_perigee` are optional and default to 0°.

use orbit_propagator::OrbitalError;
use thiserror::Error;

pub mod dictionary;
pub mod loader;
pub mod render;
pub mod writer;

pub use dictionary::ElementDictionary;
pub use render::{AnimationFrame, AnimationPlan, AnimationTrack, RenderConfig};

/// Columns every element CSV must carry
pub const REQUIRED_COLUMNS: [&str; 7] = [
    "name",
    "id",
    "inclination",
    "eccentricity",
    "semi_major_axis",
    "mean_anomaly",
    "epoch",
];

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("CSV file is missing required columns: {0:?}")]
    MissingColumns(Vec<String>),
    #[error("No valid satellite rows found")]
    NoValidRows,
    #[error("No valid orbital element sets could be created")]
    NoValidElementSets,
    #[error("Error parsing orbital data: {0}")]
    Dictionary(String),
    #[error("Invalid animation request: {0}")]
    InvalidAnimation(String),
    #[error(transparent)]
    Orbital(#[from] OrbitalError),
}

pub type Result<T> = std::result::Result<T, LoaderError>;

/// Prediction window defaults for the CLI and batch tools
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionConfig {
    /// Hours after epoch to predict
    pub hours: f64,
    /// Sample spacing in minutes
    pub resolution_minutes: f64,
    /// Divides the resolution for smoother curves
    pub smooth_factor: u32,
    /// Rayon workers for batch prediction; 0 uses the global pool
    pub workers: usize,
}

impl Default for PredictionConfig {
    fn default() -> Self {
        Self {
            hours: 24.0,
            resolution_minutes: 10.0,
            smooth_factor: 1,
            workers: 1,
        }
    }
}

impl PredictionConfig {
    pub fn sampling(&self) -> Result<orbit_propagator::TimeSampling> {
        Ok(orbit_propagator::TimeSampling::from_hours_minutes(
            self.hours,
            self.resolution_minutes,
            self.smooth_factor,
        )?)
    }
}
