//! Time sampling for trajectory renderers
//!
//! Sample times are tₖ = k·Δt for k = 0, 1, … while tₖ ≤ duration. They are
//! computed by multiplication so long runs do not accumulate drift.

use crate::{InertialPosition, OrbitalError, OrbitalPropagator, Result};
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use serde::{Deserialize, Serialize};
use std::iter::FusedIterator;
use std::ops::Range;
use tracing::debug;

/// Upper bound on samples a single sampling may describe
pub const MAX_SAMPLES: usize = 10_000_000;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeSampling {
    duration_seconds: f64,
    resolution_seconds: f64,
    count: usize,
}

impl TimeSampling {
    pub fn new(duration_seconds: f64, resolution_seconds: f64) -> Result<Self> {
        if !duration_seconds.is_finite() || duration_seconds <= 0.0 {
            return Err(OrbitalError::InvalidSampling(format!(
                "duration must be positive, got {} s",
                duration_seconds
            )));
        }
        if !resolution_seconds.is_finite() || resolution_seconds <= 0.0 {
            return Err(OrbitalError::InvalidSampling(format!(
                "resolution must be positive, got {} s",
                resolution_seconds
            )));
        }

        let ratio = (duration_seconds / resolution_seconds).floor();
        if ratio >= MAX_SAMPLES as f64 {
            return Err(OrbitalError::InvalidSampling(format!(
                "{} s at {} s resolution exceeds {} samples",
                duration_seconds, resolution_seconds, MAX_SAMPLES
            )));
        }

        // Guard the floor against rounding at exact multiples
        let mut count = ratio as usize + 1;
        while count > 1 && (count - 1) as f64 * resolution_seconds > duration_seconds {
            count -= 1;
        }
        while (count as f64) * resolution_seconds <= duration_seconds {
            count += 1;
        }

        Ok(Self {
            duration_seconds,
            resolution_seconds,
            count,
        })
    }

    /// Hours of prediction at a minute resolution, refined by `smooth_factor`
    pub fn from_hours_minutes(hours: f64, resolution_minutes: f64, smooth_factor: u32) -> Result<Self> {
        if smooth_factor == 0 {
            return Err(OrbitalError::InvalidSampling(
                "smooth factor must be at least 1".to_string(),
            ));
        }
        Self::new(
            hours * 3600.0,
            resolution_minutes * 60.0 / f64::from(smooth_factor),
        )
    }

    pub fn duration_seconds(&self) -> f64 {
        self.duration_seconds
    }

    pub fn resolution_seconds(&self) -> f64 {
        self.resolution_seconds
    }

    /// Number of sample times, including t = 0
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn time_at(&self, index: usize) -> f64 {
        index as f64 * self.resolution_seconds
    }

    /// Lazy, restartable sequence of sample times
    pub fn times(&self) -> impl Iterator<Item = f64> + Clone + '_ {
        (0..self.count).map(move |k| self.time_at(k))
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct TrajectorySample {
    pub elapsed_seconds: f64,
    pub position: InertialPosition,
}

/// Materialized, time-ordered positions
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Trajectory {
    pub samples: Vec<TrajectorySample>,
}

impl Trajectory {
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn time_points(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.elapsed_seconds).collect()
    }

    pub fn positions(&self) -> Vec<InertialPosition> {
        self.samples.iter().map(|s| s.position).collect()
    }

    /// Radius minus Earth radius for each sample
    pub fn altitudes_km(&self) -> Vec<f64> {
        self.samples
            .iter()
            .map(|s| s.position.to_spherical().altitude_km)
            .collect()
    }
}

impl FromIterator<TrajectorySample> for Trajectory {
    fn from_iter<I: IntoIterator<Item = TrajectorySample>>(iter: I) -> Self {
        Self {
            samples: iter.into_iter().collect(),
        }
    }
}

/// Lazy position iterator. Positions are computed on `next()` only.
#[derive(Debug, Clone)]
pub struct PositionStream<'a> {
    propagator: &'a OrbitalPropagator,
    sampling: TimeSampling,
    indices: Range<usize>,
}

impl<'a> Iterator for PositionStream<'a> {
    type Item = Result<TrajectorySample>;

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.indices.next()?;
        Some(sample_at(self.propagator, &self.sampling, index))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.indices.size_hint()
    }
}

impl ExactSizeIterator for PositionStream<'_> {}

impl FusedIterator for PositionStream<'_> {}

impl OrbitalPropagator {
    /// Fresh lazy stream over `sampling`; independent of any other stream
    pub fn positions(&self, sampling: &TimeSampling) -> PositionStream<'_> {
        PositionStream {
            propagator: self,
            sampling: *sampling,
            indices: 0..sampling.len(),
        }
    }
}

/// Query the propagator once per sample time and collect the result
pub fn predict_positions(propagator: &OrbitalPropagator, sampling: &TimeSampling) -> Result<Trajectory> {
    debug!(
        satellite = propagator.elements().id(),
        samples = sampling.len(),
        "Predicting positions"
    );
    propagator.positions(sampling).collect()
}

/// Same result as [`predict_positions`], computed on rayon workers.
///
/// `workers == 0` uses rayon's global pool; any other count runs on a
/// dedicated pool of that size.
pub fn predict_positions_parallel(
    propagator: &OrbitalPropagator,
    sampling: &TimeSampling,
    workers: usize,
) -> Result<Trajectory> {
    let workers = workers.min(sampling.len());
    if workers == 1 {
        return predict_positions(propagator, sampling);
    }

    debug!(
        satellite = propagator.elements().id(),
        samples = sampling.len(),
        workers,
        "Predicting positions in parallel"
    );

    let predict = || {
        (0..sampling.len())
            .into_par_iter()
            .map(|k| sample_at(propagator, sampling, k))
            .collect::<Result<Vec<TrajectorySample>>>()
    };

    let samples = if workers == 0 {
        predict()?
    } else {
        ThreadPoolBuilder::new()
            .num_threads(workers)
            .build()
            .map_err(|e| OrbitalError::WorkerPool(e.to_string()))?
            .install(predict)?
    };
    Ok(Trajectory { samples })
}

fn sample_at(propagator: &OrbitalPropagator, sampling: &TimeSampling, index: usize) -> Result<TrajectorySample> {
    let elapsed_seconds = sampling.time_at(index);
    propagator
        .calculate_position(elapsed_seconds)
        .map(|position| TrajectorySample {
            elapsed_seconds,
            position,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::fixtures::leo;

    #[test]
    fn test_sampling_includes_zero_and_endpoint() {
        let sampling = TimeSampling::new(3600.0, 600.0).unwrap();
        let times: Vec<f64> = sampling.times().collect();
        assert_eq!(times, vec![0.0, 600.0, 1200.0, 1800.0, 2400.0, 3000.0, 3600.0]);
    }

    #[test]
    fn test_sampling_never_exceeds_duration() {
        let sampling = TimeSampling::new(1000.0, 300.0).unwrap();
        let times: Vec<f64> = sampling.times().collect();
        assert_eq!(times, vec![0.0, 300.0, 600.0, 900.0]);
        assert!(times.iter().all(|&t| t <= 1000.0));

        // Resolution coarser than the window still yields t = 0
        let single = TimeSampling::new(10.0, 60.0).unwrap();
        assert_eq!(single.len(), 1);
    }

    #[test]
    fn test_sampling_exact_multiple_with_fractional_step() {
        // 0.1 is not representable; the last sample must still be ≤ 1.0
        let sampling = TimeSampling::new(1.0, 0.1).unwrap();
        let last = sampling.times().last().unwrap();
        assert!(last <= 1.0);
        assert!(sampling.len() == 10 || sampling.len() == 11);
    }

    #[test]
    fn test_invalid_sampling_rejected() {
        assert!(TimeSampling::new(0.0, 60.0).is_err());
        assert!(TimeSampling::new(-3600.0, 60.0).is_err());
        assert!(TimeSampling::new(3600.0, 0.0).is_err());
        assert!(TimeSampling::new(3600.0, -5.0).is_err());
        assert!(TimeSampling::new(f64::INFINITY, 60.0).is_err());
        assert!(TimeSampling::new(1e12, 1e-3).is_err());
        assert!(TimeSampling::from_hours_minutes(1.0, 10.0, 0).is_err());
    }

    #[test]
    fn test_smooth_factor_refines_resolution() {
        let sampling = TimeSampling::from_hours_minutes(1.0, 10.0, 2).unwrap();
        assert_eq!(sampling.resolution_seconds(), 300.0);
        assert_eq!(sampling.len(), 13);
    }

    #[test]
    fn test_predict_positions_matches_direct_queries() {
        let prop = OrbitalPropagator::new(leo());
        let sampling = TimeSampling::from_hours_minutes(1.0, 10.0, 1).unwrap();
        let trajectory = predict_positions(&prop, &sampling).unwrap();

        assert_eq!(trajectory.len(), 7);
        assert_eq!(trajectory.time_points(), sampling.times().collect::<Vec<_>>());
        for sample in &trajectory.samples {
            assert_eq!(sample.position, prop.calculate_position(sample.elapsed_seconds).unwrap());
        }
    }

    #[test]
    fn test_streams_are_independent() {
        let prop = OrbitalPropagator::new(leo());
        let sampling = TimeSampling::new(1800.0, 600.0).unwrap();

        let mut first = prop.positions(&sampling);
        let _ = first.next();
        let _ = first.next();

        let second: Vec<_> = prop.positions(&sampling).map(|s| s.unwrap()).collect();
        assert_eq!(second.len(), 4);
        assert_eq!(second[0].elapsed_seconds, 0.0);

        assert_eq!(first.len(), 2);
        assert_eq!(first.next().unwrap().unwrap().elapsed_seconds, 1200.0);
    }

    #[test]
    fn test_stream_stops_early() {
        let prop = OrbitalPropagator::new(leo());
        let sampling = TimeSampling::new(86400.0 * 30.0, 1.0).unwrap();

        let taken: Vec<_> = prop.positions(&sampling).take(4).map(|s| s.unwrap()).collect();
        assert_eq!(taken.len(), 4);
        assert_eq!(taken[3].elapsed_seconds, 3.0);
    }

    #[test]
    fn test_parallel_prediction_matches_serial() {
        let prop = OrbitalPropagator::new(leo());
        let sampling = TimeSampling::new(7200.0, 7.0).unwrap();

        let serial = predict_positions(&prop, &sampling).unwrap();
        for workers in [0, 1, 3, 8] {
            let parallel = predict_positions_parallel(&prop, &sampling, workers).unwrap();
            assert_eq!(parallel, serial, "workers = {}", workers);
        }
    }

    #[test]
    fn test_parallel_workers_capped_by_samples() {
        let prop = OrbitalPropagator::new(leo());
        let sampling = TimeSampling::new(1800.0, 600.0).unwrap();

        let parallel = predict_positions_parallel(&prop, &sampling, 5000).unwrap();
        assert_eq!(parallel, predict_positions(&prop, &sampling).unwrap());
        assert_eq!(parallel.len(), 4);
    }

    #[test]
    fn test_altitudes_track_radius() {
        let prop = OrbitalPropagator::new(leo());
        let sampling = TimeSampling::new(5400.0, 900.0).unwrap();
        let trajectory = predict_positions(&prop, &sampling).unwrap();

        for alt in trajectory.altitudes_km() {
            assert!(alt >= prop.perigee_altitude_km() - 1e-6);
            assert!(alt <= prop.apogee_altitude_km() + 1e-6);
        }
    }
}
