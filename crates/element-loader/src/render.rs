//! Animation frame planning
//!
//! Decides how many frames an orbit animation needs and at what frame rate
//! to play them, then queries the propagator once per frame. Drawing is left
//! to the viewer consuming the plan.

use crate::{LoaderError, Result};
use orbit_propagator::{InertialPosition, OrbitalPropagator};
use serde::{Deserialize, Serialize};
use std::ops::Range;
use tracing::debug;

/// Renderer-scoped settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RenderConfig {
    pub frames_per_orbit: f64,
    pub min_frames_per_orbit: f64,
    pub min_frames: usize,
    pub max_frames: usize,
    pub min_fps: f64,
    pub max_fps: f64,
    /// Playback length cap; one minute of playback per simulated hour below it
    pub max_playback_minutes: f64,
    /// Previous positions drawn behind the satellite
    pub trail_length: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            frames_per_orbit: 80.0,
            min_frames_per_orbit: 20.0,
            min_frames: 60,
            max_frames: 2000,
            min_fps: 10.0,
            max_fps: 30.0,
            max_playback_minutes: 3.0,
            trail_length: 50,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct AnimationFrame {
    pub index: usize,
    pub elapsed_seconds: f64,
    pub position: InertialPosition,
    /// First frame of the trail drawn behind this one
    pub trail_start: usize,
}

/// Frames of one satellite under a shared plan
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnimationTrack {
    pub id: String,
    pub name: String,
    pub frames: Vec<AnimationFrame>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnimationPlan {
    pub simulation_seconds: f64,
    pub orbits: f64,
    pub num_frames: usize,
    pub fps: f64,
    pub playback_seconds: f64,
    pub trail_length: usize,
}

impl AnimationPlan {
    /// Plan for a single orbit
    pub fn for_orbit(
        propagator: &OrbitalPropagator,
        simulation_hours: f64,
        config: &RenderConfig,
    ) -> Result<Self> {
        Self::for_period(propagator.orbital_period_seconds(), simulation_hours, config)
    }

    /// Plan for several satellites sharing one timeline, paced by their mean period
    pub fn for_constellation(
        propagators: &[OrbitalPropagator],
        simulation_hours: f64,
        config: &RenderConfig,
    ) -> Result<Self> {
        if propagators.is_empty() {
            return Err(LoaderError::InvalidAnimation("no satellites to animate".to_string()));
        }
        let mean_period = propagators
            .iter()
            .map(|p| p.orbital_period_seconds())
            .sum::<f64>()
            / propagators.len() as f64;
        Self::for_period(mean_period, simulation_hours, config)
    }

    fn for_period(period_seconds: f64, simulation_hours: f64, config: &RenderConfig) -> Result<Self> {
        if !simulation_hours.is_finite() || simulation_hours <= 0.0 {
            return Err(LoaderError::InvalidAnimation(format!(
                "simulation hours must be positive, got {}",
                simulation_hours
            )));
        }

        let simulation_seconds = simulation_hours * 3600.0;
        let orbits = simulation_seconds / period_seconds;
        let ideal_frames = (config.frames_per_orbit * orbits) as usize;

        let num_frames = if ideal_frames > config.max_frames {
            let per_orbit = config.max_frames as f64 / orbits;
            if per_orbit < config.min_frames_per_orbit {
                ((config.min_frames_per_orbit * orbits) as usize).min(config.max_frames)
            } else {
                config.max_frames
            }
        } else {
            ideal_frames.max(config.min_frames)
        };

        let target_playback = simulation_hours.min(config.max_playback_minutes) * 60.0;
        let raw_fps = num_frames as f64 / target_playback;
        let (fps, playback_seconds) = if raw_fps < config.min_fps {
            (config.min_fps, num_frames as f64 / config.min_fps)
        } else if raw_fps > config.max_fps {
            (config.max_fps, num_frames as f64 / config.max_fps)
        } else {
            (raw_fps, target_playback)
        };

        debug!(orbits, num_frames, fps, playback_seconds, "Planned animation");

        Ok(Self {
            simulation_seconds,
            orbits,
            num_frames,
            fps,
            playback_seconds,
            trail_length: config.trail_length,
        })
    }

    /// Milliseconds between frames
    pub fn frame_interval_ms(&self) -> f64 {
        1000.0 / self.fps
    }

    /// Frame times evenly spaced over [0, simulation_seconds], both ends included
    pub fn frame_times(&self) -> Vec<f64> {
        match self.num_frames {
            0 => Vec::new(),
            1 => vec![0.0],
            n => {
                let step = self.simulation_seconds / (n - 1) as f64;
                (0..n)
                    .map(|i| if i == n - 1 { self.simulation_seconds } else { i as f64 * step })
                    .collect()
            }
        }
    }

    /// One propagator query per frame
    pub fn frames(&self, propagator: &OrbitalPropagator) -> Result<Vec<AnimationFrame>> {
        self.frame_times()
            .into_iter()
            .enumerate()
            .map(|(index, t)| {
                Ok(AnimationFrame {
                    index,
                    elapsed_seconds: t,
                    position: propagator.calculate_position(t)?,
                    trail_start: self.trail_window(index).start,
                })
            })
            .collect()
    }

    pub fn track(&self, propagator: &OrbitalPropagator) -> Result<AnimationTrack> {
        let elements = propagator.elements();
        Ok(AnimationTrack {
            id: elements.id().to_string(),
            name: elements.name().to_string(),
            frames: self.frames(propagator)?,
        })
    }

    /// Frame indices forming the trail that ends at `index`
    pub fn trail_window(&self, index: usize) -> Range<usize> {
        let end = (index + 1).min(self.num_frames);
        end.saturating_sub(self.trail_length)..end
    }
}
