//! Summary and trajectory output

use crate::render::{AnimationPlan, AnimationTrack};
use crate::Result;
use chrono::{DateTime, Utc};
use orbit_propagator::{OrbitalElementSet, OrbitalPropagator, Trajectory, TrajectorySample};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;

pub const SUMMARY_HEADERS: [&str; 7] = [
    "Name",
    "ID",
    "Inclination (deg)",
    "Eccentricity",
    "Semi-major Axis (km)",
    "Altitude (km)",
    "Mean Anomaly (deg)",
];

/// Element summary table, one row per set
pub fn write_summary<W: Write>(out: W, sets: &[OrbitalElementSet]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(out);
    wtr.write_record(SUMMARY_HEADERS)?;

    for set in sets {
        wtr.write_record([
            set.name().to_string(),
            set.id().to_string(),
            format!("{:.4}", set.inclination_deg()),
            format!("{:.6}", set.eccentricity()),
            format!("{:.2}", set.semi_major_axis_km()),
            format!("{:.2}", set.mean_altitude_km()),
            format!("{:.2}", set.mean_anomaly_deg()),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_summary_csv(path: impl AsRef<Path>, sets: &[OrbitalElementSet]) -> Result<()> {
    let path = path.as_ref();
    write_summary(BufWriter::new(File::create(path)?), sets)?;
    info!("Wrote summary of {} satellites to {:?}", sets.len(), path);
    Ok(())
}

#[derive(Debug, Serialize)]
struct TrajectoryRow {
    elapsed_seconds: f64,
    x_km: f64,
    y_km: f64,
    z_km: f64,
    altitude_km: f64,
}

impl From<&TrajectorySample> for TrajectoryRow {
    fn from(s: &TrajectorySample) -> Self {
        Self {
            elapsed_seconds: s.elapsed_seconds,
            x_km: s.position.x_km,
            y_km: s.position.y_km,
            z_km: s.position.z_km,
            altitude_km: s.position.to_spherical().altitude_km,
        }
    }
}

/// Sampled positions as CSV rows
pub fn write_trajectory<W: Write>(out: W, trajectory: &Trajectory) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(out);
    for sample in &trajectory.samples {
        wtr.serialize(TrajectoryRow::from(sample))?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_trajectory_csv(path: impl AsRef<Path>, trajectory: &Trajectory) -> Result<()> {
    let path = path.as_ref();
    write_trajectory(BufWriter::new(File::create(path)?), trajectory)?;
    info!("Wrote {} trajectory samples to {:?}", trajectory.len(), path);
    Ok(())
}

/// JSON trajectory export with orbit metadata
#[derive(Debug, Serialize)]
pub struct TrajectoryExport<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub epoch: DateTime<Utc>,
    pub period_seconds: f64,
    pub perigee_altitude_km: f64,
    pub apogee_altitude_km: f64,
    pub samples: &'a [TrajectorySample],
}

impl<'a> TrajectoryExport<'a> {
    pub fn new(propagator: &'a OrbitalPropagator, trajectory: &'a Trajectory) -> Self {
        let elements = propagator.elements();
        Self {
            id: elements.id(),
            name: elements.name(),
            epoch: elements.epoch(),
            period_seconds: propagator.orbital_period_seconds(),
            perigee_altitude_km: propagator.perigee_altitude_km(),
            apogee_altitude_km: propagator.apogee_altitude_km(),
            samples: &trajectory.samples,
        }
    }
}

pub fn write_trajectory_json(
    path: impl AsRef<Path>,
    propagator: &OrbitalPropagator,
    trajectory: &Trajectory,
) -> Result<()> {
    let path = path.as_ref();
    let writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(writer, &TrajectoryExport::new(propagator, trajectory))?;
    info!("Wrote {} trajectory samples to {:?}", trajectory.len(), path);
    Ok(())
}

/// JSON animation export: the shared plan plus one track per satellite
#[derive(Debug, Serialize)]
pub struct AnimationExport<'a> {
    pub plan: &'a AnimationPlan,
    pub frame_interval_ms: f64,
    pub tracks: &'a [AnimationTrack],
}

pub fn write_animation_json(
    path: impl AsRef<Path>,
    plan: &AnimationPlan,
    tracks: &[AnimationTrack],
) -> Result<()> {
    let path = path.as_ref();
    let export = AnimationExport {
        plan,
        frame_interval_ms: plan.frame_interval_ms(),
        tracks,
    };
    serde_json::to_writer_pretty(BufWriter::new(File::create(path)?), &export)?;
    info!(
        "Wrote {} animation tracks of {} frames to {:?}",
        tracks.len(),
        plan.num_frames,
        path
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use crate::RenderConfig;
    use orbit_propagator::{predict_positions, ElementInput, TimeSampling};
    use tempfile::NamedTempFile;

    fn iss() -> OrbitalElementSet {
        OrbitalElementSet::try_from(ElementInput {
            name: "ISS".to_string(),
            id: "25544".to_string(),
            inclination_deg: 51.6444,
            eccentricity: 0.0001647,
            semi_major_axis_km: 6778.14,
            mean_anomaly_deg: 45.2,
            raan_deg: 238.5,
            argument_of_perigee_deg: 112.0,
            epoch: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        })
        .unwrap()
    }

    #[test]
    fn test_summary_formatting() {
        let mut buf = Vec::new();
        write_summary(&mut buf, &[iss()]).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(
            lines[0],
            "Name,ID,Inclination (deg),Eccentricity,Semi-major Axis (km),Altitude (km),Mean Anomaly (deg)"
        );
        assert_eq!(lines[1], "ISS,25544,51.6444,0.000165,6778.14,407.14,45.20");
    }

    #[test]
    fn test_trajectory_csv() {
        let prop = OrbitalPropagator::new(iss());
        let trajectory = predict_positions(&prop, &TimeSampling::new(1200.0, 600.0).unwrap()).unwrap();

        let mut buf = Vec::new();
        write_trajectory(&mut buf, &trajectory).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "elapsed_seconds,x_km,y_km,z_km,altitude_km");
        assert_eq!(lines.len(), 4);
        assert!(lines[1].starts_with("0.0,"));
        assert!(lines[3].starts_with("1200.0,"));
    }

    #[test]
    fn test_trajectory_json_file() {
        let prop = OrbitalPropagator::new(iss());
        let trajectory = predict_positions(&prop, &TimeSampling::new(600.0, 300.0).unwrap()).unwrap();
        let file = NamedTempFile::new().unwrap();

        write_trajectory_json(file.path(), &prop, &trajectory).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(file.path()).unwrap()).unwrap();
        assert_eq!(value["id"], "25544");
        assert_eq!(value["samples"].as_array().unwrap().len(), 3);
        assert!(value["period_seconds"].as_f64().unwrap() > 5000.0);
    }

    #[test]
    fn test_animation_json_file() {
        let prop = OrbitalPropagator::new(iss());
        let plan = AnimationPlan::for_orbit(&prop, 1.0, &RenderConfig::default()).unwrap();
        let tracks = vec![plan.track(&prop).unwrap()];
        let file = NamedTempFile::new().unwrap();

        write_animation_json(file.path(), &plan, &tracks).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(file.path()).unwrap()).unwrap();
        assert_eq!(value["plan"]["num_frames"], plan.num_frames);
        assert_eq!(value["frame_interval_ms"].as_f64().unwrap(), 1000.0 / plan.fps);
        assert_eq!(value["tracks"][0]["id"], "25544");
        assert_eq!(
            value["tracks"][0]["frames"].as_array().unwrap().len(),
            plan.num_frames
        );
    }
}
