//! Orbit Prediction CLI
//!
//! Loads element sets, reports derived orbit quantities and writes sampled
//! trajectories.
//!
//! Usage:
//!   orbit-predict --input data/satellites.csv --satellite 25544 \
//!                 --hours 2 --resolution-minutes 1 --output iss.json
//!   orbit-predict --dictionary data/iss_dictionary.json --hours 6 \
//!                 --animate --frames iss_frames.json

use anyhow::{bail, Context, Result};
use clap::Parser;
use element_loader::{dictionary, loader, writer, AnimationPlan, PredictionConfig, RenderConfig};
use orbit_propagator::{
    predict_positions_parallel, OrbitalElementSet, OrbitalPropagator, Trajectory,
};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "orbit-predict",
    about = "Propagate Keplerian element sets and export trajectories"
)]
struct Args {
    /// Element CSV file
    #[arg(short, long, conflicts_with = "dictionary", required_unless_present = "dictionary")]
    input: Option<PathBuf>,

    /// Element dictionary JSON file (object or array)
    #[arg(short, long)]
    dictionary: Option<PathBuf>,

    /// Only process the satellite with this id
    #[arg(short, long)]
    satellite: Option<String>,

    /// Hours after epoch to predict
    #[arg(long, default_value_t = 24.0)]
    hours: f64,

    /// Sample spacing in minutes
    #[arg(long, default_value_t = 10.0)]
    resolution_minutes: f64,

    /// Divide the resolution for smoother curves
    #[arg(long, default_value_t = 1)]
    smooth_factor: u32,

    /// Worker threads for batch prediction (0 uses every core)
    #[arg(long, default_value_t = 1)]
    workers: usize,

    /// Trajectory output (.json for JSON, anything else CSV)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Element summary CSV output
    #[arg(long)]
    summary: Option<PathBuf>,

    /// Plan animation frames for the selected satellites
    #[arg(long)]
    animate: bool,

    /// Animation frames JSON output
    #[arg(long, requires = "animate")]
    frames: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn load(args: &Args) -> Result<Vec<OrbitalElementSet>> {
    let inputs = match (&args.input, &args.dictionary) {
        (Some(csv), _) => loader::read_element_csv(csv)
            .with_context(|| format!("reading element CSV {:?}", csv))?,
        (None, Some(json)) => dictionary::load_dictionaries(json)
            .with_context(|| format!("reading element dictionary {:?}", json))?,
        (None, None) => bail!("either --input or --dictionary is required"),
    };
    Ok(loader::build_element_sets(inputs)?)
}

fn output_path(base: &Path, id: &str, many: bool) -> PathBuf {
    if !many {
        return base.to_path_buf();
    }
    let stem = base.file_stem().and_then(|s| s.to_str()).unwrap_or("trajectory");
    let ext = base.extension().and_then(|s| s.to_str()).unwrap_or("csv");
    base.with_file_name(format!("{}_{}.{}", stem, id, ext))
}

fn write_output(path: &Path, prop: &OrbitalPropagator, trajectory: &Trajectory) -> Result<()> {
    if path.extension().and_then(|e| e.to_str()) == Some("json") {
        writer::write_trajectory_json(path, prop, trajectory)?;
    } else {
        writer::write_trajectory_csv(path, trajectory)?;
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    info!("{}", "=".repeat(60));
    info!("Keplerian Orbit Prediction");
    info!("{}", "=".repeat(60));

    let mut sets = load(&args)?;
    if let Some(id) = &args.satellite {
        sets.retain(|s| s.id() == id);
        if sets.is_empty() {
            bail!("no satellite with id '{}'", id);
        }
    }
    OrbitalElementSet::sort_by_altitude(&mut sets);

    if let Some(path) = &args.summary {
        writer::write_summary_csv(path, &sets)?;
    }

    let config = PredictionConfig {
        hours: args.hours,
        resolution_minutes: args.resolution_minutes,
        smooth_factor: args.smooth_factor,
        workers: args.workers,
    };
    let sampling = config.sampling()?;

    let propagators: Vec<OrbitalPropagator> = sets.into_iter().map(OrbitalPropagator::new).collect();
    let many = propagators.len() > 1;

    for prop in &propagators {
        let elements = prop.elements();
        let initial = prop.state_at(0.0)?;
        info!("{}", elements);
        info!(
            "  period {:.2} min | v(t0) {:.3} km/s | altitude {:.1} km | perigee {:.1} km | apogee {:.1} km",
            prop.orbital_period_seconds() / 60.0,
            initial.speed_km_s,
            prop.mean_altitude_km(),
            prop.perigee_altitude_km(),
            prop.apogee_altitude_km()
        );
        debug!(
            "  r(t0) = ({:.3}, {:.3}, {:.3}) km, altitude {:.1} km",
            initial.position.x_km, initial.position.y_km, initial.position.z_km, initial.altitude_km
        );
        if elements.perigee_altitude_km() < 0.0 {
            warn!("  perigee of {} is below the Earth's surface", elements.id());
        }

        let trajectory = predict_positions_parallel(prop, &sampling, config.workers)?;
        info!(
            "  {} samples over {:.1} h at {:.1} s resolution",
            trajectory.len(),
            config.hours,
            sampling.resolution_seconds()
        );

        if let Some(base) = &args.output {
            write_output(&output_path(base, elements.id(), many), prop, &trajectory)?;
        }
    }

    if args.animate {
        let plan = AnimationPlan::for_constellation(&propagators, args.hours, &RenderConfig::default())?;
        info!(
            "Animation: {} frames at {:.1} fps ({:.1} s playback, {:.2} orbits)",
            plan.num_frames, plan.fps, plan.playback_seconds, plan.orbits
        );

        let tracks = propagators
            .iter()
            .map(|p| plan.track(p))
            .collect::<element_loader::Result<Vec<_>>>()?;
        info!(
            "  {} tracks, {:.1} ms between frames",
            tracks.len(),
            plan.frame_interval_ms()
        );

        if let Some(path) = &args.frames {
            writer::write_animation_json(path, &plan, &tracks)?;
        }
    }

    Ok(())
}
