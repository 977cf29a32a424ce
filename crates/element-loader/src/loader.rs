//! Element set loading from CSV tables

use crate::{LoaderError, Result, REQUIRED_COLUMNS};
use orbit_propagator::{parse_epoch, ElementInput, OrbitalElementSet};
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{info, warn};

/// Raw element row from CSV
#[derive(Debug, Deserialize)]
struct RawElementRow {
    name: String,
    id: String,
    inclination: f64,
    eccentricity: f64,
    semi_major_axis: f64,
    mean_anomaly: f64,
    #[serde(default)]
    raan: Option<f64>,
    #[serde(default)]
    argument_of_perigee: Option<f64>,
    epoch: String,
}

impl RawElementRow {
    fn into_input(self) -> Result<ElementInput> {
        Ok(ElementInput {
            name: self.name,
            id: self.id,
            inclination_deg: self.inclination,
            eccentricity: self.eccentricity,
            semi_major_axis_km: self.semi_major_axis,
            mean_anomaly_deg: self.mean_anomaly,
            raan_deg: self.raan.unwrap_or(0.0),
            argument_of_perigee_deg: self.argument_of_perigee.unwrap_or(0.0),
            epoch: parse_epoch(&self.epoch)?,
        })
    }
}

/// Read element rows from any CSV source.
///
/// Rows that fail to parse are skipped with a warning; row numbers count
/// the header as row 1.
pub fn read_element_rows<R: Read>(source: R) -> Result<Vec<ElementInput>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(source);

    let headers = reader.headers()?.clone();
    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|col| !headers.iter().any(|h| h == **col))
        .map(|col| col.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(LoaderError::MissingColumns(missing));
    }

    let mut inputs = Vec::new();
    let mut skipped = 0;

    for (i, row) in reader.deserialize::<RawElementRow>().enumerate() {
        let row_num = i + 2;
        match row.map_err(LoaderError::from).and_then(RawElementRow::into_input) {
            Ok(input) => inputs.push(input),
            Err(e) => {
                warn!("Skipping invalid row {}: {}", row_num, e);
                skipped += 1;
            }
        }
    }

    info!("Read {} element rows ({} skipped)", inputs.len(), skipped);

    if inputs.is_empty() {
        return Err(LoaderError::NoValidRows);
    }
    Ok(inputs)
}

/// Read element rows from a CSV file
pub fn read_element_csv(path: impl AsRef<Path>) -> Result<Vec<ElementInput>> {
    let path = path.as_ref();
    info!("Loading element sets from {:?}", path);
    read_element_rows(File::open(path)?)
}

/// Validate inputs into element sets, skipping the ones that fail
pub fn build_element_sets(inputs: Vec<ElementInput>) -> Result<Vec<OrbitalElementSet>> {
    let mut sets = Vec::new();

    for (idx, input) in inputs.into_iter().enumerate() {
        let name = input.name.clone();
        match OrbitalElementSet::try_from(input) {
            Ok(set) => sets.push(set),
            Err(e) => warn!("Satellite {} ({}): {}", idx + 1, name, e),
        }
    }

    if sets.is_empty() {
        return Err(LoaderError::NoValidElementSets);
    }
    Ok(sets)
}

/// Read and validate element sets from a CSV file
pub fn load_element_sets(path: impl AsRef<Path>) -> Result<Vec<OrbitalElementSet>> {
    let sets = build_element_sets(read_element_csv(path)?)?;
    info!("Loaded {} orbital element sets", sets.len());
    Ok(sets)
}
