//! Simplified element dictionaries
//!
//! A lighter alternative to TLEs: a JSON object with the classical angles,
//! an epoch string, and either a semi-major axis (km) or a mean motion
//! (rev/day) from which the semi-major axis is derived.

use crate::{LoaderError, Result};
use orbit_propagator::{
    parse_epoch, semi_major_axis_from_mean_motion, ElementInput, OrbitalElementSet,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ElementDictionary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub inclination: Option<f64>,
    pub eccentricity: Option<f64>,
    pub mean_anomaly: Option<f64>,
    pub epoch: Option<String>,
    /// Semi-major axis in km; takes precedence over `mean_motion`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub semi_major_axis: Option<f64>,
    /// Mean motion in revolutions per day
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mean_motion: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raan: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub argument_of_perigee: Option<f64>,
}

fn required<T: Copy>(value: Option<T>, field: &str) -> Result<T> {
    value.ok_or_else(|| LoaderError::Dictionary(format!("Missing required field: {}", field)))
}

impl ElementDictionary {
    /// Resolve into loader input. `index` labels entries without name or id.
    ///
    /// The resolved input is checked against the full element-set rules, so
    /// an entry that resolves here always builds an `OrbitalElementSet`.
    pub fn to_element_input(&self, index: usize) -> Result<ElementInput> {
        let inclination = required(self.inclination, "inclination")?;
        let eccentricity = required(self.eccentricity, "eccentricity")?;
        let mean_anomaly = required(self.mean_anomaly, "mean_anomaly")?;
        let epoch = self
            .epoch
            .as_deref()
            .ok_or_else(|| LoaderError::Dictionary("Missing required field: epoch".to_string()))?;

        let semi_major_axis = match (self.semi_major_axis, self.mean_motion) {
            (Some(a), _) => a,
            (None, Some(n)) if n > 0.0 && n.is_finite() => semi_major_axis_from_mean_motion(n),
            (None, Some(n)) => {
                return Err(LoaderError::Dictionary(format!(
                    "Mean motion must be positive, got {}",
                    n
                )))
            }
            (None, None) => {
                return Err(LoaderError::Dictionary(
                    "Either 'semi_major_axis' or 'mean_motion' must be provided".to_string(),
                ))
            }
        };

        if !(0.0..=180.0).contains(&inclination) {
            return Err(LoaderError::Dictionary(
                "Inclination must be between 0 and 180 degrees".to_string(),
            ));
        }
        if !(0.0..1.0).contains(&eccentricity) {
            return Err(LoaderError::Dictionary(
                "Eccentricity must be between 0 and 1".to_string(),
            ));
        }

        let epoch = parse_epoch(epoch).map_err(|e| LoaderError::Dictionary(e.to_string()))?;
        let id = self.id.clone().unwrap_or_else(|| format!("dict-{}", index));

        let input = ElementInput {
            name: self.name.clone().unwrap_or_else(|| id.clone()),
            id,
            inclination_deg: inclination,
            eccentricity,
            semi_major_axis_km: semi_major_axis,
            mean_anomaly_deg: mean_anomaly,
            raan_deg: self.raan.unwrap_or(0.0),
            argument_of_perigee_deg: self.argument_of_perigee.unwrap_or(0.0),
            epoch,
        };
        OrbitalElementSet::try_from(input.clone())
            .map_err(|e| LoaderError::Dictionary(format!("Entry {}: {}", index, e)))?;
        Ok(input)
    }
}

/// Parse dictionaries from JSON text: an array, or a single object
pub fn parse_dictionaries(json: &str) -> Result<Vec<ElementDictionary>> {
    let raw: serde_json::Value = serde_json::from_str(json)?;
    if raw.is_array() {
        Ok(serde_json::from_value(raw)?)
    } else {
        Ok(vec![serde_json::from_value(raw)?])
    }
}

/// Load dictionaries from a JSON file and resolve every entry.
///
/// Unlike the CSV loader this is strict: the first bad entry fails the load.
pub fn load_dictionaries(path: impl AsRef<Path>) -> Result<Vec<ElementInput>> {
    let path = path.as_ref();
    info!("Loading element dictionaries from {:?}", path);

    let dictionaries = parse_dictionaries(&fs::read_to_string(path)?)?;
    let inputs = dictionaries
        .iter()
        .enumerate()
        .map(|(i, d)| d.to_element_input(i))
        .collect::<Result<Vec<_>>>()?;

    info!("Resolved {} element dictionaries", inputs.len());
    Ok(inputs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn sample() -> ElementDictionary {
        ElementDictionary {
            inclination: Some(51.6),
            eccentricity: Some(0.0001),
            mean_motion: Some(15.54),
            mean_anomaly: Some(0.0),
            epoch: Some("2024-01-01 00:00:00".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_mean_motion_resolves_semi_major_axis() {
        let input = sample().to_element_input(0).unwrap();
        assert_eq!(input.inclination_deg, 51.6);
        assert_eq!(input.eccentricity, 0.0001);
        assert!(input.semi_major_axis_km > 6700.0 && input.semi_major_axis_km < 6900.0);
        assert_eq!(input.id, "dict-0");
        assert_eq!(input.name, "dict-0");
    }

    #[test]
    fn test_explicit_semi_major_axis_wins() {
        let dict = ElementDictionary {
            semi_major_axis: Some(7000.0),
            inclination: Some(90.0),
            mean_anomaly: Some(45.0),
            ..sample()
        };
        assert_eq!(dict.to_element_input(0).unwrap().semi_major_axis_km, 7000.0);
    }

    #[test]
    fn test_missing_fields() {
        let dict = ElementDictionary {
            inclination: Some(51.6),
            ..Default::default()
        };
        let err = dict.to_element_input(0).unwrap_err();
        assert!(err.to_string().contains("eccentricity"));

        let no_size = ElementDictionary {
            mean_motion: None,
            ..sample()
        };
        assert!(matches!(
            no_size.to_element_input(0),
            Err(LoaderError::Dictionary(_))
        ));
    }

    #[test]
    fn test_out_of_range_values() {
        let inclined = ElementDictionary {
            inclination: Some(200.0),
            ..sample()
        };
        assert!(inclined.to_element_input(0).is_err());

        let open = ElementDictionary {
            eccentricity: Some(1.0),
            ..sample()
        };
        assert!(open.to_element_input(0).is_err());

        let negative_axis = ElementDictionary {
            semi_major_axis: Some(-7000.0),
            ..sample()
        };
        assert!(matches!(
            negative_axis.to_element_input(0),
            Err(LoaderError::Dictionary(_))
        ));

        let wrapped_raan = ElementDictionary {
            raan: Some(400.0),
            ..sample()
        };
        assert!(wrapped_raan.to_element_input(0).is_err());

        let bad_epoch = ElementDictionary {
            epoch: Some("Jan 1 2024".to_string()),
            ..sample()
        };
        assert!(bad_epoch.to_element_input(0).is_err());
    }

    #[test]
    fn test_parse_single_object_and_array() {
        let single = r#"{"inclination": 98.2, "eccentricity": 0.001, "semi_major_axis": 7078.0,
                         "mean_anomaly": 10.0, "epoch": "2024-03-01T06:00:00Z"}"#;
        assert_eq!(parse_dictionaries(single).unwrap().len(), 1);

        let array = format!("[{}, {}]", single, single);
        assert_eq!(parse_dictionaries(&array).unwrap().len(), 2);
    }

    #[test]
    fn test_load_dictionaries_file() {
        let json = r#"[
            {"name": "NOAA 19", "id": "33591", "inclination": 99.19, "eccentricity": 0.0014,
             "mean_motion": 14.12, "mean_anomaly": 120.0, "raan": 45.0, "epoch": "2024-01-01 00:00:00"}
        ]"#;
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();

        let inputs = load_dictionaries(file.path()).unwrap();
        assert_eq!(inputs.len(), 1);
        assert_eq!(inputs[0].id, "33591");
        assert_eq!(inputs[0].raan_deg, 45.0);
    }

    #[test]
    fn test_load_dictionaries_fails_on_first_bad_entry() {
        let json = r#"[
            {"id": "good", "inclination": 51.6, "eccentricity": 0.001, "semi_major_axis": 6778.0,
             "mean_anomaly": 0.0, "epoch": "2024-01-01 00:00:00"},
            {"id": "bad", "inclination": 51.6, "eccentricity": 0.001, "semi_major_axis": 6778.0,
             "mean_anomaly": 0.0, "argument_of_perigee": 400.0, "epoch": "2024-01-01 00:00:00"}
        ]"#;
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();

        let err = load_dictionaries(file.path()).unwrap_err();
        assert!(err.to_string().contains("Entry 1"));
    }
}
