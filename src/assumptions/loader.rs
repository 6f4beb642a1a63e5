//! CSV-based assumption loader
//!
//! Loads the intervention catalog, age multipliers and biomarker effect sizes
//! from CSV files in data/assumptions/

use std::fs::File;
use std::path::Path;
use std::str::FromStr;

use csv::StringRecord;

use super::interventions::{Intervention, InterventionId};
use crate::error::{ArrError, Result};

/// Default path to assumptions directory
pub const DEFAULT_ASSUMPTIONS_PATH: &str = "data/assumptions";

fn parse_field<T: FromStr>(record: &StringRecord, idx: usize, file: &str) -> Result<T> {
    let raw = record
        .get(idx)
        .ok_or_else(|| ArrError::Parse(format!("{}: missing column {}", file, idx)))?
        .trim();
    raw.parse()
        .map_err(|_| ArrError::Parse(format!("{}: cannot parse '{}' in column {}", file, raw, idx)))
}

/// Load the intervention catalog rows, in file order
/// Columns: key, name, arr_lifetime, arr_5yr
pub fn load_interventions(path: &Path) -> Result<Vec<Intervention>> {
    let file = File::open(path.join("interventions.csv"))?;
    let mut reader = csv::Reader::from_reader(file);

    let mut entries = Vec::new();

    for result in reader.records() {
        let record = result?;
        let id: InterventionId = record
            .get(0)
            .map(str::trim)
            .unwrap_or_default()
            .parse()?;
        let name = record
            .get(1)
            .map(|s| s.trim().to_string())
            .ok_or_else(|| ArrError::Parse("interventions.csv: missing name".to_string()))?;
        let arr_lifetime: f64 = parse_field(&record, 2, "interventions.csv")?;
        let arr_5yr: f64 = parse_field(&record, 3, "interventions.csv")?;

        entries.push(Intervention::new(id, name, arr_lifetime, arr_5yr));
    }

    Ok(entries)
}

/// Load age multipliers
/// Returns Vec<(max_age, multiplier)>; a blank max_age marks the top band
pub fn load_age_multipliers(path: &Path) -> Result<Vec<(Option<i32>, f64)>> {
    let file = File::open(path.join("age_multipliers.csv"))?;
    let mut reader = csv::Reader::from_reader(file);

    let mut bands = Vec::new();

    for result in reader.records() {
        let record = result?;
        let max_age = match record.get(0).map(str::trim) {
            Some("") | None => None,
            Some(_) => Some(parse_field::<i32>(&record, 0, "age_multipliers.csv")?),
        };
        let multiplier: f64 = parse_field(&record, 1, "age_multipliers.csv")?;
        bands.push((max_age, multiplier));
    }

    Ok(bands)
}

/// Load biomarker effect sizes
/// Returns Vec<(biomarker key, rrr_per_step, step_size)>
pub fn load_biomarker_effects(path: &Path) -> Result<Vec<(String, f64, f64)>> {
    let file = File::open(path.join("biomarker_effects.csv"))?;
    let mut reader = csv::Reader::from_reader(file);

    let mut effects = Vec::new();

    for result in reader.records() {
        let record = result?;
        let key = record.get(0).map(|s| s.trim().to_string()).unwrap_or_default();
        let rrr_per_step: f64 = parse_field(&record, 1, "biomarker_effects.csv")?;
        let step_size: f64 = parse_field(&record, 2, "biomarker_effects.csv")?;
        effects.push((key, rrr_per_step, step_size));
    }

    Ok(effects)
}

/// Raw assumption tables as read from disk
pub struct LoadedAssumptions {
    pub interventions: Vec<Intervention>,
    pub age_multipliers: Vec<(Option<i32>, f64)>,
    pub biomarker_effects: Vec<(String, f64, f64)>,
}

impl LoadedAssumptions {
    /// Load all assumptions from the default path
    pub fn load_default() -> Result<Self> {
        Self::load_from(Path::new(DEFAULT_ASSUMPTIONS_PATH))
    }

    /// Load all assumptions from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        Ok(Self {
            interventions: load_interventions(path)?,
            age_multipliers: load_age_multipliers(path)?,
            biomarker_effects: load_biomarker_effects(path)?,
        })
    }
}
