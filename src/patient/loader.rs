//! Load patient scenarios from CSV for batch scoring

use std::path::Path;

use csv::{Reader, StringRecord};

use super::{BiomarkerAdjustment, BiomarkerPanel, PatientProfile, Selection};
use crate::assumptions::{Biomarker, Horizon};
use crate::error::{ArrError, Result};

/// Raw CSV row; blank biomarker cells deserialize to `None`
#[derive(Debug, serde::Deserialize)]
struct CsvRow {
    patient_id: Option<String>,
    age: i32,
    horizon: String,
    /// Semicolon-separated intervention keys
    #[serde(default)]
    interventions: Option<String>,
    ldl_current: Option<f64>,
    ldl_target: Option<f64>,
    hba1c_current: Option<f64>,
    hba1c_target: Option<f64>,
    sbp_current: Option<f64>,
    sbp_target: Option<f64>,
}

impl CsvRow {
    fn to_profile(self) -> Result<PatientProfile> {
        let horizon: Horizon = self.horizon.trim().parse()?;

        let selection = match self.interventions.as_deref() {
            Some(list) => Selection::from_keys(list.split(';').filter(|key| !key.trim().is_empty()))?,
            None => Selection::new(),
        };

        let biomarkers = BiomarkerPanel {
            ldl: BiomarkerAdjustment::from_pair(Biomarker::Ldl, self.ldl_current, self.ldl_target)?,
            hba1c: BiomarkerAdjustment::from_pair(Biomarker::Hba1c, self.hba1c_current, self.hba1c_target)?,
            sbp: BiomarkerAdjustment::from_pair(Biomarker::Sbp, self.sbp_current, self.sbp_target)?,
        };

        Ok(PatientProfile {
            patient_id: self.patient_id.filter(|id| !id.trim().is_empty()),
            age: self.age,
            horizon,
            selection,
            biomarkers,
        })
    }
}

/// Identifying fields of an input row, kept as written so that rows which
/// fail validation can still be reported
#[derive(Debug, Clone, PartialEq)]
pub struct RowLabel {
    /// 1-based data row number (header excluded)
    pub row: usize,
    pub patient_id: Option<String>,
    pub age: String,
    pub horizon: String,
}

impl RowLabel {
    /// Patient id, or `row<N>` when the id cell is blank
    pub fn display_id(&self) -> String {
        self.patient_id
            .clone()
            .unwrap_or_else(|| format!("row{}", self.row))
    }
}

/// One input row and its parsed profile, or the reason it was rejected
#[derive(Debug)]
pub struct PatientRecord {
    pub label: RowLabel,
    pub profile: Result<PatientProfile>,
}

/// Load all patient profiles from a CSV file, failing on the first invalid row
pub fn load_profiles<P: AsRef<Path>>(path: P) -> Result<Vec<PatientProfile>> {
    load_records(path)?.into_iter().map(|record| record.profile).collect()
}

/// Load patient profiles from any reader (e.g., string buffer, stdin)
pub fn load_profiles_from_reader<R: std::io::Read>(reader: R) -> Result<Vec<PatientProfile>> {
    load_records_from_reader(reader)?
        .into_iter()
        .map(|record| record.profile)
        .collect()
}

/// Load every row of a CSV file; invalid rows keep their place with an error
pub fn load_records<P: AsRef<Path>>(path: P) -> Result<Vec<PatientRecord>> {
    read_records(Reader::from_path(path)?)
}

pub fn load_records_from_reader<R: std::io::Read>(reader: R) -> Result<Vec<PatientRecord>> {
    read_records(Reader::from_reader(reader))
}

fn raw_field(headers: &StringRecord, record: &StringRecord, name: &str) -> Option<String> {
    let idx = headers.iter().position(|h| h.trim() == name)?;
    record.get(idx).map(|value| value.trim().to_string())
}

fn read_records<R: std::io::Read>(mut reader: Reader<R>) -> Result<Vec<PatientRecord>> {
    let headers = reader.headers()?.clone();
    let mut records = Vec::new();

    for (i, result) in reader.records().enumerate() {
        let raw = result?;
        let label = RowLabel {
            row: i + 1,
            patient_id: raw_field(&headers, &raw, "patient_id").filter(|id| !id.is_empty()),
            age: raw_field(&headers, &raw, "age").unwrap_or_default(),
            horizon: raw_field(&headers, &raw, "horizon").unwrap_or_default(),
        };
        let profile = raw
            .deserialize::<CsvRow>(Some(&headers))
            .map_err(ArrError::from)
            .and_then(CsvRow::to_profile);

        records.push(PatientRecord { label, profile });
    }

    Ok(records)
}
