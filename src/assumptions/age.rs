//! Age-banded multipliers applied to intervention effect sizes

use crate::error::{ArrError, Result};

/// Reference bands as (inclusive upper age, multiplier)
const REFERENCE_BANDS: [(i32, f64); 3] = [(50, 1.1), (60, 1.0), (70, 0.8)];

/// Multiplier for ages above the last reference band
const REFERENCE_TOP_MULTIPLIER: f64 = 0.6;

/// Scale a base relative reduction using the reference age bands
///
/// Ages outside typical human bounds are not rejected; they fall into the
/// lowest or highest band.
pub fn scale_by_age(base_arr: f64, age: i32) -> f64 {
    base_arr * band_multiplier(&REFERENCE_BANDS, REFERENCE_TOP_MULTIPLIER, age)
}

fn band_multiplier(bands: &[(i32, f64)], top_multiplier: f64, age: i32) -> f64 {
    bands
        .iter()
        .find(|(max_age, _)| age <= *max_age)
        .map(|(_, multiplier)| *multiplier)
        .unwrap_or(top_multiplier)
}

/// Step-function age multiplier table
#[derive(Debug, Clone, PartialEq)]
pub struct AgeScaling {
    /// (inclusive upper age, multiplier), ascending by age
    bands: Vec<(i32, f64)>,

    /// Multiplier above the last band
    top_multiplier: f64,
}

impl AgeScaling {
    pub fn reference() -> Self {
        Self {
            bands: REFERENCE_BANDS.to_vec(),
            top_multiplier: REFERENCE_TOP_MULTIPLIER,
        }
    }

    /// Create from loaded CSV rows; `None` marks the open-ended top band
    pub fn from_loaded(rows: &[(Option<i32>, f64)]) -> Result<Self> {
        let mut bands = Vec::with_capacity(rows.len());
        let mut top_multiplier = None;

        for (max_age, multiplier) in rows {
            if !multiplier.is_finite() || *multiplier < 0.0 {
                return Err(ArrError::InvalidAssumption(format!(
                    "age multiplier must be non-negative, got {}",
                    multiplier
                )));
            }
            match max_age {
                Some(_) if top_multiplier.is_some() => {
                    return Err(ArrError::InvalidAssumption(
                        "open-ended age band must be the last row".to_string(),
                    ));
                }
                Some(age) => {
                    if bands.last().is_some_and(|(prev, _)| age <= prev) {
                        return Err(ArrError::InvalidAssumption(format!(
                            "age bands must be strictly ascending at {}",
                            age
                        )));
                    }
                    bands.push((*age, *multiplier));
                }
                None if top_multiplier.is_some() => {
                    return Err(ArrError::InvalidAssumption(
                        "more than one open-ended age band".to_string(),
                    ));
                }
                None => top_multiplier = Some(*multiplier),
            }
        }

        let top_multiplier = top_multiplier.ok_or_else(|| {
            ArrError::InvalidAssumption("missing open-ended top age band".to_string())
        })?;

        Ok(Self { bands, top_multiplier })
    }

    /// Multiplier for an attained age
    pub fn multiplier(&self, age: i32) -> f64 {
        band_multiplier(&self.bands, self.top_multiplier, age)
    }

    /// Age-adjusted relative reduction, unrounded
    pub fn scale(&self, base_arr: f64, age: i32) -> f64 {
        base_arr * self.multiplier(age)
    }
}

impl Default for AgeScaling {
    fn default() -> Self {
        Self::reference()
    }
}
