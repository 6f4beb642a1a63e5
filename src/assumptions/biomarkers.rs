//! Biomarker effect sizes for lab-value adjustments
//!
//! Each biomarker converts a drop from current to target value into a
//! relative risk reduction: `rrr = rrr_per_step * (drop / step_size)`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ArrError, Result};

/// Continuous lab values that can adjust risk after the interventions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Biomarker {
    /// LDL cholesterol (mmol/L)
    Ldl,
    /// Glycated haemoglobin (%)
    Hba1c,
    /// Systolic blood pressure (mmHg)
    Sbp,
}

impl Biomarker {
    /// Fixed application order; each step acts on the pool left by the previous one
    pub const ORDER: [Biomarker; 3] = [Biomarker::Ldl, Biomarker::Hba1c, Biomarker::Sbp];

    pub fn key(&self) -> &'static str {
        match self {
            Biomarker::Ldl => "ldl",
            Biomarker::Hba1c => "hba1c",
            Biomarker::Sbp => "sbp",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            Biomarker::Ldl => "mmol/L",
            Biomarker::Hba1c => "%",
            Biomarker::Sbp => "mmHg",
        }
    }
}

impl FromStr for Biomarker {
    type Err = ArrError;

    fn from_str(s: &str) -> Result<Self> {
        Biomarker::ORDER
            .iter()
            .copied()
            .find(|b| b.key() == s)
            .ok_or_else(|| ArrError::InvalidAssumption(format!("unknown biomarker: {}", s)))
    }
}

impl fmt::Display for Biomarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Biomarker::Ldl => "LDL-C",
            Biomarker::Hba1c => "HbA1c",
            Biomarker::Sbp => "SBP",
        };
        f.write_str(label)
    }
}

/// Relative reduction per unit drop of one biomarker
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BiomarkerEffect {
    /// Percentage points of relative reduction per full step
    pub rrr_per_step: f64,

    /// Size of one step in the biomarker's own units
    pub step_size: f64,
}

impl BiomarkerEffect {
    pub fn new(rrr_per_step: f64, step_size: f64) -> Self {
        Self { rrr_per_step, step_size }
    }

    /// Relative reduction for a (non-negative) drop, linear in partial steps
    pub fn relative_reduction(&self, drop: f64) -> f64 {
        self.rrr_per_step * (drop / self.step_size)
    }
}

/// Effect sizes for all three biomarkers
#[derive(Debug, Clone, PartialEq)]
pub struct BiomarkerEffects {
    pub ldl: BiomarkerEffect,
    pub hba1c: BiomarkerEffect,
    pub sbp: BiomarkerEffect,
}

impl BiomarkerEffects {
    /// 22 per mmol/L LDL, 14 per % HbA1c, 20 per 10 mmHg SBP
    pub fn reference() -> Self {
        Self {
            ldl: BiomarkerEffect::new(22.0, 1.0),
            hba1c: BiomarkerEffect::new(14.0, 1.0),
            sbp: BiomarkerEffect::new(20.0, 10.0),
        }
    }

    /// Create from loaded CSV rows of (biomarker key, rrr_per_step, step_size)
    pub fn from_loaded(rows: &[(String, f64, f64)]) -> Result<Self> {
        let mut ldl = None;
        let mut hba1c = None;
        let mut sbp = None;

        for (key, rrr_per_step, step_size) in rows {
            if !step_size.is_finite() || *step_size <= 0.0 {
                return Err(ArrError::InvalidAssumption(format!(
                    "step size for {} must be positive, got {}",
                    key, step_size
                )));
            }
            if !rrr_per_step.is_finite() || *rrr_per_step < 0.0 {
                return Err(ArrError::InvalidAssumption(format!(
                    "effect size for {} must be non-negative, got {}",
                    key, rrr_per_step
                )));
            }

            let effect = BiomarkerEffect::new(*rrr_per_step, *step_size);
            let slot = match key.parse::<Biomarker>()? {
                Biomarker::Ldl => &mut ldl,
                Biomarker::Hba1c => &mut hba1c,
                Biomarker::Sbp => &mut sbp,
            };
            if slot.replace(effect).is_some() {
                return Err(ArrError::InvalidAssumption(format!("duplicate biomarker row: {}", key)));
            }
        }

        let missing = |b: Biomarker| ArrError::InvalidAssumption(format!("missing effect size for {}", b.key()));

        Ok(Self {
            ldl: ldl.ok_or_else(|| missing(Biomarker::Ldl))?,
            hba1c: hba1c.ok_or_else(|| missing(Biomarker::Hba1c))?,
            sbp: sbp.ok_or_else(|| missing(Biomarker::Sbp))?,
        })
    }

    pub fn get(&self, biomarker: Biomarker) -> &BiomarkerEffect {
        match biomarker {
            Biomarker::Ldl => &self.ldl,
            Biomarker::Hba1c => &self.hba1c,
            Biomarker::Sbp => &self.sbp,
        }
    }
}

impl Default for BiomarkerEffects {
    fn default() -> Self {
        Self::reference()
    }
}
