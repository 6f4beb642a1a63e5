//! Calculation output: per-step trace and rounded summary

use serde::{Deserialize, Serialize};

use crate::assumptions::{Biomarker, Horizon, InterventionId};

/// Round to one decimal place; applied only to final totals
///
/// Rounds the exact binary value, ties to even. Scaling by 10 first would
/// round values such as 40.6499.. (printed as 40.65) up.
pub fn round1(value: f64) -> f64 {
    format!("{:.1}", value).parse().unwrap_or(value)
}

/// What produced a reduction step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepSource {
    Intervention(InterventionId),
    Biomarker(Biomarker),
}

/// One update of the risk pool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReductionStep {
    pub source: StepSource,

    /// Display label (intervention name or biomarker)
    pub label: String,

    /// Relative reduction before age scaling; equals `applied_rrr` for biomarkers
    pub base_rrr: f64,

    /// Relative reduction actually applied to the remaining pool
    pub applied_rrr: f64,

    /// Absolute reduction taken out of the pool by this step
    pub absolute_reduction: f64,

    /// Remaining risk after this step
    pub remaining_risk: f64,
}

/// Full, unrounded result of a calculation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrResult {
    pub patient_id: Option<String>,
    pub horizon: Horizon,
    pub age: i32,

    /// Steps in application order
    pub steps: Vec<ReductionStep>,

    /// Unrounded cumulative absolute reduction
    pub cumulative_arr: f64,

    /// Unrounded remaining risk
    pub remaining_risk: f64,
}

impl ArrResult {
    pub fn new(patient_id: Option<String>, horizon: Horizon, age: i32) -> Self {
        Self {
            patient_id,
            horizon,
            age,
            steps: Vec::new(),
            cumulative_arr: 0.0,
            remaining_risk: super::state::BASELINE_RISK,
        }
    }

    pub fn add_step(&mut self, step: ReductionStep) {
        self.steps.push(step);
    }

    /// Totals rounded to one decimal
    pub fn summary(&self) -> ArrSummary {
        ArrSummary {
            cumulative_arr: round1(self.cumulative_arr),
            remaining_risk: round1(self.remaining_risk),
        }
    }

    /// Absolute reduction contributed by intervention steps only
    pub fn intervention_arr(&self) -> f64 {
        self.steps
            .iter()
            .filter(|s| matches!(s.source, StepSource::Intervention(_)))
            .map(|s| s.absolute_reduction)
            .sum()
    }

    /// Absolute reduction contributed by biomarker steps only
    pub fn biomarker_arr(&self) -> f64 {
        self.steps
            .iter()
            .filter(|s| matches!(s.source, StepSource::Biomarker(_)))
            .map(|s| s.absolute_reduction)
            .sum()
    }
}

/// The two reported numbers
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArrSummary {
    pub cumulative_arr: f64,
    pub remaining_risk: f64,
}
