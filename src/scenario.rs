//! Scenario runner for single and batch calculations
//!
//! Loads assumptions once, then scores any number of patient profiles
//! against the same immutable tables.

use rayon::prelude::*;

use crate::assumptions::{Assumptions, Horizon};
use crate::calculator::{ArrCalculator, ArrResult};
use crate::error::Result;
use crate::patient::{PatientProfile, PatientRecord, RowLabel};

/// Pre-loaded runner sharing one calculator across requests
///
/// # Example
/// ```ignore
/// let runner = ScenarioRunner::from_csv()?;
/// let results = runner.run_batch(&profiles);
/// ```
#[derive(Debug, Clone)]
pub struct ScenarioRunner {
    calculator: ArrCalculator,
}

impl ScenarioRunner {
    /// Create runner with the built-in reference tables
    pub fn new() -> Self {
        Self::with_assumptions(Assumptions::default_reference())
    }

    /// Create runner by loading assumptions from CSV files
    pub fn from_csv() -> Result<Self> {
        Ok(Self::with_assumptions(Assumptions::from_csv()?))
    }

    /// Create runner from specific assumptions directory
    pub fn from_csv_path(path: &std::path::Path) -> Result<Self> {
        Ok(Self::with_assumptions(Assumptions::from_csv_path(path)?))
    }

    pub fn with_assumptions(assumptions: Assumptions) -> Self {
        Self {
            calculator: ArrCalculator::new(assumptions),
        }
    }

    pub fn run(&self, profile: &PatientProfile) -> Result<ArrResult> {
        self.calculator.calculate(profile)
    }

    /// Score independent profiles in parallel; results keep input order
    pub fn run_batch(&self, profiles: &[PatientProfile]) -> Vec<Result<ArrResult>> {
        profiles
            .par_iter()
            .map(|profile| self.calculator.calculate(profile))
            .collect()
    }

    /// Score loaded rows in parallel; rows rejected at load time pass their
    /// error through unchanged
    pub fn run_records(&self, records: Vec<PatientRecord>) -> Vec<(RowLabel, Result<ArrResult>)> {
        records
            .into_par_iter()
            .map(|record| {
                let result = record
                    .profile
                    .and_then(|profile| self.calculator.calculate(&profile));
                (record.label, result)
            })
            .collect()
    }

    /// Same profile evaluated at every horizon, 5-year first
    pub fn run_horizons(&self, profile: &PatientProfile) -> Result<Vec<ArrResult>> {
        Horizon::ALL
            .iter()
            .map(|&horizon| self.calculator.calculate(&profile.at_horizon(horizon)))
            .collect()
    }

    pub fn calculator(&self) -> &ArrCalculator {
        &self.calculator
    }

    pub fn assumptions(&self) -> &Assumptions {
        self.calculator.assumptions()
    }
}

impl Default for ScenarioRunner {
    fn default() -> Self {
        Self::new()
    }
}
