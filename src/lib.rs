//! CVD Risk Reduction - deterministic estimator of cumulative absolute risk reduction
//!
//! This library provides:
//! - The intervention catalog with lifetime and 5-year effect sizes
//! - Age-banded scaling of intervention effects
//! - LDL, HbA1c and SBP target adjustments
//! - Sequential composition of reductions over a 100% baseline risk pool
//! - Batch scoring of patient scenarios

pub mod assumptions;
pub mod calculator;
pub mod error;
pub mod patient;
pub mod scenario;

// Re-export commonly used types
pub use assumptions::{scale_by_age, Assumptions, Biomarker, Horizon, InterventionCatalog, InterventionId};
pub use calculator::{ArrCalculator, ArrResult, ArrSummary};
pub use error::ArrError;
pub use patient::{BiomarkerAdjustment, PatientProfile, Selection};
pub use scenario::ScenarioRunner;
