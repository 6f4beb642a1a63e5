//! Absolute risk reduction calculator

mod engine;
mod state;
mod steps;

pub use engine::ArrCalculator;
pub use state::{RiskPool, BASELINE_RISK};
pub use steps::{round1, ArrResult, ArrSummary, ReductionStep, StepSource};
