//! Error types for assumption loading and risk reduction calculations

use thiserror::Error;

use crate::assumptions::Biomarker;

/// Errors raised when inputs or assumption tables violate the calculator's contract
#[derive(Debug, Error)]
pub enum ArrError {
    #[error("selection has {actual} entries but the catalog has {expected}")]
    SelectionLength { expected: usize, actual: usize },

    #[error("unknown horizon '{0}' (expected '5yr' or 'lifetime')")]
    UnknownHorizon(String),

    #[error("unknown intervention: {0}")]
    UnknownIntervention(String),

    #[error("{biomarker} requires both a current and a target value")]
    IncompleteBiomarker { biomarker: Biomarker },

    #[error("invalid intervention catalog: {0}")]
    InvalidCatalog(String),

    #[error("invalid assumption table: {0}")]
    InvalidAssumption(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("parse error: {0}")]
    Parse(String),
}

pub type Result<T> = std::result::Result<T, ArrError>;
