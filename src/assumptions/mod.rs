//! Risk reduction assumptions: intervention catalog, age scaling and biomarker effects

mod age;
mod biomarkers;
mod interventions;
pub mod loader;

pub use age::{scale_by_age, AgeScaling};
pub use biomarkers::{Biomarker, BiomarkerEffect, BiomarkerEffects};
pub use interventions::{Horizon, Intervention, InterventionCatalog, InterventionId};
pub use loader::LoadedAssumptions;

use std::path::Path;

use log::info;

use crate::error::Result;

/// Container for all calculation assumptions
///
/// Built once and never mutated afterwards; safe to share across threads.
#[derive(Debug, Clone, PartialEq)]
pub struct Assumptions {
    pub catalog: InterventionCatalog,
    pub age_scaling: AgeScaling,
    pub biomarkers: BiomarkerEffects,
}

impl Assumptions {
    /// Create assumptions with the built-in reference tables
    pub fn default_reference() -> Self {
        Self {
            catalog: InterventionCatalog::reference(),
            age_scaling: AgeScaling::reference(),
            biomarkers: BiomarkerEffects::reference(),
        }
    }

    /// Load assumptions from CSV files in the default location (data/assumptions/)
    pub fn from_csv() -> Result<Self> {
        Self::from_csv_path(Path::new(loader::DEFAULT_ASSUMPTIONS_PATH))
    }

    /// Load assumptions from CSV files in a specific directory
    pub fn from_csv_path(path: &Path) -> Result<Self> {
        let loaded = LoadedAssumptions::load_from(path)?;

        let assumptions = Self {
            catalog: InterventionCatalog::from_loaded(&loaded.interventions)?,
            age_scaling: AgeScaling::from_loaded(&loaded.age_multipliers)?,
            biomarkers: BiomarkerEffects::from_loaded(&loaded.biomarker_effects)?,
        };

        info!(
            "Loaded {} interventions and {} age bands from {}",
            assumptions.catalog.len(),
            loaded.age_multipliers.len(),
            path.display()
        );

        Ok(assumptions)
    }
}

impl Default for Assumptions {
    fn default() -> Self {
        Self::default_reference()
    }
}
