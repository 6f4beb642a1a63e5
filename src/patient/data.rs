//! Per-request patient inputs: selected interventions, age, horizon and lab targets

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::assumptions::{Biomarker, Horizon, InterventionCatalog, InterventionId};
use crate::error::{ArrError, Result};

/// Current/target pair for one biomarker; both values or neither
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BiomarkerAdjustment {
    #[default]
    Absent,
    Present { current: f64, target: f64 },
}

impl BiomarkerAdjustment {
    pub fn present(current: f64, target: f64) -> Self {
        BiomarkerAdjustment::Present { current, target }
    }

    /// Build from two optional values, rejecting a half-supplied pair
    pub fn from_pair(biomarker: Biomarker, current: Option<f64>, target: Option<f64>) -> Result<Self> {
        match (current, target) {
            (Some(current), Some(target)) => Ok(Self::present(current, target)),
            (None, None) => Ok(BiomarkerAdjustment::Absent),
            _ => Err(ArrError::IncompleteBiomarker { biomarker }),
        }
    }

    pub fn is_present(&self) -> bool {
        matches!(self, BiomarkerAdjustment::Present { .. })
    }

    /// Improvement from current to target, clamped at zero
    ///
    /// A target at or above the current value yields no reduction rather
    /// than a risk increase.
    pub fn drop(&self) -> f64 {
        match self {
            BiomarkerAdjustment::Absent => 0.0,
            BiomarkerAdjustment::Present { current, target } => (current - target).max(0.0),
        }
    }
}

/// Lab-value adjustments for LDL, HbA1c and SBP
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BiomarkerPanel {
    #[serde(default)]
    pub ldl: BiomarkerAdjustment,
    #[serde(default)]
    pub hba1c: BiomarkerAdjustment,
    #[serde(default)]
    pub sbp: BiomarkerAdjustment,
}

impl BiomarkerPanel {
    pub fn get(&self, biomarker: Biomarker) -> BiomarkerAdjustment {
        match biomarker {
            Biomarker::Ldl => self.ldl,
            Biomarker::Hba1c => self.hba1c,
            Biomarker::Sbp => self.sbp,
        }
    }

    pub fn set(&mut self, biomarker: Biomarker, adjustment: BiomarkerAdjustment) {
        match biomarker {
            Biomarker::Ldl => self.ldl = adjustment,
            Biomarker::Hba1c => self.hba1c = adjustment,
            Biomarker::Sbp => self.sbp = adjustment,
        }
    }
}

/// Set of selected interventions, keyed by identifier
///
/// Membership only; composition order always comes from the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Selection {
    ids: BTreeSet<InterventionId>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_ids<I: IntoIterator<Item = InterventionId>>(ids: I) -> Self {
        Self {
            ids: ids.into_iter().collect(),
        }
    }

    /// Positional form: one flag per catalog entry, in catalog order
    pub fn from_flags(flags: &[bool], catalog: &InterventionCatalog) -> Result<Self> {
        if flags.len() != catalog.len() {
            return Err(ArrError::SelectionLength {
                expected: catalog.len(),
                actual: flags.len(),
            });
        }

        Ok(Self {
            ids: catalog
                .iter()
                .zip(flags)
                .filter(|(_, &selected)| selected)
                .map(|(entry, _)| entry.id)
                .collect(),
        })
    }

    /// Parse intervention keys such as `smoking_cessation`
    pub fn from_keys<I, S>(keys: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let ids = keys
            .into_iter()
            .map(|key| key.as_ref().trim().parse::<InterventionId>())
            .collect::<Result<BTreeSet<_>>>()?;
        Ok(Self { ids })
    }

    pub fn insert(&mut self, id: InterventionId) -> bool {
        self.ids.insert(id)
    }

    pub fn contains(&self, id: InterventionId) -> bool {
        self.ids.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = InterventionId> + '_ {
        self.ids.iter().copied()
    }

    /// Every selected id must exist in the catalog
    pub fn validate_against(&self, catalog: &InterventionCatalog) -> Result<()> {
        match self.ids.iter().find(|id| !catalog.contains(**id)) {
            Some(id) => Err(ArrError::UnknownIntervention(format!("{} is not in the catalog", id))),
            None => Ok(()),
        }
    }

    /// Positional flags in catalog order
    pub fn to_flags(&self, catalog: &InterventionCatalog) -> Vec<bool> {
        catalog.iter().map(|entry| self.contains(entry.id)).collect()
    }
}

/// Everything needed for one risk reduction calculation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientProfile {
    /// Optional identifier for batch runs
    #[serde(default)]
    pub patient_id: Option<String>,

    /// Age in years; not validated
    pub age: i32,

    /// Which effect-size column to read from the catalog
    #[serde(default)]
    pub horizon: Horizon,

    #[serde(default)]
    pub selection: Selection,

    #[serde(default)]
    pub biomarkers: BiomarkerPanel,
}

impl PatientProfile {
    pub fn new(age: i32, horizon: Horizon) -> Self {
        Self {
            patient_id: None,
            age,
            horizon,
            selection: Selection::new(),
            biomarkers: BiomarkerPanel::default(),
        }
    }

    pub fn with_patient_id(mut self, patient_id: impl Into<String>) -> Self {
        self.patient_id = Some(patient_id.into());
        self
    }

    pub fn with_intervention(mut self, id: InterventionId) -> Self {
        self.selection.insert(id);
        self
    }

    pub fn with_selection(mut self, selection: Selection) -> Self {
        self.selection = selection;
        self
    }

    pub fn with_biomarker(mut self, biomarker: Biomarker, current: f64, target: f64) -> Self {
        self.biomarkers.set(biomarker, BiomarkerAdjustment::present(current, target));
        self
    }

    /// Same inputs evaluated at a different horizon
    pub fn at_horizon(&self, horizon: Horizon) -> Self {
        Self {
            horizon,
            ..self.clone()
        }
    }
}
