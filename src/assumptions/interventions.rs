//! Intervention catalog with per-horizon relative risk reductions
//!
//! Catalog order is significant: selected interventions are composed against
//! the remaining risk pool in exactly this order.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ArrError, Result};

/// Time frame over which an intervention's effect size is defined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Horizon {
    /// 5-year effect sizes
    #[serde(rename = "5yr")]
    FiveYear,
    /// Lifetime effect sizes
    #[default]
    #[serde(rename = "lifetime")]
    Lifetime,
}

impl Horizon {
    pub const ALL: [Horizon; 2] = [Horizon::FiveYear, Horizon::Lifetime];

    pub fn as_str(&self) -> &'static str {
        match self {
            Horizon::FiveYear => "5yr",
            Horizon::Lifetime => "lifetime",
        }
    }
}

impl FromStr for Horizon {
    type Err = ArrError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "5yr" => Ok(Horizon::FiveYear),
            "lifetime" => Ok(Horizon::Lifetime),
            other => Err(ArrError::UnknownHorizon(other.to_string())),
        }
    }
}

impl fmt::Display for Horizon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stable identifier for each intervention in the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterventionId {
    SmokingCessation,
    Statin,
    Ezetimibe,
    Pcsk9Inhibitor,
    Antiplatelet,
    BpControl,
    Semaglutide,
    WeightLoss,
    Empagliflozin,
    IcosapentEthyl,
    MediterraneanDiet,
    PhysicalActivity,
    AlcoholModeration,
    StressReduction,
}

impl InterventionId {
    /// All identifiers in reference catalog order
    pub const ALL: [InterventionId; 14] = [
        InterventionId::SmokingCessation,
        InterventionId::Statin,
        InterventionId::Ezetimibe,
        InterventionId::Pcsk9Inhibitor,
        InterventionId::Antiplatelet,
        InterventionId::BpControl,
        InterventionId::Semaglutide,
        InterventionId::WeightLoss,
        InterventionId::Empagliflozin,
        InterventionId::IcosapentEthyl,
        InterventionId::MediterraneanDiet,
        InterventionId::PhysicalActivity,
        InterventionId::AlcoholModeration,
        InterventionId::StressReduction,
    ];

    /// Key used in CSV files and on the command line
    pub fn key(&self) -> &'static str {
        match self {
            InterventionId::SmokingCessation => "smoking_cessation",
            InterventionId::Statin => "statin",
            InterventionId::Ezetimibe => "ezetimibe",
            InterventionId::Pcsk9Inhibitor => "pcsk9_inhibitor",
            InterventionId::Antiplatelet => "antiplatelet",
            InterventionId::BpControl => "bp_control",
            InterventionId::Semaglutide => "semaglutide",
            InterventionId::WeightLoss => "weight_loss",
            InterventionId::Empagliflozin => "empagliflozin",
            InterventionId::IcosapentEthyl => "icosapent_ethyl",
            InterventionId::MediterraneanDiet => "mediterranean_diet",
            InterventionId::PhysicalActivity => "physical_activity",
            InterventionId::AlcoholModeration => "alcohol_moderation",
            InterventionId::StressReduction => "stress_reduction",
        }
    }
}

impl FromStr for InterventionId {
    type Err = ArrError;

    fn from_str(s: &str) -> Result<Self> {
        InterventionId::ALL
            .iter()
            .copied()
            .find(|id| id.key() == s)
            .ok_or_else(|| ArrError::UnknownIntervention(s.to_string()))
    }
}

impl fmt::Display for InterventionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// A single catalog entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Intervention {
    pub id: InterventionId,

    /// Display label
    pub name: String,

    /// Relative risk reduction at the lifetime horizon (percentage points)
    pub arr_lifetime: f64,

    /// Relative risk reduction at the 5-year horizon (percentage points)
    pub arr_5yr: f64,
}

impl Intervention {
    pub fn new(id: InterventionId, name: impl Into<String>, arr_lifetime: f64, arr_5yr: f64) -> Self {
        Self {
            id,
            name: name.into(),
            arr_lifetime,
            arr_5yr,
        }
    }

    /// Base relative reduction for the requested horizon, before age scaling
    pub fn base_arr(&self, horizon: Horizon) -> f64 {
        match horizon {
            Horizon::FiveYear => self.arr_5yr,
            Horizon::Lifetime => self.arr_lifetime,
        }
    }
}

/// Ordered, immutable intervention catalog
#[derive(Debug, Clone, PartialEq)]
pub struct InterventionCatalog {
    entries: Vec<Intervention>,
}

impl InterventionCatalog {
    /// Build a catalog, rejecting duplicate ids or names and out-of-range percentages
    pub fn new(entries: Vec<Intervention>) -> Result<Self> {
        let mut ids = HashSet::new();
        let mut names = HashSet::new();

        for entry in &entries {
            if !ids.insert(entry.id) {
                return Err(ArrError::InvalidCatalog(format!("duplicate intervention id: {}", entry.id)));
            }
            if !names.insert(entry.name.as_str()) {
                return Err(ArrError::InvalidCatalog(format!("duplicate intervention name: {}", entry.name)));
            }
            for (label, value) in [("arr_lifetime", entry.arr_lifetime), ("arr_5yr", entry.arr_5yr)] {
                if !value.is_finite() || !(0.0..=100.0).contains(&value) {
                    return Err(ArrError::InvalidCatalog(format!(
                        "{} for {} must be within [0, 100], got {}",
                        label, entry.id, value
                    )));
                }
            }
        }

        Ok(Self { entries })
    }

    /// The 14-entry reference catalog
    pub fn reference() -> Self {
        use InterventionId::*;

        Self {
            entries: vec![
                Intervention::new(SmokingCessation, "Smoking cessation", 17.0, 5.0),
                Intervention::new(Statin, "Statin (atorvastatin 80 mg)", 9.0, 3.0),
                Intervention::new(Ezetimibe, "Ezetimibe", 2.0, 1.0),
                Intervention::new(Pcsk9Inhibitor, "PCSK9 inhibitor", 5.0, 2.0),
                Intervention::new(Antiplatelet, "Antiplatelet (ASA or clopidogrel)", 6.0, 2.0),
                Intervention::new(BpControl, "BP control (ACEi/ARB ± CCB)", 12.0, 4.0),
                Intervention::new(Semaglutide, "Semaglutide 2.4 mg", 4.0, 1.0),
                Intervention::new(WeightLoss, "Weight loss to ideal BMI", 10.0, 3.0),
                Intervention::new(Empagliflozin, "Empagliflozin", 6.0, 2.0),
                Intervention::new(IcosapentEthyl, "Icosapent ethyl (TG ≥1.5)", 5.0, 2.0),
                Intervention::new(MediterraneanDiet, "Mediterranean diet", 9.0, 3.0),
                Intervention::new(PhysicalActivity, "Physical activity", 9.0, 3.0),
                Intervention::new(AlcoholModeration, "Alcohol moderation", 5.0, 2.0),
                Intervention::new(StressReduction, "Stress reduction", 3.0, 1.0),
            ],
        }
    }

    /// Create from loaded CSV rows
    pub fn from_loaded(rows: &[Intervention]) -> Result<Self> {
        Self::new(rows.to_vec())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in composition order
    pub fn iter(&self) -> impl Iterator<Item = &Intervention> {
        self.entries.iter()
    }

    pub fn get(&self, id: InterventionId) -> Option<&Intervention> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn contains(&self, id: InterventionId) -> bool {
        self.get(id).is_some()
    }

    /// Identifier at a catalog position
    pub fn id_at(&self, index: usize) -> Option<InterventionId> {
        self.entries.get(index).map(|e| e.id)
    }
}

impl Default for InterventionCatalog {
    fn default() -> Self {
        Self::reference()
    }
}
