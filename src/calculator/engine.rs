//! Sequential risk reduction engine

use log::debug;

use super::state::RiskPool;
use super::steps::{ArrResult, ArrSummary, ReductionStep, StepSource};
use crate::assumptions::{Assumptions, Biomarker, Horizon};
use crate::error::Result;
use crate::patient::{BiomarkerAdjustment, BiomarkerPanel, PatientProfile, Selection};

/// Calculator over an immutable set of assumptions
#[derive(Debug, Clone)]
pub struct ArrCalculator {
    assumptions: Assumptions,
}

impl ArrCalculator {
    pub fn new(assumptions: Assumptions) -> Self {
        Self { assumptions }
    }

    pub fn assumptions(&self) -> &Assumptions {
        &self.assumptions
    }

    /// Age-adjusted relative reduction using this calculator's age table
    pub fn scale_by_age(&self, base_arr: f64, age: i32) -> f64 {
        self.assumptions.age_scaling.scale(base_arr, age)
    }

    /// Run the full calculation for one profile
    ///
    /// Selected interventions are applied first, in catalog order and scaled
    /// by age. Biomarker adjustments follow in the fixed order LDL, HbA1c,
    /// SBP and are not age-scaled. Every step acts on the risk left by the
    /// previous one.
    pub fn calculate(&self, profile: &PatientProfile) -> Result<ArrResult> {
        profile.selection.validate_against(&self.assumptions.catalog)?;

        let mut result = ArrResult::new(profile.patient_id.clone(), profile.horizon, profile.age);
        let mut pool = RiskPool::new();

        self.apply_interventions(profile, &mut pool, &mut result);
        self.apply_biomarkers(&profile.biomarkers, &mut pool, &mut result);

        result.cumulative_arr = pool.cumulative_arr;
        result.remaining_risk = pool.remaining_risk;

        debug!(
            "age {} ({}): cumulative ARR {:.4}, remaining risk {:.4} over {} steps",
            profile.age,
            profile.horizon,
            result.cumulative_arr,
            result.remaining_risk,
            result.steps.len()
        );

        Ok(result)
    }

    /// Positional form: one flag per catalog entry, optional (current, target)
    /// pairs and a horizon string. Returns the rounded totals.
    pub fn calculate_arr(
        &self,
        selection: &[bool],
        age: i32,
        ldl: Option<(f64, f64)>,
        hba1c: Option<(f64, f64)>,
        sbp: Option<(f64, f64)>,
        horizon: &str,
    ) -> Result<ArrSummary> {
        let horizon: Horizon = horizon.parse()?;
        let selection = Selection::from_flags(selection, &self.assumptions.catalog)?;

        let pair = |values: Option<(f64, f64)>| match values {
            Some((current, target)) => BiomarkerAdjustment::present(current, target),
            None => BiomarkerAdjustment::Absent,
        };

        let profile = PatientProfile {
            patient_id: None,
            age,
            horizon,
            selection,
            biomarkers: BiomarkerPanel {
                ldl: pair(ldl),
                hba1c: pair(hba1c),
                sbp: pair(sbp),
            },
        };

        Ok(self.calculate(&profile)?.summary())
    }

    fn apply_interventions(&self, profile: &PatientProfile, pool: &mut RiskPool, result: &mut ArrResult) {
        for intervention in self.assumptions.catalog.iter() {
            if !profile.selection.contains(intervention.id) {
                continue;
            }

            let base_rrr = intervention.base_arr(profile.horizon);
            let applied_rrr = self.scale_by_age(base_rrr, profile.age);
            let reduced = pool.apply(applied_rrr);

            debug!(
                "{}: base {} -> {:.4} at age {}, reduced {:.4}, remaining {:.4}",
                intervention.id, base_rrr, applied_rrr, profile.age, reduced, pool.remaining_risk
            );

            result.add_step(ReductionStep {
                source: StepSource::Intervention(intervention.id),
                label: intervention.name.clone(),
                base_rrr,
                applied_rrr,
                absolute_reduction: reduced,
                remaining_risk: pool.remaining_risk,
            });
        }
    }

    fn apply_biomarkers(&self, panel: &BiomarkerPanel, pool: &mut RiskPool, result: &mut ArrResult) {
        for biomarker in Biomarker::ORDER {
            let adjustment = panel.get(biomarker);
            if !adjustment.is_present() {
                continue;
            }

            let drop = adjustment.drop();
            let rrr = self.assumptions.biomarkers.get(biomarker).relative_reduction(drop);
            let reduced = pool.apply(rrr);

            debug!(
                "{}: drop {:.4} {} -> rrr {:.4}, reduced {:.4}, remaining {:.4}",
                biomarker,
                drop,
                biomarker.unit(),
                rrr,
                reduced,
                pool.remaining_risk
            );

            result.add_step(ReductionStep {
                source: StepSource::Biomarker(biomarker),
                label: biomarker.to_string(),
                base_rrr: rrr,
                applied_rrr: rrr,
                absolute_reduction: reduced,
                remaining_risk: pool.remaining_risk,
            });
        }
    }
}

impl Default for ArrCalculator {
    fn default() -> Self {
        Self::new(Assumptions::default_reference())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assumptions::{InterventionCatalog, InterventionId, Intervention};
    use crate::error::ArrError;
    use approx::assert_abs_diff_eq;

    fn flags_for(ids: &[InterventionId]) -> Vec<bool> {
        InterventionId::ALL.iter().map(|id| ids.contains(id)).collect()
    }

    fn assert_summary(summary: ArrSummary, cumulative_arr: f64, remaining_risk: f64) {
        assert_abs_diff_eq!(summary.cumulative_arr, cumulative_arr, epsilon = 1e-9);
        assert_abs_diff_eq!(summary.remaining_risk, remaining_risk, epsilon = 1e-9);
    }

    #[test]
    fn test_nothing_selected() {
        let calc = ArrCalculator::default();
        let summary = calc.calculate_arr(&[false; 14], 60, None, None, None, "lifetime").unwrap();
        assert_summary(summary, 0.0, 100.0);

        let result = calc.calculate(&PatientProfile::new(60, Horizon::FiveYear)).unwrap();
        assert!(result.steps.is_empty());
        assert_eq!(result.remaining_risk, 100.0);
    }

    #[test]
    fn test_smoking_cessation_only() {
        let calc = ArrCalculator::default();
        let flags = flags_for(&[InterventionId::SmokingCessation]);
        let summary = calc.calculate_arr(&flags, 60, None, None, None, "lifetime").unwrap();
        assert_summary(summary, 17.0, 83.0);
    }

    #[test]
    fn test_ldl_only() {
        let calc = ArrCalculator::default();
        let summary = calc
            .calculate_arr(&[false; 14], 60, Some((2.5, 1.4)), None, None, "lifetime")
            .unwrap();
        assert_summary(summary, 24.2, 75.8);
    }

    #[test]
    fn test_full_stack_regression() {
        // 17 from smoking, then 24.2% of 83, 14% of 62.914, 50% of 54.10604
        let calc = ArrCalculator::default();
        let flags = flags_for(&[InterventionId::SmokingCessation]);
        let summary = calc
            .calculate_arr(&flags, 60, Some((2.5, 1.4)), Some((8.0, 7.0)), Some((145.0, 120.0)), "lifetime")
            .unwrap();
        assert_summary(summary, 72.9, 27.1);

        let profile = PatientProfile::new(60, Horizon::Lifetime)
            .with_intervention(InterventionId::SmokingCessation)
            .with_biomarker(Biomarker::Sbp, 145.0, 120.0)
            .with_biomarker(Biomarker::Ldl, 2.5, 1.4)
            .with_biomarker(Biomarker::Hba1c, 8.0, 7.0);
        let result = calc.calculate(&profile).unwrap();

        assert_abs_diff_eq!(result.cumulative_arr, 72.94698, epsilon = 1e-9);
        assert_abs_diff_eq!(result.remaining_risk, 27.05302, epsilon = 1e-9);

        let reductions: Vec<f64> = result.steps.iter().map(|s| s.absolute_reduction).collect();
        assert_abs_diff_eq!(reductions[0], 17.0, epsilon = 1e-9);
        assert_abs_diff_eq!(reductions[1], 20.086, epsilon = 1e-9);
        assert_abs_diff_eq!(reductions[2], 8.80796, epsilon = 1e-9);
        assert_abs_diff_eq!(reductions[3], 27.05302, epsilon = 1e-9);
    }

    #[test]
    fn test_totals_near_rounding_midpoint() {
        // Remaining risk lands just below x.x5; both totals must still sum to 100.0
        let calc = ArrCalculator::default();
        let sbp = Some((145.0, 120.0));

        let smoking = flags_for(&[InterventionId::SmokingCessation]);
        let summary = calc.calculate_arr(&smoking, 30, None, None, sbp, "lifetime").unwrap();
        assert_eq!((summary.cumulative_arr, summary.remaining_risk), (59.4, 40.6));

        let statin = flags_for(&[InterventionId::Statin]);
        let summary = calc.calculate_arr(&statin, 30, None, None, sbp, "lifetime").unwrap();
        assert_eq!((summary.cumulative_arr, summary.remaining_risk), (54.9, 45.0));
        assert_abs_diff_eq!(summary.cumulative_arr + summary.remaining_risk, 100.0, epsilon = 1e-9);
    }

    #[test]
    fn test_biomarkers_apply_after_interventions_in_fixed_order() {
        let calc = ArrCalculator::default();
        let profile = PatientProfile::new(55, Horizon::Lifetime)
            .with_biomarker(Biomarker::Sbp, 150.0, 130.0)
            .with_biomarker(Biomarker::Hba1c, 8.0, 7.0)
            .with_biomarker(Biomarker::Ldl, 3.0, 2.0)
            .with_intervention(InterventionId::StressReduction)
            .with_intervention(InterventionId::SmokingCessation);

        let result = calc.calculate(&profile).unwrap();
        let sources: Vec<StepSource> = result.steps.iter().map(|s| s.source).collect();

        assert_eq!(
            sources,
            vec![
                StepSource::Intervention(InterventionId::SmokingCessation),
                StepSource::Intervention(InterventionId::StressReduction),
                StepSource::Biomarker(Biomarker::Ldl),
                StepSource::Biomarker(Biomarker::Hba1c),
                StepSource::Biomarker(Biomarker::Sbp),
            ]
        );
    }

    #[test]
    fn test_biomarker_clamp() {
        let calc = ArrCalculator::default();

        let summary = calc
            .calculate_arr(&[false; 14], 60, Some((1.4, 2.5)), None, None, "lifetime")
            .unwrap();
        assert_summary(summary, 0.0, 100.0);

        let profile = PatientProfile::new(60, Horizon::Lifetime).with_biomarker(Biomarker::Ldl, 1.4, 2.5);
        let result = calc.calculate(&profile).unwrap();
        assert_eq!(result.steps.len(), 1);
        assert_eq!(result.steps[0].absolute_reduction, 0.0);
        assert_eq!(result.steps[0].applied_rrr, 0.0);
    }

    #[test]
    fn test_biomarkers_ignore_age() {
        let calc = ArrCalculator::default();
        for age in [40, 55, 65, 80] {
            let summary = calc
                .calculate_arr(&[false; 14], age, Some((2.5, 1.4)), None, None, "5yr")
                .unwrap();
            assert_summary(summary, 24.2, 75.8);
        }
    }

    #[test]
    fn test_age_and_horizon_select_effect_size() {
        let calc = ArrCalculator::default();
        let flags = flags_for(&[InterventionId::SmokingCessation]);

        let young = calc.calculate_arr(&flags, 45, None, None, None, "lifetime").unwrap();
        assert_summary(young, 18.7, 81.3);

        let old = calc.calculate_arr(&flags, 75, None, None, None, "lifetime").unwrap();
        assert_summary(old, 10.2, 89.8);

        let five_year = calc.calculate_arr(&flags, 65, None, None, None, "5yr").unwrap();
        assert_summary(five_year, 4.0, 96.0);
    }

    #[test]
    fn test_intervention_order_follows_catalog() {
        // Reordering the catalog changes per-step attribution but not the totals
        let calc = ArrCalculator::default();
        let profile = PatientProfile::new(60, Horizon::Lifetime)
            .with_intervention(InterventionId::Statin)
            .with_intervention(InterventionId::SmokingCessation);
        let result = calc.calculate(&profile).unwrap();

        assert_eq!(result.steps[0].source, StepSource::Intervention(InterventionId::SmokingCessation));
        assert_abs_diff_eq!(result.steps[0].absolute_reduction, 17.0, epsilon = 1e-9);
        assert_abs_diff_eq!(result.steps[1].absolute_reduction, 83.0 * 0.09, epsilon = 1e-9);

        let mut reversed: Vec<Intervention> = calc.assumptions().catalog.iter().cloned().collect();
        reversed.reverse();
        let mut assumptions = calc.assumptions().clone();
        assumptions.catalog = InterventionCatalog::new(reversed).unwrap();
        let reversed_calc = ArrCalculator::new(assumptions);
        let reversed_result = reversed_calc.calculate(&profile).unwrap();

        assert_eq!(reversed_result.steps[0].source, StepSource::Intervention(InterventionId::Statin));
        assert_abs_diff_eq!(reversed_result.steps[0].absolute_reduction, 9.0, epsilon = 1e-9);
        assert_abs_diff_eq!(reversed_result.remaining_risk, result.remaining_risk, epsilon = 1e-9);
    }

    #[test]
    fn test_totals_always_sum_to_baseline() {
        let calc = ArrCalculator::default();
        let all = [true; 14];

        for horizon in ["5yr", "lifetime"] {
            for age in [20, 50, 51, 60, 61, 70, 71, 95] {
                for mask in [0usize, 1, 0b1010_1010_1010_10, 0b11_1111_1111_1111] {
                    let flags: Vec<bool> = (0..14).map(|i| mask & (1 << i) != 0).collect();
                    let summary = calc
                        .calculate_arr(&flags, age, Some((3.0, 1.8)), Some((8.5, 7.0)), Some((160.0, 125.0)), horizon)
                        .unwrap();
                    assert!(summary.remaining_risk >= 0.0 && summary.remaining_risk <= 100.0);
                    assert_abs_diff_eq!(summary.cumulative_arr + summary.remaining_risk, 100.0, epsilon = 0.1 + 1e-9);
                }
            }

            let summary = calc.calculate_arr(&all, 45, None, None, None, horizon).unwrap();
            assert!(summary.cumulative_arr < 100.0);
        }
    }

    #[test]
    fn test_contract_violations_fail_fast() {
        let calc = ArrCalculator::default();

        assert!(matches!(
            calc.calculate_arr(&[false; 13], 60, None, None, None, "lifetime"),
            Err(ArrError::SelectionLength { expected: 14, actual: 13 })
        ));
        assert!(matches!(
            calc.calculate_arr(&[false; 14], 60, None, None, None, "10yr"),
            Err(ArrError::UnknownHorizon(_))
        ));

        // Catalog without the selected intervention
        let mut assumptions = Assumptions::default_reference();
        assumptions.catalog = InterventionCatalog::new(vec![Intervention::new(
            InterventionId::Statin,
            "Statin",
            9.0,
            3.0,
        )])
        .unwrap();
        let small = ArrCalculator::new(assumptions);
        let profile = PatientProfile::new(60, Horizon::Lifetime).with_intervention(InterventionId::Ezetimibe);
        assert!(matches!(small.calculate(&profile), Err(ArrError::UnknownIntervention(_))));
    }

    #[test]
    fn test_pathological_inputs_can_drive_risk_negative() {
        // Not clamped: only biomarker drops are clamped at zero. An LDL drop
        // above 100/22 mmol/L or a catalog entry above 100/1.1 at a young age
        // overshoots the pool.
        let calc = ArrCalculator::default();
        let summary = calc
            .calculate_arr(&[false; 14], 60, Some((6.0, 0.5)), None, None, "lifetime")
            .unwrap();
        assert!(summary.remaining_risk < 0.0);
        assert!(summary.cumulative_arr > 100.0);

        let mut assumptions = Assumptions::default_reference();
        assumptions.catalog = InterventionCatalog::new(vec![Intervention::new(
            InterventionId::Statin,
            "Statin",
            95.0,
            3.0,
        )])
        .unwrap();
        let edited = ArrCalculator::new(assumptions);
        let profile = PatientProfile::new(40, Horizon::Lifetime).with_intervention(InterventionId::Statin);
        let result = edited.calculate(&profile).unwrap();
        assert!(result.remaining_risk < 0.0);
    }
}
