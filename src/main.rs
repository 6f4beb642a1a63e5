//! CVD risk reduction CLI
//!
//! Scores one patient's selected interventions and lab targets and prints
//! the cumulative ARR and remaining risk.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use serde::Serialize;

use cvd_risk_reduction::calculator::{round1, ArrResult, ArrSummary, ReductionStep};
use cvd_risk_reduction::{
    Assumptions, ArrCalculator, Biomarker, BiomarkerAdjustment, Horizon, PatientProfile, Selection,
};

#[derive(Debug, Parser)]
#[command(
    name = "cvd-arr",
    version,
    about = "Estimate cumulative CVD absolute risk reduction for a set of interventions",
    after_help = "EXAMPLES:\n  \
        cvd-arr --age 60 --select smoking_cessation --ldl 2.5 1.4\n  \
        cvd-arr --horizon 5yr --flags 1,1,0,0,0,1,0,0,0,0,0,0,0,0 --trace\n  \
        cvd-arr --list"
)]
struct Cli {
    /// Patient age in years
    #[arg(long, default_value_t = 60, allow_negative_numbers = true)]
    age: i32,

    /// Time horizon for effect sizes: 5yr or lifetime
    #[arg(long, default_value = "lifetime")]
    horizon: String,

    /// Intervention key to apply (repeatable), e.g. smoking_cessation
    #[arg(long = "select", value_name = "KEY")]
    select: Vec<String>,

    /// One 0/1 flag per catalog entry, in catalog order
    #[arg(
        long,
        value_name = "FLAGS",
        value_delimiter = ',',
        value_parser = parse_flag,
        conflicts_with = "select"
    )]
    flags: Option<Vec<bool>>,

    /// Current and target LDL-C (mmol/L)
    #[arg(long, num_args = 2, value_names = ["CURRENT", "TARGET"])]
    ldl: Option<Vec<f64>>,

    /// Current and target HbA1c (%)
    #[arg(long, num_args = 2, value_names = ["CURRENT", "TARGET"])]
    hba1c: Option<Vec<f64>>,

    /// Current and target systolic blood pressure (mmHg)
    #[arg(long, num_args = 2, value_names = ["CURRENT", "TARGET"])]
    sbp: Option<Vec<f64>>,

    /// Directory of assumption CSV files (defaults to built-in tables)
    #[arg(long, value_name = "DIR")]
    assumptions: Option<PathBuf>,

    /// Print every reduction step
    #[arg(long)]
    trace: bool,

    /// Emit the result as JSON
    #[arg(long)]
    json: bool,

    /// List the intervention catalog and exit
    #[arg(long)]
    list: bool,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    horizon: Horizon,
    age: i32,
    #[serde(flatten)]
    summary: ArrSummary,
    intervention_arr: f64,
    biomarker_arr: f64,
    steps: &'a [ReductionStep],
}

fn parse_flag(value: &str) -> std::result::Result<bool, String> {
    match value.trim() {
        "0" => Ok(false),
        "1" => Ok(true),
        other => Err(format!("expected 0 or 1, got '{}'", other)),
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let assumptions = match &cli.assumptions {
        Some(dir) => Assumptions::from_csv_path(dir)
            .with_context(|| format!("loading assumptions from {}", dir.display()))?,
        None => Assumptions::default_reference(),
    };

    if cli.list {
        print_catalog(&assumptions);
        return Ok(());
    }

    let calculator = ArrCalculator::new(assumptions);
    let profile = build_profile(&cli, &calculator)?;
    info!(
        "Scoring {} interventions at age {} ({})",
        profile.selection.len(),
        profile.age,
        profile.horizon
    );

    let result = calculator.calculate(&profile)?;

    if cli.json {
        let report = JsonReport {
            horizon: result.horizon,
            age: result.age,
            summary: result.summary(),
            intervention_arr: round1(result.intervention_arr()),
            biomarker_arr: round1(result.biomarker_arr()),
            steps: &result.steps,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_result(&result, cli.trace);
    }

    Ok(())
}

fn build_profile(cli: &Cli, calculator: &ArrCalculator) -> Result<PatientProfile> {
    let horizon: Horizon = cli.horizon.parse()?;
    let catalog = &calculator.assumptions().catalog;

    let selection = match &cli.flags {
        Some(flags) => Selection::from_flags(flags, catalog)?,
        None => Selection::from_keys(&cli.select)?,
    };

    let mut profile = PatientProfile::new(cli.age, horizon).with_selection(selection);
    for (biomarker, values) in [
        (Biomarker::Ldl, &cli.ldl),
        (Biomarker::Hba1c, &cli.hba1c),
        (Biomarker::Sbp, &cli.sbp),
    ] {
        if let Some(adjustment) = pair(values) {
            profile.biomarkers.set(biomarker, adjustment);
        }
    }

    Ok(profile)
}

fn pair(values: &Option<Vec<f64>>) -> Option<BiomarkerAdjustment> {
    match values.as_deref() {
        Some([current, target]) => Some(BiomarkerAdjustment::present(*current, *target)),
        _ => None,
    }
}

fn print_catalog(assumptions: &Assumptions) {
    println!("{:<4} {:<20} {:<36} {:>8} {:>6}", "#", "Key", "Intervention", "Lifetime", "5yr");
    println!("{}", "-".repeat(78));
    for (i, entry) in assumptions.catalog.iter().enumerate() {
        println!(
            "{:<4} {:<20} {:<36} {:>8} {:>6}",
            i + 1,
            entry.id.key(),
            entry.name,
            entry.arr_lifetime,
            entry.arr_5yr
        );
    }
}

fn print_result(result: &ArrResult, trace: bool) {
    if trace {
        println!("{:<36} {:>10} {:>10} {:>10} {:>10}", "Step", "Base RRR", "Applied", "Reduced", "Remaining");
        println!("{}", "-".repeat(80));
        for step in &result.steps {
            println!(
                "{:<36} {:>10.2} {:>10.2} {:>10.4} {:>10.4}",
                step.label, step.base_rrr, step.applied_rrr, step.absolute_reduction, step.remaining_risk
            );
        }
        println!("{}", "-".repeat(80));
        println!("{:<36} {:>43.4}", "From interventions", result.intervention_arr());
        println!("{:<36} {:>43.4}", "From biomarker targets", result.biomarker_arr());
        println!();
    }

    let summary = result.summary();
    println!("Estimated Cumulative ARR ({}): {:.1}%", result.horizon, summary.cumulative_arr);
    println!("Estimated Remaining CVD Risk: {:.1}%", summary.remaining_risk);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("cvd-arr").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_defaults() {
        let cli = parse(&[]);
        assert_eq!(cli.age, 60);
        assert_eq!(cli.horizon, "lifetime");
        assert!(cli.select.is_empty());
        assert!(cli.ldl.is_none());
    }

    #[test]
    fn test_build_profile_from_keys_and_pairs() {
        let cli = parse(&["--age", "60", "--select", "smoking_cessation", "--ldl", "2.5", "1.4", "--sbp", "145", "120"]);
        let calculator = ArrCalculator::default();
        let profile = build_profile(&cli, &calculator).unwrap();

        assert_eq!(profile.selection.len(), 1);
        assert_eq!(profile.biomarkers.ldl, BiomarkerAdjustment::present(2.5, 1.4));
        assert_eq!(profile.biomarkers.hba1c, BiomarkerAdjustment::Absent);
        assert_eq!(profile.biomarkers.sbp, BiomarkerAdjustment::present(145.0, 120.0));

        let summary = calculator.calculate(&profile).unwrap().summary();
        assert!(summary.cumulative_arr > 17.0);
    }

    #[test]
    fn test_build_profile_from_flags() {
        let cli = parse(&["--horizon", "5yr", "--flags", "1,0,0,0,0,0,0,0,0,0,0,0,0,1"]);
        let profile = build_profile(&cli, &ArrCalculator::default()).unwrap();
        assert_eq!(profile.horizon, Horizon::FiveYear);
        assert_eq!(profile.selection.len(), 2);

        let short = parse(&["--flags", "1,0,1"]);
        assert!(build_profile(&short, &ArrCalculator::default()).is_err());
    }

    #[test]
    fn test_report_splits_interventions_and_biomarkers() {
        let cli = parse(&["--select", "smoking_cessation", "--ldl", "2.5", "1.4"]);
        let calculator = ArrCalculator::default();
        let result = calculator.calculate(&build_profile(&cli, &calculator).unwrap()).unwrap();

        let report = JsonReport {
            horizon: result.horizon,
            age: result.age,
            summary: result.summary(),
            intervention_arr: round1(result.intervention_arr()),
            biomarker_arr: round1(result.biomarker_arr()),
            steps: &result.steps,
        };
        let json = serde_json::to_value(&report).unwrap();

        // 17 from smoking, then 24.2% of the remaining 83
        assert_eq!(json["intervention_arr"], 17.0);
        assert_eq!(json["biomarker_arr"], 20.1);
        assert_eq!(json["cumulative_arr"], 37.1);
        assert_eq!(json["steps"].as_array().map(Vec::len), Some(2));
    }

    #[test]
    fn test_flags_accept_only_zero_or_one() {
        let result = Cli::try_parse_from(["cvd-arr", "--flags", "2,0,0,0,0,0,0,0,0,0,0,0,0,0"]);
        assert!(result.is_err());
        assert!(Cli::try_parse_from(["cvd-arr", "--flags", "1,yes"]).is_err());
        assert_eq!(parse_flag("1"), Ok(true));
        assert_eq!(parse_flag("0"), Ok(false));
    }

    #[test]
    fn test_unknown_horizon_rejected() {
        let cli = parse(&["--horizon", "10yr"]);
        assert!(build_profile(&cli, &ArrCalculator::default()).is_err());
    }

    #[test]
    fn test_half_pair_rejected_by_parser() {
        let result = Cli::try_parse_from(["cvd-arr", "--ldl", "2.5"]);
        assert!(result.is_err());
    }
}
