//! Score a file of patient scenarios and write one result row per patient
//!
//! Failed rows are kept in the output with an error message so the
//! input and output line up.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};
use serde::Serialize;

use cvd_risk_reduction::error::Result as CalcResult;
use cvd_risk_reduction::patient::{load_records, RowLabel};
use cvd_risk_reduction::{ArrResult, ScenarioRunner};

#[derive(Debug, Parser)]
#[command(name = "run_batch", about = "Score a CSV of patient scenarios")]
struct Args {
    /// Input CSV of patient scenarios
    input: PathBuf,

    /// Output CSV path
    #[arg(default_value = "arr_batch_output.csv")]
    output: PathBuf,

    /// Directory of assumption CSV files (defaults to built-in tables)
    #[arg(long, value_name = "DIR")]
    assumptions: Option<PathBuf>,
}

/// Output row; age and horizon are echoed as written when a row is rejected
#[derive(Debug, Serialize)]
struct BatchRow {
    patient_id: String,
    horizon: String,
    age: String,
    cumulative_arr: Option<f64>,
    remaining_risk: Option<f64>,
    error: String,
}

impl BatchRow {
    fn new(label: &RowLabel, result: &CalcResult<ArrResult>) -> Self {
        let patient_id = label.display_id();

        match result {
            Ok(r) => {
                let summary = r.summary();
                Self {
                    patient_id,
                    horizon: r.horizon.to_string(),
                    age: r.age.to_string(),
                    cumulative_arr: Some(summary.cumulative_arr),
                    remaining_risk: Some(summary.remaining_risk),
                    error: String::new(),
                }
            }
            Err(e) => Self {
                patient_id,
                horizon: label.horizon.clone(),
                age: label.age.clone(),
                cumulative_arr: None,
                remaining_risk: None,
                error: e.to_string(),
            },
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let runner = match &args.assumptions {
        Some(dir) => ScenarioRunner::from_csv_path(dir)
            .with_context(|| format!("loading assumptions from {}", dir.display()))?,
        None => ScenarioRunner::new(),
    };

    let start = Instant::now();
    let records = load_records(&args.input)
        .with_context(|| format!("loading patients from {}", args.input.display()))?;
    info!("Loaded {} patients in {:?}", records.len(), start.elapsed());

    let calc_start = Instant::now();
    let results = runner.run_records(records);
    info!("Scored {} patients in {:?}", results.len(), calc_start.elapsed());

    let mut writer = csv::Writer::from_path(&args.output)
        .with_context(|| format!("creating {}", args.output.display()))?;

    let mut failed = 0;
    let mut total_arr = 0.0;
    for (label, result) in &results {
        let row = BatchRow::new(label, result);
        match result {
            Ok(r) => total_arr += r.cumulative_arr,
            Err(e) => {
                failed += 1;
                warn!("{}: {}", row.patient_id, e);
            }
        }
        writer.serialize(&row)?;
    }
    writer.flush()?;

    let scored = results.len() - failed;
    println!("Patients:        {}", results.len());
    println!("Scored:          {}", scored);
    println!("Failed:          {}", failed);
    if scored > 0 {
        println!("Mean ARR:        {:.1}%", total_arr / scored as f64);
    }
    println!("Output:          {}", args.output.display());
    println!("Total time:      {:?}", start.elapsed());

    Ok(())
}
