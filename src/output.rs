// src/output.rs
use crate::mc::mc_engine::SimulationResult;
use ndarray::Array2;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// One row per trial: terminal price and undiscounted payoff
pub fn write_terminal_prices_csv<P: AsRef<Path>>(
    filename: P,
    result: &SimulationResult,
    strike_price: f64,
) -> io::Result<()> {
    let mut file = BufWriter::new(File::create(filename)?);
    writeln!(file, "path_id,s_t,payoff")?;
    for (i, &s_t) in result.terminal_prices.iter().enumerate() {
        let payoff = result.option_type.payoff(s_t, strike_price);
        writeln!(file, "{},{},{}", i, s_t, payoff)?;
    }
    file.flush()
}

/// Long format, one row per (path, step), ready for line charts
pub fn write_paths_csv<P: AsRef<Path>>(
    filename: P,
    paths: &Array2<f64>,
    time_to_maturity: f64,
) -> io::Result<()> {
    let mut file = BufWriter::new(File::create(filename)?);
    let steps = paths.ncols().saturating_sub(1).max(1);
    let dt = time_to_maturity / steps as f64;
    writeln!(file, "path_id,step,t,s_t")?;
    for (i, row) in paths.rows().into_iter().enumerate() {
        for (j, s) in row.iter().enumerate() {
            writeln!(file, "{},{},{},{}", i, j, j as f64 * dt, s)?;
        }
    }
    file.flush()
}

pub fn write_summary_to_csv<P: AsRef<Path>>(
    filename: P,
    summary_data: &[(&str, String)],
) -> io::Result<()> {
    let mut file = BufWriter::new(File::create(filename)?);
    writeln!(file, "key,value")?;
    for (key, value) in summary_data {
        writeln!(file, "{},{}", key, value)?;
    }
    file.flush()
}

/// Key/value summary of a run, stamped with the UTC time it was produced
pub fn summary_rows(result: &SimulationResult) -> Vec<(&'static str, String)> {
    vec![
        (
            "generated_at",
            chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string(),
        ),
        ("option_type", result.option_type.to_string()),
        ("num_simulations", result.num_simulations.to_string()),
        ("price_estimate", format!("{:.6}", result.price_estimate)),
        ("standard_error", format!("{:.6}", result.standard_error)),
        ("confidence_level", result.confidence_level.to_string()),
        ("ci_low", format!("{:.6}", result.confidence_interval.low)),
        ("ci_high", format!("{:.6}", result.confidence_interval.high)),
    ]
}
