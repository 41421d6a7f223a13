use std::cmp;
use std::fs::{ self, File };
use std::io::prelude::*;
use std::path::{ Path, PathBuf };

use chrono::prelude::*;
use tracing::info;

use crate::config::SweepConfig;
use crate::errors::Result;
use crate::statistics_calculator::SweepResults;

const POLARS_MAX_COLS: &str = "16";

/// Set environment variabls so that the whole dataframe is printed
fn set_polars_environment_variables(max_rows: usize) {
    std::env::set_var("POLARS_FMT_MAX_COLS", POLARS_MAX_COLS);
    std::env::set_var("POLARS_FMT_MAX_ROWS", max_rows.to_string());
}

/// Creates directory and its parents if it doesn't exist
fn create_directory(directory: &Path) -> std::io::Result<()> {
    if !directory.is_dir() {
        fs::create_dir_all(directory)?;
        info!(directory = %directory.display(), "report directory created");
    }
    Ok(())
}

fn get_timestamped_file_path(directory: &Path, file_name: &str) -> PathBuf {
    let local: DateTime<Local> = Local::now();
    let datetime_str = local.format("%Y-%m-%d_%H-%M-%S").to_string();
    directory.join(format!("{}_{}.txt", file_name, datetime_str))
}

fn get_lines_to_write(sweep: &SweepConfig, results: &SweepResults) -> Result<Vec<String>> {
    let mut lines = Vec::new();

    lines.push("### k-armed bandit sweep ###".to_string());
    lines.push(
        format!(
            "Arms: {} \t Trials: {} \t Steps per trial: {} \t Seed: {:?}",
            sweep.num_arms,
            sweep.num_trials,
            sweep.num_steps,
            sweep.seed
        )
    );
    lines.push(
        format!(
            "Reward noise std: {} \t Drift std: {} \t Initial means: {:?}",
            sweep.reward_noise_std,
            sweep.drift_std,
            sweep.initial_means
        )
    );

    lines.push("\n### Summary for all configurations ###".to_string());
    lines.push(format!("{:?}", results.summary()?));

    for (key, stats) in results.iter() {
        lines.push(format!("\n### Learning curve for {} ###", key));
        lines.push(format!("{:?}", stats.to_dataframe()?));
    }
    Ok(lines)
}

/// Writes summary and learning curve tables of the sweep into a timestamped text file
/// inside `directory`. Returns the path of the written file.
pub fn write_report(directory: &Path, sweep: &SweepConfig, results: &SweepResults) -> Result<PathBuf> {
    set_polars_environment_variables(cmp::max(sweep.num_steps, results.len()));
    create_directory(directory)?;

    let file_path = get_timestamped_file_path(directory, "run_result");
    let mut output = File::create(&file_path)?;
    for line in get_lines_to_write(sweep, results)? {
        writeln!(output, "{}", line)?;
    }

    info!(file = %file_path.display(), "statistics for all configurations saved");
    Ok(file_path)
}
