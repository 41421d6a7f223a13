use std::path::PathBuf;

use clap::{ Parser, ValueEnum };
use tracing::{ error, info };

use k_armed_bandits::constants::{
    DRIFT_STD,
    EPSILONS,
    INITIAL_MEANS_MEAN,
    INITIAL_MEANS_STD,
    INITIAL_VALUES,
    NUM_OF_ARMS,
    NUM_OF_STEPS_IN_A_TRIAL,
    NUM_OF_TRIALS,
    REPORT_DIRECTORY,
    REWARD_NOISE_STD,
};
use k_armed_bandits::logging::init_logging;
use k_armed_bandits::report_writer::write_report;
use k_armed_bandits::{ run_sweep, InitialMeans, Result, StepSize, SweepConfig };

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    Stationary,
    NonStationary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum InitialMeansMode {
    /// Every arm starts at 0
    Zero,
    /// Every arm draws its mean from N(0, 1)
    Gaussian,
}

#[derive(Parser, Debug)]
#[command(name = "k_armed_bandits", about = "Hyperparameter sweep for the k-armed bandit problem")]
struct Cli {
    /// Number of arms (k)
    #[arg(long, default_value_t = NUM_OF_ARMS)]
    arms: usize,

    /// Independent trials averaged per configuration
    #[arg(long, default_value_t = NUM_OF_TRIALS)]
    trials: usize,

    /// Steps per trial
    #[arg(long, default_value_t = NUM_OF_STEPS_IN_A_TRIAL)]
    steps: usize,

    /// Exploration probabilities to sweep
    #[arg(long, value_delimiter = ',', default_values_t = EPSILONS)]
    epsilons: Vec<f64>,

    /// Initial Q-table values to sweep
    #[arg(long, value_delimiter = ',', default_values_t = INITIAL_VALUES)]
    initial_values: Vec<f64>,

    /// Step sizes to sweep, `none` selects the sample-average method
    #[arg(long, value_delimiter = ',', default_values_t = [StepSize::SampleAverage])]
    alphas: Vec<StepSize>,

    /// Environment modes to sweep
    #[arg(long, value_enum, value_delimiter = ',', default_values_t = [Mode::Stationary])]
    modes: Vec<Mode>,

    #[arg(long, value_enum, default_value_t = InitialMeansMode::Gaussian)]
    initial_means: InitialMeansMode,

    #[arg(long, default_value_t = REWARD_NOISE_STD)]
    reward_noise_std: f64,

    /// Random walk step of the true means in non-stationary mode
    #[arg(long, default_value_t = DRIFT_STD)]
    drift_std: f64,

    /// Master seed for reproducible runs
    #[arg(long)]
    seed: Option<u64>,

    /// Run trials on a single thread
    #[arg(long)]
    sequential: bool,

    #[arg(long, default_value = REPORT_DIRECTORY)]
    output_dir: PathBuf,

    /// Do not write the report file
    #[arg(long)]
    no_report: bool,
}

impl Cli {
    fn sweep_config(&self) -> SweepConfig {
        let initial_means = match self.initial_means {
            InitialMeansMode::Zero => InitialMeans::Zero,
            InitialMeansMode::Gaussian =>
                InitialMeans::Gaussian { mean: INITIAL_MEANS_MEAN, std_dev: INITIAL_MEANS_STD },
        };
        SweepConfig {
            num_arms: self.arms,
            num_trials: self.trials,
            num_steps: self.steps,
            epsilons: self.epsilons.clone(),
            initial_values: self.initial_values.clone(),
            step_sizes: self.alphas.clone(),
            stationary_modes: self.modes
                .iter()
                .map(|mode| *mode == Mode::Stationary)
                .collect(),
            initial_means,
            reward_noise_std: self.reward_noise_std,
            drift_std: self.drift_std,
            seed: self.seed,
            parallel: !self.sequential,
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let sweep = cli.sweep_config();
    let results = run_sweep(&sweep)?;

    println!("## Summary for all configurations ##");
    println!("{:?}", results.summary()?);

    if !cli.no_report {
        let path = write_report(&cli.output_dir, &sweep, &results)?;
        info!(file = %path.display(), "report written");
    }
    Ok(())
}

fn main() {
    init_logging("info");
    let cli = Cli::parse();

    if let Err(err) = run(&cli) {
        error!(%err, "run failed");
        std::process::exit(1);
    }
}
