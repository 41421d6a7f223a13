use std::fmt;
use std::str::FromStr;

use rand::rngs::StdRng;
use rand::{ Rng, SeedableRng };

use crate::constants::{
    DRIFT_STD,
    EPSILONS,
    INITIAL_MEANS_MEAN,
    INITIAL_MEANS_STD,
    INITIAL_VALUES,
    NUM_OF_ARMS,
    NUM_OF_STEPS_IN_A_TRIAL,
    NUM_OF_TRIALS,
    REWARD_NOISE_STD,
};
use crate::errors::ConfigError;

/// Determines how much weight the agent gives to a newly observed reward.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StepSize {
    /// Step size is 1/n where n is the number of times the arm was chosen.
    /// Estimates converge to the mean of the observed rewards.
    SampleAverage,
    /// Fixed step size alpha. Produces an exponential recency-weighted average
    /// which keeps tracking the arm when its mean drifts.
    Constant(f64),
}

impl StepSize {
    pub fn alpha(&self) -> Option<f64> {
        match self {
            StepSize::SampleAverage => None,
            StepSize::Constant(alpha) => Some(*alpha),
        }
    }
}

impl fmt::Display for StepSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepSize::SampleAverage => write!(f, "sample-average"),
            StepSize::Constant(alpha) => write!(f, "{alpha}"),
        }
    }
}

impl FromStr for StepSize {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" | "sample-average" | "average" => Ok(StepSize::SampleAverage),
            other =>
                other
                    .parse::<f64>()
                    .map(StepSize::Constant)
                    .map_err(|_| ConfigError::UnparsableStepSize(s.to_string())),
        }
    }
}

/// How the true means of the arms are chosen when an environment is created.
#[derive(Debug, Clone, PartialEq)]
pub enum InitialMeans {
    /// All arms start with a true mean of 0.0.
    Zero,
    /// Every arm draws its true mean independently from N(mean, std_dev).
    Gaussian {
        mean: f64,
        std_dev: f64,
    },
    /// Fixed true means, one per arm.
    Explicit(Vec<f64>),
}

impl Default for InitialMeans {
    fn default() -> Self {
        InitialMeans::Gaussian { mean: INITIAL_MEANS_MEAN, std_dev: INITIAL_MEANS_STD }
    }
}

/// Identifies one combination of hyperparameters in a sweep.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConfigKey {
    pub epsilon: f64,
    pub initial_value: f64,
    pub step_size: StepSize,
    pub stationary: bool,
}

impl ConfigKey {
    /// Compact label used as legend entry by whoever plots the results.
    pub fn label(&self) -> String {
        let mode = if self.stationary { "stationary" } else { "non-stationary" };
        format!("E:{},A:{},I:{},S:{}", self.epsilon, self.step_size, self.initial_value, mode)
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Everything needed to run one experiment: `num_trials` independent trials of
/// `num_steps` steps each, with a single combination of hyperparameters.
#[derive(Debug, Clone, PartialEq)]
pub struct ExperimentConfig {
    pub num_arms: usize,
    pub num_trials: usize,
    pub num_steps: usize,
    /// Probability of taking a uniformly random action, 0 <= epsilon <= 1.
    pub epsilon: f64,
    /// Value every Q-table entry starts with.
    pub initial_value: f64,
    pub step_size: StepSize,
    /// When false, true means take a random walk step after every step of the trial.
    pub stationary: bool,
    pub initial_means: InitialMeans,
    pub reward_noise_std: f64,
    pub drift_std: f64,
    /// Master seed. `None` draws fresh entropy for every run.
    pub seed: Option<u64>,
    /// Run trials on the rayon thread pool.
    pub parallel: bool,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        ExperimentConfig {
            num_arms: NUM_OF_ARMS,
            num_trials: NUM_OF_TRIALS,
            num_steps: NUM_OF_STEPS_IN_A_TRIAL,
            epsilon: 0.1,
            initial_value: INITIAL_VALUES[0],
            step_size: StepSize::SampleAverage,
            stationary: true,
            initial_means: InitialMeans::default(),
            reward_noise_std: REWARD_NOISE_STD,
            drift_std: DRIFT_STD,
            seed: None,
            parallel: true,
        }
    }
}

impl ExperimentConfig {
    pub fn key(&self) -> ConfigKey {
        ConfigKey {
            epsilon: self.epsilon,
            initial_value: self.initial_value,
            step_size: self.step_size,
            stationary: self.stationary,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.num_arms < 1 {
            return Err(ConfigError::NoArms(self.num_arms));
        }
        if self.num_trials < 1 {
            return Err(ConfigError::NoTrials(self.num_trials));
        }
        if self.num_steps < 1 {
            return Err(ConfigError::NoSteps(self.num_steps));
        }
        if !(0.0..=1.0).contains(&self.epsilon) {
            return Err(ConfigError::EpsilonOutOfRange(self.epsilon));
        }
        if let StepSize::Constant(alpha) = self.step_size {
            if !(alpha > 0.0 && alpha <= 1.0) {
                return Err(ConfigError::AlphaOutOfRange(alpha));
            }
        }
        if !self.initial_value.is_finite() {
            return Err(ConfigError::NonFiniteInitialValue(self.initial_value));
        }
        validate_standard_deviation("reward_noise_std", self.reward_noise_std)?;
        validate_standard_deviation("drift_std", self.drift_std)?;

        match &self.initial_means {
            InitialMeans::Zero => {}
            InitialMeans::Gaussian { mean, std_dev } => {
                if !mean.is_finite() || !std_dev.is_finite() || *std_dev < 0.0 {
                    return Err(ConfigError::InvalidInitialMeansDistribution {
                        mean: *mean,
                        std_dev: *std_dev,
                    });
                }
            }
            InitialMeans::Explicit(means) => {
                if means.len() != self.num_arms {
                    return Err(ConfigError::InitialMeansLengthMismatch {
                        expected: self.num_arms,
                        actual: means.len(),
                    });
                }
                if let Some((index, value)) = means
                    .iter()
                    .enumerate()
                    .find(|(_, value)| !value.is_finite()) {
                    return Err(ConfigError::NonFiniteInitialMean { index, value: *value });
                }
            }
        }
        Ok(())
    }
}

fn validate_standard_deviation(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidStandardDeviation { name, value })
    }
}

/// Every combination must appear once in the results, so repeated list entries are an error.
fn reject_duplicates<T: PartialEq + fmt::Display>(
    list: &'static str,
    values: &[T]
) -> Result<(), ConfigError> {
    for (index, value) in values.iter().enumerate() {
        if values[..index].contains(value) {
            return Err(ConfigError::DuplicateSweepValue { list, value: value.to_string() });
        }
    }
    Ok(())
}

/// Lists of hyperparameters to sweep. One experiment is run for every element of the
/// cross-product of `stationary_modes`, `step_sizes`, `epsilons` and `initial_values`.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepConfig {
    pub num_arms: usize,
    pub num_trials: usize,
    pub num_steps: usize,
    pub epsilons: Vec<f64>,
    pub initial_values: Vec<f64>,
    pub step_sizes: Vec<StepSize>,
    pub stationary_modes: Vec<bool>,
    pub initial_means: InitialMeans,
    pub reward_noise_std: f64,
    pub drift_std: f64,
    pub seed: Option<u64>,
    pub parallel: bool,
}

impl Default for SweepConfig {
    fn default() -> Self {
        SweepConfig {
            num_arms: NUM_OF_ARMS,
            num_trials: NUM_OF_TRIALS,
            num_steps: NUM_OF_STEPS_IN_A_TRIAL,
            epsilons: EPSILONS.to_vec(),
            initial_values: INITIAL_VALUES.to_vec(),
            step_sizes: vec![StepSize::SampleAverage],
            stationary_modes: vec![true],
            initial_means: InitialMeans::default(),
            reward_noise_std: REWARD_NOISE_STD,
            drift_std: DRIFT_STD,
            seed: None,
            parallel: true,
        }
    }
}

impl SweepConfig {
    pub fn num_of_combinations(&self) -> usize {
        self.stationary_modes.len() *
            self.step_sizes.len() *
            self.epsilons.len() *
            self.initial_values.len()
    }

    /// Expands the sweep into validated experiment configurations. Nothing is returned
    /// unless every combination is valid.
    ///
    /// With a master seed, every experiment receives its own seed drawn from it in
    /// expansion order.
    pub fn experiments(&self) -> Result<Vec<ExperimentConfig>, ConfigError> {
        if self.epsilons.is_empty() {
            return Err(ConfigError::EmptySweepList("epsilons"));
        }
        if self.initial_values.is_empty() {
            return Err(ConfigError::EmptySweepList("initial_values"));
        }
        if self.step_sizes.is_empty() {
            return Err(ConfigError::EmptySweepList("step_sizes"));
        }
        if self.stationary_modes.is_empty() {
            return Err(ConfigError::EmptySweepList("stationary_modes"));
        }
        reject_duplicates("epsilons", &self.epsilons)?;
        reject_duplicates("initial_values", &self.initial_values)?;
        reject_duplicates("step_sizes", &self.step_sizes)?;
        reject_duplicates("stationary_modes", &self.stationary_modes)?;

        let mut seeder = self.seed.map(StdRng::seed_from_u64);
        let mut experiments = Vec::with_capacity(self.num_of_combinations());

        for &stationary in &self.stationary_modes {
            for &step_size in &self.step_sizes {
                for &epsilon in &self.epsilons {
                    for &initial_value in &self.initial_values {
                        let experiment = ExperimentConfig {
                            num_arms: self.num_arms,
                            num_trials: self.num_trials,
                            num_steps: self.num_steps,
                            epsilon,
                            initial_value,
                            step_size,
                            stationary,
                            initial_means: self.initial_means.clone(),
                            reward_noise_std: self.reward_noise_std,
                            drift_std: self.drift_std,
                            seed: seeder.as_mut().map(|rng| rng.gen()),
                            parallel: self.parallel,
                        };
                        experiment.validate()?;
                        experiments.push(experiment);
                    }
                }
            }
        }
        Ok(experiments)
    }
}
