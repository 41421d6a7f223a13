//! Error types for configuring and running bandit experiments.

use polars::prelude::PolarsError;
use thiserror::Error;

/// Result type alias for experiment operations.
pub type Result<T> = std::result::Result<T, BanditError>;

/// Rejected configuration. Raised before any simulation runs, values are never clamped.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("number of arms must be at least 1, got {0}")]
    NoArms(usize),

    #[error("number of trials must be at least 1, got {0}")]
    NoTrials(usize),

    #[error("number of steps must be at least 1, got {0}")]
    NoSteps(usize),

    #[error("epsilon must be in the range [0, 1], got {0}")]
    EpsilonOutOfRange(f64),

    #[error("alpha must be in the range (0, 1], got {0}")]
    AlphaOutOfRange(f64),

    #[error("initial value must be finite, got {0}")]
    NonFiniteInitialValue(f64),

    #[error("{name} must be finite and non-negative, got {value}")]
    InvalidStandardDeviation { name: &'static str, value: f64 },

    #[error("initial means distribution N({mean}, {std_dev}) is invalid")]
    InvalidInitialMeansDistribution { mean: f64, std_dev: f64 },

    #[error("initial mean for arm {index} must be finite, got {value}")]
    NonFiniteInitialMean { index: usize, value: f64 },

    #[error("{expected} arms configured but {actual} explicit initial means given")]
    InitialMeansLengthMismatch { expected: usize, actual: usize },

    #[error("sweep list `{0}` is empty")]
    EmptySweepList(&'static str),

    #[error("sweep list `{list}` contains `{value}` more than once")]
    DuplicateSweepValue { list: &'static str, value: String },

    #[error("cannot parse step size `{0}`, expected `none`, `sample-average` or a number")]
    UnparsableStepSize(String),
}

/// Errors that stop an experiment.
#[derive(Debug, Error)]
pub enum BanditError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// A reward or estimate became NaN or infinite, which signals a configuration bug.
    #[error("non-finite {quantity} ({value}) in trial {trial} at step {step}")]
    NonFiniteValue {
        quantity: &'static str,
        value: f64,
        trial: usize,
        step: usize,
    },

    #[error("dataframe error: {0}")]
    Polars(#[from] PolarsError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
