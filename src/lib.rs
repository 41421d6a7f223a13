//! Simulation of the k-armed bandit problem. Many independent trials of an
//! epsilon-greedy agent are run against a stochastic, optionally drifting
//! environment and averaged into learning curves, one per hyperparameter
//! combination.

pub mod config;
pub mod constants;
pub mod environments;
pub mod epsilon_greedy_agent;
pub mod errors;
pub mod logging;
pub mod report_writer;
pub mod simulation_runner;
pub mod statistics_calculator;

pub use config::{ ConfigKey, ExperimentConfig, InitialMeans, StepSize, SweepConfig };
pub use environments::{ GaussianArm, KArmedEnvironment };
pub use epsilon_greedy_agent::EpsilonGreedyAgent;
pub use errors::{ BanditError, ConfigError, Result };
pub use simulation_runner::{ run_experiment, run_sweep, run_trial };
pub use statistics_calculator::{ AggregateStats, StepRecord, StepStatistics, SweepResults };
