//! Default values used when an experiment is not configured explicitly.

/// Represents the number of slot machines being played in k-armed bandit problem, it is the number k.
pub const NUM_OF_ARMS: usize = 10;
/// Represents the number of steps the agent is allowed to learn in one trial.
pub const NUM_OF_STEPS_IN_A_TRIAL: usize = 1000;
/// Represent number of independent trials averaged for every configuration.
pub const NUM_OF_TRIALS: usize = 2000;
/// Represents the probabilities with which random action is selected. Each value is one
/// configuration in the sweep.
/// Epsilon is expected to be in bounds 0 <= EPSILON <= 1. When EPSILON = 0, agent always takes
/// greedy action and explits the knowledge that it has. When EPSILON = 1, agent always takes
/// exploratory action.
pub const EPSILONS: [f64; 6] = [0.0, 0.05, 0.1, 0.2, 0.5, 1.0];
/// Initial value written into every entry of the Q-table at the start of a trial.
/// Values above the expected reward make the agent optimistic.
pub const INITIAL_VALUES: [f64; 1] = [0.0];
/// Standard deviation of the normal noise added to the true mean on every pull.
pub const REWARD_NOISE_STD: f64 = 1.0;
/// Standard deviation of the random walk applied to every true mean in non-stationary mode.
pub const DRIFT_STD: f64 = 0.01;
/// Mean of the normal distribution the arms' true means are drawn from.
pub const INITIAL_MEANS_MEAN: f64 = 0.0;
/// Standard deviation of the normal distribution the arms' true means are drawn from.
pub const INITIAL_MEANS_STD: f64 = 1.0;
/// Directory where the binary writes its run reports.
pub const REPORT_DIRECTORY: &str = "files/k_armed_bandits";
