use rand::rngs::StdRng;
use rand::Rng;
use rand_distr::StandardNormal;
use tracing::trace;

use crate::config::{ ExperimentConfig, InitialMeans };
use crate::environments::gaussian_arm::{ first_arg_max, GaussianArm };

/// The environment of the k-armed bandit problem. Holds a fixed number of arms
/// for the whole trial, the index of an arm identifies it permanently.
/// In non-stationary mode every arm's true mean takes an independent random walk
/// step each time `step` is called.
#[derive(Debug, Clone)]
pub struct KArmedEnvironment {
    arms: Vec<GaussianArm>,
    stationary: bool,
    /// Index of the arm with the highest true mean, lowest index on ties.
    optimal_arm_index: usize,
    rng: StdRng,
}

impl KArmedEnvironment {
    pub fn new(arms: Vec<GaussianArm>, stationary: bool, rng: StdRng) -> Self {
        assert!(!arms.is_empty(), "Environment needs at least one arm.");
        let mut environment = KArmedEnvironment {
            arms,
            stationary,
            optimal_arm_index: 0,
            rng,
        };
        environment.recompute_optimal_arm();
        environment
    }

    /// Builds a fresh environment for one trial. Initial true means are drawn
    /// from `rng` when the configuration asks for random means.
    pub fn from_config(config: &ExperimentConfig, mut rng: StdRng) -> Self {
        let means: Vec<f64> = match &config.initial_means {
            InitialMeans::Zero => vec![0.0; config.num_arms],
            InitialMeans::Gaussian { mean, std_dev } =>
                (0..config.num_arms)
                    .map(|_| {
                        let noise: f64 = rng.sample(StandardNormal);
                        mean + std_dev * noise
                    })
                    .collect(),
            InitialMeans::Explicit(means) => {
                assert_eq!(
                    means.len(),
                    config.num_arms,
                    "Number of initial means must match the number of arms."
                );
                means.clone()
            }
        };

        let arms = means
            .into_iter()
            .map(|mean| GaussianArm::new(mean, config.reward_noise_std, config.drift_std))
            .collect();
        KArmedEnvironment::new(arms, config.stationary, rng)
    }

    pub fn num_arms(&self) -> usize {
        self.arms.len()
    }

    pub fn is_stationary(&self) -> bool {
        self.stationary
    }

    pub fn optimal_arm_index(&self) -> usize {
        self.optimal_arm_index
    }

    /// Samples a reward from the chosen arm. An index outside [0, k) is a bug in the caller.
    pub fn reward_for(&mut self, arm_index: usize) -> f64 {
        assert!(
            arm_index < self.arms.len(),
            "Arm index {} is out of range for {} arms.",
            arm_index,
            self.arms.len()
        );
        self.arms[arm_index].sample_reward(&mut self.rng)
    }

    pub fn is_optimal(&self, arm_index: usize) -> bool {
        arm_index == self.optimal_arm_index
    }

    /// Advances the environment by one step. Does nothing in stationary mode.
    pub fn step(&mut self) {
        if self.stationary {
            return;
        }
        for arm in self.arms.iter_mut() {
            arm.drift(&mut self.rng);
        }
        self.recompute_optimal_arm();
        trace!(optimal_arm = self.optimal_arm_index, "environment drifted");
    }

    /// Added for collecting statistics, the agent never sees these values.
    pub fn true_means(&self) -> Vec<f64> {
        self.arms
            .iter()
            .map(|arm| arm.true_mean())
            .collect()
    }

    fn recompute_optimal_arm(&mut self) {
        self.optimal_arm_index = first_arg_max(&self.true_means());
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rand::SeedableRng;

    fn environment_with_means(means: &[f64], stationary: bool) -> KArmedEnvironment {
        let arms = means
            .iter()
            .map(|&mean| GaussianArm::new(mean, 0.0, 0.01))
            .collect();
        KArmedEnvironment::new(arms, stationary, StdRng::seed_from_u64(42))
    }

    #[test]
    fn test_create_environment_from_default_config() {
        let config = ExperimentConfig::default();
        let environment = KArmedEnvironment::from_config(&config, StdRng::seed_from_u64(1));

        assert_eq!(environment.num_arms(), config.num_arms);
        assert!(environment.is_stationary());

        let mut means = environment.true_means();
        means.sort_by(|a, b| a.partial_cmp(b).unwrap());
        means.dedup();
        assert_eq!(means.len(), config.num_arms, "Arms do not have unique random means");
    }

    #[test]
    fn test_create_environment_with_zero_means() {
        let config = ExperimentConfig {
            num_arms: 4,
            initial_means: InitialMeans::Zero,
            ..Default::default()
        };
        let environment = KArmedEnvironment::from_config(&config, StdRng::seed_from_u64(1));

        assert_eq!(environment.true_means(), vec![0.0; 4]);
        assert_eq!(environment.optimal_arm_index(), 0);
    }

    #[test]
    fn test_optimal_arm_is_arm_with_highest_mean() {
        let environment = environment_with_means(&[0.5, 2.0, -1.0, 2.0], true);

        assert_eq!(environment.optimal_arm_index(), 1);
        assert!(environment.is_optimal(1));
        assert!(!environment.is_optimal(3));
        assert!(!environment.is_optimal(0));
    }

    #[test]
    fn test_reward_for_arm_without_noise() {
        let mut environment = environment_with_means(&[1.0, 2.0], true);

        assert_eq!(environment.reward_for(0), 1.0);
        assert_eq!(environment.reward_for(1), 2.0);
    }

    #[test]
    #[should_panic(expected = "Arm index 2 is out of range for 2 arms.")]
    fn test_reward_for_invalid_arm_panics() {
        let mut environment = environment_with_means(&[1.0, 2.0], true);
        environment.reward_for(2);
    }

    #[test]
    fn test_stationary_environment_never_changes_means() {
        let mut environment = environment_with_means(&[0.1, 0.2, 0.3], true);
        let initial_means = environment.true_means();

        for _ in 0..1000 {
            environment.step();
        }

        assert_eq!(environment.true_means(), initial_means);
        assert_eq!(environment.optimal_arm_index(), 2);
    }

    #[test]
    fn test_non_stationary_environment_drifts_means() {
        let mut environment = environment_with_means(&[0.1, 0.2, 0.3], false);
        let initial_means = environment.true_means();

        for _ in 0..1000 {
            environment.step();
        }

        let drifted_means = environment.true_means();
        for (initial, drifted) in initial_means.iter().zip(drifted_means.iter()) {
            assert_ne!(initial, drifted, "Mean did not drift");
        }
        assert_eq!(
            environment.optimal_arm_index(),
            first_arg_max(&drifted_means),
            "Optimal arm not recomputed after drift"
        );
    }

    #[test]
    fn test_same_seed_gives_same_environment() {
        let config = ExperimentConfig { stationary: false, ..Default::default() };
        let mut first = KArmedEnvironment::from_config(&config, StdRng::seed_from_u64(9));
        let mut second = KArmedEnvironment::from_config(&config, StdRng::seed_from_u64(9));

        for _ in 0..50 {
            first.step();
            second.step();
            assert_eq!(first.reward_for(3), second.reward_for(3));
        }
        assert_eq!(first.true_means(), second.true_means());
    }
}
