use rand::rngs::StdRng;
use rand::Rng;
use tracing::trace;

use crate::config::{ ExperimentConfig, StepSize };
use crate::environments::gaussian_arm::{ first_arg_max, generate_random_number_in_range };

/// Learning agent for the k-armed bandit problem. It keeps an estimate of the
/// expected reward of every arm (the Q-table) and picks arms with an
/// epsilon-greedy policy: with probability epsilon a uniformly random arm,
/// otherwise the arm with the highest estimate.
///
/// Greedy ties are always broken in favour of the lowest arm index, so two agents
/// with the same seed and the same observations pick the same arms.
#[derive(Debug, Clone)]
pub struct EpsilonGreedyAgent {
    /// Index of this vector is the arm number, the value is the estimated
    /// expected reward of that arm.
    q_values: Vec<f64>,
    /// Should be in range: 0 <= epsilon <= 1
    /// If epsilon = 0, greedy action is always taken. If epsilon = 1, random action is
    /// always taken.
    epsilon: f64,
    step_size: StepSize,
    /// Number of times each arm was selected. Provides the 1/n step size of the
    /// sample-average update.
    num_times_arm_selected: Vec<usize>,
    /// Cached arg max of `q_values`.
    greedy_action: usize,
    rng: StdRng,
}

impl EpsilonGreedyAgent {
    pub fn new(
        num_of_arms: usize,
        epsilon: f64,
        initial_value: f64,
        step_size: StepSize,
        rng: StdRng
    ) -> Self {
        assert!(num_of_arms > 0, "Agent needs at least one arm to choose from.");
        assert!((0.0..=1.0).contains(&epsilon), "Epsilon must be in the range [0, 1].");
        if let StepSize::Constant(alpha) = step_size {
            assert!(alpha > 0.0 && alpha <= 1.0, "Alpha must be in the range (0, 1].");
        }
        EpsilonGreedyAgent {
            q_values: vec![initial_value; num_of_arms],
            epsilon,
            step_size,
            num_times_arm_selected: vec![0; num_of_arms],
            greedy_action: 0,
            rng,
        }
    }

    pub fn from_config(config: &ExperimentConfig, rng: StdRng) -> Self {
        EpsilonGreedyAgent::new(
            config.num_arms,
            config.epsilon,
            config.initial_value,
            config.step_size,
            rng
        )
    }

    pub fn num_of_arms(&self) -> usize {
        self.q_values.len()
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    pub fn step_size(&self) -> StepSize {
        self.step_size
    }

    pub fn estimates(&self) -> &[f64] {
        &self.q_values
    }

    pub fn action_counts(&self) -> &[usize] {
        &self.num_times_arm_selected
    }

    pub fn select_action(&mut self) -> usize {
        let number: f64 = self.rng.gen();
        if number < self.epsilon {
            return self.random_action();
        }
        self.greedy_action()
    }

    pub fn random_action(&mut self) -> usize {
        let action = generate_random_number_in_range(&mut self.rng, 0, self.q_values.len());
        trace!(action, "random action selected");
        action
    }

    /// Arm with the highest estimate, lowest index on ties.
    pub fn greedy_action(&self) -> usize {
        self.greedy_action
    }

    /// Moves the estimate of `action` towards `reward`.
    ///
    /// Sample-average: the count is incremented first, so the first observed reward
    /// replaces the initial value completely.
    pub fn update(&mut self, action: usize, reward: f64) {
        assert!(
            action < self.q_values.len(),
            "Action {} is out of range for {} arms.",
            action,
            self.q_values.len()
        );
        let previous = self.q_values[action];

        self.num_times_arm_selected[action] += 1;
        let alpha = match self.step_size {
            StepSize::SampleAverage => 1.0 / (self.num_times_arm_selected[action] as f64),
            StepSize::Constant(alpha) => alpha,
        };
        self.q_values[action] += alpha * (reward - self.q_values[action]);

        self.refresh_greedy_action(action, previous);
        trace!(action, reward, alpha, estimate = self.q_values[action], "value updated");
    }

    /// Only `action` changed. A full scan is needed only when the cached greedy
    /// arm lost value.
    fn refresh_greedy_action(&mut self, action: usize, previous: f64) {
        let best = self.greedy_action;
        let value = self.q_values[action];
        if action == best {
            if value < previous {
                self.recompute_greedy_action();
            }
        } else if value > self.q_values[best] || (value == self.q_values[best] && action < best) {
            self.greedy_action = action;
        }
    }

    fn recompute_greedy_action(&mut self) {
        self.greedy_action = first_arg_max(&self.q_values);
    }
}
