use rand::Rng;
use rand_distr::StandardNormal;

/// Generates random number in range: [min, max)
pub fn generate_random_number_in_range<R: Rng + ?Sized>(rng: &mut R, min: usize, max: usize) -> usize {
    assert!(min < max, "Minimum number cannot be bigger than maximum number!");
    rng.gen_range(min..max)
}

/// Returns the index of the largest value. Ties go to the lowest index.
pub fn first_arg_max(values: &[f64]) -> usize {
    assert!(!values.is_empty(), "Cannot take arg max of an empty slice!");
    let mut best = 0;
    for (index, &value) in values.iter().enumerate().skip(1) {
        if value > values[best] {
            best = index;
        }
    }
    best
}

/// GaussianArm represents one lever of the k-armed bandit. Every pull returns
/// the true mean plus normally distributed noise. The true mean is not known
/// to the agent and only changes through `drift`.
#[derive(PartialEq, Debug, Clone)]
pub struct GaussianArm {
    true_mean: f64,
    reward_noise_std: f64,
    drift_std: f64,
}

impl GaussianArm {
    pub fn new(true_mean: f64, reward_noise_std: f64, drift_std: f64) -> Self {
        assert!(true_mean.is_finite(), "True mean must be finite.");
        assert!(
            reward_noise_std.is_finite() && reward_noise_std >= 0.0,
            "Reward noise must be finite and non-negative."
        );
        assert!(drift_std.is_finite() && drift_std >= 0.0, "Drift must be finite and non-negative.");
        GaussianArm {
            true_mean,
            reward_noise_std,
            drift_std,
        }
    }

    /// Each pull represents pulling a leaver similar like in the slot machine.
    /// The reward is drawn from N(true_mean, reward_noise_std^2).
    pub fn sample_reward<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        let noise: f64 = rng.sample(StandardNormal);
        self.true_mean + self.reward_noise_std * noise
    }

    /// Moves the true mean by one step of a zero-mean gaussian random walk.
    pub fn drift<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let noise: f64 = rng.sample(StandardNormal);
        self.true_mean += self.drift_std * noise;
    }

    pub fn true_mean(&self) -> f64 {
        self.true_mean
    }
}
