use polars::prelude::*;

use crate::config::ConfigKey;

/// Outcome of one step of one trial.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepRecord {
    pub action: usize,
    pub reward: f64,
    /// True when the chosen arm had the highest true mean at that step.
    pub was_optimal: bool,
}

/// Statistics of one step index across all trials of an experiment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepStatistics {
    /// 1-based step index.
    pub step: usize,
    pub mean_reward: f64,
    /// Fraction of trials whose chosen arm was optimal, in [0, 1].
    pub fraction_optimal: f64,
}

/// Sums per-step rewards and optimal counts over trials. Addition is done in the
/// order trials are added, so the same trials always give bit-identical results.
#[derive(Debug, Clone, PartialEq)]
pub struct StepAccumulator {
    reward_sums: Vec<f64>,
    optimal_counts: Vec<usize>,
    num_of_trials: usize,
}

impl StepAccumulator {
    pub fn new(num_of_steps: usize) -> Self {
        StepAccumulator {
            reward_sums: vec![0.0; num_of_steps],
            optimal_counts: vec![0; num_of_steps],
            num_of_trials: 0,
        }
    }

    pub fn num_of_trials(&self) -> usize {
        self.num_of_trials
    }

    pub fn add_trial(&mut self, records: &[StepRecord]) {
        assert_eq!(
            records.len(),
            self.reward_sums.len(),
            "Trial has a different number of steps than the experiment."
        );
        for (step, record) in records.iter().enumerate() {
            self.reward_sums[step] += record.reward;
            if record.was_optimal {
                self.optimal_counts[step] += 1;
            }
        }
        self.num_of_trials += 1;
    }

    /// Adds the sums of another accumulator over the same number of steps.
    pub fn merge(&mut self, other: &StepAccumulator) {
        assert_eq!(
            other.reward_sums.len(),
            self.reward_sums.len(),
            "Cannot merge accumulators with different numbers of steps."
        );
        for (sum, other_sum) in self.reward_sums.iter_mut().zip(other.reward_sums.iter()) {
            *sum += other_sum;
        }
        for (count, other_count) in self.optimal_counts.iter_mut().zip(other.optimal_counts.iter()) {
            *count += other_count;
        }
        self.num_of_trials += other.num_of_trials;
    }

    pub fn finish(self) -> AggregateStats {
        assert!(self.num_of_trials > 0, "Cannot aggregate zero trials.");
        let trials = self.num_of_trials as f64;
        let steps = self.reward_sums
            .iter()
            .zip(self.optimal_counts.iter())
            .enumerate()
            .map(|(index, (&reward_sum, &optimal_count))| StepStatistics {
                step: index + 1,
                mean_reward: reward_sum / trials,
                fraction_optimal: (optimal_count as f64) / trials,
            })
            .collect();
        AggregateStats {
            num_of_trials: self.num_of_trials,
            steps,
        }
    }
}

/// Learning curve of one experiment: one entry per step, in step order.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateStats {
    pub num_of_trials: usize,
    pub steps: Vec<StepStatistics>,
}

impl AggregateStats {
    pub fn from_trials(trials: &[Vec<StepRecord>]) -> Self {
        assert!(!trials.is_empty(), "Cannot aggregate zero trials.");
        let mut accumulator = StepAccumulator::new(trials[0].len());
        for records in trials {
            accumulator.add_trial(records);
        }
        accumulator.finish()
    }

    pub fn num_of_steps(&self) -> usize {
        self.steps.len()
    }

    pub fn mean_rewards(&self) -> Vec<f64> {
        self.steps
            .iter()
            .map(|s| s.mean_reward)
            .collect()
    }

    pub fn fractions_optimal(&self) -> Vec<f64> {
        self.steps
            .iter()
            .map(|s| s.fraction_optimal)
            .collect()
    }

    /// Average of the mean reward over all steps.
    pub fn average_reward(&self) -> f64 {
        self.mean_rewards().iter().sum::<f64>() / (self.steps.len() as f64)
    }

    pub fn last(&self) -> Option<&StepStatistics> {
        self.steps.last()
    }

    /// Columns: step, mean_reward, fraction_optimal, percent_optimal.
    pub fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        let df = DataFrame::new(
            vec![
                Series::new(
                    "step",
                    self.steps
                        .iter()
                        .map(|s| s.step as u32)
                        .collect::<Vec<u32>>()
                ),
                Series::new("mean_reward", &self.mean_rewards()),
                Series::new("fraction_optimal", &self.fractions_optimal())
            ]
        )?;
        with_percent_optimal(df)
    }
}

fn with_percent_optimal(df: DataFrame) -> PolarsResult<DataFrame> {
    df.lazy()
        .with_column((col("fraction_optimal") * lit(100.0)).alias("percent_optimal"))
        .collect()
}

/// Learning curves of every configuration in a sweep, in sweep order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SweepResults {
    pub experiments: Vec<(ConfigKey, AggregateStats)>,
}

impl SweepResults {
    pub fn len(&self) -> usize {
        self.experiments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.experiments.is_empty()
    }

    pub fn push(&mut self, key: ConfigKey, stats: AggregateStats) {
        self.experiments.push((key, stats));
    }

    pub fn get(&self, key: &ConfigKey) -> Option<&AggregateStats> {
        self.experiments
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, stats)| stats)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(ConfigKey, AggregateStats)> {
        self.experiments.iter()
    }

    /// Long format table, one row per configuration and step.
    pub fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        let mut labels = Vec::new();
        let mut epsilons = Vec::new();
        let mut initial_values = Vec::new();
        let mut alphas: Vec<Option<f64>> = Vec::new();
        let mut stationary = Vec::new();
        let mut steps = Vec::new();
        let mut mean_rewards = Vec::new();
        let mut fractions_optimal = Vec::new();

        for (key, stats) in &self.experiments {
            let label = key.label();
            for step in &stats.steps {
                labels.push(label.clone());
                epsilons.push(key.epsilon);
                initial_values.push(key.initial_value);
                alphas.push(key.step_size.alpha());
                stationary.push(key.stationary);
                steps.push(step.step as u32);
                mean_rewards.push(step.mean_reward);
                fractions_optimal.push(step.fraction_optimal);
            }
        }

        let df = DataFrame::new(
            vec![
                Series::new("label", &labels),
                Series::new("epsilon", &epsilons),
                Series::new("initial_value", &initial_values),
                Series::new("alpha", &alphas),
                Series::new("stationary", &stationary),
                Series::new("step", &steps),
                Series::new("mean_reward", &mean_rewards),
                Series::new("fraction_optimal", &fractions_optimal)
            ]
        )?;
        with_percent_optimal(df)
    }

    /// One row per configuration: average reward over all steps, reward and
    /// fraction optimal at the final step.
    pub fn summary(&self) -> PolarsResult<DataFrame> {
        let mut labels = Vec::new();
        let mut average_rewards = Vec::new();
        let mut final_rewards = Vec::new();
        let mut final_fractions_optimal = Vec::new();

        for (key, stats) in &self.experiments {
            labels.push(key.label());
            average_rewards.push(stats.average_reward());
            final_rewards.push(stats.last().map_or(f64::NAN, |s| s.mean_reward));
            final_fractions_optimal.push(stats.last().map_or(f64::NAN, |s| s.fraction_optimal));
        }

        DataFrame::new(
            vec![
                Series::new("label", &labels),
                Series::new("average_reward", &average_rewards),
                Series::new("final_mean_reward", &final_rewards),
                Series::new("final_fraction_optimal", &final_fractions_optimal)
            ]
        )
    }
}
