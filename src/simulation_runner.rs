use std::time::Instant;

use rand::rngs::StdRng;
use rand::{ Rng, SeedableRng };
use rayon::prelude::*;
use tracing::{ debug, info, trace };

use crate::config::{ ExperimentConfig, SweepConfig };
use crate::environments::KArmedEnvironment;
use crate::epsilon_greedy_agent::EpsilonGreedyAgent;
use crate::errors::{ BanditError, Result };
use crate::statistics_calculator::{ AggregateStats, StepAccumulator, StepRecord, SweepResults };

/// Seeds of the private random sources of one trial.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrialSeeds {
    pub environment: u64,
    pub agent: u64,
}

/// Draws the seeds of every trial up front from the experiment's master seed, so the
/// outcome does not depend on the order trials are scheduled in.
pub fn generate_trial_seeds(config: &ExperimentConfig) -> Vec<TrialSeeds> {
    let mut master = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    (0..config.num_trials)
        .map(|_| TrialSeeds {
            environment: master.gen(),
            agent: master.gen(),
        })
        .collect()
}

/// Plays one trial: a fresh environment and agent interact for `config.num_steps` steps.
///
/// Within a step the agent picks an arm, the environment pays the reward and reports
/// whether the arm is optimal at that moment, the agent learns from the reward and only
/// then the environment drifts.
pub fn run_trial<E, A>(
    config: &ExperimentConfig,
    environment_factory: E,
    agent_factory: A,
    trial: usize
) -> Result<Vec<StepRecord>>
    where
        E: FnOnce(&ExperimentConfig) -> KArmedEnvironment,
        A: FnOnce(&ExperimentConfig) -> EpsilonGreedyAgent
{
    let mut environment = environment_factory(config);
    let mut agent = agent_factory(config);
    assert_eq!(
        environment.num_arms(),
        agent.num_of_arms(),
        "Agent and environment disagree on the number of arms."
    );

    let mut records = Vec::with_capacity(config.num_steps);
    for step in 1..=config.num_steps {
        let action = agent.select_action();
        let reward = environment.reward_for(action);
        check_finite("reward", reward, trial, step)?;
        let was_optimal = environment.is_optimal(action);

        agent.update(action, reward);
        check_finite("estimate", agent.estimates()[action], trial, step)?;
        environment.step();

        trace!(trial, step, action, reward, was_optimal, "step played");
        records.push(StepRecord { action, reward, was_optimal });
    }
    Ok(records)
}

fn check_finite(quantity: &'static str, value: f64, trial: usize, step: usize) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(BanditError::NonFiniteValue { quantity, value, trial, step })
    }
}

/// Runs one trial with environment and agent built from the configuration and seeded
/// with `seeds`.
pub fn run_seeded_trial(
    config: &ExperimentConfig,
    seeds: TrialSeeds,
    trial: usize
) -> Result<Vec<StepRecord>> {
    let records = run_trial(
        config,
        |config| KArmedEnvironment::from_config(config, StdRng::seed_from_u64(seeds.environment)),
        |config| EpsilonGreedyAgent::from_config(config, StdRng::seed_from_u64(seeds.agent)),
        trial
    )?;

    debug!(
        trial,
        total_reward = records.iter().map(|r| r.reward).sum::<f64>(),
        optimal_steps = records.iter().filter(|r| r.was_optimal).count(),
        "trial finished"
    );
    Ok(records)
}

/// Trials summed into one accumulator before chunks are merged. Both execution modes
/// use the same chunks, so they add rewards in the same order.
const TRIALS_PER_CHUNK: usize = 64;

/// Runs consecutive trials starting at `first_trial` and sums them in trial order.
fn run_chunk(
    config: &ExperimentConfig,
    first_trial: usize,
    seeds: &[TrialSeeds]
) -> Result<StepAccumulator> {
    let mut accumulator = StepAccumulator::new(config.num_steps);
    for (offset, &trial_seeds) in seeds.iter().enumerate() {
        let records = run_seeded_trial(config, trial_seeds, first_trial + offset)?;
        accumulator.add_trial(&records);
    }
    Ok(accumulator)
}

/// Runs `config.num_trials` independent trials and averages them step by step.
pub fn run_experiment(config: &ExperimentConfig) -> Result<AggregateStats> {
    config.validate()?;
    let start_time = Instant::now();
    info!(
        config = %config.key(),
        trials = config.num_trials,
        steps = config.num_steps,
        parallel = config.parallel,
        "running experiment"
    );

    let seeds = generate_trial_seeds(config);
    let chunks = if config.parallel {
        seeds
            .par_chunks(TRIALS_PER_CHUNK)
            .enumerate()
            .map(|(chunk, chunk_seeds)| run_chunk(config, chunk * TRIALS_PER_CHUNK, chunk_seeds))
            .collect::<Result<Vec<StepAccumulator>>>()?
    } else {
        seeds
            .chunks(TRIALS_PER_CHUNK)
            .enumerate()
            .map(|(chunk, chunk_seeds)| run_chunk(config, chunk * TRIALS_PER_CHUNK, chunk_seeds))
            .collect::<Result<Vec<StepAccumulator>>>()?
    };

    let mut accumulator = StepAccumulator::new(config.num_steps);
    for chunk in &chunks {
        accumulator.merge(chunk);
    }
    debug_assert_eq!(accumulator.num_of_trials(), config.num_trials);

    let stats = accumulator.finish();
    info!(
        config = %config.key(),
        average_reward = stats.average_reward(),
        final_fraction_optimal = stats.last().map_or(0.0, |s| s.fraction_optimal),
        elapsed = ?start_time.elapsed(),
        "experiment finished"
    );
    Ok(stats)
}

/// Runs one experiment for every combination in the sweep. The whole sweep is
/// validated before the first trial starts.
pub fn run_sweep(sweep: &SweepConfig) -> Result<SweepResults> {
    let experiments = sweep.experiments()?;
    info!(
        combinations = experiments.len(),
        arms = sweep.num_arms,
        trials = sweep.num_trials,
        steps = sweep.num_steps,
        "running sweep"
    );

    let mut results = SweepResults::default();
    for experiment in &experiments {
        let stats = run_experiment(experiment)?;
        results.push(experiment.key(), stats);
    }
    Ok(results)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::config::{ InitialMeans, StepSize };
    use crate::environments::GaussianArm;
    use crate::errors::ConfigError;

    fn two_armed_config(initial_value: f64) -> ExperimentConfig {
        ExperimentConfig {
            num_arms: 2,
            num_trials: 1,
            num_steps: 3,
            epsilon: 0.0,
            initial_value,
            step_size: StepSize::SampleAverage,
            stationary: true,
            initial_means: InitialMeans::Explicit(vec![1.0, 2.0]),
            reward_noise_std: 0.0,
            seed: Some(1),
            ..Default::default()
        }
    }

    fn small_testbed(epsilon: f64) -> ExperimentConfig {
        ExperimentConfig {
            num_trials: 200,
            num_steps: 500,
            epsilon,
            seed: Some(2018),
            ..Default::default()
        }
    }

    #[test]
    fn test_greedy_agent_never_discovers_better_arm() {
        let config = two_armed_config(0.0);

        let records = run_seeded_trial(&config, generate_trial_seeds(&config)[0], 0).unwrap();

        assert_eq!(
            records,
            vec![StepRecord { action: 0, reward: 1.0, was_optimal: false }; 3]
        );

        let stats = run_experiment(&config).unwrap();
        assert_eq!(stats.mean_rewards(), vec![1.0, 1.0, 1.0]);
        assert_eq!(stats.fractions_optimal(), vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_optimistic_agent_discovers_better_arm() {
        let config = two_armed_config(5.0);

        let stats = run_experiment(&config).unwrap();

        assert_eq!(stats.mean_rewards(), vec![1.0, 2.0, 2.0]);
        assert_eq!(stats.fractions_optimal(), vec![0.0, 1.0, 1.0]);
    }

    #[test]
    fn test_trial_has_exactly_num_steps_records() {
        let config = ExperimentConfig { num_steps: 137, stationary: false, ..Default::default() };

        let records = run_seeded_trial(&config, TrialSeeds { environment: 1, agent: 2 }, 0).unwrap();

        assert_eq!(records.len(), 137);
        assert!(records.iter().all(|r| r.action < config.num_arms));
    }

    #[test]
    fn test_invalid_config_rejected_before_running() {
        let config = ExperimentConfig { num_trials: 0, ..Default::default() };

        let result = run_experiment(&config);

        assert!(matches!(result, Err(BanditError::Config(ConfigError::NoTrials(0)))));
    }

    #[test]
    fn test_non_finite_estimate_stops_the_trial() {
        let config = ExperimentConfig { num_arms: 1, num_steps: 5, ..Default::default() };

        let result = run_trial(
            &config,
            |_| {
                KArmedEnvironment::new(
                    vec![GaussianArm::new(f64::MAX, 0.0, 0.0)],
                    true,
                    StdRng::seed_from_u64(0)
                )
            },
            |_| {
                EpsilonGreedyAgent::new(
                    1,
                    0.0,
                    -f64::MAX,
                    StepSize::Constant(1.0),
                    StdRng::seed_from_u64(0)
                )
            },
            4
        );

        match result {
            Err(BanditError::NonFiniteValue { quantity, trial, step, .. }) => {
                assert_eq!(quantity, "estimate");
                assert_eq!(trial, 4);
                assert_eq!(step, 1);
            }
            other => panic!("Expected non-finite estimate error, got {:?}", other),
        }
    }

    #[test]
    fn test_parallel_and_sequential_runs_are_identical() {
        let config = ExperimentConfig {
            num_trials: 3 * TRIALS_PER_CHUNK + 7,
            num_steps: 40,
            stationary: false,
            step_size: StepSize::Constant(0.1),
            seed: Some(99),
            ..Default::default()
        };

        let parallel = run_experiment(&ExperimentConfig { parallel: true, ..config.clone() }).unwrap();
        let sequential = run_experiment(&ExperimentConfig { parallel: false, ..config }).unwrap();

        assert_eq!(parallel, sequential);
    }

    #[test]
    fn test_same_seed_reproduces_results() {
        let config = ExperimentConfig { num_trials: 10, num_steps: 50, seed: Some(5), ..Default::default() };
        let other = ExperimentConfig { seed: Some(6), ..config.clone() };

        assert_eq!(run_experiment(&config).unwrap(), run_experiment(&config).unwrap());
        assert_ne!(run_experiment(&config).unwrap(), run_experiment(&other).unwrap());
    }

    #[test]
    fn test_fraction_optimal_is_count_over_trials() {
        let config = ExperimentConfig { num_trials: 8, num_steps: 200, seed: Some(3), ..Default::default() };

        let stats = run_experiment(&config).unwrap();

        for step in &stats.steps {
            assert!((0.0..=1.0).contains(&step.fraction_optimal));
            let count = step.fraction_optimal * 8.0;
            assert_eq!(count, count.round(), "Fraction is not a whole number of trials");
        }
    }

    #[test]
    fn test_exploring_agent_beats_greedy_agent() {
        let greedy = run_experiment(&small_testbed(0.0)).unwrap();
        let exploring = run_experiment(&small_testbed(0.1)).unwrap();

        let late_optimal = |stats: &AggregateStats| {
            stats.fractions_optimal()[400..].iter().sum::<f64>() / 100.0
        };
        assert!(
            late_optimal(&exploring) > late_optimal(&greedy),
            "Epsilon 0.1 should find the optimal arm more often than epsilon 0"
        );
    }

    #[test]
    fn test_random_agent_picks_optimal_arm_one_in_k_times() {
        let stats = run_experiment(&small_testbed(1.0)).unwrap();

        let overall = stats.fractions_optimal().iter().sum::<f64>() / (stats.num_of_steps() as f64);

        assert!((0.08..0.12).contains(&overall), "Random agent chose optimal arm {} of the time", overall);
    }

    #[test]
    fn test_sweep_produces_every_combination() {
        let sweep = SweepConfig {
            num_trials: 3,
            num_steps: 20,
            epsilons: vec![0.0, 0.1],
            initial_values: vec![0.0, 5.0],
            step_sizes: vec![StepSize::SampleAverage, StepSize::Constant(0.1)],
            stationary_modes: vec![true, false],
            seed: Some(11),
            ..Default::default()
        };

        let results = run_sweep(&sweep).unwrap();

        assert_eq!(results.len(), 16);
        for experiment in sweep.experiments().unwrap() {
            let stats = results.get(&experiment.key()).expect("Combination missing from results");
            let steps: Vec<usize> = stats.steps
                .iter()
                .map(|s| s.step)
                .collect();
            assert_eq!(steps, (1..=20).collect::<Vec<_>>());
        }
    }
}
