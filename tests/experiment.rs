use k_armed_bandits::{
    run_experiment,
    run_sweep,
    BanditError,
    ConfigError,
    ExperimentConfig,
    InitialMeans,
    StepSize,
    SweepConfig,
};

#[test]
fn greedy_agent_sticks_with_the_first_arm() {
    let config = ExperimentConfig {
        num_arms: 2,
        num_trials: 1,
        num_steps: 3,
        epsilon: 0.0,
        initial_value: 0.0,
        step_size: StepSize::SampleAverage,
        initial_means: InitialMeans::Explicit(vec![1.0, 2.0]),
        reward_noise_std: 0.0,
        ..Default::default()
    };

    let stats = run_experiment(&config).unwrap();

    assert_eq!(stats.num_of_trials, 1);
    assert_eq!(stats.mean_rewards(), vec![1.0; 3]);
    assert_eq!(stats.fractions_optimal(), vec![0.0; 3]);
}

#[test]
fn constant_step_size_tracks_drifting_arms() {
    let base = ExperimentConfig {
        num_trials: 100,
        num_steps: 5_000,
        epsilon: 0.1,
        stationary: false,
        initial_means: InitialMeans::Zero,
        seed: Some(10),
        ..Default::default()
    };
    let sample_average = run_experiment(&base).unwrap();
    let constant = run_experiment(
        &(ExperimentConfig { step_size: StepSize::Constant(0.1), ..base.clone() })
    ).unwrap();

    let late_reward = |rewards: Vec<f64>| rewards[4_000..].iter().sum::<f64>() / 1_000.0;
    assert!(
        late_reward(constant.mean_rewards()) > late_reward(sample_average.mean_rewards()),
        "Recency weighted estimates should earn more once the arms have drifted apart"
    );
}

#[test]
fn sweep_keys_every_combination_once() {
    let sweep = SweepConfig {
        num_arms: 5,
        num_trials: 4,
        num_steps: 25,
        epsilons: vec![0.0, 0.2, 1.0],
        initial_values: vec![0.0, 5.0],
        step_sizes: vec![StepSize::SampleAverage, StepSize::Constant(0.5)],
        stationary_modes: vec![true, false],
        seed: Some(1),
        ..Default::default()
    };

    let results = run_sweep(&sweep).unwrap();

    assert_eq!(results.len(), 24);
    for (key, stats) in results.iter() {
        assert_eq!(results.iter().filter(|(k, _)| k == key).count(), 1);
        assert_eq!(stats.num_of_steps(), 25);
        assert!(stats.fractions_optimal().iter().all(|f| (0.0..=1.0).contains(f)));
    }

    let table = results.to_dataframe().unwrap();
    assert_eq!(table.height(), 24 * 25);
}

#[test]
fn invalid_sweep_is_rejected_up_front() {
    let sweep = SweepConfig {
        step_sizes: vec![StepSize::Constant(0.1), StepSize::Constant(0.0)],
        ..Default::default()
    };

    let result = run_sweep(&sweep);

    assert!(matches!(result, Err(BanditError::Config(ConfigError::AlphaOutOfRange(alpha))) if alpha == 0.0));
}

#[test]
fn repeated_sweep_value_is_rejected_instead_of_run_twice() {
    let sweep = SweepConfig {
        num_trials: 2,
        num_steps: 3,
        epsilons: vec![0.1, 0.1],
        seed: Some(1),
        ..Default::default()
    };

    let result = run_sweep(&sweep);

    assert!(
        matches!(
            result,
            Err(BanditError::Config(ConfigError::DuplicateSweepValue { list: "epsilons", .. }))
        )
    );
}
