use rl::{AgentConfig, FlappyEnv, ModelVariant, RunControl, Trainer, TrainerState};
use sim::SimConfig;

// End-to-end smoke test over the real world simulation: a short training
// run completes, fills replay memory, and produces finite numbers.
#[test]
fn short_training_run_over_the_real_world() {
    let config = AgentConfig {
        batch_size: 16,
        hidden_dim: 16,
        memory_max_len: 2_000,
        max_steps: 2_000,
        epsilon: 0.5,
        seed: 7,
        ..AgentConfig::default()
    };
    let env = FlappyEnv::new(SimConfig::default());
    let mut trainer = Trainer::new(env, ModelVariant::Double, config);

    let mut ctl = RunControl::default();
    let report = trainer.train(5, &mut ctl);
    assert_eq!(report.completed, 5);
    assert_eq!(trainer.state(), TrainerState::Completed);

    let stats = trainer.stats();
    assert_eq!(stats.rewards.len(), 5);
    assert!(stats.rewards.iter().all(|r| r.is_finite()));
    assert!(stats.lengths.iter().all(|&l| l >= 1));
    let total_ticks: usize = stats.lengths.iter().map(|&l| l as usize).sum();
    assert_eq!(trainer.memory().len(), total_ticks.min(2_000));

    // Every stored transition carries finite features and rewards.
    for transition in trainer.memory().iter() {
        assert!(transition.state.iter().all(|v| v.is_finite()));
        assert!(transition.reward.is_finite());
    }
}
