mod common;

use common::MockEnv;
use rl::{AgentConfig, ModelVariant, RunControl, Snapshot, SnapshotError, Trainer};

fn config() -> AgentConfig {
    AgentConfig {
        batch_size: 8,
        hidden_dim: 8,
        memory_max_len: 128,
        seed: 11,
        ..AgentConfig::default()
    }
}

fn trained_trainer() -> Trainer<MockEnv> {
    let mut trainer = Trainer::new(MockEnv::new(25), ModelVariant::Double, config());
    let mut ctl = RunControl::default();
    trainer.train(4, &mut ctl);
    trainer
}

#[test]
fn snapshot_round_trips_through_json() {
    let source = trained_trainer();
    let snapshot = source.snapshot(1_700_000_000);
    assert_eq!(snapshot.config.episode, 4);
    assert_eq!(snapshot.config.hidden_dim, 8);
    assert_eq!(snapshot.config.memory_size, 128);
    assert_eq!(snapshot.config.statistics.rewards.len(), 4);
    assert_eq!(snapshot.config.timestamp, 1_700_000_000);
    assert_eq!(snapshot.weights.len(), 2, "two dense layers");

    let json = serde_json::to_string(&snapshot).unwrap();
    let parsed: Snapshot = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, snapshot);

    // Restoring into a fresh trainer of the same architecture reproduces
    // the run state and the exact predictions.
    let mut fresh = Trainer::new(MockEnv::new(25), ModelVariant::Double, config());
    fresh.restore(&parsed).unwrap();
    assert_eq!(fresh.episode_index(), source.episode_index());
    assert_eq!(fresh.epsilon(), source.epsilon());
    assert_eq!(fresh.stats(), source.stats());

    let probe = [0.2f32, -0.4, 0.1, 0.6];
    assert_eq!(fresh.model().predict(&probe), source.model().predict(&probe));
    // The target copy is refreshed from the restored online network.
    assert_eq!(
        fresh.model().predict_target(&probe),
        fresh.model().predict(&probe)
    );
}

#[test]
fn malformed_weights_are_rejected_before_any_mutation() {
    let source = trained_trainer();
    let mut target = Trainer::new(MockEnv::new(25), ModelVariant::Double, config());
    let probe = [0.1f32, 0.1, 0.1, 0.1];
    let before_prediction = target.model().predict(&probe);
    let before_epsilon = target.epsilon();

    // Ragged weight row.
    let mut snapshot = source.snapshot(0);
    snapshot.weights[0].rows[2].pop();
    let err = target.restore(&snapshot).unwrap_err();
    assert!(matches!(err, SnapshotError::Weights(_)));
    assert_eq!(target.model().predict(&probe), before_prediction);
    assert_eq!(target.epsilon(), before_epsilon);
    assert_eq!(target.episode_index(), 0);

    // Missing layer.
    let mut snapshot = source.snapshot(0);
    snapshot.weights.pop();
    assert!(target.restore(&snapshot).is_err());
    assert_eq!(target.model().predict(&probe), before_prediction);

    // Architecture mismatch is caught up front.
    let mut snapshot = source.snapshot(0);
    snapshot.config.hidden_dim = 16;
    let err = target.restore(&snapshot).unwrap_err();
    assert!(matches!(err, SnapshotError::HiddenDim { expected: 8, found: 16 }));
    assert_eq!(target.model().predict(&probe), before_prediction);
    assert_eq!(target.stats(), &rl::RunStats::default());
}
