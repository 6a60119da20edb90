//! Agent hyperparameters.

/// Which value-model arrangement the trainer uses.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModelVariant {
    /// One network serves both action selection and bootstrap targets.
    Single,
    /// A frozen copy of the network, refreshed every
    /// [`AgentConfig::target_update_freq`] episodes, produces the
    /// bootstrap targets. Decoupling the two reduces overestimation bias.
    Double,
}

/// Immutable-per-run agent configuration.
///
/// The [`Default`] impl gives the documented defaults; construct with
/// struct update syntax to override individual fields.
#[derive(Clone, Debug)]
pub struct AgentConfig {
    /// Discount factor for future rewards. Default `0.99`.
    pub gamma: f32,
    /// Initial exploration rate. Default `0.3`.
    pub epsilon: f32,
    /// Multiplier applied to epsilon after each completed episode.
    /// Default `0.9995`.
    pub epsilon_decay: f32,
    /// Lower bound on epsilon. Default `0.01`.
    pub epsilon_min: f32,
    /// Transitions per learning step. Default `32`.
    pub batch_size: usize,
    /// Replay memory capacity. Default `10_000`.
    pub memory_max_len: usize,
    /// Target-network refresh period in episodes. Default `10`.
    pub target_update_freq: usize,
    /// Hidden layer width of the Q-network. Default `64`.
    pub hidden_dim: usize,
    /// Optimizer learning rate. Default `0.001`.
    pub learning_rate: f32,
    /// Step cap per episode; the only bound on a runaway rollout.
    /// Default `30_000`.
    pub max_steps: u32,
    /// Seed for action sampling, replay sampling, and weight init.
    /// Default `0`.
    pub seed: u64,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            gamma: 0.99,
            epsilon: 0.3,
            epsilon_decay: 0.9995,
            epsilon_min: 0.01,
            batch_size: 32,
            memory_max_len: 10_000,
            target_update_freq: 10,
            hidden_dim: 64,
            learning_rate: 0.001,
            max_steps: 30_000,
            seed: 0,
        }
    }
}
