//! Environment contract and the Flappy world adapter.

use sim::{SimConfig, World};

use crate::State;

/// The two discrete actions available to the agent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    /// Do nothing; gravity acts.
    Coast,
    /// Apply the flap impulse.
    Flap,
}

impl Action {
    /// Number of discrete actions.
    pub const COUNT: usize = 2;

    /// Index of this action in a value vector.
    #[must_use]
    pub fn index(self) -> usize {
        match self {
            Action::Coast => 0,
            Action::Flap => 1,
        }
    }

    /// Inverse of [`Action::index`].
    #[must_use]
    pub fn from_index(index: usize) -> Self {
        match index {
            0 => Action::Coast,
            1 => Action::Flap,
            _ => panic!("action index {index} out of range"),
        }
    }
}

/// What one environment step produced.
#[derive(Clone, Copy, Debug)]
pub struct Step {
    /// Feature vector after the tick.
    pub state: State,
    /// Scalar reward for the tick.
    pub reward: f32,
    /// Whether the episode terminated on this tick.
    pub done: bool,
}

/// Reinforcement learning environment contract.
///
/// One call to [`step`] applies an action for exactly one simulation tick.
/// After a step reports `done`, the environment must be [`reset`] before
/// stepping again.
///
/// [`step`]: Env::step
/// [`reset`]: Env::reset
pub trait Env {
    /// Reinitializes the environment and returns the initial features.
    fn reset(&mut self) -> State;

    /// Applies `action` for one tick.
    fn step(&mut self, action: Action) -> Step;

    /// Score accumulated since the last reset, for episode statistics.
    fn score(&self) -> u32;
}

/// Reward for surviving a tick.
const ALIVE_REWARD: f32 = 0.1;
/// Extra reward on a tick where a pipe is passed.
const SCORE_REWARD: f32 = 5.0;
/// Reward on the terminal tick.
const DEATH_PENALTY: f32 = -10.0;
/// Extra penalty when the terminal action was on the wrong side of the gap.
const WRONG_SIDE_PENALTY: f32 = -5.0;
/// Per-tick penalty coefficient on normalized distance from the gap center.
const OFFSET_COEFF: f32 = 0.01;
/// Divisor taking vertical velocity into a small dimensionless range.
const VELOCITY_NORM: f32 = 10.0;

/// [`Env`] adapter over the Flappy world.
///
/// Features, each independently normalized to a small dimensionless range
/// (values may leave ±1 during abnormal states):
/// `[vertical velocity, horizontal distance to the next pipe, vertical
/// offset from the gap center, vertical position]`.
pub struct FlappyEnv {
    world: World,
}

impl FlappyEnv {
    #[must_use]
    pub fn new(config: SimConfig) -> Self {
        Self { world: World::new(config) }
    }

    /// Read access to the wrapped world.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    fn features(&self) -> State {
        let config = self.world.config();
        let pipe = self.world.next_pipe();
        [
            self.world.bird_vy() / VELOCITY_NORM,
            (pipe.x - config.bird_x) / config.width,
            (self.world.bird_y() - pipe.gap_y) / config.height,
            self.world.bird_y() / config.height,
        ]
    }
}

impl Env for FlappyEnv {
    fn reset(&mut self) -> State {
        self.world.reset();
        self.features()
    }

    fn step(&mut self, action: Action) -> Step {
        // The y axis points down: "above the gap center" is a smaller y.
        let gap_y = self.world.next_pipe().gap_y;
        let was_above = self.world.bird_y() < gap_y;
        let was_below = self.world.bird_y() > gap_y;

        let flap = action == Action::Flap;
        let outcome = self.world.tick(flap);
        let state = self.features();

        let reward = if outcome.dead {
            // The extra penalty applies when the terminal action pushed
            // the bird further from the gap center.
            let wrong_side = (flap && was_above) || (!flap && was_below);
            DEATH_PENALTY + if wrong_side { WRONG_SIDE_PENALTY } else { 0.0 }
        } else {
            let mut reward = ALIVE_REWARD - OFFSET_COEFF * state[2].abs();
            if outcome.scored {
                reward += SCORE_REWARD;
            }
            reward
        };

        Step { state, reward, done: outcome.dead }
    }

    fn score(&self) -> u32 {
        self.world.score()
    }
}
