//! Episode-driven trainer state machine.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::config::{AgentConfig, ModelVariant};
use crate::env::{Action, Env};
use crate::model::ValueModel;
use crate::replay::{ReplayMemory, Transition};
use crate::{State, STATE_DIM};

/// Probability that a random exploration step coasts instead of flapping.
/// Intentionally biased: uniform exploration flaps far too often to ever
/// survive the early episodes.
const EXPLORE_COAST_BIAS: f32 = 0.75;

/// Lifecycle of a trainer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrainerState {
    /// Fresh or reset; nothing in flight.
    Idle,
    /// Inside a `train` call.
    Running,
    /// An episode was interrupted between ticks and is waiting to resume.
    Paused,
    /// The last `train` call ran every requested iteration to natural
    /// completion.
    Completed,
}

/// Snapshot of an interrupted episode, passed by value between rollout
/// invocations. At most one exists at a time; it is consumed when the
/// episode resumes.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PausedEpisode {
    pub state: State,
    pub total_reward: f32,
    pub steps: u32,
}

/// Cumulative per-episode statistics, one entry per naturally completed
/// episode.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RunStats {
    pub rewards: Vec<f32>,
    pub scores: Vec<u32>,
    pub lengths: Vec<u32>,
}

/// One notification per completed or paused episode.
#[derive(Clone, Debug, PartialEq)]
pub struct EpisodeEvent {
    /// Index of the episode the event describes.
    pub episode: usize,
    pub score: u32,
    pub total_reward: f32,
    pub epsilon: f32,
    pub steps: u32,
    pub memory_len: usize,
    /// True when the episode was interrupted rather than completed.
    pub paused: bool,
}

/// Receiver for per-episode notifications.
pub trait NotificationSink {
    fn on_episode(&mut self, event: &EpisodeEvent);
}

/// Default sink: mirrors events to `tracing`.
pub struct LogSink;

impl NotificationSink for LogSink {
    fn on_episode(&mut self, event: &EpisodeEvent) {
        if event.paused {
            tracing::info!(
                episode = event.episode,
                score = event.score,
                total_reward = event.total_reward,
                steps = event.steps,
                "episode paused"
            );
        } else {
            tracing::info!(
                episode = event.episode,
                score = event.score,
                total_reward = event.total_reward,
                epsilon = event.epsilon,
                steps = event.steps,
                memory_len = event.memory_len,
                "episode complete"
            );
        }
    }
}

/// Cooperative halt signal, checked once per simulation tick. Cloning
/// shares the underlying flag.
#[derive(Clone, Debug, Default)]
pub struct StopFlag(Arc<AtomicBool>);

impl StopFlag {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests a pause at the next tick boundary.
    pub fn request(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Clears a previous request, e.g. before resuming.
    pub fn clear(&self) {
        self.0.store(false, Ordering::Relaxed);
    }

    #[must_use]
    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Suspension hook invoked after every simulation tick.
///
/// The trainer never sleeps on its own; a host that wants paced
/// visualization installs a pacer that does, while tests run [`NoPacing`]
/// fully deterministically.
pub trait Pacer {
    fn after_tick(&mut self);
}

/// Zero-delay pacer.
pub struct NoPacing;

impl Pacer for NoPacing {
    fn after_tick(&mut self) {}
}

/// Caller-supplied control surface for a `train` call.
pub struct RunControl {
    pub stop: StopFlag,
    pub pacer: Box<dyn Pacer>,
    pub sink: Box<dyn NotificationSink>,
}

impl Default for RunControl {
    fn default() -> Self {
        Self {
            stop: StopFlag::new(),
            pacer: Box::new(NoPacing),
            sink: Box::new(LogSink),
        }
    }
}

/// What a `train` call did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TrainReport {
    /// Episodes that ran to natural completion during this call.
    pub completed: usize,
    /// True when the call returned early with a paused episode.
    pub paused: bool,
}

enum EpisodeEnd {
    Completed,
    Paused,
}

/// The agent: orchestrates action selection, rollout, replay learning,
/// target synchronization, epsilon annealing, and pause/resume.
pub struct Trainer<E: Env> {
    pub(crate) env: E,
    pub(crate) model: ValueModel,
    pub(crate) memory: ReplayMemory,
    pub(crate) config: AgentConfig,
    pub(crate) epsilon: f32,
    pub(crate) episode_index: usize,
    pub(crate) total_steps: u64,
    pub(crate) stats: RunStats,
    pub(crate) state: TrainerState,
    pub(crate) paused: Option<PausedEpisode>,
    pub(crate) rng: SmallRng,
}

impl<E: Env> Trainer<E> {
    /// Builds a trainer with a freshly initialized value model.
    #[must_use]
    pub fn new(env: E, variant: ModelVariant, config: AgentConfig) -> Self {
        let mut rng = SmallRng::seed_from_u64(config.seed);
        let net = ml::QNet::new(
            STATE_DIM,
            config.hidden_dim,
            Action::COUNT,
            config.learning_rate,
            &mut rng,
        );
        let model = match variant {
            ModelVariant::Single => ValueModel::single(net),
            ModelVariant::Double => ValueModel::double(net),
        };
        Self {
            env,
            memory: ReplayMemory::with_capacity(config.memory_max_len),
            model,
            epsilon: config.epsilon,
            episode_index: 0,
            total_steps: 0,
            stats: RunStats::default(),
            state: TrainerState::Idle,
            paused: None,
            rng,
            config,
        }
    }

    /// Runs exactly `episodes` iterations of the episode loop, where one
    /// iteration may be the resumption of a previously paused episode.
    ///
    /// Returns early with `paused: true` when the stop flag is raised
    /// between two ticks; the interrupted episode is retained and the
    /// next `train` call continues it. Calling `train` while already
    /// `Running` is a guarded no-op.
    pub fn train(&mut self, episodes: usize, ctl: &mut RunControl) -> TrainReport {
        if self.state == TrainerState::Running {
            return TrainReport { completed: 0, paused: false };
        }
        self.state = TrainerState::Running;
        let mut completed = 0;
        for _ in 0..episodes {
            if self.model.is_double()
                && self.episode_index % self.config.target_update_freq == 0
            {
                self.model.sync_target();
            }
            match self.run_episode(ctl) {
                EpisodeEnd::Completed => completed += 1,
                EpisodeEnd::Paused => {
                    self.state = TrainerState::Paused;
                    return TrainReport { completed, paused: true };
                }
            }
        }
        self.state = TrainerState::Completed;
        TrainReport { completed, paused: false }
    }

    fn run_episode(&mut self, ctl: &mut RunControl) -> EpisodeEnd {
        let (mut state, mut total_reward, mut steps) = match self.paused.take() {
            Some(resume) => (resume.state, resume.total_reward, resume.steps),
            None => (self.env.reset(), 0.0, 0),
        };

        loop {
            let action = self.select_action(&state);
            let step = self.env.step(action);
            self.memory.insert(Transition {
                state,
                action,
                reward: step.reward,
                next_state: step.state,
                done: step.done,
            });
            state = step.state;
            total_reward += step.reward;
            steps += 1;
            self.total_steps += 1;
            ctl.pacer.after_tick();

            if step.done || steps >= self.config.max_steps {
                break;
            }
            if ctl.stop.is_set() {
                self.paused = Some(PausedEpisode { state, total_reward, steps });
                ctl.sink.on_episode(&EpisodeEvent {
                    episode: self.episode_index,
                    score: self.env.score(),
                    total_reward,
                    epsilon: self.epsilon,
                    steps,
                    memory_len: self.memory.len(),
                    paused: true,
                });
                return EpisodeEnd::Paused;
            }
        }

        self.paused = None;
        self.learn();
        self.epsilon = self.config.epsilon_min.max(self.epsilon * self.config.epsilon_decay);
        let score = self.env.score();
        self.stats.rewards.push(total_reward);
        self.stats.scores.push(score);
        self.stats.lengths.push(steps);
        ctl.sink.on_episode(&EpisodeEvent {
            episode: self.episode_index,
            score,
            total_reward,
            epsilon: self.epsilon,
            steps,
            memory_len: self.memory.len(),
            paused: false,
        });
        self.episode_index += 1;
        EpisodeEnd::Completed
    }

    /// Epsilon-greedy action selection with the biased random branch.
    fn select_action(&mut self, state: &State) -> Action {
        if self.rng.gen::<f32>() < self.epsilon {
            if self.rng.gen::<f32>() < EXPLORE_COAST_BIAS {
                Action::Coast
            } else {
                Action::Flap
            }
        } else {
            let values = self.model.predict(state);
            if values[Action::Flap.index()] > values[Action::Coast.index()] {
                Action::Flap
            } else {
                Action::Coast
            }
        }
    }

    /// One batch learning step from replay memory. A no-op until the
    /// memory holds a full batch. A failure inside the fit is surfaced as
    /// a warning instead of unwinding past the trainer.
    fn learn(&mut self) {
        if self.memory.len() < self.config.batch_size {
            return;
        }
        let mut states = Vec::with_capacity(self.config.batch_size);
        let mut targets = Vec::with_capacity(self.config.batch_size);
        for transition in self.memory.sample(self.config.batch_size, &mut self.rng) {
            let mut target = self.model.predict(&transition.state);
            target[transition.action.index()] =
                regression_target(&self.model, transition, self.config.gamma);
            states.push(transition.state.to_vec());
            targets.push(target);
        }
        if let Err(err) = self.model.update(&states, &targets) {
            tracing::warn!(%err, "learning step failed, continuing the run");
        }
    }

    /// Clears accumulated state back to initial values: memory,
    /// statistics, epsilon, episode index, step counter, and any paused
    /// episode. Model weights are kept.
    pub fn reset(&mut self) {
        self.memory.clear();
        self.stats = RunStats::default();
        self.epsilon = self.config.epsilon;
        self.episode_index = 0;
        self.total_steps = 0;
        self.paused = None;
        self.state = TrainerState::Idle;
        self.rng = SmallRng::seed_from_u64(self.config.seed);
    }

    #[must_use]
    pub fn state(&self) -> TrainerState {
        self.state
    }

    #[must_use]
    pub fn epsilon(&self) -> f32 {
        self.epsilon
    }

    #[must_use]
    pub fn episode_index(&self) -> usize {
        self.episode_index
    }

    #[must_use]
    pub fn total_steps(&self) -> u64 {
        self.total_steps
    }

    #[must_use]
    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    #[must_use]
    pub fn memory(&self) -> &ReplayMemory {
        &self.memory
    }

    #[must_use]
    pub fn model(&self) -> &ValueModel {
        &self.model
    }

    #[must_use]
    pub fn paused_episode(&self) -> Option<&PausedEpisode> {
        self.paused.as_ref()
    }

    #[must_use]
    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    #[must_use]
    pub fn env(&self) -> &E {
        &self.env
    }
}

/// The Bellman regression target for one transition's taken action.
///
/// Terminal transitions regress to the bare reward; otherwise the
/// discounted best next-state value from the bootstrap source is added.
/// Each transition's next-state value is computed independently.
#[must_use]
pub fn regression_target(model: &ValueModel, transition: &Transition, gamma: f32) -> f32 {
    if transition.done {
        transition.reward
    } else {
        let next = model.predict_target(&transition.next_state);
        let best = next.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        transition.reward + gamma * best
    }
}
