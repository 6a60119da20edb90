//! Shared fixtures for the trainer tests.
#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use rl::{Action, Env, EpisodeEvent, NotificationSink, Pacer, State, Step, StopFlag};

/// Deterministic environment: every episode lasts exactly `episode_len`
/// ticks, rewards depend only on the tick counter and the action, and
/// the feature vector is a pure function of the tick counter.
pub struct MockEnv {
    t: u32,
    episode_len: u32,
}

impl MockEnv {
    pub fn new(episode_len: u32) -> Self {
        assert!(episode_len > 0);
        Self { t: 0, episode_len }
    }

    fn features(&self) -> State {
        let t = self.t as f32;
        [t * 0.01, 0.5 - t * 0.002, (t * 0.1).sin() * 0.3, 0.25]
    }
}

impl Env for MockEnv {
    fn reset(&mut self) -> State {
        self.t = 0;
        self.features()
    }

    fn step(&mut self, action: Action) -> Step {
        self.t += 1;
        let done = self.t >= self.episode_len;
        let reward = if done {
            -15.0
        } else {
            1.0 + 0.5 * action.index() as f32
        };
        Step { state: self.features(), reward, done }
    }

    fn score(&self) -> u32 {
        self.t / 10
    }
}

/// Sink that records every event behind a shared handle.
#[derive(Clone, Default)]
pub struct RecordingSink(pub Rc<RefCell<Vec<EpisodeEvent>>>);

impl NotificationSink for RecordingSink {
    fn on_episode(&mut self, event: &EpisodeEvent) {
        self.0.borrow_mut().push(event.clone());
    }
}

/// Pacer that raises the stop flag after a fixed number of ticks,
/// standing in for an external halt arriving mid-episode.
pub struct HaltAfter {
    remaining: u32,
    stop: StopFlag,
}

impl HaltAfter {
    pub fn new(ticks: u32, stop: StopFlag) -> Self {
        assert!(ticks > 0);
        Self { remaining: ticks, stop }
    }
}

impl Pacer for HaltAfter {
    fn after_tick(&mut self) {
        if self.remaining > 0 {
            self.remaining -= 1;
            if self.remaining == 0 {
                self.stop.request();
            }
        }
    }
}
