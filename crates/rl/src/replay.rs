//! Fixed-capacity experience replay.

use rand::Rng;

use crate::env::Action;
use crate::State;

/// One recorded experience. Immutable once stored; a slot is only ever
/// overwritten wholesale when the ring wraps.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transition {
    pub state: State,
    pub action: Action,
    pub reward: f32,
    pub next_state: State,
    pub done: bool,
}

/// Ring buffer of transitions with O(1) insert and a fixed footprint.
///
/// The backing store grows once up to `capacity` and is then reused: the
/// `i`-th insertion after the buffer first fills overwrites slot
/// `i mod capacity`, so the logically oldest entry per slot is replaced.
/// This is an arena with a write cursor, not a queue.
pub struct ReplayMemory {
    slots: Vec<Transition>,
    capacity: usize,
    cursor: usize,
}

impl ReplayMemory {
    /// Creates an empty memory holding at most `capacity` transitions.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        assert!(capacity > 0, "replay memory capacity must be positive");
        Self {
            slots: Vec::with_capacity(capacity),
            capacity,
            cursor: 0,
        }
    }

    /// Stores a transition, overwriting the slot under the write cursor
    /// once the memory is full.
    pub fn insert(&mut self, transition: Transition) {
        if self.slots.len() < self.capacity {
            self.slots.push(transition);
        } else {
            self.slots[self.cursor] = transition;
            self.cursor = (self.cursor + 1) % self.capacity;
        }
    }

    /// Draws `n` distinct transitions uniformly at random.
    ///
    /// Sampling never mutates the memory and makes no ordering guarantee.
    /// Requesting more than [`len`](Self::len) transitions is a programmer
    /// error and fails fast.
    #[must_use]
    pub fn sample<'a>(&'a self, n: usize, rng: &mut impl Rng) -> Vec<&'a Transition> {
        assert!(
            n <= self.slots.len(),
            "sample of {n} requested from {} stored transitions",
            self.slots.len()
        );
        rand::seq::index::sample(rng, self.slots.len(), n)
            .iter()
            .map(|i| &self.slots[i])
            .collect()
    }

    /// Number of stored transitions, at most the capacity.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// The fixed capacity chosen at construction.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Stored transitions in slot order (not insertion order once the
    /// ring has wrapped).
    pub fn iter(&self) -> impl Iterator<Item = &Transition> {
        self.slots.iter()
    }

    /// Drops every stored transition and rewinds the write cursor.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.cursor = 0;
    }
}
