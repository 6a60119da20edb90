//! # Fledge World Simulation
//!
//! A minimal, headless side-scroller world for reinforcement learning
//! experiments. The world contains a single controlled body (the bird),
//! a scrolling queue of pipe obstacles with passable gaps, and a scoring
//! counter. One call to [`World::tick`] advances the simulation by exactly
//! one step.
//!
//! The simulation is deterministic: two worlds constructed from the same
//! [`SimConfig`] (including its RNG seed) produce identical tick sequences.
//! There is no rendering here; higher layers read the world state through
//! accessors and decide what to do with it.

pub mod types;
pub mod world;

pub use types::{Pipe, TickOutcome};
pub use world::{SimConfig, World};
