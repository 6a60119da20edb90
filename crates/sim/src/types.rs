//! Plain data types shared across the simulation.

/// One pipe obstacle. `x` is the leading (left) edge in world units;
/// `gap_y` is the vertical center of the passable gap.
#[derive(Clone, Copy, Debug)]
pub struct Pipe {
    pub x: f32,
    pub gap_y: f32,
    /// Set once the bird has passed the trailing edge, so the pipe
    /// scores at most once.
    pub passed: bool,
}

/// Result of a single simulation tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickOutcome {
    /// The bird passed a pipe on this tick.
    pub scored: bool,
    /// The bird hit a pipe or left the vertical bounds on this tick.
    pub dead: bool,
}
