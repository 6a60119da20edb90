//! Serializable trainer snapshots.
//!
//! The shape matches what the persistence collaborator exchanges: the
//! value network's nested weight arrays plus the run configuration and
//! statistics. File I/O and compression live outside this crate.

use ml::{LayerParams, MlError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::env::Env;
use crate::trainer::{RunStats, Trainer};

/// Weight rows and biases of one dense layer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LayerWeights {
    /// One row of input weights per output unit.
    pub rows: Vec<Vec<f32>>,
    pub bias: Vec<f32>,
}

/// Run metadata stored alongside the weights.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SnapshotConfig {
    pub episode: usize,
    pub epsilon: f32,
    /// Replay memory capacity at export time, informational.
    pub memory_size: usize,
    pub hidden_dim: usize,
    pub statistics: RunStats,
    /// Caller-supplied export time, seconds since the epoch.
    pub timestamp: u64,
}

/// A complete exported trainer state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub weights: Vec<LayerWeights>,
    pub config: SnapshotConfig,
}

/// Why a snapshot was rejected. Restoration never partially applies: on
/// any error the trainer is left exactly as it was.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot hidden width {found} does not match live network width {expected}")]
    HiddenDim { expected: usize, found: usize },
    #[error("snapshot weights rejected: {0}")]
    Weights(#[from] MlError),
}

impl<E: Env> Trainer<E> {
    /// Exports the live parameters and run state.
    #[must_use]
    pub fn snapshot(&self, timestamp: u64) -> Snapshot {
        Snapshot {
            weights: self
                .model
                .export_weights()
                .into_iter()
                .map(|layer| LayerWeights { rows: layer.rows, bias: layer.bias })
                .collect(),
            config: SnapshotConfig {
                episode: self.episode_index,
                epsilon: self.epsilon,
                memory_size: self.memory.capacity(),
                hidden_dim: self.model.hidden_dim(),
                statistics: self.stats.clone(),
                timestamp,
            },
        }
    }

    /// Restores weights and run state from a snapshot.
    ///
    /// Every weight shape is validated against the live architecture
    /// before anything is mutated; a malformed snapshot is rejected with
    /// a single descriptive error and the trainer is unchanged.
    pub fn restore(&mut self, snapshot: &Snapshot) -> Result<(), SnapshotError> {
        if snapshot.config.hidden_dim != self.model.hidden_dim() {
            return Err(SnapshotError::HiddenDim {
                expected: self.model.hidden_dim(),
                found: snapshot.config.hidden_dim,
            });
        }
        let layers: Vec<LayerParams> = snapshot
            .weights
            .iter()
            .map(|w| LayerParams { rows: w.rows.clone(), bias: w.bias.clone() })
            .collect();
        self.model.import_weights(&layers)?;
        self.epsilon = snapshot.config.epsilon;
        self.episode_index = snapshot.config.episode;
        self.stats = snapshot.config.statistics.clone();
        Ok(())
    }
}
