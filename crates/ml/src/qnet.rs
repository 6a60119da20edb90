//! Action-value network: a two-layer MLP mapping a state vector to one
//! value per discrete action.

use rand::Rng;
use thiserror::Error;

use crate::nn::{relu, relu_mask, Dense};
use crate::optim::Adam;
use crate::Tensor;

/// Errors from batch fitting and weight import.
#[derive(Debug, Error)]
pub enum MlError {
    #[error("batch size mismatch: {states} states vs {targets} targets")]
    BatchMismatch { states: usize, targets: usize },
    #[error("empty training batch")]
    EmptyBatch,
    #[error("batch row {row}: expected input width {expected}, got {found}")]
    InputWidth { row: usize, expected: usize, found: usize },
    #[error("batch row {row}: expected target width {expected}, got {found}")]
    TargetWidth { row: usize, expected: usize, found: usize },
    #[error("weight import expects {expected} layers, got {found}")]
    LayerCount { expected: usize, found: usize },
    #[error(
        "layer {layer}: expected {expected_out}x{expected_in} weights \
         ({expected_out} biases), got {found_out}x{found_in} ({found_biases})"
    )]
    LayerShape {
        layer: usize,
        expected_out: usize,
        expected_in: usize,
        found_out: usize,
        found_in: usize,
        found_biases: usize,
    },
}

/// Weight rows and biases of one dense layer, in plain nested vectors.
/// This is the exchange format for snapshots and target-network copies.
#[derive(Clone, Debug, PartialEq)]
pub struct LayerParams {
    /// `out_dim` rows of `in_dim` weights each.
    pub rows: Vec<Vec<f32>>,
    pub bias: Vec<f32>,
}

/// A `state_dim -> hidden_dim -> action_count` MLP with a ReLU hidden
/// layer and a linear output head, fitted by Adam on mean squared error.
#[derive(Clone, Debug)]
pub struct QNet {
    l1: Dense,
    l2: Dense,
    opt: Adam,
    state_dim: usize,
    hidden_dim: usize,
    action_count: usize,
}

impl QNet {
    /// Creates a freshly initialized network.
    #[must_use]
    pub fn new(
        state_dim: usize,
        hidden_dim: usize,
        action_count: usize,
        learning_rate: f32,
        rng: &mut impl Rng,
    ) -> Self {
        assert!(state_dim > 0 && hidden_dim > 0 && action_count > 0);
        Self {
            l1: Dense::xavier(state_dim, hidden_dim, rng),
            l2: Dense::xavier(hidden_dim, action_count, rng),
            opt: Adam::new(learning_rate),
            state_dim,
            hidden_dim,
            action_count,
        }
    }

    #[must_use]
    pub fn state_dim(&self) -> usize {
        self.state_dim
    }

    #[must_use]
    pub fn hidden_dim(&self) -> usize {
        self.hidden_dim
    }

    #[must_use]
    pub fn action_count(&self) -> usize {
        self.action_count
    }

    /// Predicted value per action for one state vector.
    #[must_use]
    pub fn predict(&self, state: &[f32]) -> Vec<f32> {
        let h = relu(&self.l1.forward(state));
        self.l2.forward(&h)
    }

    /// One full-batch gradient step fitting the network outputs toward
    /// `targets`. Gradients are averaged over the batch and applied in a
    /// single optimizer step. Returns the pre-step mean squared error.
    pub fn fit_batch(
        &mut self,
        states: &[Vec<f32>],
        targets: &[Vec<f32>],
    ) -> Result<f32, MlError> {
        if states.len() != targets.len() {
            return Err(MlError::BatchMismatch {
                states: states.len(),
                targets: targets.len(),
            });
        }
        if states.is_empty() {
            return Err(MlError::EmptyBatch);
        }
        for (row, s) in states.iter().enumerate() {
            if s.len() != self.state_dim {
                return Err(MlError::InputWidth {
                    row,
                    expected: self.state_dim,
                    found: s.len(),
                });
            }
        }
        for (row, t) in targets.iter().enumerate() {
            if t.len() != self.action_count {
                return Err(MlError::TargetWidth {
                    row,
                    expected: self.action_count,
                    found: t.len(),
                });
            }
        }

        let n = states.len() as f32;
        let denom = n * self.action_count as f32;
        let mut loss = 0.0f32;
        let mut acc_w1 = Tensor::zeros(self.l1.w.shape.clone());
        let mut acc_b1 = Tensor::zeros(self.l1.b.shape.clone());
        let mut acc_w2 = Tensor::zeros(self.l2.w.shape.clone());
        let mut acc_b2 = Tensor::zeros(self.l2.b.shape.clone());

        for (x, t) in states.iter().zip(targets) {
            let h_pre = self.l1.forward(x);
            let h = relu(&h_pre);
            let y = self.l2.forward(&h);

            let mut grad_y = vec![0.0f32; self.action_count];
            for (j, g) in grad_y.iter_mut().enumerate() {
                let diff = y[j] - t[j];
                loss += diff * diff;
                *g = 2.0 * diff / denom;
            }

            let (dh, dw2, db2) = self.l2.backward(&h, &grad_y);
            let dh_pre = relu_mask(&h_pre, &dh);
            let (_, dw1, db1) = self.l1.backward(x, &dh_pre);

            accumulate(&mut acc_w1, &dw1);
            accumulate(&mut acc_b1, &db1);
            accumulate(&mut acc_w2, &dw2);
            accumulate(&mut acc_b2, &db2);
        }

        let grads = [acc_w1, acc_b1, acc_w2, acc_b2];
        let mut params = [
            &mut self.l1.w,
            &mut self.l1.b,
            &mut self.l2.w,
            &mut self.l2.b,
        ];
        self.opt.step(&mut params, &grads);

        Ok(loss / denom)
    }

    /// Exports the layer parameters as nested vectors, input layer first.
    #[must_use]
    pub fn export_weights(&self) -> Vec<LayerParams> {
        [&self.l1, &self.l2]
            .into_iter()
            .map(|layer| LayerParams {
                rows: layer
                    .w
                    .data
                    .chunks(layer.in_dim)
                    .map(<[f32]>::to_vec)
                    .collect(),
                bias: layer.b.data.clone(),
            })
            .collect()
    }

    /// Replaces the layer parameters with imported ones.
    ///
    /// Every shape is validated against the live architecture before any
    /// parameter is touched; on error the network is unchanged. The
    /// optimizer's moment buffers are cleared on success since they no
    /// longer describe the new parameters.
    pub fn import_weights(&mut self, layers: &[LayerParams]) -> Result<(), MlError> {
        let dims = [
            (self.state_dim, self.hidden_dim),
            (self.hidden_dim, self.action_count),
        ];
        if layers.len() != dims.len() {
            return Err(MlError::LayerCount {
                expected: dims.len(),
                found: layers.len(),
            });
        }
        let mut imported = Vec::with_capacity(dims.len());
        for (i, (params, &(in_dim, out_dim))) in layers.iter().zip(&dims).enumerate() {
            let rows_ok = params.rows.len() == out_dim
                && params.rows.iter().all(|r| r.len() == in_dim)
                && params.bias.len() == out_dim;
            if !rows_ok {
                return Err(MlError::LayerShape {
                    layer: i,
                    expected_out: out_dim,
                    expected_in: in_dim,
                    found_out: params.rows.len(),
                    found_in: params.rows.first().map_or(0, Vec::len),
                    found_biases: params.bias.len(),
                });
            }
            let weights: Vec<f32> = params.rows.iter().flatten().copied().collect();
            imported.push(Dense::new(weights, params.bias.clone(), in_dim, out_dim));
        }
        let mut it = imported.into_iter();
        self.l1 = it.next().expect("validated above");
        self.l2 = it.next().expect("validated above");
        self.opt.reset();
        Ok(())
    }
}

fn accumulate(acc: &mut Tensor, grad: &Tensor) {
    debug_assert_eq!(acc.len(), grad.len());
    for (a, g) in acc.data.iter_mut().zip(&grad.data) {
        *a += g;
    }
}
