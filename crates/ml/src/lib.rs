//! # Fledge ML
//!
//! A small CPU-only neural network toolkit: a flat [`Tensor`] type, dense
//! layers with explicit forward/backward passes, first-order optimizers,
//! and the [`QNet`] action-value network built from them.
//!
//! Everything here is plain `Vec<f32>` arithmetic. There is no implicit
//! autodiff graph; each layer knows how to push a gradient back through
//! itself, and batch fitting accumulates parameter gradients by hand.

pub mod nn;
pub mod optim;
pub mod qnet;

pub use nn::{relu, relu_mask, Dense};
pub use optim::{Adam, Sgd};
pub use qnet::{LayerParams, MlError, QNet};

/// A dense row-major tensor.
#[derive(Clone, Debug, PartialEq)]
pub struct Tensor {
    pub data: Vec<f32>,
    pub shape: Vec<usize>,
}

impl Tensor {
    /// Builds a tensor from a flat buffer, checking the element count.
    #[must_use]
    pub fn from_vec(shape: Vec<usize>, data: Vec<f32>) -> Self {
        assert_eq!(
            shape.iter().product::<usize>(),
            data.len(),
            "tensor shape does not match data length"
        );
        Self { data, shape }
    }

    /// A zero-filled tensor of the given shape.
    #[must_use]
    pub fn zeros(shape: Vec<usize>) -> Self {
        let len = shape.iter().product();
        Self { data: vec![0.0; len], shape }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Mean squared error between a prediction and a target of equal length.
#[must_use]
pub fn mse(pred: &[f32], target: &[f32]) -> f32 {
    assert_eq!(pred.len(), target.len());
    let sum: f32 = pred
        .iter()
        .zip(target)
        .map(|(&p, &t)| (p - t).powi(2))
        .sum();
    sum / pred.len() as f32
}
