//! Dense layers and activations.

use rand::distributions::Uniform;
use rand::Rng;

use crate::Tensor;

/// A fully connected layer with an `out_dim x in_dim` weight matrix.
#[derive(Clone, Debug)]
pub struct Dense {
    /// The weight matrix, row-major, one row per output.
    pub w: Tensor,
    /// The bias vector.
    pub b: Tensor,
    pub in_dim: usize,
    pub out_dim: usize,
}

impl Dense {
    /// Creates a layer from explicit weights and biases.
    #[must_use]
    pub fn new(weights: Vec<f32>, bias: Vec<f32>, in_dim: usize, out_dim: usize) -> Self {
        assert_eq!(weights.len(), in_dim * out_dim);
        assert_eq!(bias.len(), out_dim);
        Self {
            w: Tensor::from_vec(vec![out_dim, in_dim], weights),
            b: Tensor::from_vec(vec![out_dim], bias),
            in_dim,
            out_dim,
        }
    }

    /// Xavier/Glorot uniform initialization.
    #[must_use]
    pub fn xavier(in_dim: usize, out_dim: usize, rng: &mut impl Rng) -> Self {
        let limit = (6.0f32 / (in_dim as f32 + out_dim as f32)).sqrt();
        let dist = Uniform::new(-limit, limit);
        let weights: Vec<f32> = (0..in_dim * out_dim).map(|_| rng.sample(dist)).collect();
        let bias = vec![0.0; out_dim];
        Self::new(weights, bias, in_dim, out_dim)
    }

    /// Forward pass for a single input vector.
    #[must_use]
    pub fn forward(&self, x: &[f32]) -> Vec<f32> {
        assert_eq!(x.len(), self.in_dim);
        let mut y = vec![0.0f32; self.out_dim];
        for o in 0..self.out_dim {
            let mut sum = self.b.data[o];
            let row = o * self.in_dim;
            for i in 0..self.in_dim {
                sum += self.w.data[row + i] * x[i];
            }
            y[o] = sum;
        }
        y
    }

    /// Backward pass for a single input vector.
    ///
    /// Given the input `x` the layer saw and the gradient of the loss with
    /// respect to the layer output, returns `(dx, dw, db)`.
    #[must_use]
    pub fn backward(&self, x: &[f32], grad: &[f32]) -> (Vec<f32>, Tensor, Tensor) {
        assert_eq!(x.len(), self.in_dim);
        assert_eq!(grad.len(), self.out_dim);
        let mut dx = vec![0.0f32; self.in_dim];
        let mut dw = vec![0.0f32; self.in_dim * self.out_dim];
        let mut db = vec![0.0f32; self.out_dim];
        for o in 0..self.out_dim {
            let go = grad[o];
            let row = o * self.in_dim;
            for i in 0..self.in_dim {
                dw[row + i] = go * x[i];
                dx[i] += self.w.data[row + i] * go;
            }
            db[o] = go;
        }
        (
            dx,
            Tensor::from_vec(vec![self.out_dim, self.in_dim], dw),
            Tensor::from_vec(vec![self.out_dim], db),
        )
    }
}

/// Elementwise rectified linear unit.
#[must_use]
pub fn relu(x: &[f32]) -> Vec<f32> {
    x.iter().map(|&v| v.max(0.0)).collect()
}

/// Gates a gradient through a ReLU given the pre-activation values.
#[must_use]
pub fn relu_mask(pre: &[f32], grad: &[f32]) -> Vec<f32> {
    pre.iter()
        .zip(grad)
        .map(|(&p, &g)| if p > 0.0 { g } else { 0.0 })
        .collect()
}
