//! Value-model variants.

use ml::{LayerParams, MlError, QNet};

/// The function approximator behind the agent, as a tagged variant.
///
/// `Single` uses one network for both action selection and bootstrap
/// targets. `Double` keeps a frozen copy that only produces the
/// max-future-value term of the regression target; [`sync_target`]
/// refreshes the copy from the online network.
///
/// [`sync_target`]: ValueModel::sync_target
pub enum ValueModel {
    Single(QNet),
    Double { online: QNet, target: QNet },
}

impl ValueModel {
    /// Wraps a network in the single-model arrangement.
    #[must_use]
    pub fn single(net: QNet) -> Self {
        ValueModel::Single(net)
    }

    /// Wraps a network in the double arrangement, starting the target as
    /// an independent copy of the online network.
    #[must_use]
    pub fn double(net: QNet) -> Self {
        let target = net.clone();
        ValueModel::Double { online: net, target }
    }

    #[must_use]
    pub fn is_double(&self) -> bool {
        matches!(self, ValueModel::Double { .. })
    }

    fn online(&self) -> &QNet {
        match self {
            ValueModel::Single(net) => net,
            ValueModel::Double { online, .. } => online,
        }
    }

    /// Predicted per-action values from the online network.
    #[must_use]
    pub fn predict(&self, state: &[f32]) -> Vec<f32> {
        self.online().predict(state)
    }

    /// Predicted per-action values from the bootstrap source: the frozen
    /// target copy under `Double`, the online network under `Single`.
    #[must_use]
    pub fn predict_target(&self, state: &[f32]) -> Vec<f32> {
        match self {
            ValueModel::Single(net) => net.predict(state),
            ValueModel::Double { target, .. } => target.predict(state),
        }
    }

    /// One batch regression step on the online network.
    pub fn update(
        &mut self,
        states: &[Vec<f32>],
        targets: &[Vec<f32>],
    ) -> Result<f32, MlError> {
        match self {
            ValueModel::Single(net) => net.fit_batch(states, targets),
            ValueModel::Double { online, .. } => online.fit_batch(states, targets),
        }
    }

    /// Copies the online parameters into the target copy.
    ///
    /// The copy is structurally independent: later updates to the online
    /// network never leak into the target. Idempotent when no update has
    /// happened in between. No-op under `Single`.
    pub fn sync_target(&mut self) {
        if let ValueModel::Double { online, target } = self {
            *target = online.clone();
        }
    }

    /// Hidden layer width of the underlying network.
    #[must_use]
    pub fn hidden_dim(&self) -> usize {
        self.online().hidden_dim()
    }

    /// Exports the online network's parameters.
    #[must_use]
    pub fn export_weights(&self) -> Vec<LayerParams> {
        self.online().export_weights()
    }

    /// Imports parameters into the online network, validating shapes
    /// before any mutation; under `Double` the target is refreshed to
    /// match on success.
    pub fn import_weights(&mut self, layers: &[LayerParams]) -> Result<(), MlError> {
        match self {
            ValueModel::Single(net) => net.import_weights(layers),
            ValueModel::Double { online, target } => {
                online.import_weights(layers)?;
                *target = online.clone();
                Ok(())
            }
        }
    }
}
