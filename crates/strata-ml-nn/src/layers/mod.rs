pub mod activation;
pub mod continuous;
pub mod dense;
pub mod input;
pub mod softmax;

pub use activation::Activation;
pub use continuous::Continuous;
pub use dense::Dense;
pub use input::Input;
pub use softmax::Softmax;

use strata_ml_core::{Matrix, Parameter, StrataResult};
use strata_ml_optim::Optimizer;

use crate::deferred::Deferred;

/// One stage of the computation stack.
///
/// A layer starts uninitialized; after `initialize` it alternates forward
/// and backward passes for as long as the network lives.
pub trait Layer {
    /// Output width in features.
    fn width(&self) -> usize;

    /// One-time allocation pass. Receives the previous layer's width and
    /// reports its own, so the network can chain fan-ins through the stack.
    fn initialize(&mut self, fan_in: usize) -> StrataResult<usize>;

    /// Training-time forward pass; caches whatever backward will need.
    fn forward(&mut self, input: &Matrix) -> StrataResult<Matrix>;

    /// Inference-time forward pass; writes no caches.
    fn infer(&self, input: &Matrix) -> StrataResult<Matrix>;

    /// The trainable parameters owned by this layer.
    fn parameters(&self) -> Vec<&Parameter>;
}

/// A stage that can pass gradients toward the input.
pub trait Hidden: Layer {
    /// Consume the upstream gradient, update any owned parameters through
    /// the optimizer, and hand back a lazy gradient for the layer below.
    fn backward(
        &mut self,
        gradient: &Matrix,
        optimizer: &mut dyn Optimizer,
    ) -> StrataResult<Deferred>;
}

/// The terminal stage of the stack — the entry point of the backward pass.
pub trait Output: Layer {
    /// Mean loss over the batch plus the gradient with respect to this
    /// layer's input, computed from the activations cached by the last
    /// forward pass.
    fn cost(&self, target: &Matrix) -> StrataResult<(f64, Matrix)>;
}
