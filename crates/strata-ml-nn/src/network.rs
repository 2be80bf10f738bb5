use strata_ml_core::{Matrix, StrataResult};
use strata_ml_optim::Optimizer;

use crate::deferred::Deferred;
use crate::layers::{Hidden, Input, Layer, Output};

/// An ordered stack of layers trained by a single optimizer.
///
/// The stack is `Input → Hidden… → Output`; zero hidden layers is a valid
/// configuration. One instance must not be shared between threads while
/// training; give each worker its own network and optimizer instead.
pub struct FeedForward {
    input: Input,
    hidden: Vec<Box<dyn Hidden>>,
    output: Box<dyn Output>,
    optimizer: Box<dyn Optimizer>,
}

impl FeedForward {
    /// Assemble a network. Layer widths are validated by the layer
    /// constructors, so an ill-configured stack cannot be represented.
    pub fn new(
        input: Input,
        hidden: Vec<Box<dyn Hidden>>,
        output: Box<dyn Output>,
        optimizer: Box<dyn Optimizer>,
    ) -> Self {
        FeedForward {
            input,
            hidden,
            output,
            optimizer,
        }
    }

    /// Walk the stack once, chaining each layer's fan-in from the width of
    /// the layer below it and allocating starting parameters.
    pub fn initialize(&mut self) -> StrataResult<()> {
        let mut fan_in = self.input.width();
        for layer in &mut self.hidden {
            fan_in = layer.initialize(fan_in)?;
        }
        self.output.initialize(fan_in)?;
        Ok(())
    }

    /// Pure forward pass through every layer in order.
    pub fn infer(&self, batch: &Matrix) -> StrataResult<Matrix> {
        let mut activations = self.input.infer(batch)?;
        for layer in &self.hidden {
            activations = layer.infer(&activations)?;
        }
        self.output.infer(&activations)
    }

    /// One training step over a batch: forward pass, cost, backward pass
    /// with parameter updates. Returns the batch's mean loss.
    pub fn roundtrip(&mut self, batch: &Matrix, target: &Matrix) -> StrataResult<f64> {
        let mut activations = self.input.forward(batch)?;
        for layer in &mut self.hidden {
            activations = layer.forward(&activations)?;
        }
        self.output.forward(&activations)?;

        let (loss, gradient) = self.output.cost(target)?;

        let mut deferred = Deferred::ready(gradient);
        for layer in self.hidden.iter_mut().rev() {
            let upstream = deferred.force().clone();
            deferred = layer.backward(&upstream, self.optimizer.as_mut())?;
        }
        // The last deferred, the gradient toward the input layer, is
        // dropped without ever being forced.

        Ok(loss)
    }

    /// Number of layers in the stack, input and output included.
    pub fn depth(&self) -> usize {
        self.hidden.len() + 2
    }

    pub fn input(&self) -> &Input {
        &self.input
    }

    pub fn hidden(&self) -> &[Box<dyn Hidden>] {
        &self.hidden
    }

    pub fn output(&self) -> &dyn Output {
        self.output.as_ref()
    }

    /// The hidden layers holding at least one trainable parameter, in
    /// stack order. Callers use this for parameter counts and weight
    /// introspection.
    pub fn parametric(&self) -> Vec<&dyn Layer> {
        self.hidden
            .iter()
            .map(|layer| -> &dyn Layer { layer.as_ref() })
            .filter(|layer| !layer.parameters().is_empty())
            .collect()
    }
}
