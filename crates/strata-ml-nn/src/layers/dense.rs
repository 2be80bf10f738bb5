use strata_ml_core::{Matrix, Parameter, StrataError, StrataResult};
use strata_ml_optim::Optimizer;

use crate::deferred::Deferred;
use crate::initializer::{Initializer, Xavier};
use crate::layers::{Hidden, Layer};

/// Fully connected layer: `z = x·Wᵗ + b`.
///
/// Owns a weight matrix of shape `[width, fan_in]` produced by its
/// configured initializer (Xavier by default) and a zero-filled bias row.
pub struct Dense {
    width: usize,
    initializer: Box<dyn Initializer>,
    weights: Option<Parameter>,
    biases: Option<Parameter>,
    input: Option<Matrix>,
}

impl Dense {
    pub fn new(width: usize) -> StrataResult<Self> {
        if width < 1 {
            return Err(StrataError::InvalidConfiguration(format!(
                "dense width must be at least 1, got {width}"
            )));
        }
        Ok(Dense {
            width,
            initializer: Box::new(Xavier),
            weights: None,
            biases: None,
            input: None,
        })
    }

    pub fn with_initializer(mut self, initializer: Box<dyn Initializer>) -> Self {
        self.initializer = initializer;
        self
    }

    /// The weight parameter, once initialized. The row at index `i` holds
    /// the incoming weights of output neuron `i`.
    pub fn weights(&self) -> Option<&Parameter> {
        self.weights.as_ref()
    }

    pub fn biases(&self) -> Option<&Parameter> {
        self.biases.as_ref()
    }

    fn affine(&self, input: &Matrix) -> StrataResult<Matrix> {
        let weights = self.weights.as_ref().ok_or_else(uninitialized)?;
        let biases = self.biases.as_ref().ok_or_else(uninitialized)?;
        input
            .matmul(&weights.value().transpose())?
            .add(biases.value())
    }
}

fn uninitialized() -> StrataError {
    StrataError::InvalidOperation("dense layer has not been initialized".into())
}

impl Layer for Dense {
    fn width(&self) -> usize {
        self.width
    }

    fn initialize(&mut self, fan_in: usize) -> StrataResult<usize> {
        self.weights = Some(Parameter::new(
            self.initializer.initialize(fan_in, self.width)?,
        ));
        self.biases = Some(Parameter::new(Matrix::zeros(1, self.width)));
        Ok(self.width)
    }

    fn forward(&mut self, input: &Matrix) -> StrataResult<Matrix> {
        let output = self.affine(input)?;
        self.input = Some(input.clone());
        Ok(output)
    }

    fn infer(&self, input: &Matrix) -> StrataResult<Matrix> {
        self.affine(input)
    }

    fn parameters(&self) -> Vec<&Parameter> {
        self.weights.iter().chain(self.biases.iter()).collect()
    }
}

impl Hidden for Dense {
    fn backward(
        &mut self,
        gradient: &Matrix,
        optimizer: &mut dyn Optimizer,
    ) -> StrataResult<Deferred> {
        let input = self
            .input
            .take()
            .ok_or_else(|| StrataError::InvalidOperation("backward before forward".into()))?;

        let d_weights = gradient.transpose().matmul(&input)?;
        let d_biases = gradient.sum_axis(0)?;

        let weights = self.weights.as_mut().ok_or_else(uninitialized)?;
        // Gradients keep flowing through the pre-update weights.
        let carried = weights.value().clone();
        let delta = optimizer.step(weights, &d_weights);
        weights.update(&delta)?;

        let biases = self.biases.as_mut().ok_or_else(uninitialized)?;
        let delta = optimizer.step(biases, &d_biases);
        biases.update(&delta)?;

        let gradient = gradient.clone();
        Ok(Deferred::new(move || {
            gradient.matmul(&carried).expect("input gradient")
        }))
    }
}
