use strata_ml_core::{Matrix, Parameter, StrataError, StrataResult};
use strata_ml_loss::{CostFunction, CrossEntropy};

use crate::layers::{Layer, Output};

/// Terminal layer for multiclass probability estimation.
///
/// Forward normalizes each row into a distribution; `cost` delegates to the
/// configured cost function and folds in the diagonal of the softmax
/// Jacobian, with the mean reduction over batch and class dimensions
/// applied here so downstream layers see batch-invariant gradients.
pub struct Softmax {
    cost_fn: Box<dyn CostFunction>,
    width: usize,
    output: Option<Matrix>,
}

impl Softmax {
    pub fn new(cost_fn: Box<dyn CostFunction>) -> Self {
        Softmax {
            cost_fn,
            width: 0,
            output: None,
        }
    }
}

impl Default for Softmax {
    fn default() -> Self {
        Softmax::new(Box::new(CrossEntropy))
    }
}

impl Layer for Softmax {
    fn width(&self) -> usize {
        self.width
    }

    fn initialize(&mut self, fan_in: usize) -> StrataResult<usize> {
        self.width = fan_in;
        Ok(fan_in)
    }

    fn forward(&mut self, input: &Matrix) -> StrataResult<Matrix> {
        let output = input.softmax();
        self.output = Some(output.clone());
        Ok(output)
    }

    fn infer(&self, input: &Matrix) -> StrataResult<Matrix> {
        Ok(input.softmax())
    }

    fn parameters(&self) -> Vec<&Parameter> {
        Vec::new()
    }
}

impl Output for Softmax {
    fn cost(&self, target: &Matrix) -> StrataResult<(f64, Matrix)> {
        let activations = self
            .output
            .as_ref()
            .ok_or_else(|| StrataError::InvalidOperation("cost before forward".into()))?;

        let losses = self.cost_fn.compute(activations, target)?;
        let loss = losses.mean();

        let jacobian = activations.apply(|a| a * (1.0 - a));
        let gradient = self
            .cost_fn
            .differentiate(activations, target)?
            .mul(&jacobian)?
            .div_scalar(losses.numel() as f64);

        Ok((loss, gradient))
    }
}
