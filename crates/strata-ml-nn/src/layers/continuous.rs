use strata_ml_core::{Matrix, Parameter, StrataError, StrataResult};
use strata_ml_loss::{CostFunction, LeastSquares};

use crate::layers::{Layer, Output};

/// Terminal layer for regression: a linear output with no squashing.
pub struct Continuous {
    cost_fn: Box<dyn CostFunction>,
    width: usize,
    output: Option<Matrix>,
}

impl Continuous {
    pub fn new(cost_fn: Box<dyn CostFunction>) -> Self {
        Continuous {
            cost_fn,
            width: 0,
            output: None,
        }
    }
}

impl Default for Continuous {
    fn default() -> Self {
        Continuous::new(Box::new(LeastSquares))
    }
}

impl Layer for Continuous {
    fn width(&self) -> usize {
        self.width
    }

    fn initialize(&mut self, fan_in: usize) -> StrataResult<usize> {
        self.width = fan_in;
        Ok(fan_in)
    }

    fn forward(&mut self, input: &Matrix) -> StrataResult<Matrix> {
        self.output = Some(input.clone());
        Ok(input.clone())
    }

    fn infer(&self, input: &Matrix) -> StrataResult<Matrix> {
        Ok(input.clone())
    }

    fn parameters(&self) -> Vec<&Parameter> {
        Vec::new()
    }
}

impl Output for Continuous {
    fn cost(&self, target: &Matrix) -> StrataResult<(f64, Matrix)> {
        let activations = self
            .output
            .as_ref()
            .ok_or_else(|| StrataError::InvalidOperation("cost before forward".into()))?;

        let losses = self.cost_fn.compute(activations, target)?;
        let loss = losses.mean();

        let gradient = self
            .cost_fn
            .differentiate(activations, target)?
            .div_scalar(losses.numel() as f64);

        Ok((loss, gradient))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_forward_is_identity() {
        let mut layer = Continuous::default();
        layer.initialize(2).unwrap();
        assert_eq!(layer.width(), 2);

        let batch = Matrix::from_rows(&[vec![1.5, -0.5]]).unwrap();
        assert_eq!(layer.forward(&batch).unwrap(), batch);
        assert_eq!(layer.infer(&batch).unwrap(), batch);
    }

    #[test]
    fn test_cost_mean_and_gradient() {
        let mut layer = Continuous::default();
        layer.initialize(1).unwrap();

        let batch = Matrix::from_rows(&[vec![1.0], vec![3.0]]).unwrap();
        layer.forward(&batch).unwrap();

        let target = Matrix::from_rows(&[vec![0.0], vec![0.0]]).unwrap();
        let (loss, gradient) = layer.cost(&target).unwrap();
        // mean of (1² , 3²)
        assert_relative_eq!(loss, 5.0, epsilon = 1e-12);
        // 2·(o - t) / n
        assert_relative_eq!(gradient.get(0, 0).unwrap(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(gradient.get(1, 0).unwrap(), 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_cost_before_forward_fails() {
        let layer = Continuous::default();
        assert!(layer.cost(&Matrix::ones(1, 1)).is_err());
    }
}
