use strata_ml_core::{Matrix, Parameter, StrataError, StrataResult};
use strata_ml_optim::Optimizer;

use crate::activation::ActivationFunction;
use crate::deferred::Deferred;
use crate::layers::{Hidden, Layer};

/// Applies an element-wise nonlinearity to the previous layer's output.
///
/// Caches both the pre-activation input and the activated output so the
/// backward pass can evaluate the derivative at the forward point.
pub struct Activation {
    function: Box<dyn ActivationFunction>,
    width: usize,
    input: Option<Matrix>,
    output: Option<Matrix>,
}

impl Activation {
    pub fn new(function: Box<dyn ActivationFunction>) -> Self {
        Activation {
            function,
            width: 0,
            input: None,
            output: None,
        }
    }
}

impl Layer for Activation {
    fn width(&self) -> usize {
        self.width
    }

    fn initialize(&mut self, fan_in: usize) -> StrataResult<usize> {
        self.width = fan_in;
        Ok(fan_in)
    }

    fn forward(&mut self, input: &Matrix) -> StrataResult<Matrix> {
        let output = self.function.activate(input);
        self.input = Some(input.clone());
        self.output = Some(output.clone());
        Ok(output)
    }

    fn infer(&self, input: &Matrix) -> StrataResult<Matrix> {
        Ok(self.function.activate(input))
    }

    fn parameters(&self) -> Vec<&Parameter> {
        Vec::new()
    }
}

impl Hidden for Activation {
    fn backward(
        &mut self,
        gradient: &Matrix,
        _optimizer: &mut dyn Optimizer,
    ) -> StrataResult<Deferred> {
        let input = self
            .input
            .take()
            .ok_or_else(|| StrataError::InvalidOperation("backward before forward".into()))?;
        let output = self
            .output
            .take()
            .ok_or_else(|| StrataError::InvalidOperation("backward before forward".into()))?;

        let local = self.function.differentiate(&input, &output);
        Ok(Deferred::ready(gradient.mul(&local)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activation::{ReLU, Sigmoid};
    use approx::assert_relative_eq;
    use strata_ml_optim::Stochastic;

    #[test]
    fn test_forward_applies_function() {
        let mut layer = Activation::new(Box::new(ReLU));
        layer.initialize(3).unwrap();
        assert_eq!(layer.width(), 3);

        let batch = Matrix::from_rows(&[vec![-1.0, 0.0, 2.0]]).unwrap();
        let out = layer.forward(&batch).unwrap();
        assert_eq!(out.data(), &[0.0, 0.0, 2.0]);
        assert_eq!(layer.infer(&batch).unwrap(), out);
        assert!(layer.parameters().is_empty());
    }

    #[test]
    fn test_backward_chain_rule() {
        let mut layer = Activation::new(Box::new(Sigmoid));
        layer.initialize(1).unwrap();
        let mut optimizer = Stochastic::new(0.1).unwrap();

        let batch = Matrix::from_rows(&[vec![0.0]]).unwrap();
        layer.forward(&batch).unwrap();

        let upstream = Matrix::from_rows(&[vec![2.0]]).unwrap();
        let mut deferred = layer.backward(&upstream, &mut optimizer).unwrap();
        // σ'(0) = 0.25, chained with the upstream gradient of 2.
        assert_relative_eq!(deferred.force().get(0, 0).unwrap(), 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_backward_requires_forward() {
        let mut layer = Activation::new(Box::new(ReLU));
        layer.initialize(1).unwrap();
        let mut optimizer = Stochastic::new(0.1).unwrap();
        assert!(layer.backward(&Matrix::ones(1, 1), &mut optimizer).is_err());
    }
}
