use strata_ml_core::{Matrix, Parameter, StrataError, StrataResult};
use strata_ml_optim::Optimizer;

use crate::deferred::Deferred;
use crate::layers::{Hidden, Layer};

/// The placeholder stage at the bottom of the stack.
///
/// Forward is the identity after checking that the batch carries the
/// declared number of features; backward hands the upstream gradient
/// straight through and is never forced in practice.
pub struct Input {
    width: usize,
}

impl Input {
    pub fn new(width: usize) -> StrataResult<Self> {
        if width < 1 {
            return Err(StrataError::InvalidConfiguration(format!(
                "input width must be at least 1, got {width}"
            )));
        }
        Ok(Input { width })
    }

    fn check(&self, batch: &Matrix) -> StrataResult<()> {
        if batch.cols() != self.width {
            return Err(StrataError::DimensionMismatch {
                expected: self.width,
                got: batch.cols(),
            });
        }
        Ok(())
    }
}

impl Layer for Input {
    fn width(&self) -> usize {
        self.width
    }

    fn initialize(&mut self, _fan_in: usize) -> StrataResult<usize> {
        Ok(self.width)
    }

    fn forward(&mut self, input: &Matrix) -> StrataResult<Matrix> {
        self.check(input)?;
        Ok(input.clone())
    }

    fn infer(&self, input: &Matrix) -> StrataResult<Matrix> {
        self.check(input)?;
        Ok(input.clone())
    }

    fn parameters(&self) -> Vec<&Parameter> {
        Vec::new()
    }
}

impl Hidden for Input {
    fn backward(
        &mut self,
        gradient: &Matrix,
        _optimizer: &mut dyn Optimizer,
    ) -> StrataResult<Deferred> {
        Ok(Deferred::ready(gradient.clone()))
    }
}
