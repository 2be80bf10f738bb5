use std::collections::HashMap;

use strata_ml_core::{Matrix, Parameter, StrataError, StrataResult};

/// Turns a raw gradient into the additive update for one parameter.
///
/// Implementations return the delta to apply (`w_new = w_old + delta`), with
/// the descent sign already folded in. Stateful optimizers key their
/// accumulators to [`Parameter::id`] and warm them lazily with zero matrices
/// shaped like the first gradient they see for that parameter.
pub trait Optimizer {
    fn step(&mut self, param: &Parameter, gradient: &Matrix) -> Matrix;

    /// Drop all per-parameter accumulator state.
    fn reset(&mut self) {}
}

pub(crate) fn check_rate(rate: f64) -> StrataResult<()> {
    if rate <= 0.0 {
        return Err(StrataError::InvalidConfiguration(format!(
            "learning rate must be positive, got {rate}"
        )));
    }
    Ok(())
}

pub(crate) fn check_unit_interval(name: &str, value: f64) -> StrataResult<()> {
    if !(0.0..=1.0).contains(&value) {
        return Err(StrataError::InvalidConfiguration(format!(
            "{name} must lie in [0, 1], got {value}"
        )));
    }
    Ok(())
}

/// Plain stochastic gradient descent: `delta = -rate·g`.
pub struct Stochastic {
    rate: f64,
}

impl Stochastic {
    pub fn new(rate: f64) -> StrataResult<Self> {
        check_rate(rate)?;
        Ok(Stochastic { rate })
    }
}

impl Optimizer for Stochastic {
    fn step(&mut self, _param: &Parameter, gradient: &Matrix) -> Matrix {
        gradient.mul_scalar(-self.rate)
    }
}

/// Gradient descent with a decaying velocity term.
///
/// `v = decay·v - rate·g; delta = v`
pub struct Momentum {
    rate: f64,
    decay: f64,
    velocities: HashMap<usize, Matrix>,
}

impl Momentum {
    pub fn new(rate: f64, decay: f64) -> StrataResult<Self> {
        check_rate(rate)?;
        check_unit_interval("momentum decay", decay)?;
        Ok(Momentum {
            rate,
            decay,
            velocities: HashMap::new(),
        })
    }
}

impl Optimizer for Momentum {
    fn step(&mut self, param: &Parameter, gradient: &Matrix) -> Matrix {
        let velocity = self
            .velocities
            .entry(param.id())
            .or_insert_with(|| Matrix::zeros(gradient.rows(), gradient.cols()));

        *velocity = velocity
            .mul_scalar(self.decay)
            .sub(&gradient.mul_scalar(self.rate))
            .expect("velocity update");

        velocity.clone()
    }

    fn reset(&mut self) {
        self.velocities.clear();
    }
}
