use std::collections::HashMap;

use strata_ml_core::{Matrix, Parameter, StrataError, StrataResult};

use crate::optimizer::{check_rate, check_unit_interval, Optimizer};

/// Triangular cyclical learning rate.
///
/// The rate climbs linearly from `lower` to `upper` over `steps` updates,
/// falls back to `lower` over the next `steps`, and repeats. Each parameter
/// keeps its own phase counter.
pub struct Cyclical {
    lower: f64,
    upper: f64,
    steps: usize,
    counters: HashMap<usize, usize>,
}

impl Cyclical {
    pub fn new(lower: f64, upper: f64, steps: usize) -> StrataResult<Self> {
        check_rate(lower)?;
        if upper < lower {
            return Err(StrataError::InvalidConfiguration(format!(
                "upper rate {upper} must not be below lower rate {lower}"
            )));
        }
        if steps < 1 {
            return Err(StrataError::InvalidConfiguration(
                "cycle must span at least one step".into(),
            ));
        }
        Ok(Cyclical {
            lower,
            upper,
            steps,
            counters: HashMap::new(),
        })
    }

    fn rate_at(&self, step: usize) -> f64 {
        let t = step as f64 / self.steps as f64;
        let cycle = (1.0 + t / 2.0).floor();
        let x = (t - 2.0 * cycle + 1.0).abs();
        self.lower + (self.upper - self.lower) * (1.0 - x).max(0.0)
    }
}

impl Optimizer for Cyclical {
    fn step(&mut self, param: &Parameter, gradient: &Matrix) -> Matrix {
        let counter = self.counters.entry(param.id()).or_insert(0);
        let step = *counter;
        *counter += 1;
        let rate = self.rate_at(step);
        gradient.mul_scalar(-rate)
    }

    fn reset(&mut self) {
        self.counters.clear();
    }
}

/// Stepwise learning rate decay.
///
/// The base rate is multiplied by `decay` once every `n` updates:
/// `rate_t = rate·decay^⌊t/n⌋`. Each parameter keeps its own step counter.
pub struct StepDecay {
    rate: f64,
    n: usize,
    decay: f64,
    counters: HashMap<usize, usize>,
}

impl StepDecay {
    pub fn new(rate: f64, n: usize, decay: f64) -> StrataResult<Self> {
        check_rate(rate)?;
        check_unit_interval("decay factor", decay)?;
        if n < 1 {
            return Err(StrataError::InvalidConfiguration(
                "decay interval must be at least one step".into(),
            ));
        }
        Ok(StepDecay {
            rate,
            n,
            decay,
            counters: HashMap::new(),
        })
    }
}

impl Optimizer for StepDecay {
    fn step(&mut self, param: &Parameter, gradient: &Matrix) -> Matrix {
        let counter = self.counters.entry(param.id()).or_insert(0);
        let rate = self.rate * self.decay.powi((*counter / self.n) as i32);
        *counter += 1;
        gradient.mul_scalar(-rate)
    }

    fn reset(&mut self) {
        self.counters.clear();
    }
}
