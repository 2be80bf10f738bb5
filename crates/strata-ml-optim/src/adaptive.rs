use std::collections::HashMap;

use strata_ml_core::{Matrix, Parameter, StrataResult};

use crate::optimizer::{check_rate, check_unit_interval, Optimizer};

/// Keeps adaptive denominators away from zero.
const EPSILON: f64 = 1e-8;

/// Per-parameter learning rates from the full squared-gradient history.
///
/// `g2 += g²; delta = -rate·g / (√g2 + ε)`
pub struct AdaGrad {
    rate: f64,
    cache: HashMap<usize, Matrix>,
}

impl AdaGrad {
    pub fn new(rate: f64) -> StrataResult<Self> {
        check_rate(rate)?;
        Ok(AdaGrad {
            rate,
            cache: HashMap::new(),
        })
    }
}

impl Optimizer for AdaGrad {
    fn step(&mut self, param: &Parameter, gradient: &Matrix) -> Matrix {
        let g2 = self
            .cache
            .entry(param.id())
            .or_insert_with(|| Matrix::zeros(gradient.rows(), gradient.cols()));

        *g2 = g2
            .add(&gradient.mul(gradient).expect("gradient squared"))
            .expect("squared gradient accumulate");

        gradient
            .div(&g2.sqrt().add_scalar(EPSILON))
            .expect("adagrad delta")
            .mul_scalar(-self.rate)
    }

    fn reset(&mut self) {
        self.cache.clear();
    }
}

/// Like AdaGrad but with an exponentially decaying squared-gradient window.
///
/// `g2 = decay·g2 + (1 - decay)·g²; delta = -rate·g / (√g2 + ε)`
pub struct RmsProp {
    rate: f64,
    decay: f64,
    cache: HashMap<usize, Matrix>,
}

impl RmsProp {
    pub fn new(rate: f64, decay: f64) -> StrataResult<Self> {
        check_rate(rate)?;
        check_unit_interval("rms decay", decay)?;
        Ok(RmsProp {
            rate,
            decay,
            cache: HashMap::new(),
        })
    }
}

impl Optimizer for RmsProp {
    fn step(&mut self, param: &Parameter, gradient: &Matrix) -> Matrix {
        let g2 = self
            .cache
            .entry(param.id())
            .or_insert_with(|| Matrix::zeros(gradient.rows(), gradient.cols()));

        let squared = gradient.mul(gradient).expect("gradient squared");
        *g2 = g2
            .mul_scalar(self.decay)
            .add(&squared.mul_scalar(1.0 - self.decay))
            .expect("squared gradient window");

        gradient
            .div(&g2.sqrt().add_scalar(EPSILON))
            .expect("rmsprop delta")
            .mul_scalar(-self.rate)
    }

    fn reset(&mut self) {
        self.cache.clear();
    }
}

/// First- and second-moment estimation.
///
/// `m = β1·m + (1-β1)·g; v = β2·v + (1-β2)·g²; delta = -rate·m / (√v + ε)`
pub struct Adam {
    rate: f64,
    beta1: f64,
    beta2: f64,
    moments: HashMap<usize, (Matrix, Matrix)>,
}

impl Adam {
    pub fn new(rate: f64, beta1: f64, beta2: f64) -> StrataResult<Self> {
        check_rate(rate)?;
        check_unit_interval("beta1", beta1)?;
        check_unit_interval("beta2", beta2)?;
        Ok(Adam {
            rate,
            beta1,
            beta2,
            moments: HashMap::new(),
        })
    }
}

impl Optimizer for Adam {
    fn step(&mut self, param: &Parameter, gradient: &Matrix) -> Matrix {
        let (m, v) = self.moments.entry(param.id()).or_insert_with(|| {
            (
                Matrix::zeros(gradient.rows(), gradient.cols()),
                Matrix::zeros(gradient.rows(), gradient.cols()),
            )
        });

        *m = m
            .mul_scalar(self.beta1)
            .add(&gradient.mul_scalar(1.0 - self.beta1))
            .expect("first moment update");

        let squared = gradient.mul(gradient).expect("gradient squared");
        *v = v
            .mul_scalar(self.beta2)
            .add(&squared.mul_scalar(1.0 - self.beta2))
            .expect("second moment update");

        m.div(&v.sqrt().add_scalar(EPSILON))
            .expect("adam delta")
            .mul_scalar(-self.rate)
    }

    fn reset(&mut self) {
        self.moments.clear();
    }
}

/// Adam variant normalizing by the infinity norm of the gradient history.
///
/// `m = β1·m + (1-β1)·g; u = max(β2·u, |g|); delta = -rate·m / (u + ε)`
pub struct AdaMax {
    rate: f64,
    beta1: f64,
    beta2: f64,
    moments: HashMap<usize, (Matrix, Matrix)>,
}

impl AdaMax {
    pub fn new(rate: f64, beta1: f64, beta2: f64) -> StrataResult<Self> {
        check_rate(rate)?;
        check_unit_interval("beta1", beta1)?;
        check_unit_interval("beta2", beta2)?;
        Ok(AdaMax {
            rate,
            beta1,
            beta2,
            moments: HashMap::new(),
        })
    }
}

impl Optimizer for AdaMax {
    fn step(&mut self, param: &Parameter, gradient: &Matrix) -> Matrix {
        let (m, u) = self.moments.entry(param.id()).or_insert_with(|| {
            (
                Matrix::zeros(gradient.rows(), gradient.cols()),
                Matrix::zeros(gradient.rows(), gradient.cols()),
            )
        });

        *m = m
            .mul_scalar(self.beta1)
            .add(&gradient.mul_scalar(1.0 - self.beta1))
            .expect("first moment update");

        *u = u
            .mul_scalar(self.beta2)
            .maximum(&gradient.abs())
            .expect("infinity norm update");

        m.div(&u.add_scalar(EPSILON))
            .expect("adamax delta")
            .mul_scalar(-self.rate)
    }

    fn reset(&mut self) {
        self.moments.clear();
    }
}
