use strata_ml_core::{Matrix, StrataError, StrataResult};

/// An element-wise nonlinearity and its derivative.
///
/// `differentiate` receives both the pre-activation input and the activated
/// output of the forward pass, so implementations can use whichever is
/// cheaper; it must equal the true derivative of `activate` at the same
/// point within floating tolerance.
pub trait ActivationFunction {
    fn activate(&self, input: &Matrix) -> Matrix;

    fn differentiate(&self, input: &Matrix, activated: &Matrix) -> Matrix;
}

fn sigmoid(x: f64) -> f64 {
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let e = x.exp();
        e / (1.0 + e)
    }
}

/// Logistic sigmoid: `f(x) = 1 / (1 + e^-x)`.
pub struct Sigmoid;

impl ActivationFunction for Sigmoid {
    fn activate(&self, input: &Matrix) -> Matrix {
        input.apply(sigmoid)
    }

    fn differentiate(&self, _input: &Matrix, activated: &Matrix) -> Matrix {
        activated.apply(|a| a * (1.0 - a))
    }
}

/// Hyperbolic tangent.
pub struct Tanh;

impl ActivationFunction for Tanh {
    fn activate(&self, input: &Matrix) -> Matrix {
        input.apply(f64::tanh)
    }

    fn differentiate(&self, _input: &Matrix, activated: &Matrix) -> Matrix {
        activated.apply(|a| 1.0 - a * a)
    }
}

/// Rectified linear unit: `f(x) = max(0, x)`.
pub struct ReLU;

impl ActivationFunction for ReLU {
    fn activate(&self, input: &Matrix) -> Matrix {
        input.apply(|x| x.max(0.0))
    }

    fn differentiate(&self, input: &Matrix, _activated: &Matrix) -> Matrix {
        input.apply(|x| if x > 0.0 { 1.0 } else { 0.0 })
    }
}

/// Leaky rectifier: `f(x) = x` for positive inputs, `leakage·x` otherwise.
pub struct LeakyReLU {
    leakage: f64,
}

impl LeakyReLU {
    pub fn new(leakage: f64) -> StrataResult<Self> {
        if !(0.0..1.0).contains(&leakage) || leakage == 0.0 {
            return Err(StrataError::InvalidConfiguration(format!(
                "leakage must lie in (0, 1), got {leakage}"
            )));
        }
        Ok(LeakyReLU { leakage })
    }
}

impl Default for LeakyReLU {
    fn default() -> Self {
        LeakyReLU { leakage: 0.1 }
    }
}

impl ActivationFunction for LeakyReLU {
    fn activate(&self, input: &Matrix) -> Matrix {
        let leakage = self.leakage;
        input.apply(|x| if x > 0.0 { x } else { leakage * x })
    }

    fn differentiate(&self, input: &Matrix, _activated: &Matrix) -> Matrix {
        let leakage = self.leakage;
        input.apply(|x| if x > 0.0 { 1.0 } else { leakage })
    }
}

/// Exponential linear unit: smooth below zero, identity above.
///
/// `f(x) = x` for `x > 0`, `α·(e^x - 1)` otherwise.
pub struct ELU {
    alpha: f64,
}

impl ELU {
    pub fn new(alpha: f64) -> StrataResult<Self> {
        if alpha <= 0.0 {
            return Err(StrataError::InvalidConfiguration(format!(
                "alpha must be positive, got {alpha}"
            )));
        }
        Ok(ELU { alpha })
    }
}

impl Default for ELU {
    fn default() -> Self {
        ELU { alpha: 1.0 }
    }
}

impl ActivationFunction for ELU {
    fn activate(&self, input: &Matrix) -> Matrix {
        let alpha = self.alpha;
        input.apply(|x| if x > 0.0 { x } else { alpha * (x.exp() - 1.0) })
    }

    fn differentiate(&self, input: &Matrix, activated: &Matrix) -> Matrix {
        // For x <= 0, f'(x) = α·e^x = f(x) + α.
        let alpha = self.alpha;
        input
            .zip(activated, |x, a| if x > 0.0 { 1.0 } else { a + alpha })
            .expect("activation shapes")
    }
}

/// Scaled exponential linear unit with the self-normalizing constants.
pub struct SELU;

const SELU_ALPHA: f64 = 1.673_263_242_354_377_2;
const SELU_SCALE: f64 = 1.050_700_987_355_480_5;

impl ActivationFunction for SELU {
    fn activate(&self, input: &Matrix) -> Matrix {
        input.apply(|x| {
            if x > 0.0 {
                SELU_SCALE * x
            } else {
                SELU_SCALE * SELU_ALPHA * (x.exp() - 1.0)
            }
        })
    }

    fn differentiate(&self, input: &Matrix, activated: &Matrix) -> Matrix {
        // For x <= 0, f'(x) = λ·α·e^x = f(x) + λ·α.
        input
            .zip(activated, |x, a| {
                if x > 0.0 {
                    SELU_SCALE
                } else {
                    a + SELU_SCALE * SELU_ALPHA
                }
            })
            .expect("activation shapes")
    }
}

/// Gaussian error linear unit (tanh approximation).
pub struct GELU;

const GELU_C: f64 = 0.797_884_560_802_865_4; // √(2/π)
const GELU_K: f64 = 0.044_715;

impl ActivationFunction for GELU {
    fn activate(&self, input: &Matrix) -> Matrix {
        input.apply(|x| 0.5 * x * (1.0 + (GELU_C * (x + GELU_K * x * x * x)).tanh()))
    }

    fn differentiate(&self, input: &Matrix, _activated: &Matrix) -> Matrix {
        input.apply(|x| {
            let t = (GELU_C * (x + GELU_K * x * x * x)).tanh();
            0.5 * (1.0 + t) + 0.5 * x * (1.0 - t * t) * GELU_C * (1.0 + 3.0 * GELU_K * x * x)
        })
    }
}

/// Smooth rectifier: `f(x) = ln(1 + e^x)`.
pub struct Softplus;

impl ActivationFunction for Softplus {
    fn activate(&self, input: &Matrix) -> Matrix {
        // max(x, 0) + ln(1 + e^-|x|) never overflows.
        input.apply(|x| x.max(0.0) + (-x.abs()).exp().ln_1p())
    }

    fn differentiate(&self, input: &Matrix, _activated: &Matrix) -> Matrix {
        input.apply(sigmoid)
    }
}

/// Polynomial squashing: `f(x) = x / (1 + |x|)`.
pub struct Softsign;

impl ActivationFunction for Softsign {
    fn activate(&self, input: &Matrix) -> Matrix {
        input.apply(|x| x / (1.0 + x.abs()))
    }

    fn differentiate(&self, input: &Matrix, _activated: &Matrix) -> Matrix {
        input.apply(|x| {
            let d = 1.0 + x.abs();
            1.0 / (d * d)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    // Sample points chosen off the rectifier kinks at zero.
    const SAMPLES: [f64; 8] = [-3.7, -1.9, -0.8, -0.15, 0.2, 0.9, 2.1, 3.8];

    fn derivative_check(f: &dyn ActivationFunction) {
        let h = 1e-5;
        let z = Matrix::new(1, SAMPLES.len(), SAMPLES.to_vec()).unwrap();
        let a = f.activate(&z);
        let analytic = f.differentiate(&z, &a);

        let plus = f.activate(&z.add_scalar(h));
        let minus = f.activate(&z.add_scalar(-h));
        for j in 0..SAMPLES.len() {
            let numeric =
                (plus.get(0, j).unwrap() - minus.get(0, j).unwrap()) / (2.0 * h);
            assert_relative_eq!(
                analytic.get(0, j).unwrap(),
                numeric,
                epsilon = 1e-5,
                max_relative = 1e-5
            );
        }
    }

    fn extremes_stay_finite(f: &dyn ActivationFunction) {
        let z = Matrix::new(1, 4, vec![-600.0, -50.0, 50.0, 600.0]).unwrap();
        let a = f.activate(&z);
        assert!(a.data().iter().all(|v| v.is_finite()), "activation overflow");
        let d = f.differentiate(&z, &a);
        assert!(d.data().iter().all(|v| v.is_finite()), "derivative overflow");
    }

    #[test]
    fn test_sigmoid() {
        let z = Matrix::new(1, 3, vec![0.0, -800.0, 800.0]).unwrap();
        let a = Sigmoid.activate(&z);
        assert_relative_eq!(a.get(0, 0).unwrap(), 0.5, epsilon = 1e-12);
        assert_relative_eq!(a.get(0, 1).unwrap(), 0.0, epsilon = 1e-12);
        assert_relative_eq!(a.get(0, 2).unwrap(), 1.0, epsilon = 1e-12);

        derivative_check(&Sigmoid);
        extremes_stay_finite(&Sigmoid);
    }

    #[test]
    fn test_tanh() {
        derivative_check(&Tanh);
        extremes_stay_finite(&Tanh);
    }

    #[test]
    fn test_relu() {
        let z = Matrix::new(1, 3, vec![-2.0, 0.0, 3.0]).unwrap();
        assert_eq!(ReLU.activate(&z).data(), &[0.0, 0.0, 3.0]);

        derivative_check(&ReLU);
        extremes_stay_finite(&ReLU);
    }

    #[test]
    fn test_leaky_relu() {
        let f = LeakyReLU::new(0.01).unwrap();
        let z = Matrix::new(1, 2, vec![-2.0, 2.0]).unwrap();
        let a = f.activate(&z);
        assert_relative_eq!(a.get(0, 0).unwrap(), -0.02, epsilon = 1e-12);
        assert_relative_eq!(a.get(0, 1).unwrap(), 2.0, epsilon = 1e-12);

        derivative_check(&f);
        derivative_check(&LeakyReLU::default());

        assert!(LeakyReLU::new(0.0).is_err());
        assert!(LeakyReLU::new(1.0).is_err());
    }

    #[test]
    fn test_elu() {
        let f = ELU::default();
        let z = Matrix::new(1, 2, vec![-1.0, 1.0]).unwrap();
        let a = f.activate(&z);
        assert_relative_eq!(a.get(0, 0).unwrap(), (-1.0f64).exp() - 1.0, epsilon = 1e-12);
        assert_relative_eq!(a.get(0, 1).unwrap(), 1.0, epsilon = 1e-12);

        derivative_check(&f);
        derivative_check(&ELU::new(0.4).unwrap());
        extremes_stay_finite(&f);

        assert!(ELU::new(0.0).is_err());
    }

    #[test]
    fn test_selu() {
        let z = Matrix::new(1, 1, vec![1.0]).unwrap();
        let a = SELU.activate(&z);
        assert_relative_eq!(a.get(0, 0).unwrap(), SELU_SCALE, epsilon = 1e-12);

        derivative_check(&SELU);
        extremes_stay_finite(&SELU);
    }

    #[test]
    fn test_gelu() {
        let z = Matrix::new(1, 5, vec![-2.0, -1.0, 0.0, 1.0, 2.0]).unwrap();
        let a = GELU.activate(&z);
        assert_relative_eq!(a.get(0, 0).unwrap(), -0.0454, epsilon = 1e-3);
        assert_relative_eq!(a.get(0, 2).unwrap(), 0.0, epsilon = 1e-12);
        assert_relative_eq!(a.get(0, 3).unwrap(), 0.8413, epsilon = 1e-3);

        derivative_check(&GELU);
        extremes_stay_finite(&GELU);
    }

    #[test]
    fn test_softplus() {
        let z = Matrix::new(1, 2, vec![0.0, 100.0]).unwrap();
        let a = Softplus.activate(&z);
        assert_relative_eq!(a.get(0, 0).unwrap(), 2.0f64.ln(), epsilon = 1e-12);
        assert_relative_eq!(a.get(0, 1).unwrap(), 100.0, epsilon = 1e-9);

        derivative_check(&Softplus);
        extremes_stay_finite(&Softplus);
    }

    #[test]
    fn test_softsign() {
        let z = Matrix::new(1, 2, vec![-3.0, 1.0]).unwrap();
        let a = Softsign.activate(&z);
        assert_relative_eq!(a.get(0, 0).unwrap(), -0.75, epsilon = 1e-12);
        assert_relative_eq!(a.get(0, 1).unwrap(), 0.5, epsilon = 1e-12);

        derivative_check(&Softsign);
        extremes_stay_finite(&Softsign);
    }
}
