use strata_ml_core::{Matrix, StrataError, StrataResult};

/// Floor applied to probabilities before a logarithm is taken.
const EPSILON: f64 = 1e-8;

/// A differentiable measure of how far a network's output is from its target.
///
/// `compute` returns the per-element loss matrix; the network reduces it to
/// a scalar by taking the mean over both the batch and feature dimensions.
/// `differentiate` returns the gradient of the loss with respect to each
/// output element.
pub trait CostFunction {
    /// Bounds of the per-element loss.
    fn range(&self) -> (f64, f64);

    fn compute(&self, output: &Matrix, target: &Matrix) -> StrataResult<Matrix>;

    fn differentiate(&self, output: &Matrix, target: &Matrix) -> StrataResult<Matrix>;
}

/// Squared error: `l = (o - t)²`.
pub struct LeastSquares;

impl CostFunction for LeastSquares {
    fn range(&self) -> (f64, f64) {
        (0.0, f64::INFINITY)
    }

    fn compute(&self, output: &Matrix, target: &Matrix) -> StrataResult<Matrix> {
        output.zip(target, |o, t| (o - t) * (o - t))
    }

    fn differentiate(&self, output: &Matrix, target: &Matrix) -> StrataResult<Matrix> {
        output.zip(target, |o, t| 2.0 * (o - t))
    }
}

/// Cross entropy over probabilistic outputs.
///
/// Outputs are clipped into `[ε, 1 - ε]` before the logarithms so that a
/// saturated probability can never produce `-∞` or `NaN`:
///
/// `l = -ô·ln(ô) - (1 - t)·ln(1 - ô)`
///
/// The gradient is the standard `(ô - t) / (ô·(1 - ô))`, which composed
/// with a sigmoid or softmax derivative collapses to the `(a - t)` delta
/// rule.
pub struct CrossEntropy;

impl CostFunction for CrossEntropy {
    fn range(&self) -> (f64, f64) {
        (0.0, f64::INFINITY)
    }

    fn compute(&self, output: &Matrix, target: &Matrix) -> StrataResult<Matrix> {
        let clipped = output.clip(EPSILON, 1.0 - EPSILON);
        clipped.zip(target, |o, t| -o * o.ln() - (1.0 - t) * (1.0 - o).ln())
    }

    fn differentiate(&self, output: &Matrix, target: &Matrix) -> StrataResult<Matrix> {
        let clipped = output.clip(EPSILON, 1.0 - EPSILON);
        clipped.zip(target, |o, t| (o - t) / (o * (1.0 - o)))
    }
}

/// Smooth Huber loss: quadratic near zero, linear for large residuals.
///
/// `l = α²·(√(1 + (r/α)²) - 1)` with `r = o - t`.
pub struct Huber {
    alpha: f64,
}

impl Huber {
    pub fn new(alpha: f64) -> StrataResult<Self> {
        if alpha <= 0.0 {
            return Err(StrataError::InvalidConfiguration(format!(
                "huber alpha must be positive, got {alpha}"
            )));
        }
        Ok(Huber { alpha })
    }
}

impl Default for Huber {
    fn default() -> Self {
        Huber { alpha: 0.9 }
    }
}

impl CostFunction for Huber {
    fn range(&self) -> (f64, f64) {
        (0.0, f64::INFINITY)
    }

    fn compute(&self, output: &Matrix, target: &Matrix) -> StrataResult<Matrix> {
        let a2 = self.alpha * self.alpha;
        output.zip(target, |o, t| {
            let r = o - t;
            a2 * ((1.0 + r * r / a2).sqrt() - 1.0)
        })
    }

    fn differentiate(&self, output: &Matrix, target: &Matrix) -> StrataResult<Matrix> {
        let a2 = self.alpha * self.alpha;
        output.zip(target, |o, t| {
            let r = o - t;
            r / (1.0 + r * r / a2).sqrt()
        })
    }
}

/// Kullback-Leibler divergence between the target and output distributions.
///
/// Both operands are clipped away from zero before the logarithm:
///
/// `l = t̂·ln(t̂ / ô)`
pub struct RelativeEntropy;

impl CostFunction for RelativeEntropy {
    fn range(&self) -> (f64, f64) {
        (f64::NEG_INFINITY, f64::INFINITY)
    }

    fn compute(&self, output: &Matrix, target: &Matrix) -> StrataResult<Matrix> {
        let output = output.clip(EPSILON, 1.0);
        let target = target.clip(EPSILON, 1.0);
        target.zip(&output, |t, o| t * (t / o).ln())
    }

    fn differentiate(&self, output: &Matrix, target: &Matrix) -> StrataResult<Matrix> {
        let output = output.clip(EPSILON, 1.0);
        let target = target.clip(EPSILON, 1.0);
        target.zip(&output, |t, o| -t / o)
    }
}
