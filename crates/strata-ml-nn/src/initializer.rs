use strata_ml_core::{Matrix, StrataError, StrataResult};

/// Produces a starting weight matrix of shape `[fan_out, fan_in]`.
///
/// The distribution constants are part of the contract; downstream
/// convergence behavior depends on them.
pub trait Initializer {
    fn initialize(&self, fan_in: usize, fan_out: usize) -> StrataResult<Matrix>;
}

fn check_fans(fan_in: usize, fan_out: usize) -> StrataResult<()> {
    if fan_in < 1 || fan_out < 1 {
        return Err(StrataError::InvalidConfiguration(format!(
            "fan in and fan out must be at least 1, got ({fan_in}, {fan_out})"
        )));
    }
    Ok(())
}

/// Glorot uniform: values drawn from `±√(6 / (fan_in + fan_out))`.
pub struct Xavier;

impl Initializer for Xavier {
    fn initialize(&self, fan_in: usize, fan_out: usize) -> StrataResult<Matrix> {
        check_fans(fan_in, fan_out)?;
        let limit = (6.0 / (fan_in + fan_out) as f64).sqrt();
        Ok(Matrix::rand(fan_out, fan_in, None)
            .mul_scalar(2.0 * limit)
            .add_scalar(-limit))
    }
}

/// Kaiming normal: std `√(2 / fan_in)`, suited to rectified units.
pub struct He;

impl Initializer for He {
    fn initialize(&self, fan_in: usize, fan_out: usize) -> StrataResult<Matrix> {
        check_fans(fan_in, fan_out)?;
        let std = (2.0 / fan_in as f64).sqrt();
        Ok(Matrix::randn(fan_out, fan_in, None).mul_scalar(std))
    }
}

/// LeCun normal: std `√(1 / fan_in)`.
pub struct LeCun;

impl Initializer for LeCun {
    fn initialize(&self, fan_in: usize, fan_out: usize) -> StrataResult<Matrix> {
        check_fans(fan_in, fan_out)?;
        let std = (1.0 / fan_in as f64).sqrt();
        Ok(Matrix::randn(fan_out, fan_in, None).mul_scalar(std))
    }
}

/// Gaussian with a caller-chosen standard deviation.
pub struct Normal {
    std: f64,
}

impl Normal {
    pub fn new(std: f64) -> StrataResult<Self> {
        if std <= 0.0 {
            return Err(StrataError::InvalidConfiguration(format!(
                "standard deviation must be positive, got {std}"
            )));
        }
        Ok(Normal { std })
    }
}

impl Initializer for Normal {
    fn initialize(&self, fan_in: usize, fan_out: usize) -> StrataResult<Matrix> {
        check_fans(fan_in, fan_out)?;
        Ok(Matrix::randn(fan_out, fan_in, None).mul_scalar(self.std))
    }
}

/// Uniform over `±beta`.
pub struct Uniform {
    beta: f64,
}

impl Uniform {
    pub fn new(beta: f64) -> StrataResult<Self> {
        if beta <= 0.0 {
            return Err(StrataError::InvalidConfiguration(format!(
                "beta must be positive, got {beta}"
            )));
        }
        Ok(Uniform { beta })
    }
}

impl Default for Uniform {
    fn default() -> Self {
        Uniform { beta: 0.5 }
    }
}

impl Initializer for Uniform {
    fn initialize(&self, fan_in: usize, fan_out: usize) -> StrataResult<Matrix> {
        check_fans(fan_in, fan_out)?;
        Ok(Matrix::rand(fan_out, fan_in, None)
            .mul_scalar(2.0 * self.beta)
            .add_scalar(-self.beta))
    }
}

/// Every weight set to the same value.
pub struct Constant {
    value: f64,
}

impl Constant {
    pub fn new(value: f64) -> StrataResult<Self> {
        if !value.is_finite() {
            return Err(StrataError::InvalidConfiguration(format!(
                "constant must be finite, got {value}"
            )));
        }
        Ok(Constant { value })
    }
}

impl Initializer for Constant {
    fn initialize(&self, fan_in: usize, fan_out: usize) -> StrataResult<Matrix> {
        check_fans(fan_in, fan_out)?;
        Ok(Matrix::full(fan_out, fan_in, self.value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shapes() {
        for init in [
            Box::new(Xavier) as Box<dyn Initializer>,
            Box::new(He),
            Box::new(LeCun),
            Box::new(Normal::new(0.05).unwrap()),
            Box::new(Uniform::default()),
            Box::new(Constant::new(0.1).unwrap()),
        ] {
            let w = init.initialize(4, 3).unwrap();
            assert_eq!(w.shape(), (3, 4));
        }
    }

    #[test]
    fn test_rejects_zero_fans() {
        assert!(Xavier.initialize(0, 3).is_err());
        assert!(He.initialize(4, 0).is_err());
    }

    #[test]
    fn test_xavier_bounds() {
        let w = Xavier.initialize(50, 100).unwrap();
        assert_eq!(w.shape(), (100, 50));

        let limit: f64 = (6.0 / 150.0_f64).sqrt();
        assert!(w.data().iter().all(|&v| v.abs() <= limit));

        // The draw should fill the interval roughly uniformly: both halves
        // and both tails must be populated.
        let n = w.numel() as f64;
        let negative = w.data().iter().filter(|&&v| v < 0.0).count() as f64;
        assert!((negative / n - 0.5).abs() < 0.05);
        let outer = w.data().iter().filter(|&&v| v.abs() > limit / 2.0).count() as f64;
        assert!((outer / n - 0.5).abs() < 0.05);
    }

    #[test]
    fn test_uniform_bounds() {
        let w = Uniform::new(0.2).unwrap().initialize(10, 10).unwrap();
        assert!(w.data().iter().all(|&v| v.abs() <= 0.2));
        assert!(Uniform::new(-0.5).is_err());
    }

    #[test]
    fn test_constant() {
        let w = Constant::new(0.25).unwrap().initialize(2, 3).unwrap();
        assert!(w.data().iter().all(|&v| v == 0.25));
        assert!(Constant::new(f64::NAN).is_err());
    }

    #[test]
    fn test_he_spread() {
        let w = He.initialize(200, 200).unwrap();
        let mean = w.mean();
        let var = w.apply(|v| (v - mean) * (v - mean)).mean();
        assert!((var - 2.0 / 200.0).abs() < 0.002, "var = {var}");
    }
}
