use crate::error::{StrataError, StrataResult};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Dense 2-D matrix of `f64` — the numeric substrate of StrataML.
///
/// Stores data in a flat contiguous `Vec<f64>` with row-major layout.
/// Batches are laid out one sample per row, one feature per column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

// ─── Construction ───────────────────────────────────────────────────────────

impl Matrix {
    /// Create a matrix from raw row-major data.
    pub fn new(rows: usize, cols: usize, data: Vec<f64>) -> StrataResult<Self> {
        if data.len() != rows * cols {
            return Err(StrataError::ShapeMismatch {
                expected: (rows, cols),
                got: (data.len(), 1),
            });
        }
        Ok(Matrix { rows, cols, data })
    }

    /// Matrix filled with zeros.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Matrix {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    /// Matrix filled with ones.
    pub fn ones(rows: usize, cols: usize) -> Self {
        Matrix {
            rows,
            cols,
            data: vec![1.0; rows * cols],
        }
    }

    /// Matrix filled with a constant value.
    pub fn full(rows: usize, cols: usize, value: f64) -> Self {
        Matrix {
            rows,
            cols,
            data: vec![value; rows * cols],
        }
    }

    /// Build a matrix from nested row slices.
    pub fn from_rows(rows: &[Vec<f64>]) -> StrataResult<Self> {
        if rows.is_empty() {
            return Err(StrataError::EmptyMatrix);
        }
        let cols = rows[0].len();
        for row in rows {
            if row.len() != cols {
                return Err(StrataError::ShapeMismatch {
                    expected: (rows.len(), cols),
                    got: (rows.len(), row.len()),
                });
            }
        }
        let data: Vec<f64> = rows.iter().flat_map(|r| r.iter().copied()).collect();
        Matrix::new(rows.len(), cols, data)
    }

    /// Random matrix with uniform values in [0, 1).
    pub fn rand(rows: usize, cols: usize, seed: Option<u64>) -> Self {
        let mut rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        let data: Vec<f64> = (0..rows * cols).map(|_| rng.gen::<f64>()).collect();
        Matrix { rows, cols, data }
    }

    /// Random matrix with standard normal values (Box-Muller transform).
    pub fn randn(rows: usize, cols: usize, seed: Option<u64>) -> Self {
        let mut rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        let n = rows * cols;
        let mut data = Vec::with_capacity(n);

        let mut i = 0;
        while i < n {
            let u1: f64 = rng.gen::<f64>().max(1e-10);
            let u2: f64 = rng.gen::<f64>();
            let r = (-2.0 * u1.ln()).sqrt();
            let theta = 2.0 * std::f64::consts::PI * u2;
            data.push(r * theta.cos());
            if i + 1 < n {
                data.push(r * theta.sin());
            }
            i += 2;
        }
        data.truncate(n);
        Matrix { rows, cols, data }
    }

    // ─── Accessors ──────────────────────────────────────────────────────────

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn numel(&self) -> usize {
        self.data.len()
    }

    pub fn data(&self) -> &[f64] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [f64] {
        &mut self.data
    }

    pub fn get(&self, row: usize, col: usize) -> StrataResult<f64> {
        self.offset(row, col).map(|i| self.data[i])
    }

    pub fn set(&mut self, row: usize, col: usize, value: f64) -> StrataResult<()> {
        let i = self.offset(row, col)?;
        self.data[i] = value;
        Ok(())
    }

    /// Borrow one row as a slice.
    pub fn row(&self, row: usize) -> StrataResult<&[f64]> {
        if row >= self.rows {
            return Err(StrataError::IndexOutOfBounds {
                row,
                col: 0,
                rows: self.rows,
                cols: self.cols,
            });
        }
        Ok(&self.data[row * self.cols..(row + 1) * self.cols])
    }

    /// Copy out rows `start..end`.
    pub fn slice_rows(&self, start: usize, end: usize) -> StrataResult<Matrix> {
        if start >= end || end > self.rows {
            return Err(StrataError::IndexOutOfBounds {
                row: end,
                col: 0,
                rows: self.rows,
                cols: self.cols,
            });
        }
        let data = self.data[start * self.cols..end * self.cols].to_vec();
        Matrix::new(end - start, self.cols, data)
    }

    fn offset(&self, row: usize, col: usize) -> StrataResult<usize> {
        if row >= self.rows || col >= self.cols {
            return Err(StrataError::IndexOutOfBounds {
                row,
                col,
                rows: self.rows,
                cols: self.cols,
            });
        }
        Ok(row * self.cols + col)
    }

    // ─── Element-wise Unary Operations ──────────────────────────────────────

    pub fn apply<F: Fn(f64) -> f64>(&self, f: F) -> Matrix {
        Matrix {
            rows: self.rows,
            cols: self.cols,
            data: self.data.iter().map(|&x| f(x)).collect(),
        }
    }

    pub fn abs(&self) -> Matrix {
        self.apply(f64::abs)
    }

    pub fn sqrt(&self) -> Matrix {
        self.apply(f64::sqrt)
    }

    /// Clamp every element into [min, max].
    pub fn clip(&self, min: f64, max: f64) -> Matrix {
        self.apply(|x| x.max(min).min(max))
    }

    // ─── Scalar Operations ──────────────────────────────────────────────────

    pub fn add_scalar(&self, s: f64) -> Matrix {
        self.apply(|x| x + s)
    }

    pub fn sub_scalar(&self, s: f64) -> Matrix {
        self.apply(|x| x - s)
    }

    pub fn mul_scalar(&self, s: f64) -> Matrix {
        self.apply(|x| x * s)
    }

    pub fn div_scalar(&self, s: f64) -> Matrix {
        self.apply(|x| x / s)
    }

    // ─── Element-wise Binary Operations ─────────────────────────────────────

    /// Combine two same-shape matrices element by element.
    pub fn zip<F: Fn(f64, f64) -> f64>(&self, other: &Matrix, f: F) -> StrataResult<Matrix> {
        if self.shape() != other.shape() {
            return Err(StrataError::ShapeMismatch {
                expected: self.shape(),
                got: other.shape(),
            });
        }
        let data: Vec<f64> = self
            .data
            .iter()
            .zip(other.data.iter())
            .map(|(&a, &b)| f(a, b))
            .collect();
        Ok(Matrix {
            rows: self.rows,
            cols: self.cols,
            data,
        })
    }

    fn binary_op<F: Fn(f64, f64) -> f64>(&self, other: &Matrix, op: F) -> StrataResult<Matrix> {
        if self.shape() == other.shape() {
            return self.zip(other, op);
        }
        // Row broadcast: rhs is a single row repeated over the batch.
        if other.rows == 1 && other.cols == self.cols {
            let data: Vec<f64> = self
                .data
                .iter()
                .enumerate()
                .map(|(i, &a)| op(a, other.data[i % self.cols]))
                .collect();
            return Ok(Matrix {
                rows: self.rows,
                cols: self.cols,
                data,
            });
        }
        Err(StrataError::ShapeMismatch {
            expected: self.shape(),
            got: other.shape(),
        })
    }

    pub fn add(&self, other: &Matrix) -> StrataResult<Matrix> {
        self.binary_op(other, |a, b| a + b)
    }

    pub fn sub(&self, other: &Matrix) -> StrataResult<Matrix> {
        self.binary_op(other, |a, b| a - b)
    }

    pub fn mul(&self, other: &Matrix) -> StrataResult<Matrix> {
        self.binary_op(other, |a, b| a * b)
    }

    pub fn div(&self, other: &Matrix) -> StrataResult<Matrix> {
        self.binary_op(other, |a, b| a / b)
    }

    /// Element-wise maximum of two same-shape matrices.
    pub fn maximum(&self, other: &Matrix) -> StrataResult<Matrix> {
        self.zip(other, f64::max)
    }

    // ─── Matrix Multiply / Transpose ────────────────────────────────────────

    pub fn matmul(&self, other: &Matrix) -> StrataResult<Matrix> {
        if self.cols != other.rows {
            return Err(StrataError::ShapeMismatch {
                expected: (self.cols, other.cols),
                got: other.shape(),
            });
        }
        let (m, k, n) = (self.rows, self.cols, other.cols);
        let mut data = vec![0.0; m * n];
        for i in 0..m {
            for p in 0..k {
                let a = self.data[i * k + p];
                if a == 0.0 {
                    continue;
                }
                for j in 0..n {
                    data[i * n + j] += a * other.data[p * n + j];
                }
            }
        }
        Matrix::new(m, n, data)
    }

    pub fn transpose(&self) -> Matrix {
        let mut data = vec![0.0; self.numel()];
        for i in 0..self.rows {
            for j in 0..self.cols {
                data[j * self.rows + i] = self.data[i * self.cols + j];
            }
        }
        Matrix {
            rows: self.cols,
            cols: self.rows,
            data,
        }
    }

    // ─── Reductions ─────────────────────────────────────────────────────────

    /// Sum of all elements.
    pub fn sum(&self) -> f64 {
        self.data.iter().sum()
    }

    /// Mean of all elements.
    pub fn mean(&self) -> f64 {
        self.sum() / self.numel() as f64
    }

    /// Sum along an axis: 0 collapses rows to `1×cols`, 1 collapses columns
    /// to `rows×1`.
    pub fn sum_axis(&self, axis: usize) -> StrataResult<Matrix> {
        match axis {
            0 => {
                let mut data = vec![0.0; self.cols];
                for i in 0..self.rows {
                    for j in 0..self.cols {
                        data[j] += self.data[i * self.cols + j];
                    }
                }
                Matrix::new(1, self.cols, data)
            }
            1 => {
                let mut data = vec![0.0; self.rows];
                for i in 0..self.rows {
                    for j in 0..self.cols {
                        data[i] += self.data[i * self.cols + j];
                    }
                }
                Matrix::new(self.rows, 1, data)
            }
            _ => Err(StrataError::InvalidOperation(format!(
                "sum_axis requires axis 0 or 1, got {axis}"
            ))),
        }
    }

    // ─── Softmax ────────────────────────────────────────────────────────────

    /// Row-wise softmax with max-subtraction for numerical stability.
    pub fn softmax(&self) -> Matrix {
        let mut data = self.data.clone();
        for i in 0..self.rows {
            let start = i * self.cols;
            let end = start + self.cols;
            let max = data[start..end]
                .iter()
                .copied()
                .fold(f64::NEG_INFINITY, f64::max);
            let mut sum = 0.0;
            for v in &mut data[start..end] {
                *v = (*v - max).exp();
                sum += *v;
            }
            for v in &mut data[start..end] {
                *v /= sum;
            }
        }
        Matrix {
            rows: self.rows,
            cols: self.cols,
            data,
        }
    }
}

// ─── Display ────────────────────────────────────────────────────────────────

impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "matrix([")?;
        for i in 0..self.rows.min(8) {
            write!(f, "  [")?;
            for j in 0..self.cols.min(8) {
                if j > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{:.4}", self.data[i * self.cols + j])?;
            }
            if self.cols > 8 {
                write!(f, ", ...")?;
            }
            writeln!(f, "],")?;
        }
        if self.rows > 8 {
            writeln!(f, "  ...")?;
        }
        write!(f, "], shape=({}, {}))", self.rows, self.cols)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_creation() {
        let m = Matrix::zeros(3, 4);
        assert_eq!(m.shape(), (3, 4));
        assert_eq!(m.numel(), 12);
        assert_eq!(m.data()[0], 0.0);

        let m = Matrix::ones(2, 3);
        assert_eq!(m.sum(), 6.0);

        assert!(Matrix::new(2, 2, vec![1.0, 2.0, 3.0]).is_err());
    }

    #[test]
    fn test_from_rows() {
        let m = Matrix::from_rows(&[vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]).unwrap();
        assert_eq!(m.shape(), (2, 3));
        assert_eq!(m.get(1, 2).unwrap(), 6.0);

        assert!(Matrix::from_rows(&[vec![1.0], vec![1.0, 2.0]]).is_err());
    }

    #[test]
    fn test_arithmetic() {
        let a = Matrix::new(2, 2, vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        let b = Matrix::new(2, 2, vec![5.0, 6.0, 7.0, 8.0]).unwrap();
        assert_eq!(a.add(&b).unwrap().data(), &[6.0, 8.0, 10.0, 12.0]);
        assert_eq!(a.sub(&b).unwrap().data(), &[-4.0, -4.0, -4.0, -4.0]);
        assert_eq!(a.mul(&b).unwrap().data(), &[5.0, 12.0, 21.0, 32.0]);
    }

    #[test]
    fn test_row_broadcast() {
        let a = Matrix::new(2, 3, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        let bias = Matrix::new(1, 3, vec![10.0, 20.0, 30.0]).unwrap();
        let c = a.add(&bias).unwrap();
        assert_eq!(c.data(), &[11.0, 22.0, 33.0, 14.0, 25.0, 36.0]);

        let bad = Matrix::new(1, 2, vec![1.0, 2.0]).unwrap();
        assert!(a.add(&bad).is_err());
    }

    #[test]
    fn test_matmul() {
        let a = Matrix::new(2, 3, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        let b = Matrix::new(3, 2, vec![7.0, 8.0, 9.0, 10.0, 11.0, 12.0]).unwrap();
        let c = a.matmul(&b).unwrap();
        assert_eq!(c.shape(), (2, 2));
        assert_eq!(c.data(), &[58.0, 64.0, 139.0, 154.0]);

        assert!(b.matmul(&c).is_err());
    }

    #[test]
    fn test_transpose() {
        let a = Matrix::new(2, 3, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        let t = a.transpose();
        assert_eq!(t.shape(), (3, 2));
        assert_eq!(t.data(), &[1.0, 4.0, 2.0, 5.0, 3.0, 6.0]);
        assert_eq!(t.transpose(), a);
    }

    #[test]
    fn test_sum_axis() {
        let a = Matrix::new(2, 3, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        let s0 = a.sum_axis(0).unwrap();
        assert_eq!(s0.shape(), (1, 3));
        assert_eq!(s0.data(), &[5.0, 7.0, 9.0]);

        let s1 = a.sum_axis(1).unwrap();
        assert_eq!(s1.shape(), (2, 1));
        assert_eq!(s1.data(), &[6.0, 15.0]);

        assert!(a.sum_axis(2).is_err());
    }

    #[test]
    fn test_softmax() {
        let a = Matrix::new(2, 3, vec![1.0, 2.0, 3.0, 1000.0, 1000.0, 1000.0]).unwrap();
        let sm = a.softmax();
        let first: f64 = sm.row(0).unwrap().iter().sum();
        assert_relative_eq!(first, 1.0, epsilon = 1e-12);
        // Large inputs must not overflow into NaN.
        for &v in sm.row(1).unwrap() {
            assert_relative_eq!(v, 1.0 / 3.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_clip() {
        let a = Matrix::new(1, 4, vec![-1.0, 0.25, 0.75, 2.0]).unwrap();
        assert_eq!(a.clip(0.0, 1.0).data(), &[0.0, 0.25, 0.75, 1.0]);
    }

    #[test]
    fn test_slice_rows() {
        let a = Matrix::new(3, 2, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        let s = a.slice_rows(1, 3).unwrap();
        assert_eq!(s.shape(), (2, 2));
        assert_eq!(s.data(), &[3.0, 4.0, 5.0, 6.0]);
        assert!(a.slice_rows(2, 2).is_err());
    }

    #[test]
    fn test_rand_bounds() {
        let m = Matrix::rand(10, 10, Some(42));
        assert!(m.data().iter().all(|&v| (0.0..1.0).contains(&v)));
        // Same seed reproduces the same draw.
        assert_eq!(m, Matrix::rand(10, 10, Some(42)));
    }

    #[test]
    fn test_randn_moments() {
        let m = Matrix::randn(100, 100, Some(7));
        let mean = m.mean();
        let var = m.apply(|v| (v - mean) * (v - mean)).mean();
        assert!(mean.abs() < 0.05, "mean = {mean}");
        assert!((var - 1.0).abs() < 0.05, "var = {var}");
    }
}
