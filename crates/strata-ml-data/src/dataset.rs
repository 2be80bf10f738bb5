use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use strata_ml_core::{Matrix, StrataError, StrataResult};

/// An in-memory dataset of samples paired with training targets.
///
/// Samples sit one per row; targets carry the same row count with one
/// column per output feature.
pub struct Labeled {
    samples: Matrix,
    targets: Matrix,
}

impl Labeled {
    pub fn new(samples: Matrix, targets: Matrix) -> StrataResult<Self> {
        if samples.rows() != targets.rows() {
            return Err(StrataError::ShapeMismatch {
                expected: (samples.rows(), targets.cols()),
                got: targets.shape(),
            });
        }
        if samples.rows() == 0 {
            return Err(StrataError::EmptyMatrix);
        }
        Ok(Labeled { samples, targets })
    }

    pub fn samples(&self) -> &Matrix {
        &self.samples
    }

    pub fn targets(&self) -> &Matrix {
        &self.targets
    }

    pub fn len(&self) -> usize {
        self.samples.rows()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Shuffle samples and targets together, keeping rows paired.
    pub fn randomize(&mut self) {
        let mut order: Vec<usize> = (0..self.len()).collect();
        order.shuffle(&mut StdRng::from_entropy());
        self.samples = reorder(&self.samples, &order);
        self.targets = reorder(&self.targets, &order);
    }

    /// Split into consecutive batches of up to `size` rows; the final batch
    /// carries the remainder.
    pub fn batch(&self, size: usize) -> StrataResult<Vec<(Matrix, Matrix)>> {
        if size < 1 {
            return Err(StrataError::InvalidConfiguration(
                "batch size must be at least 1".into(),
            ));
        }
        let mut batches = Vec::with_capacity(self.len().div_ceil(size));
        let mut start = 0;
        while start < self.len() {
            let end = (start + size).min(self.len());
            batches.push((
                self.samples.slice_rows(start, end)?,
                self.targets.slice_rows(start, end)?,
            ));
            start = end;
        }
        Ok(batches)
    }
}

fn reorder(matrix: &Matrix, order: &[usize]) -> Matrix {
    let mut data = Vec::with_capacity(matrix.numel());
    for &i in order {
        data.extend_from_slice(matrix.row(i).expect("row in range"));
    }
    Matrix::new(matrix.rows(), matrix.cols(), data).expect("shape preserved")
}
