use crate::error::StrataResult;
use crate::matrix::Matrix;

use std::sync::atomic::{AtomicUsize, Ordering};

static NEXT_ID: AtomicUsize = AtomicUsize::new(0);

/// One trainable tensor (a weight matrix or a bias row).
///
/// Every parameter carries a process-unique integer id assigned at
/// construction. Optimizers key their per-parameter accumulator state to
/// this id, so the identity survives any number of value updates.
#[derive(Debug)]
pub struct Parameter {
    id: usize,
    value: Matrix,
}

impl Parameter {
    pub fn new(value: Matrix) -> Self {
        Parameter {
            id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
            value,
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn value(&self) -> &Matrix {
        &self.value
    }

    /// Apply an additive update produced by an optimizer.
    pub fn update(&mut self, delta: &Matrix) -> StrataResult<()> {
        self.value = self.value.add(delta)?;
        Ok(())
    }
}
