use strata_ml_core::Matrix;

/// A memoized, lazily evaluated gradient computation.
///
/// Layers return these from their backward pass so the reverse walk can
/// leave a gradient uncomputed when nothing below consumes it. In a linear
/// stack that is the contribution flowing toward the input layer.
pub struct Deferred {
    thunk: Option<Box<dyn FnOnce() -> Matrix>>,
    value: Option<Matrix>,
}

impl Deferred {
    pub fn new<F>(thunk: F) -> Self
    where
        F: FnOnce() -> Matrix + 'static,
    {
        Deferred {
            thunk: Some(Box::new(thunk)),
            value: None,
        }
    }

    /// Wrap a gradient that is already evaluated.
    pub fn ready(value: Matrix) -> Self {
        Deferred {
            thunk: None,
            value: Some(value),
        }
    }

    /// Run the computation on first call; afterwards return the cached value.
    pub fn force(&mut self) -> &Matrix {
        if let Some(thunk) = self.thunk.take() {
            self.value = Some(thunk());
        }
        self.value.as_ref().expect("deferred holds a value once forced")
    }

    pub fn is_evaluated(&self) -> bool {
        self.value.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_lazy_and_memoized() {
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);

        let mut deferred = Deferred::new(move || {
            counter.set(counter.get() + 1);
            Matrix::ones(2, 2)
        });
        assert!(!deferred.is_evaluated());
        assert_eq!(calls.get(), 0);

        assert_eq!(deferred.force().sum(), 4.0);
        assert_eq!(deferred.force().sum(), 4.0);
        assert_eq!(calls.get(), 1);
        assert!(deferred.is_evaluated());
    }

    #[test]
    fn test_dropped_without_forcing_never_runs() {
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);

        let deferred = Deferred::new(move || {
            counter.set(counter.get() + 1);
            Matrix::zeros(1, 1)
        });
        drop(deferred);
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn test_ready() {
        let mut deferred = Deferred::ready(Matrix::full(1, 3, 2.0));
        assert!(deferred.is_evaluated());
        assert_eq!(deferred.force().sum(), 6.0);
    }
}
