pub mod cost;

pub use cost::{CostFunction, CrossEntropy, Huber, LeastSquares, RelativeEntropy};
