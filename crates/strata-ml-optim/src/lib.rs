pub mod adaptive;
pub mod annealing;
pub mod optimizer;

pub use adaptive::{AdaGrad, AdaMax, Adam, RmsProp};
pub use annealing::{Cyclical, StepDecay};
pub use optimizer::{Momentum, Optimizer, Stochastic};
