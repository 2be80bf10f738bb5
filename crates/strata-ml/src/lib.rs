//! # StrataML
//!
//! A layered feed-forward neural network engine written in pure Rust.
//!
//! ## Modules
//!
//! - **core** — Matrix engine: dense 2-D arrays with broadcasting, matmul, reductions; stable-identity parameters
//! - **loss** — Cost functions: LeastSquares, CrossEntropy, Huber, RelativeEntropy
//! - **optim** — Optimizers: Stochastic, Momentum, AdaGrad, RMSProp, Adam, AdaMax, Cyclical, StepDecay
//! - **nn** — The engine: Input/Dense/Activation layers, Softmax and Continuous outputs, initializers, the FeedForward network
//! - **data** — In-memory labeled datasets with batching and shuffling

/// Matrix engine and parameter store.
pub use strata_ml_core as core;

/// Cost functions.
pub use strata_ml_loss as loss;

/// Optimizers.
pub use strata_ml_optim as optim;

/// Neural network layers and the feed-forward engine.
pub use strata_ml_nn as nn;

/// Dataset utilities.
pub use strata_ml_data as data;
