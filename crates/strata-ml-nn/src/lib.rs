pub mod activation;
pub mod deferred;
pub mod initializer;
pub mod layers;
pub mod network;

pub use activation::{
    ActivationFunction, Sigmoid, Softplus, Softsign, Tanh, ELU, GELU, SELU,
    LeakyReLU, ReLU,
};
pub use deferred::Deferred;
pub use initializer::{Constant, He, Initializer, LeCun, Normal, Uniform, Xavier};
pub use layers::{Activation, Continuous, Dense, Hidden, Input, Layer, Output, Softmax};
pub use network::FeedForward;
