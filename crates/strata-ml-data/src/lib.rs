pub mod dataset;

pub use dataset::Labeled;
