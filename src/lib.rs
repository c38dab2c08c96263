pub mod arch;
pub mod config;
pub mod error;
pub mod linalg;
pub mod optimization;
pub mod tensor;

pub use arch::layers::{DenseLayer, LayerState, DEFAULT_LEARN_RATE};
pub use error::{MlErr, Result};
pub use linalg::{Matrix, MatrixExt, Padding};
pub use tensor::StackedMatrix;
