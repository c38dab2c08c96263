mod dense;
mod state;

pub use dense::{DenseLayer, DEFAULT_LEARN_RATE};
pub use state::LayerState;
