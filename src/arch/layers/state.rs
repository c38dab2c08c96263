use serde::{Deserialize, Serialize};

use crate::{Matrix, Result};

/// A snapshot of a `DenseLayer`'s parameters and optimizer state, for persistence and
/// inspection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerState {
    pub weights: Matrix,
    pub first_moment_weights: Matrix,
    pub second_moment_weights: Matrix,
    pub bias: Matrix,
    pub first_moment_bias: Matrix,
    pub second_moment_bias: Matrix,
    /// Training steps taken so far.
    pub iteration: u64,
}

impl LayerState {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
