use ndarray::Zip;

use super::{optimizer::check_moments, MomentStep, Optimizer};
use crate::{Matrix, Result};

/// RMSProp: the gradient is divided by a running root mean square of its past values, kept in the
/// second-moment accumulator.
#[derive(Debug, Clone, Copy)]
pub struct RmsProp {
    beta: f32,
    epsilon: f32,
}

impl RmsProp {
    /// Creates a new `RmsProp` optimizer.
    ///
    /// # Arguments
    /// * `beta` - The decay rate of the squared gradient average.
    /// * `epsilon` - Added to the denominator to avoid dividing by zero.
    pub fn new(beta: f32, epsilon: f32) -> Self {
        Self { beta, epsilon }
    }
}

impl Default for RmsProp {
    fn default() -> Self {
        Self::new(0.9, 1e-8)
    }
}

impl Optimizer for RmsProp {
    fn step(&self, first: &Matrix, second: &Matrix, grad: &Matrix, _: u64) -> Result<MomentStep> {
        check_moments(first, second, grad)?;

        let Self { beta, epsilon: eps } = *self;
        let second = Zip::from(second)
            .and(grad)
            .map_collect(|&s, &g| beta * s + (1. - beta) * g * g);

        let adjusted = Zip::from(grad)
            .and(&second)
            .map_collect(|&g, &s| g / (s.sqrt() + eps));

        Ok(MomentStep {
            first: first.clone(),
            second,
            adjusted,
        })
    }
}
