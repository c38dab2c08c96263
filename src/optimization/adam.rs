use ndarray::Zip;

use super::{optimizer::check_moments, MomentStep, Optimizer};
use crate::{Matrix, Result};

/// Adam: bias-corrected running averages of the gradient and of its square.
#[derive(Debug, Clone, Copy)]
pub struct Adam {
    beta1: f32,
    beta2: f32,
    epsilon: f32,
}

impl Adam {
    /// Creates a new `Adam` optimizer.
    ///
    /// # Arguments
    /// * `beta1`, `beta2`, `epsilon` - Hyperparameters to the optimization algorithm.
    ///
    /// # Returns
    /// A new `Adam` instance.
    pub fn new(beta1: f32, beta2: f32, epsilon: f32) -> Self {
        Self {
            beta1,
            beta2,
            epsilon,
        }
    }
}

impl Default for Adam {
    fn default() -> Self {
        Self::new(0.9, 0.999, 1e-8)
    }
}

impl Optimizer for Adam {
    fn step(
        &self,
        first: &Matrix,
        second: &Matrix,
        grad: &Matrix,
        iteration: u64,
    ) -> Result<MomentStep> {
        check_moments(first, second, grad)?;

        let Self {
            beta1: b1,
            beta2: b2,
            epsilon: eps,
        } = *self;

        let t = iteration.clamp(1, i32::MAX as u64) as i32;
        let bc1 = 1. - b1.powi(t);
        let bc2 = 1. - b2.powi(t);

        let first = Zip::from(first)
            .and(grad)
            .map_collect(|&m, &g| b1 * m + (1. - b1) * g);

        let second = Zip::from(second)
            .and(grad)
            .map_collect(|&v, &g| b2 * v + (1. - b2) * g * g);

        let adjusted = Zip::from(&first)
            .and(&second)
            .map_collect(|&m, &v| (m / bc1) / ((v / bc2).sqrt() + eps));

        Ok(MomentStep {
            first,
            second,
            adjusted,
        })
    }
}
