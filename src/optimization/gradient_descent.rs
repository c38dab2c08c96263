use super::{optimizer::check_moments, MomentStep, Optimizer};
use crate::{Matrix, Result};

/// Gradient descent optimization algorithm: the raw gradient is the step, the moments are carried
/// through untouched.
#[derive(Debug, Default, Clone, Copy)]
pub struct GradientDescent;

impl GradientDescent {
    /// Returns a new `GradientDescent`.
    pub fn new() -> Self {
        Self
    }
}

impl Optimizer for GradientDescent {
    fn step(&self, first: &Matrix, second: &Matrix, grad: &Matrix, _: u64) -> Result<MomentStep> {
        check_moments(first, second, grad)?;

        Ok(MomentStep {
            first: first.clone(),
            second: second.clone(),
            adjusted: grad.clone(),
        })
    }
}
