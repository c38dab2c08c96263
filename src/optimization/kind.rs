use super::{Adam, GradientDescent, GradientDescentWithMomentum, MomentStep, Optimizer, RmsProp};
use crate::{Matrix, Result};

/// The optimizers a layer can be trained with when the choice is made at runtime.
#[derive(Debug, Clone, Copy)]
pub enum OptimizerKind {
    GradientDescent(GradientDescent),
    GradientDescentWithMomentum(GradientDescentWithMomentum),
    RmsProp(RmsProp),
    Adam(Adam),
}

impl Optimizer for OptimizerKind {
    fn step(
        &self,
        first: &Matrix,
        second: &Matrix,
        grad: &Matrix,
        iteration: u64,
    ) -> Result<MomentStep> {
        match self {
            Self::GradientDescent(o) => o.step(first, second, grad, iteration),
            Self::GradientDescentWithMomentum(o) => o.step(first, second, grad, iteration),
            Self::RmsProp(o) => o.step(first, second, grad, iteration),
            Self::Adam(o) => o.step(first, second, grad, iteration),
        }
    }
}
