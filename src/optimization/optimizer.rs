use crate::{Matrix, MlErr, Result};

/// The outcome of one optimizer step over a parameter matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct MomentStep {
    /// The updated first-moment accumulator.
    pub first: Matrix,
    /// The updated second-moment accumulator.
    pub second: Matrix,
    /// The gradient to scale by the learn rate and subtract from the parameters.
    pub adjusted: Matrix,
}

/// Defines how a raw gradient becomes a parameter step, given the moment state of the parameter.
///
/// Optimizers are pure: the prior moments are read, never written, and the updated ones are
/// returned in the `MomentStep` so the owner of the parameters decides when to store them.
pub trait Optimizer {
    /// # Arguments
    /// * `first` - The first-moment accumulator for the parameter.
    /// * `second` - The second-moment accumulator for the parameter.
    /// * `grad` - The raw gradient of the loss with respect to the parameter.
    /// * `iteration` - The 1-based count of training steps taken by the parameter's owner.
    ///
    /// # Returns
    /// The updated moments and the adjusted gradient, or `MlErr::ShapeMismatch` if the moments and
    /// the gradient differ in shape.
    fn step(
        &self,
        first: &Matrix,
        second: &Matrix,
        grad: &Matrix,
        iteration: u64,
    ) -> Result<MomentStep>;
}

impl<F> Optimizer for F
where
    F: Fn(&Matrix, &Matrix, &Matrix, u64) -> Result<MomentStep>,
{
    fn step(
        &self,
        first: &Matrix,
        second: &Matrix,
        grad: &Matrix,
        iteration: u64,
    ) -> Result<MomentStep> {
        self(first, second, grad, iteration)
    }
}

/// Checks that both moment accumulators have the gradient's shape.
pub(super) fn check_moments(first: &Matrix, second: &Matrix, grad: &Matrix) -> Result<()> {
    for moment in [first, second] {
        if moment.dim() != grad.dim() {
            return Err(MlErr::shape("optimizer moments", moment.dim(), grad.dim()));
        }
    }

    Ok(())
}
