use ndarray::{ArrayView2, Zip};

use crate::{Matrix, MlErr, Result};

/// An activation function applied to the pre-activation output of a layer.
///
/// The full matrix is handed to both `f` and `df` so activations whose value at one position
/// depends on every other position (softmax) fit the same interface as elementwise ones.
pub trait Activation {
    /// The activated value of `x`, one of the values of the pre-activation matrix `z`.
    fn f(&self, x: f32, z: ArrayView2<f32>) -> f32;

    /// The derivative with respect to the pre-activation value, expressed in terms of the
    /// activated value `y`, one of the values of the layer output `a`.
    fn df(&self, y: f32, a: ArrayView2<f32>) -> f32;

    /// Activates every value of `z`.
    fn activate(&self, z: ArrayView2<f32>) -> Matrix {
        z.mapv(|x| self.f(x, z))
    }
}

/// Turns the raw gradient a layer receives with respect to its output into the gradient with
/// respect to its pre-activation output.
pub trait ActivationGradient {
    /// # Arguments
    /// * `act_fn` - The activation the layer applied.
    /// * `raw` - The gradient with respect to the activated output.
    /// * `predicted` - The activated output the layer produced.
    ///
    /// # Returns
    /// The corrected gradient, with the same shape as `raw`.
    fn apply<A>(
        &self,
        act_fn: &A,
        raw: ArrayView2<f32>,
        predicted: ArrayView2<f32>,
    ) -> Result<Matrix>
    where
        A: Activation + ?Sized;
}

/// The chain rule: `raw ⊙ df(predicted)`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ChainRule;

impl ActivationGradient for ChainRule {
    fn apply<A>(
        &self,
        act_fn: &A,
        raw: ArrayView2<f32>,
        predicted: ArrayView2<f32>,
    ) -> Result<Matrix>
    where
        A: Activation + ?Sized,
    {
        if raw.dim() != predicted.dim() {
            return Err(MlErr::shape("activation gradient", raw.dim(), predicted.dim()));
        }

        let grad = Zip::from(&raw)
            .and(&predicted)
            .map_collect(|&d, &y| d * act_fn.df(y, predicted));

        Ok(grad)
    }
}

/// Hands the raw gradient back unchanged, for callers that already computed the gradient with
/// respect to the pre-activation output (e.g. softmax paired with cross entropy).
#[derive(Debug, Default, Clone, Copy)]
pub struct PassThrough;

impl ActivationGradient for PassThrough {
    fn apply<A>(
        &self,
        _act_fn: &A,
        raw: ArrayView2<f32>,
        predicted: ArrayView2<f32>,
    ) -> Result<Matrix>
    where
        A: Activation + ?Sized,
    {
        if raw.dim() != predicted.dim() {
            return Err(MlErr::shape("activation gradient", raw.dim(), predicted.dim()));
        }

        Ok(raw.to_owned())
    }
}

#[cfg(test)]
mod test {
    use ndarray::array;

    use super::*;
    use crate::arch::activations::{Identity, Tanh};

    #[test]
    fn chain_rule_scales_by_derivative() {
        let raw: Matrix = array![[1., 2.], [3., 4.]];
        let predicted: Matrix = array![[0., 0.5], [-0.5, 1.]];

        let grad = ChainRule.apply(&Tanh, raw.view(), predicted.view()).unwrap();
        assert_eq!(grad, array![[1., 1.5], [2.25, 0.]]);
    }

    #[test]
    fn pass_through_keeps_raw_gradient() {
        let raw: Matrix = array![[1.], [-2.]];
        let predicted: Matrix = array![[7.], [7.]];

        let grad = PassThrough.apply(&Tanh, raw.view(), predicted.view()).unwrap();
        assert_eq!(grad, raw);
    }

    #[test]
    fn gradient_rejects_mismatched_shapes() {
        let raw = Matrix::zeros((2, 1));
        let predicted = Matrix::zeros((2, 2));

        let err = ChainRule.apply(&Identity, raw.view(), predicted.view()).unwrap_err();
        assert!(err.is_shape_mismatch());
    }
}
