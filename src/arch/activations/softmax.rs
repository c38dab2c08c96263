use ndarray::ArrayView2;

use super::Activation;
use crate::Matrix;

/// Softmax normalized over every value of the pre-activation matrix.
///
/// The maximum of the matrix is subtracted before exponentiating, which leaves the result
/// unchanged and keeps `exp` from overflowing.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Softmax;

impl Softmax {
    fn max(z: ArrayView2<f32>) -> f32 {
        z.fold(f32::NEG_INFINITY, |m, &x| m.max(x))
    }

    fn denominator(z: ArrayView2<f32>, max: f32) -> f32 {
        z.fold(0., |acc, &x| acc + (x - max).exp())
    }
}

impl Activation for Softmax {
    fn f(&self, x: f32, z: ArrayView2<f32>) -> f32 {
        let max = Self::max(z);
        (x - max).exp() / Self::denominator(z, max)
    }

    // diagonal of the jacobian
    fn df(&self, a: f32, _: ArrayView2<f32>) -> f32 {
        a * (1. - a)
    }

    fn activate(&self, z: ArrayView2<f32>) -> Matrix {
        let max = Self::max(z);
        let denominator = Self::denominator(z, max);
        z.mapv(|x| (x - max).exp() / denominator)
    }
}

#[cfg(test)]
mod test {
    use ndarray::array;

    use super::*;

    #[test]
    fn sums_to_one_over_the_whole_matrix() {
        let z: Matrix = array![[1., 2.], [3., 4.]];
        let a = Softmax.activate(z.view());
        assert!((a.sum() - 1.).abs() < 1e-6);
        assert!(a[[1, 1]] > a[[0, 0]]);
    }

    #[test]
    fn activate_agrees_with_pointwise_f() {
        let z: Matrix = array![[0.5], [-1.], [800.]];
        let a = Softmax.activate(z.view());

        for (x, y) in z.iter().zip(a.iter()) {
            assert_eq!(Softmax.f(*x, z.view()), *y);
            assert!(y.is_finite());
        }
    }
}
