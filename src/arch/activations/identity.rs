use ndarray::ArrayView2;

use super::Activation;

/// Leaves the pre-activation output untouched, turning the layer into a plain affine map.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Identity;

impl Activation for Identity {
    fn f(&self, z: f32, _: ArrayView2<f32>) -> f32 {
        z
    }

    fn df(&self, _: f32, _: ArrayView2<f32>) -> f32 {
        1.
    }
}
