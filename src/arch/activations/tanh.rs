use ndarray::ArrayView2;

use super::Activation;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Tanh;

impl Activation for Tanh {
    fn f(&self, z: f32, _: ArrayView2<f32>) -> f32 {
        z.tanh()
    }

    fn df(&self, a: f32, _: ArrayView2<f32>) -> f32 {
        1. - a * a
    }
}
