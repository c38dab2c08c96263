use ndarray::ArrayView2;

use super::Activation;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Relu;

impl Activation for Relu {
    fn f(&self, z: f32, _: ArrayView2<f32>) -> f32 {
        z.max(0.)
    }

    fn df(&self, a: f32, _: ArrayView2<f32>) -> f32 {
        if a > 0. {
            1.
        } else {
            0.
        }
    }
}

/// A ReLU that lets `alpha * z` through for negative inputs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LeakyRelu {
    alpha: f32,
}

impl LeakyRelu {
    /// Returns a new `LeakyRelu`.
    ///
    /// # Arguments
    /// * `alpha` - The slope for negative inputs.
    pub fn new(alpha: f32) -> Self {
        Self { alpha }
    }
}

impl Activation for LeakyRelu {
    fn f(&self, z: f32, _: ArrayView2<f32>) -> f32 {
        if z > 0. {
            z
        } else {
            self.alpha * z
        }
    }

    fn df(&self, a: f32, _: ArrayView2<f32>) -> f32 {
        if a > 0. {
            1.
        } else {
            self.alpha
        }
    }
}
