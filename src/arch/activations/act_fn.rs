use ndarray::ArrayView2;

use super::{Activation, Identity, LeakyRelu, Relu, Sigmoid, Softmax, Tanh};
use crate::Matrix;

/// The activation functions a `DenseLayer` can be built with at runtime.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ActFn {
    Identity(Identity),
    Sigmoid(Sigmoid),
    Tanh(Tanh),
    Relu(Relu),
    LeakyRelu(LeakyRelu),
    Softmax(Softmax),
}

impl ActFn {
    pub fn identity() -> Self {
        Self::Identity(Identity)
    }

    pub fn sigmoid(amp: f32) -> Self {
        Self::Sigmoid(Sigmoid::new(amp))
    }

    pub fn tanh() -> Self {
        Self::Tanh(Tanh)
    }

    pub fn relu() -> Self {
        Self::Relu(Relu)
    }

    pub fn leaky_relu(alpha: f32) -> Self {
        Self::LeakyRelu(LeakyRelu::new(alpha))
    }

    pub fn softmax() -> Self {
        Self::Softmax(Softmax)
    }

    fn inner(&self) -> &dyn Activation {
        match self {
            Self::Identity(a) => a,
            Self::Sigmoid(a) => a,
            Self::Tanh(a) => a,
            Self::Relu(a) => a,
            Self::LeakyRelu(a) => a,
            Self::Softmax(a) => a,
        }
    }
}

impl Activation for ActFn {
    fn f(&self, x: f32, z: ArrayView2<f32>) -> f32 {
        self.inner().f(x, z)
    }

    fn df(&self, y: f32, a: ArrayView2<f32>) -> f32 {
        self.inner().df(y, a)
    }

    fn activate(&self, z: ArrayView2<f32>) -> Matrix {
        self.inner().activate(z)
    }
}
