use ndarray::ArrayView2;

use super::Activation;

/// A logistic sigmoid scaled to the range `(0, amp)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sigmoid {
    amp: f32,
}

impl Sigmoid {
    /// Returns a new `Sigmoid`.
    ///
    /// # Arguments
    /// * `amp` - The upper bound of the function's image.
    pub fn new(amp: f32) -> Self {
        Self { amp }
    }
}

impl Default for Sigmoid {
    fn default() -> Self {
        Self::new(1.)
    }
}

impl Activation for Sigmoid {
    fn f(&self, z: f32, _: ArrayView2<f32>) -> f32 {
        self.amp / (1. + (-z).exp())
    }

    fn df(&self, a: f32, _: ArrayView2<f32>) -> f32 {
        (a * (self.amp - a)) / self.amp
    }
}

#[cfg(test)]
mod test {
    use ndarray::Array2;

    use super::*;

    #[test]
    fn derivative_from_output_matches_analytic_derivative() {
        let sigmoid = Sigmoid::new(2.);
        let none = Array2::<f32>::zeros((0, 0));

        for z in [-3., -0.5, 0., 0.7, 4.] {
            let a = sigmoid.f(z, none.view());
            let analytic = 2. * (-z).exp() / ((-z).exp() + 1f32).powi(2);
            assert!((sigmoid.df(a, none.view()) - analytic).abs() < 1e-5);
        }
    }

    #[test]
    fn centered_at_half_amplitude() {
        let none = Array2::<f32>::zeros((0, 0));
        assert_eq!(Sigmoid::new(4.).f(0., none.view()), 2.);
    }
}
