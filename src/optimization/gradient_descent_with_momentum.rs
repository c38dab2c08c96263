use ndarray::Zip;

use super::{optimizer::check_moments, MomentStep, Optimizer};
use crate::{Matrix, Result};

/// Gradient descent with a velocity kept in the first-moment accumulator.
#[derive(Debug, Clone, Copy)]
pub struct GradientDescentWithMomentum {
    momentum: f32,
}

impl GradientDescentWithMomentum {
    /// Creates a new `GradientDescentWithMomentum` optimizer.
    ///
    /// # Arguments
    /// * `momentum` - The fraction of the previous velocity kept on each step.
    pub fn new(momentum: f32) -> Self {
        Self { momentum }
    }
}

impl Optimizer for GradientDescentWithMomentum {
    fn step(&self, first: &Matrix, second: &Matrix, grad: &Matrix, _: u64) -> Result<MomentStep> {
        check_moments(first, second, grad)?;

        let mu = self.momentum;
        let velocity = Zip::from(first)
            .and(grad)
            .map_collect(|&v, &g| mu * v + g);

        Ok(MomentStep {
            adjusted: velocity.clone(),
            first: velocity,
            second: second.clone(),
        })
    }
}

#[cfg(test)]
mod test {
    use ndarray::array;

    use super::*;

    #[test]
    fn velocity_accumulates() {
        let opt = GradientDescentWithMomentum::new(0.5);
        let zeros = Matrix::zeros((1, 2));
        let grad: Matrix = array![[1., -2.]];

        let s1 = opt.step(&zeros, &zeros, &grad, 1).unwrap();
        assert_eq!(s1.adjusted, grad);

        let s2 = opt.step(&s1.first, &s1.second, &grad, 2).unwrap();
        assert_eq!(s2.adjusted, array![[1.5, -3.]]);
        assert_eq!(s2.second, zeros);
    }
}
