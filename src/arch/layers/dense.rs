use log::{debug, trace};
use ndarray::ArrayView2;
use ndarray_rand::{rand_distr::StandardNormal, RandomExt};
use rand::Rng;

use super::LayerState;
use crate::{
    arch::activations::{ActFn, Activation, ActivationGradient, ChainRule},
    linalg::MatrixExt,
    optimization::Optimizer,
    tensor::StackedMatrix,
    Matrix, MlErr, Result,
};

/// The learn rate used when the caller has no preference.
pub const DEFAULT_LEARN_RATE: f32 = 0.1;

/// A fully connected layer: `a = act_fn(W · x + b)`.
///
/// Inputs are column vectors (or matrices whose columns are samples) with `dim_in` rows, outputs
/// have `dim_out` rows. Besides its parameters the layer owns the first and second-moment
/// accumulators the optimizer reads and produces on every `train` call.
#[derive(Debug, Clone)]
pub struct DenseLayer<A = ActFn, G = ChainRule> {
    act_fn: A,
    act_grad: G,

    // Parameters
    weights: Matrix,
    bias: Matrix,

    // Optimizer state
    first_weights: Matrix,
    second_weights: Matrix,
    first_bias: Matrix,
    second_bias: Matrix,
    iteration: u64,
}

impl<A: Activation> DenseLayer<A, ChainRule> {
    /// Creates a new `DenseLayer` whose output gradient goes through the chain rule.
    ///
    /// # Arguments
    /// * `weights` - A `(dim_out, dim_in)` matrix.
    /// * `bias` - A `(dim_out, 1)` matrix.
    /// * `act_fn` - The activation applied to the output.
    ///
    /// # Returns
    /// The layer, or `MlErr::ShapeMismatch` if `bias` doesn't fit `weights`.
    pub fn new(weights: Matrix, bias: Matrix, act_fn: A) -> Result<Self> {
        Self::with_gradient(weights, bias, act_fn, ChainRule)
    }

    /// Creates a new `DenseLayer` of dimension `(dim_in, dim_out)` with normally distributed
    /// weights scaled by `1 / sqrt(dim_in)` and a zero bias.
    pub fn random<R>(dim: (usize, usize), act_fn: A, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        let (dim_in, dim_out) = dim;
        let scale = 1. / (dim_in.max(1) as f32).sqrt();

        let weights =
            Matrix::random_using((dim_out, dim_in), StandardNormal, rng).mapv(|w: f32| w * scale);
        let bias = Matrix::zeros((dim_out, 1));

        Self::from_parts(weights, bias, act_fn, ChainRule)
    }
}

impl<A, G> DenseLayer<A, G>
where
    A: Activation,
    G: ActivationGradient,
{
    /// Creates a new `DenseLayer` with a custom activation gradient.
    ///
    /// # Arguments
    /// * `weights` - A `(dim_out, dim_in)` matrix.
    /// * `bias` - A `(dim_out, 1)` matrix.
    /// * `act_fn` - The activation applied to the output.
    /// * `act_grad` - Turns the output gradient into the pre-activation gradient.
    pub fn with_gradient(weights: Matrix, bias: Matrix, act_fn: A, act_grad: G) -> Result<Self> {
        let expected = (weights.nrows(), 1);
        if bias.dim() != expected {
            return Err(MlErr::shape("bias", bias.dim(), expected));
        }

        Ok(Self::from_parts(weights, bias, act_fn, act_grad))
    }

    /// Restores a layer from a snapshot taken with `report_state`, moments and iteration
    /// included.
    pub fn from_state(state: LayerState, act_fn: A, act_grad: G) -> Result<Self> {
        let LayerState {
            weights,
            first_moment_weights,
            second_moment_weights,
            bias,
            first_moment_bias,
            second_moment_bias,
            iteration,
        } = state;

        let mut layer = Self::with_gradient(weights, bias, act_fn, act_grad)?;

        for m in [&first_moment_weights, &second_moment_weights] {
            if m.dim() != layer.weights.dim() {
                return Err(MlErr::shape("weight moments", m.dim(), layer.weights.dim()));
            }
        }

        for m in [&first_moment_bias, &second_moment_bias] {
            if m.dim() != layer.bias.dim() {
                return Err(MlErr::shape("bias moments", m.dim(), layer.bias.dim()));
            }
        }

        layer.first_weights = first_moment_weights;
        layer.second_weights = second_moment_weights;
        layer.first_bias = first_moment_bias;
        layer.second_bias = second_moment_bias;
        layer.iteration = iteration;

        Ok(layer)
    }

    fn from_parts(weights: Matrix, bias: Matrix, act_fn: A, act_grad: G) -> Self {
        trace!("dense layer created: dim_out={} dim_in={}", weights.nrows(), weights.ncols());

        Self {
            act_fn,
            act_grad,
            first_weights: Matrix::zeros(weights.dim()),
            second_weights: Matrix::zeros(weights.dim()),
            first_bias: Matrix::zeros(bias.dim()),
            second_bias: Matrix::zeros(bias.dim()),
            weights,
            bias,
            iteration: 0,
        }
    }

    /// Returns `(dim_in, dim_out)`.
    pub fn dim(&self) -> (usize, usize) {
        (self.weights.ncols(), self.weights.nrows())
    }

    /// The amount of `train` calls this layer has received.
    pub fn iteration(&self) -> u64 {
        self.iteration
    }

    pub fn weights(&self) -> &Matrix {
        &self.weights
    }

    pub fn bias(&self) -> &Matrix {
        &self.bias
    }

    pub fn act_fn(&self) -> &A {
        &self.act_fn
    }

    /// Makes a forward pass through the layer.
    ///
    /// # Arguments
    /// * `x` - The input, with `dim_in` rows and one column per sample.
    ///
    /// # Returns
    /// The activated output, or `MlErr::ShapeMismatch` if `x` doesn't have `dim_in` rows.
    pub fn predict(&self, x: ArrayView2<f32>) -> Result<Matrix> {
        let z = self.weights.matmul(x)?.broadcast_add(self.bias.view())?;
        Ok(self.act_fn.activate(z.view()))
    }

    /// Runs `predict` over every matrix of `x`.
    pub fn predict_stacked(&self, x: &StackedMatrix) -> Result<StackedMatrix> {
        let outputs = x
            .iter()
            .map(|m| self.predict(m.view()))
            .collect::<Result<Vec<_>>>()?;

        StackedMatrix::new(outputs)
    }

    /// Makes a backward pass through the layer, updating its parameters and optimizer state.
    ///
    /// The iteration counter advances before anything else, so it also advances when the call
    /// fails. Every other field is assigned only once all the fallible work is done: on error the
    /// parameters and moments are left as they were.
    ///
    /// # Arguments
    /// * `x` - The input given to the `predict` call that produced `predicted`.
    /// * `predicted` - The output of that `predict` call.
    /// * `raw_error` - The gradient of the loss with respect to `predicted`.
    /// * `optimizer` - Turns raw gradients into steps, given the moments of each parameter.
    /// * `learn_rate` - The length of the steps, `DEFAULT_LEARN_RATE` is the usual choice.
    ///
    /// # Returns
    /// The gradient of the loss with respect to `x`, to be handed to the previous layer.
    pub fn train<O>(
        &mut self,
        x: ArrayView2<f32>,
        predicted: ArrayView2<f32>,
        raw_error: ArrayView2<f32>,
        optimizer: &O,
        learn_rate: f32,
    ) -> Result<Matrix>
    where
        O: Optimizer + ?Sized,
    {
        self.iteration += 1;
        let iteration = self.iteration;

        let error = self.act_grad.apply(&self.act_fn, raw_error, predicted)?;
        let dw = error.matmul(x.t())?;

        let w_step = optimizer.step(&self.first_weights, &self.second_weights, &dw, iteration)?;
        let weights = self
            .weights
            .checked_sub(w_step.adjusted.scale(learn_rate).view())?;

        // Only advances the bias moments, see `bias_step`.
        let b_step = optimizer.step(&self.first_bias, &self.second_bias, &error, iteration)?;
        let bias = self.bias_step(&error, learn_rate)?;

        self.weights = weights;
        self.first_weights = w_step.first;
        self.second_weights = w_step.second;
        self.bias = bias;
        self.first_bias = b_step.first;
        self.second_bias = b_step.second;

        debug!(iteration = iteration; "dense layer trained");

        // Backpropagated through the already updated weights.
        self.weights.t().matmul(error.view())
    }

    /// The bias after one step. The step is `learn_rate * error`, the raw pre-activation gradient:
    /// the optimizer-adjusted bias gradient is not used, the optimizer only keeps the bias
    /// moments in step with the weight moments.
    fn bias_step(&self, error: &Matrix, learn_rate: f32) -> Result<Matrix> {
        self.bias.checked_sub(error.scale(learn_rate).view())
    }

    /// A snapshot of the parameters, the moments and the iteration counter.
    pub fn report_state(&self) -> LayerState {
        LayerState {
            weights: self.weights.clone(),
            first_moment_weights: self.first_weights.clone(),
            second_moment_weights: self.second_weights.clone(),
            bias: self.bias.clone(),
            first_moment_bias: self.first_bias.clone(),
            second_moment_bias: self.second_bias.clone(),
            iteration: self.iteration,
        }
    }
}

#[cfg(test)]
mod test {
    use ndarray::array;
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;
    use crate::{
        arch::activations::{Identity, Sigmoid},
        optimization::{Adam, GradientDescent},
    };

    fn identity_layer() -> DenseLayer<Identity> {
        DenseLayer::new(array![[1., 0.], [0., 1.]], array![[0.], [0.]], Identity).unwrap()
    }

    #[test]
    fn rejects_bias_of_wrong_shape() {
        let err = DenseLayer::new(Matrix::zeros((3, 2)), Matrix::zeros((2, 1)), Identity);
        assert!(err.unwrap_err().is_shape_mismatch());

        let err = DenseLayer::new(Matrix::zeros((3, 2)), Matrix::zeros((3, 2)), Identity);
        assert!(err.unwrap_err().is_shape_mismatch());
    }

    #[test]
    fn moments_start_at_zero() {
        let state = identity_layer().report_state();
        assert_eq!(state.first_moment_weights, Matrix::zeros((2, 2)));
        assert_eq!(state.second_moment_bias, Matrix::zeros((2, 1)));
        assert_eq!(state.iteration, 0);
    }

    #[test]
    fn predict_broadcasts_bias_over_samples() {
        let layer = DenseLayer::new(array![[1., 1.]], array![[0.5]], Identity).unwrap();
        let x: Matrix = array![[1., 2., 3.], [1., 0., -3.]];

        assert_eq!(layer.predict(x.view()).unwrap(), array![[2.5, 2.5, 0.5]]);
    }

    #[test]
    fn predict_rejects_wrong_input_rows() {
        let x = Matrix::zeros((3, 1));
        assert!(identity_layer().predict(x.view()).unwrap_err().is_shape_mismatch());
    }

    #[test]
    fn failed_train_leaves_parameters_untouched() {
        let mut layer = identity_layer();
        let before = layer.report_state();

        let x: Matrix = array![[2.], [3.]];
        let predicted: Matrix = array![[2.], [3.]];
        let bad_error = Matrix::ones((3, 1));

        let res = layer.train(
            x.view(),
            predicted.view(),
            bad_error.view(),
            &GradientDescent,
            DEFAULT_LEARN_RATE,
        );

        assert!(res.unwrap_err().is_shape_mismatch());
        assert_eq!(layer.iteration(), 1);

        let after = layer.report_state();
        assert_eq!(after.weights, before.weights);
        assert_eq!(after.bias, before.bias);
        assert_eq!(after.first_moment_weights, before.first_moment_weights);
    }

    #[test]
    fn multi_column_error_fails_at_the_bias_step() {
        let mut layer = identity_layer();
        let x: Matrix = array![[1., 2.], [3., 4.]];
        let predicted = layer.predict(x.view()).unwrap();
        let error = Matrix::ones((2, 2));

        let res = layer.train(x.view(), predicted.view(), error.view(), &GradientDescent, 0.1);
        assert!(res.unwrap_err().is_shape_mismatch());
        assert_eq!(layer.weights(), &array![[1., 0.], [0., 1.]]);
    }

    #[test]
    fn train_advances_all_four_moments() {
        let mut layer = identity_layer();
        let x: Matrix = array![[2.], [3.]];
        let predicted = layer.predict(x.view()).unwrap();
        let error: Matrix = array![[1.], [-1.]];

        layer
            .train(x.view(), predicted.view(), error.view(), &Adam::default(), 0.01)
            .unwrap();

        let state = layer.report_state();
        assert_eq!(state.iteration, 1);
        assert!(state.first_moment_weights.iter().all(|m| *m != 0.));
        assert!(state.second_moment_weights.iter().all(|v| *v > 0.));
        assert!((state.first_moment_bias[[0, 0]] - 0.1).abs() < 1e-6);
        assert!((state.first_moment_bias[[1, 0]] + 0.1).abs() < 1e-6);
        assert!(state.second_moment_bias.iter().all(|v| *v > 0.));
    }

    #[test]
    fn chain_rule_uses_the_activation_derivative() {
        let mut layer =
            DenseLayer::new(Matrix::zeros((1, 1)), Matrix::zeros((1, 1)), Sigmoid::default())
                .unwrap();
        let x: Matrix = array![[1.]];
        let predicted = layer.predict(x.view()).unwrap();
        assert_eq!(predicted, array![[0.5]]);

        // error = 1 * 0.5 * (1 - 0.5)
        let raw: Matrix = array![[1.]];
        layer
            .train(x.view(), predicted.view(), raw.view(), &GradientDescent, 1.)
            .unwrap();

        assert_eq!(layer.weights(), &array![[-0.25]]);
        assert_eq!(layer.bias(), &array![[-0.25]]);
    }

    #[test]
    fn state_restores_an_identical_layer() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut layer = DenseLayer::random((3, 2), ActFn::tanh(), &mut rng);
        let x: Matrix = array![[0.1], [0.2], [0.3]];
        let predicted = layer.predict(x.view()).unwrap();
        let error: Matrix = array![[0.5], [-0.5]];
        layer
            .train(x.view(), predicted.view(), error.view(), &Adam::default(), 0.1)
            .unwrap();

        let json = layer.report_state().to_json().unwrap();
        let state = LayerState::from_json(&json).unwrap();
        let restored = DenseLayer::from_state(state, ActFn::tanh(), ChainRule).unwrap();

        assert_eq!(restored.iteration(), 1);
        let restored = restored.report_state();
        let original = layer.report_state();
        let pairs = [
            (&restored.weights, &original.weights),
            (&restored.first_moment_weights, &original.first_moment_weights),
            (&restored.second_moment_weights, &original.second_moment_weights),
            (&restored.bias, &original.bias),
            (&restored.second_moment_bias, &original.second_moment_bias),
        ];

        for (a, b) in pairs {
            assert_eq!(a.dim(), b.dim());
            assert!(a.iter().zip(b).all(|(x, y)| (x - y).abs() <= 1e-6 * y.abs().max(1.)));
        }
    }

    #[test]
    fn from_state_rejects_moments_of_another_shape() {
        let mut state = identity_layer().report_state();
        state.second_moment_weights = Matrix::zeros((2, 3));

        let err = DenseLayer::from_state(state, Identity, ChainRule).unwrap_err();
        assert!(err.is_shape_mismatch());
    }

    #[test]
    fn random_layer_has_requested_dimensions() {
        let mut rng = StdRng::seed_from_u64(0);
        let layer = DenseLayer::random((4, 3), ActFn::relu(), &mut rng);

        assert_eq!(layer.dim(), (4, 3));
        assert_eq!(layer.weights().dim(), (3, 4));
        assert_eq!(layer.bias(), &Matrix::zeros((3, 1)));
    }
}
