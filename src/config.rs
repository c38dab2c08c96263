use std::num::NonZeroUsize;

use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::{
    arch::{activations::ActFn, layers::DEFAULT_LEARN_RATE},
    optimization::{Adam, GradientDescent, GradientDescentWithMomentum, OptimizerKind, RmsProp},
    DenseLayer, MlErr, Result,
};

/// The configuration for the `ActFn` enum.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActFnConfig {
    Identity,
    Sigmoid { amp: f32 },
    Tanh,
    Relu,
    LeakyRelu { alpha: f32 },
    Softmax,
}

impl ActFnConfig {
    pub fn build(self) -> ActFn {
        match self {
            Self::Identity => ActFn::identity(),
            Self::Sigmoid { amp } => ActFn::sigmoid(amp),
            Self::Tanh => ActFn::tanh(),
            Self::Relu => ActFn::relu(),
            Self::LeakyRelu { alpha } => ActFn::leaky_relu(alpha),
            Self::Softmax => ActFn::softmax(),
        }
    }

    fn validate(&self) -> Result<()> {
        match *self {
            Self::Sigmoid { amp } if !(amp.is_finite() && amp > 0.) => Err(MlErr::InvalidConfig(
                format!("sigmoid amp must be finite and > 0, got {amp}"),
            )),
            Self::LeakyRelu { alpha } if !(alpha.is_finite() && alpha >= 0.) => {
                Err(MlErr::InvalidConfig(format!(
                    "leaky relu alpha must be finite and >= 0, got {alpha}"
                )))
            }
            _ => Ok(()),
        }
    }
}

/// The configuration for the `Optimizer` trait.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptimizerConfig {
    GradientDescent,
    GradientDescentWithMomentum {
        momentum: f32,
    },
    RmsProp {
        beta: f32,
        epsilon: f32,
    },
    Adam {
        beta1: f32,
        beta2: f32,
        epsilon: f32,
    },
}

impl OptimizerConfig {
    pub fn build(self) -> OptimizerKind {
        match self {
            Self::GradientDescent => OptimizerKind::GradientDescent(GradientDescent::new()),
            Self::GradientDescentWithMomentum { momentum } => {
                OptimizerKind::GradientDescentWithMomentum(GradientDescentWithMomentum::new(
                    momentum,
                ))
            }
            Self::RmsProp { beta, epsilon } => OptimizerKind::RmsProp(RmsProp::new(beta, epsilon)),
            Self::Adam {
                beta1,
                beta2,
                epsilon,
            } => OptimizerKind::Adam(Adam::new(beta1, beta2, epsilon)),
        }
    }

    fn validate(&self) -> Result<()> {
        let decay = |name: &str, v: f32| {
            if (0. ..1.).contains(&v) {
                Ok(())
            } else {
                Err(MlErr::InvalidConfig(format!(
                    "{name} must be in [0, 1), got {v}"
                )))
            }
        };

        let epsilon = |v: f32| {
            if v.is_finite() && v > 0. {
                Ok(())
            } else {
                Err(MlErr::InvalidConfig(format!(
                    "epsilon must be finite and > 0, got {v}"
                )))
            }
        };

        match *self {
            Self::GradientDescent => Ok(()),
            Self::GradientDescentWithMomentum { momentum } => decay("momentum", momentum),
            Self::RmsProp { beta, epsilon: eps } => {
                decay("beta", beta)?;
                epsilon(eps)
            }
            Self::Adam {
                beta1,
                beta2,
                epsilon: eps,
            } => {
                decay("beta1", beta1)?;
                decay("beta2", beta2)?;
                epsilon(eps)
            }
        }
    }
}

/// The configuration for a `DenseLayer`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayerConfig {
    /// `(dim_in, dim_out)`.
    pub dim: (usize, usize),
    pub act_fn: ActFnConfig,
}

impl LayerConfig {
    /// Builds a randomly initialized layer.
    pub fn build<R>(&self, rng: &mut R) -> DenseLayer
    where
        R: Rng + ?Sized,
    {
        DenseLayer::random(self.dim, self.act_fn.build(), rng)
    }
}

fn default_learn_rate() -> f32 {
    DEFAULT_LEARN_RATE
}

/// Everything needed to build and train a stack of dense layers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingConfig {
    pub layers: Vec<LayerConfig>,
    pub optimizer: OptimizerConfig,
    #[serde(default = "default_learn_rate")]
    pub learn_rate: f32,
    pub epochs: NonZeroUsize,
    #[serde(default)]
    pub seed: Option<u64>,
}

impl TrainingConfig {
    /// Parses and validates a JSON training configuration.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks every value before anything is built out of them.
    pub fn validate(&self) -> Result<()> {
        self.validate_layers()?;
        self.optimizer.validate()?;

        let lr = self.learn_rate;
        if !(lr.is_finite() && lr > 0.) {
            return Err(MlErr::InvalidConfig(format!(
                "learn_rate must be finite and > 0, got {lr}"
            )));
        }

        Ok(())
    }

    fn validate_layers(&self) -> Result<()> {
        if self.layers.is_empty() {
            return Err(MlErr::InvalidConfig(
                "at least one layer is required".into(),
            ));
        }

        for (i, layer) in self.layers.iter().enumerate() {
            let (n, m) = layer.dim;
            if n == 0 || m == 0 {
                return Err(MlErr::InvalidConfig(format!(
                    "layer {i}: dimensions must be greater than 0, got ({n}, {m})"
                )));
            }

            layer.act_fn.validate()?;
        }

        // Adjacent layers must have compatible dimensions: prev.m == next.n
        for (i, pair) in self.layers.windows(2).enumerate() {
            let (_, prev_m) = pair[0].dim;
            let (curr_n, _) = pair[1].dim;
            if prev_m != curr_n {
                return Err(MlErr::InvalidConfig(format!(
                    "layer {}: input size ({curr_n}) does not match previous layer output size ({prev_m})",
                    i + 1
                )));
            }
        }

        Ok(())
    }

    /// The random number generator for this configuration, seeded if a seed was given.
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        }
    }

    /// Builds the configured layers, in order.
    pub fn build_layers<R>(&self, rng: &mut R) -> Vec<DenseLayer>
    where
        R: Rng + ?Sized,
    {
        self.layers.iter().map(|layer| layer.build(rng)).collect()
    }
}
