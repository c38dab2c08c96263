mod act_fn;
mod activation;
mod identity;
mod relu;
mod sigmoid;
mod softmax;
mod tanh;

pub use act_fn::ActFn;
pub use activation::{Activation, ActivationGradient, ChainRule, PassThrough};
pub use identity::Identity;
pub use relu::{LeakyRelu, Relu};
pub use sigmoid::Sigmoid;
pub use softmax::Softmax;
pub use tanh::Tanh;
