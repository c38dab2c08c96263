mod adam;
mod gradient_descent;
mod gradient_descent_with_momentum;
mod kind;
mod optimizer;
mod rms_prop;

pub use adam::Adam;
pub use gradient_descent::GradientDescent;
pub use gradient_descent_with_momentum::GradientDescentWithMomentum;
pub use kind::OptimizerKind;
pub use optimizer::{MomentStep, Optimizer};
pub use rms_prop::RmsProp;
