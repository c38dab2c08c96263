pub mod activations;
pub mod layers;
