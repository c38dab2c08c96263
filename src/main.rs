use std::{env, fs};

use anyhow::Context;
use log::info;
use ndarray::{array, Array2, ArrayView2, Axis};

use neural_layers::{
    config::TrainingConfig, optimization::OptimizerKind, DenseLayer, Matrix, MatrixExt,
};

const DEFAULT_CONFIG: &str = r#"{
    "layers": [
        { "dim": [2, 4], "act_fn": "tanh" },
        { "dim": [4, 1], "act_fn": { "sigmoid": { "amp": 1.0 } } }
    ],
    "optimizer": { "adam": { "beta1": 0.9, "beta2": 0.999, "epsilon": 1e-8 } },
    "learn_rate": 0.05,
    "epochs": 2000,
    "seed": 42
}"#;

const LOG_EVERY: usize = 200;

/// Feeds `x` through every layer, keeping the input of each one.
fn forward(layers: &[DenseLayer], x: ArrayView2<f32>) -> anyhow::Result<Vec<Matrix>> {
    let mut activations = vec![x.to_owned()];
    for layer in layers {
        let a = layer.predict(activations[activations.len() - 1].view())?;
        activations.push(a);
    }

    Ok(activations)
}

/// One sample's worth of backpropagation through the stack, returns the squared error.
fn train_sample(
    layers: &mut [DenseLayer],
    optimizer: &OptimizerKind,
    learn_rate: f32,
    x: ArrayView2<f32>,
    y: ArrayView2<f32>,
) -> anyhow::Result<f32> {
    let activations = forward(layers, x)?;
    let y_pred = &activations[activations.len() - 1];

    let diff = y_pred.checked_sub(y)?;
    let loss = diff.mapv(|d| d * d).mean().unwrap_or_default();

    // d(mse)/dy
    let mut error = diff.scale(2. / diff.len() as f32);
    for (i, layer) in layers.iter_mut().enumerate().rev() {
        let input = activations[i].view();
        let predicted = activations[i + 1].view();
        error = layer.train(input, predicted, error.view(), optimizer, learn_rate)?;
    }

    Ok(loss)
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = match env::args().nth(1) {
        Some(path) => {
            let json = fs::read_to_string(&path).with_context(|| format!("reading {path}"))?;
            TrainingConfig::from_json(&json).with_context(|| format!("parsing {path}"))?
        }
        None => TrainingConfig::from_json(DEFAULT_CONFIG)?,
    };

    let mut rng = config.rng();
    let mut layers = config.build_layers(&mut rng);
    let optimizer = config.optimizer.build();

    // one sample per column
    let xs: Array2<f32> = array![[0., 0., 1., 1.], [0., 1., 0., 1.]];
    let ys: Array2<f32> = array![[0., 1., 1., 0.]];

    for epoch in 0..config.epochs.get() {
        let mut loss = 0.;
        for (x, y) in xs.axis_iter(Axis(1)).zip(ys.axis_iter(Axis(1))) {
            let x = x.insert_axis(Axis(1));
            let y = y.insert_axis(Axis(1));
            loss += train_sample(&mut layers, &optimizer, config.learn_rate, x, y)?;
        }

        loss /= xs.ncols() as f32;
        if epoch % LOG_EVERY == 0 {
            info!(epoch = epoch, loss = loss; "epoch finished");
        }
    }

    let activations = forward(&layers, xs.view())?;
    println!("inputs:\n{xs}");
    println!("predictions:\n{:.3}", activations[activations.len() - 1]);

    Ok(())
}
