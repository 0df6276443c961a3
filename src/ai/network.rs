use std::path::Path;

use burn::backend::{Autodiff, NdArray};
use burn::module::{AutodiffModule, Param};
use burn::nn::{Linear, LinearConfig};
use burn::prelude::*;
use burn::record::DefaultRecorder;
use burn::tensor::activation::sigmoid;
use burn::tensor::TensorData;
use rand::Rng;

use super::encoding::{features_batch, Features, NUM_FEATURES};
use super::value::{check_features, ValueFunction};
use crate::error::CheckpointError;

pub type InferBackend = NdArray<f32>;
pub type TrainBackend = Autodiff<InferBackend>;

/// File stem of the saved weights; the recorder appends `.mpk`.
pub const WEIGHTS_FILE: &str = "value_network";

/// Feed-forward value network.
///
/// ```text
/// Input:  [batch, num_features]
/// Hidden: num_features -> hidden_units, sigmoid
/// Output: hidden_units -> 1, sigmoid  (estimated win probability)
/// ```
#[derive(Module, Debug)]
pub struct ValueNetwork<B: Backend> {
    hidden: Linear<B>,
    output: Linear<B>,
}

#[derive(Config, Debug)]
pub struct ValueNetworkConfig {
    pub num_features: usize,
    pub hidden_units: usize,
}

impl ValueNetworkConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> ValueNetwork<B> {
        ValueNetwork {
            hidden: LinearConfig::new(self.num_features, self.hidden_units).init(device),
            output: LinearConfig::new(self.hidden_units, 1).init(device),
        }
    }
}

impl<B: Backend> ValueNetwork<B> {
    /// Forward pass: input [batch, num_features] -> output [batch, 1].
    pub fn forward(&self, input: Tensor<B, 2>) -> Tensor<B, 2> {
        let x = sigmoid(self.hidden.forward(input));
        sigmoid(self.output.forward(x))
    }
}

/// The burn network behind the [`ValueFunction`] interface.
///
/// Parameter blocks are ordered hidden weight, hidden bias, output weight,
/// output bias. Weights are stored `[inputs, outputs]` and flattened row-major.
#[derive(Debug)]
pub struct NeuralValue {
    network: ValueNetwork<TrainBackend>,
    config: ValueNetworkConfig,
    device: <TrainBackend as Backend>::Device,
}

impl NeuralValue {
    /// Build a network with weights drawn uniformly from
    /// `±1/sqrt(fan_in)`, using `rng` so seeded runs are reproducible.
    pub fn new<R: Rng + ?Sized>(config: ValueNetworkConfig, rng: &mut R) -> Self {
        let device = Default::default();
        let mut network: ValueNetwork<TrainBackend> = config.init(&device);

        randomize(&mut network.hidden, config.num_features, rng, &device);
        randomize(&mut network.output, config.hidden_units, rng, &device);

        NeuralValue {
            network,
            config,
            device,
        }
    }

    pub fn config(&self) -> &ValueNetworkConfig {
        &self.config
    }

    /// Save weights as `<dir>/value_network.mpk`.
    pub fn save_to_dir(&self, dir: &Path) -> Result<(), CheckpointError> {
        let recorder = DefaultRecorder::default();
        self.network
            .clone()
            .valid()
            .save_file(dir.join(WEIGHTS_FILE), &recorder)
            .map_err(|e| CheckpointError::ModelSave(e.to_string()))
    }

    /// Replace the weights with those saved in `dir`.
    pub fn load_from_dir(&mut self, dir: &Path) -> Result<(), CheckpointError> {
        let recorder = DefaultRecorder::default();
        let network: ValueNetwork<TrainBackend> = self
            .config
            .init(&self.device)
            .load_file(dir.join(WEIGHTS_FILE), &recorder, &self.device)
            .map_err(|e| CheckpointError::ModelLoad(e.to_string()))?;
        self.network = network;
        Ok(())
    }

    fn input(&self, features: &[f32]) -> Tensor<TrainBackend, 2> {
        check_features(self.config.num_features, features);
        Tensor::from_data(
            TensorData::new(features.to_vec(), [1, features.len()]),
            &self.device,
        )
    }
}

fn randomize<R: Rng + ?Sized>(
    layer: &mut Linear<TrainBackend>,
    fan_in: usize,
    rng: &mut R,
    device: &<TrainBackend as Backend>::Device,
) {
    let bound = 1.0 / (fan_in as f32).sqrt();
    let dims = layer.weight.val().dims();
    layer.weight = uniform_param(dims, bound, rng, device);
    if let Some(bias) = &layer.bias {
        let dims = bias.val().dims();
        layer.bias = Some(uniform_param(dims, bound, rng, device));
    }
}

fn uniform_param<const D: usize, R: Rng + ?Sized>(
    dims: [usize; D],
    bound: f32,
    rng: &mut R,
    device: &<TrainBackend as Backend>::Device,
) -> Param<Tensor<TrainBackend, D>> {
    let len: usize = dims.iter().product();
    let values: Vec<f32> = (0..len).map(|_| rng.random_range(-bound..bound)).collect();
    Param::from_tensor(Tensor::from_data(TensorData::new(values, dims), device).require_grad())
}

fn flatten<B: Backend, const D: usize>(tensor: Tensor<B, D>) -> Vec<f32> {
    tensor
        .into_data()
        .to_vec::<f32>()
        .expect("f32 tensor data extraction")
}

fn shifted<const D: usize>(
    param: &Param<Tensor<TrainBackend, D>>,
    delta: &[f32],
    device: &<TrainBackend as Backend>::Device,
) -> Param<Tensor<TrainBackend, D>> {
    let current = param.val().inner();
    let step = Tensor::<InferBackend, D>::from_data(
        TensorData::new(delta.to_vec(), current.dims()),
        device,
    );
    Param::from_tensor(Tensor::from_inner(current + step).require_grad())
}

impl ValueFunction for NeuralValue {
    fn num_features(&self) -> usize {
        self.config.num_features
    }

    fn evaluate(&self, features: &[f32]) -> f32 {
        let output = self.network.valid().forward(self.input(features).inner());
        flatten(output)[0]
    }

    fn evaluate_batch(&self, batch: &[Features]) -> Vec<f32> {
        if batch.is_empty() {
            return Vec::new();
        }
        assert_eq!(
            self.config.num_features, NUM_FEATURES,
            "batched evaluation needs a {NUM_FEATURES}-feature network"
        );
        let input = features_batch::<InferBackend>(batch, &self.device);
        flatten(self.network.valid().forward(input))
    }

    fn value_and_gradient(&self, features: &[f32]) -> (f32, Vec<Vec<f32>>) {
        let output = self.network.forward(self.input(features));
        let value = flatten(output.clone().inner())[0];
        let grads = output.sum().backward();

        let weight_grad = |param: &Param<Tensor<TrainBackend, 2>>| {
            param
                .val()
                .grad(&grads)
                .map(flatten)
                .unwrap_or_else(|| vec![0.0; param.val().shape().num_elements()])
        };
        let bias_grad = |bias: &Option<Param<Tensor<TrainBackend, 1>>>| match bias {
            Some(param) => param
                .val()
                .grad(&grads)
                .map(flatten)
                .unwrap_or_else(|| vec![0.0; param.val().shape().num_elements()]),
            None => Vec::new(),
        };

        let gradient = vec![
            weight_grad(&self.network.hidden.weight),
            bias_grad(&self.network.hidden.bias),
            weight_grad(&self.network.output.weight),
            bias_grad(&self.network.output.bias),
        ];
        (value, gradient)
    }

    fn parameters(&self) -> Vec<Vec<f32>> {
        let bias = |b: &Option<Param<Tensor<TrainBackend, 1>>>| {
            b.as_ref().map_or_else(Vec::new, |p| flatten(p.val()))
        };
        vec![
            flatten(self.network.hidden.weight.val()),
            bias(&self.network.hidden.bias),
            flatten(self.network.output.weight.val()),
            bias(&self.network.output.bias),
        ]
    }

    fn apply_delta(&mut self, delta: &[Vec<f32>]) {
        assert_eq!(delta.len(), 4, "expected four parameter blocks");
        let device = self.device.clone();

        let hidden = &mut self.network.hidden;
        hidden.weight = shifted(&hidden.weight, &delta[0], &device);
        if let Some(bias) = &hidden.bias {
            hidden.bias = Some(shifted(bias, &delta[1], &device));
        }

        let output = &mut self.network.output;
        output.weight = shifted(&output.weight, &delta[2], &device);
        if let Some(bias) = &output.bias {
            output.bias = Some(shifted(bias, &delta[3], &device));
        }
    }
}
