use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{Activation, ConfigError, Dense, Layer, ShapeError, WeightInit};

/// Ordered stack of layers evaluated front to back.
///
/// The layer widths are validated when the network is built: the first layer
/// is dense and every layer's output width matches the next dense layer's
/// input width. Inference borrows the network immutably, so one network can
/// serve any number of ticks.
///
/// # Example
///
/// ```
/// use flapnet_engine::{Dense, Network};
///
/// // 3 inputs -> 2 outputs, passing the first two inputs through.
/// let dense = Dense::new(3, 2, vec![1.0, 0.0, 0.0, 1.0, 0.0, 0.0], vec![0.0, 0.0]).unwrap();
/// let network = Network::new(vec![dense.into()]).unwrap();
/// assert_eq!(network.forward(&[2.0, -1.0, 0.0]), vec![2.0, -1.0]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Network {
    layers: Vec<Layer>,
}

impl Network {
    pub fn new(layers: Vec<Layer>) -> Result<Self, ShapeError> {
        let Some(first) = layers.first() else {
            return Err(ShapeError::EmptyNetwork);
        };
        let Some(mut width) = first.input_size() else {
            return Err(ShapeError::LeadingActivation);
        };
        for (index, layer) in layers.iter().enumerate() {
            if let Some(dense) = layer.as_dense()
                && (dense.input_size() == 0 || dense.output_size() == 0)
            {
                return Err(ShapeError::ZeroWidth { index });
            }
            if let Some(expected) = layer.input_size()
                && expected != width
            {
                return Err(ShapeError::LayerWidth {
                    index,
                    expected,
                    actual: width,
                });
            }
            width = layer.output_size(width);
        }
        Ok(Self { layers })
    }

    #[must_use]
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Width of the vector accepted by [`Self::forward`].
    #[must_use]
    pub fn input_size(&self) -> usize {
        // `new` guarantees a leading dense layer.
        self.layers[0].input_size().unwrap_or_default()
    }

    /// Width of the vector returned by [`Self::forward`].
    #[must_use]
    pub fn output_size(&self) -> usize {
        self.layers
            .iter()
            .fold(self.input_size(), |width, layer| layer.output_size(width))
    }

    /// Runs the input through every layer.
    ///
    /// # Panics
    ///
    /// Panics if `input.len()` differs from [`Self::input_size`].
    #[must_use]
    pub fn forward(&self, input: &[f64]) -> Vec<f64> {
        assert_eq!(
            input.len(),
            self.input_size(),
            "network input has the wrong width"
        );
        self.layers
            .iter()
            .fold(input.to_vec(), |current, layer| layer.forward(current))
    }

    pub fn dense_layers(&self) -> impl Iterator<Item = &Dense> + '_ {
        self.layers.iter().filter_map(Layer::as_dense)
    }

    /// Handles to every dense layer, in order. Activation layers never appear.
    pub fn dense_layers_mut(&mut self) -> Vec<&mut Dense> {
        self.layers.iter_mut().filter_map(Layer::as_dense_mut).collect()
    }

    /// Total number of weights and biases.
    #[must_use]
    pub fn parameter_count(&self) -> usize {
        self.dense_layers()
            .map(|d| d.weights().len() + d.bias().len())
            .sum()
    }
}

/// One entry of a [`Topology`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerSpec {
    /// Dense layer with the given output width.
    Dense(usize),
    Activation(Activation),
}

/// Shape of a network without its parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topology {
    input_size: usize,
    layers: Vec<LayerSpec>,
}

impl Default for Topology {
    /// `3 → 5 → 4 → 2`, followed by a sigmoid.
    fn default() -> Self {
        Self::new(3)
            .dense(5)
            .dense(4)
            .dense(2)
            .activation(Activation::SIGMOID)
    }
}

impl Topology {
    #[must_use]
    pub fn new(input_size: usize) -> Self {
        Self {
            input_size,
            layers: vec![],
        }
    }

    /// Builds a topology of dense layers with `activation` after each one,
    /// or only after the last when `activate_hidden` is false.
    #[must_use]
    pub fn from_widths(
        input_size: usize,
        widths: &[usize],
        activation: Activation,
        activate_hidden: bool,
    ) -> Self {
        let mut topology = Self::new(input_size);
        for (i, &width) in widths.iter().enumerate() {
            topology = topology.dense(width);
            if activate_hidden || i + 1 == widths.len() {
                topology = topology.activation(activation);
            }
        }
        topology
    }

    #[must_use]
    pub fn dense(mut self, output_size: usize) -> Self {
        self.layers.push(LayerSpec::Dense(output_size));
        self
    }

    #[must_use]
    pub fn activation(mut self, activation: Activation) -> Self {
        self.layers.push(LayerSpec::Activation(activation));
        self
    }

    #[must_use]
    pub fn input_size(&self) -> usize {
        self.input_size
    }

    #[must_use]
    pub fn output_size(&self) -> usize {
        self.layers
            .iter()
            .fold(self.input_size, |width, spec| match spec {
                LayerSpec::Dense(output) => *output,
                LayerSpec::Activation(_) => width,
            })
    }

    #[must_use]
    pub fn layers(&self) -> &[LayerSpec] {
        &self.layers
    }

    /// Weights plus biases of a network built from this topology.
    #[must_use]
    pub fn parameter_count(&self) -> usize {
        let mut width = self.input_size;
        let mut count = 0;
        for spec in &self.layers {
            if let LayerSpec::Dense(output) = *spec {
                count += width * output + output;
                width = output;
            }
        }
        count
    }

    /// Checks that the topology builds a valid network with the requested
    /// input and output widths.
    pub fn validate(&self, input_size: usize, output_size: usize) -> Result<(), ConfigError> {
        if self.layers.is_empty() {
            return Err(ConfigError::Topology(ShapeError::EmptyNetwork));
        }
        if matches!(self.layers[0], LayerSpec::Activation(_)) {
            return Err(ConfigError::Topology(ShapeError::LeadingActivation));
        }
        if self.input_size == 0 {
            return Err(ConfigError::Topology(ShapeError::ZeroWidth { index: 0 }));
        }
        if let Some(index) = self
            .layers
            .iter()
            .position(|spec| *spec == LayerSpec::Dense(0))
        {
            return Err(ConfigError::Topology(ShapeError::ZeroWidth { index }));
        }
        if self.input_size != input_size {
            return Err(ConfigError::Topology(ShapeError::LayerWidth {
                index: 0,
                expected: self.input_size,
                actual: input_size,
            }));
        }
        if self.output_size() != output_size {
            return Err(ConfigError::Topology(ShapeError::LayerWidth {
                index: self.layers.len(),
                expected: output_size,
                actual: self.output_size(),
            }));
        }
        Ok(())
    }

    /// Instantiates a network with freshly drawn parameters.
    pub fn build<R>(&self, init: &WeightInit, rng: &mut R) -> Result<Network, ConfigError>
    where
        R: Rng + ?Sized,
    {
        let mut width = self.input_size;
        let mut layers = Vec::with_capacity(self.layers.len());
        for spec in &self.layers {
            match *spec {
                LayerSpec::Dense(output) => {
                    layers.push(Dense::random(width, output, init, rng)?.into());
                    width = output;
                }
                LayerSpec::Activation(activation) => layers.push(activation.into()),
            }
        }
        Network::new(layers).map_err(ConfigError::Topology)
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use rand::SeedableRng as _;
    use rand_pcg::Pcg64;

    use super::*;

    fn identity_network() -> Network {
        let dense = Dense::new(3, 2, vec![1.0, 0.0, 0.0, 1.0, 0.0, 0.0], vec![0.0, 0.0]).unwrap();
        Network::new(vec![dense.into()]).unwrap()
    }

    mod construction {
        use super::*;

        #[test]
        fn rejects_empty() {
            assert_eq!(Network::new(vec![]).unwrap_err(), ShapeError::EmptyNetwork);
        }

        #[test]
        fn rejects_leading_activation() {
            let err = Network::new(vec![Activation::SIGMOID.into()]).unwrap_err();
            assert_eq!(err, ShapeError::LeadingActivation);
        }

        #[test]
        fn rejects_width_mismatch() {
            let a = Dense::new(3, 4, vec![0.0; 12], vec![0.0; 4]).unwrap();
            let b = Dense::new(5, 2, vec![0.0; 10], vec![0.0; 2]).unwrap();
            let err = Network::new(vec![a.into(), Activation::TANH.into(), b.into()]).unwrap_err();
            assert_eq!(
                err,
                ShapeError::LayerWidth {
                    index: 2,
                    expected: 5,
                    actual: 4
                }
            );
        }

        #[test]
        fn rejects_zero_width_dense() {
            let a = Dense::new(3, 0, vec![], vec![]).unwrap();
            let b = Dense::new(0, 2, vec![], vec![0.0; 2]).unwrap();
            let err = Network::new(vec![a.into(), b.into()]).unwrap_err();
            assert_eq!(err, ShapeError::ZeroWidth { index: 0 });

            let empty_input = Dense::new(0, 2, vec![], vec![0.0; 2]).unwrap();
            let err = Network::new(vec![empty_input.into()]).unwrap_err();
            assert_eq!(err, ShapeError::ZeroWidth { index: 0 });
        }

        #[test]
        fn reports_widths() {
            let mut rng = Pcg64::seed_from_u64(3);
            let network = Topology::default()
                .build(&WeightInit::default(), &mut rng)
                .unwrap();
            assert_eq!(network.input_size(), 3);
            assert_eq!(network.output_size(), 2);
            assert_eq!(network.layers().len(), 4);
            assert_eq!(network.parameter_count(), 3 * 5 + 5 + 5 * 4 + 4 + 4 * 2 + 2);
            assert_eq!(Topology::default().parameter_count(), network.parameter_count());
        }
    }

    mod forward {
        use super::*;

        #[test]
        fn identity_scenario() {
            let network = identity_network();
            assert_eq!(network.forward(&[2.0, -1.0, 0.0]), vec![2.0, -1.0]);
        }

        #[test]
        fn trailing_sigmoid_squashes_output() {
            let dense = Dense::new(1, 2, vec![0.0, 0.0], vec![0.0, 100.0]).unwrap();
            let network = Network::new(vec![dense.into(), Activation::SIGMOID.into()]).unwrap();
            let out = network.forward(&[1.0]);
            assert_eq!(out[0], 0.5);
            assert!(out[1] > 0.99 && out[1] <= 1.0);
        }

        #[test]
        #[should_panic(expected = "wrong width")]
        fn wrong_input_width_panics() {
            let _ = identity_network().forward(&[1.0, 2.0]);
        }
    }

    mod topology {
        use super::*;

        #[test]
        fn default_matches_bird_brain() {
            let topology = Topology::default();
            assert_eq!(topology.input_size(), 3);
            assert_eq!(topology.output_size(), 2);
            assert_eq!(
                topology.layers(),
                &[
                    LayerSpec::Dense(5),
                    LayerSpec::Dense(4),
                    LayerSpec::Dense(2),
                    LayerSpec::Activation(Activation::SIGMOID),
                ]
            );
            assert!(topology.validate(3, 2).is_ok());
        }

        #[test]
        fn from_widths_places_activations() {
            let hidden = Topology::from_widths(3, &[6, 2], Activation::TANH, true);
            assert_eq!(hidden.layers().len(), 4);
            let last_only = Topology::from_widths(3, &[6, 2], Activation::TANH, false);
            assert_eq!(
                last_only.layers(),
                &[
                    LayerSpec::Dense(6),
                    LayerSpec::Dense(2),
                    LayerSpec::Activation(Activation::TANH),
                ]
            );
        }

        #[test]
        fn validate_rejects_wrong_output_width() {
            let topology = Topology::new(3).dense(3);
            assert!(matches!(
                topology.validate(3, 2),
                Err(ConfigError::Topology(ShapeError::LayerWidth { .. }))
            ));
            assert!(matches!(
                Topology::new(3).validate(3, 2),
                Err(ConfigError::Topology(ShapeError::EmptyNetwork))
            ));
        }

        #[test]
        fn validate_rejects_zero_width_layers() {
            let topology = Topology::from_widths(3, &[0, 2], Activation::SIGMOID, false);
            assert_eq!(
                topology.validate(3, 2),
                Err(ConfigError::Topology(ShapeError::ZeroWidth { index: 0 }))
            );
            let topology = Topology::new(3).dense(4).activation(Activation::TANH).dense(0);
            assert!(matches!(
                topology.validate(3, 0),
                Err(ConfigError::Topology(ShapeError::ZeroWidth { index: 2 }))
            ));
            assert!(matches!(
                Topology::new(0).dense(2).validate(0, 2),
                Err(ConfigError::Topology(ShapeError::ZeroWidth { index: 0 }))
            ));
        }
    }

    fn arb_widths() -> impl Strategy<Value = Vec<usize>> {
        prop::collection::vec(1usize..8, 1..5)
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn forward_output_matches_declared_width(
            input_size in 1usize..6,
            widths in arb_widths(),
            seed in any::<u64>(),
            scale in 0.1f64..10.0,
        ) {
            let mut rng = Pcg64::seed_from_u64(seed);
            let topology = Topology::from_widths(input_size, &widths, Activation::SIGMOID, true);
            let network = topology.build(&WeightInit::default(), &mut rng).unwrap();
            let input: Vec<f64> = (0..input_size).map(|i| scale * i as f64).collect();
            let output = network.forward(&input);
            prop_assert_eq!(output.len(), network.output_size());
            prop_assert_eq!(output.len(), *widths.last().unwrap());
        }

        #[test]
        fn forward_is_pure(seed in any::<u64>(), x in -50.0f64..50.0, y in -50.0f64..50.0) {
            let mut rng = Pcg64::seed_from_u64(seed);
            let network = Topology::default().build(&WeightInit::default(), &mut rng).unwrap();
            let before = network.clone();
            let first = network.forward(&[x, y, 1.0]);
            let second = network.forward(&[x, y, 1.0]);
            prop_assert_eq!(
                first.iter().map(|v| v.to_bits()).collect::<Vec<_>>(),
                second.iter().map(|v| v.to_bits()).collect::<Vec<_>>()
            );
            prop_assert_eq!(network, before);
        }
    }
}
