use rand::Rng;
use rand_distr::{Distribution as _, Normal, Uniform};
use serde::{Deserialize, Serialize};

use crate::{Activation, ConfigError, ShapeError};

/// Distribution used to fill freshly constructed dense layers.
///
/// Both weights and biases are drawn independently from the same
/// distribution. The default is `Uniform { half_width: 1.0 }`, i.e. every
/// parameter starts in `[-1, 1)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WeightInit {
    /// Uniform in `[-half_width, half_width)`.
    Uniform { half_width: f64 },
    /// Zero-mean normal with the given standard deviation.
    Normal { std_dev: f64 },
}

impl Default for WeightInit {
    fn default() -> Self {
        Self::Uniform { half_width: 1.0 }
    }
}

impl WeightInit {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let value = match *self {
            Self::Uniform { half_width } => half_width,
            Self::Normal { std_dev } => std_dev,
        };
        if value.is_finite() && value > 0.0 {
            Ok(())
        } else {
            Err(ConfigError::WeightInit { value })
        }
    }

    /// Draws `len` parameters.
    pub fn sample<R>(&self, rng: &mut R, len: usize) -> Result<Vec<f64>, ConfigError>
    where
        R: Rng + ?Sized,
    {
        self.validate()?;
        let values = match *self {
            Self::Uniform { half_width } => {
                let dist = Uniform::new(-half_width, half_width)
                    .map_err(|_| ConfigError::WeightInit { value: half_width })?;
                dist.sample_iter(&mut *rng).take(len).collect()
            }
            Self::Normal { std_dev } => {
                let dist = Normal::new(0.0, std_dev)
                    .map_err(|_| ConfigError::WeightInit { value: std_dev })?;
                dist.sample_iter(&mut *rng).take(len).collect()
            }
        };
        Ok(values)
    }
}

/// Affine transform `y = xW + b` with owned parameters.
///
/// Weights are stored flat and input-major: `weights[i * output_size + j]`
/// connects input `i` to output `j`.
#[derive(Debug, Clone, PartialEq)]
pub struct Dense {
    input_size: usize,
    output_size: usize,
    weights: Vec<f64>,
    bias: Vec<f64>,
}

impl Dense {
    /// Creates a dense layer from explicit parameters.
    ///
    /// The parameter lengths are checked here once; the forward pass relies on
    /// them without re-checking.
    pub fn new(
        input_size: usize,
        output_size: usize,
        weights: Vec<f64>,
        bias: Vec<f64>,
    ) -> Result<Self, ShapeError> {
        let expected = input_size * output_size;
        if weights.len() != expected {
            return Err(ShapeError::WeightLength {
                expected,
                actual: weights.len(),
            });
        }
        if bias.len() != output_size {
            return Err(ShapeError::BiasLength {
                expected: output_size,
                actual: bias.len(),
            });
        }
        Ok(Self {
            input_size,
            output_size,
            weights,
            bias,
        })
    }

    /// Creates a dense layer with parameters drawn from `init`.
    pub fn random<R>(
        input_size: usize,
        output_size: usize,
        init: &WeightInit,
        rng: &mut R,
    ) -> Result<Self, ConfigError>
    where
        R: Rng + ?Sized,
    {
        let weights = init.sample(rng, input_size * output_size)?;
        let bias = init.sample(rng, output_size)?;
        Ok(Self {
            input_size,
            output_size,
            weights,
            bias,
        })
    }

    #[must_use]
    pub fn input_size(&self) -> usize {
        self.input_size
    }

    #[must_use]
    pub fn output_size(&self) -> usize {
        self.output_size
    }

    #[must_use]
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    #[must_use]
    pub fn bias(&self) -> &[f64] {
        &self.bias
    }

    /// Mutable access to the parameters. Lengths cannot change through it.
    pub fn weights_mut(&mut self) -> &mut [f64] {
        &mut self.weights
    }

    pub fn bias_mut(&mut self) -> &mut [f64] {
        &mut self.bias
    }

    /// Weight connecting input `i` to output `j`.
    #[must_use]
    pub fn weight(&self, i: usize, j: usize) -> f64 {
        self.weights[i * self.output_size + j]
    }

    fn forward(&self, input: &[f64]) -> Vec<f64> {
        debug_assert_eq!(input.len(), self.input_size);
        let mut output = self.bias.clone();
        for (i, x) in input.iter().enumerate() {
            let row = &self.weights[i * self.output_size..(i + 1) * self.output_size];
            for (out, w) in output.iter_mut().zip(row) {
                *out += x * w;
            }
        }
        output
    }
}

/// One stage of a [`Network`](crate::Network).
#[derive(Debug, Clone, PartialEq, derive_more::IsVariant)]
pub enum Layer {
    Dense(Dense),
    Activation(Activation),
}

impl From<Dense> for Layer {
    fn from(dense: Dense) -> Self {
        Self::Dense(dense)
    }
}

impl From<Activation> for Layer {
    fn from(activation: Activation) -> Self {
        Self::Activation(activation)
    }
}

impl Layer {
    /// Output width given the width of the incoming vector.
    #[must_use]
    pub fn output_size(&self, input_size: usize) -> usize {
        match self {
            Layer::Dense(dense) => dense.output_size,
            Layer::Activation(_) => input_size,
        }
    }

    /// Width this layer requires of its input, if it constrains it.
    #[must_use]
    pub fn input_size(&self) -> Option<usize> {
        match self {
            Layer::Dense(dense) => Some(dense.input_size),
            Layer::Activation(_) => None,
        }
    }

    /// Transforms `input` into this layer's output.
    #[must_use]
    pub fn forward(&self, mut input: Vec<f64>) -> Vec<f64> {
        match self {
            Layer::Dense(dense) => dense.forward(&input),
            Layer::Activation(activation) => {
                activation.apply_in_place(&mut input);
                input
            }
        }
    }

    #[must_use]
    pub fn as_dense(&self) -> Option<&Dense> {
        match self {
            Layer::Dense(dense) => Some(dense),
            Layer::Activation(_) => None,
        }
    }

    pub fn as_dense_mut(&mut self) -> Option<&mut Dense> {
        match self {
            Layer::Dense(dense) => Some(dense),
            Layer::Activation(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_pcg::Pcg64;

    use super::*;

    mod dense {
        use super::*;

        #[test]
        fn rejects_wrong_weight_length() {
            let err = Dense::new(3, 2, vec![0.0; 5], vec![0.0; 2]).unwrap_err();
            assert_eq!(
                err,
                ShapeError::WeightLength {
                    expected: 6,
                    actual: 5
                }
            );
        }

        #[test]
        fn rejects_wrong_bias_length() {
            let err = Dense::new(3, 2, vec![0.0; 6], vec![0.0; 3]).unwrap_err();
            assert_eq!(
                err,
                ShapeError::BiasLength {
                    expected: 2,
                    actual: 3
                }
            );
        }

        #[test]
        fn affine_transform_is_input_major() {
            // 2 inputs -> 3 outputs
            let dense = Dense::new(
                2,
                3,
                vec![1.0, 2.0, 3.0, 10.0, 20.0, 30.0],
                vec![0.5, 0.0, -0.5],
            )
            .unwrap();
            assert_eq!(dense.weight(1, 2), 30.0);
            let out = Layer::Dense(dense).forward(vec![1.0, 0.1]);
            assert_eq!(out, vec![2.5, 4.0, 5.5]);
        }

        #[test]
        fn random_fills_every_parameter_in_range() {
            let mut rng = Pcg64::seed_from_u64(7);
            let init = WeightInit::Uniform { half_width: 1.0 };
            let dense = Dense::random(5, 4, &init, &mut rng).unwrap();
            assert_eq!(dense.weights().len(), 20);
            assert_eq!(dense.bias().len(), 4);
            assert!(
                dense
                    .weights()
                    .iter()
                    .chain(dense.bias())
                    .all(|v| (-1.0..1.0).contains(v))
            );
        }
    }

    mod weight_init {
        use super::*;

        #[test]
        fn rejects_non_positive_parameters() {
            assert!(WeightInit::Uniform { half_width: 0.0 }.validate().is_err());
            assert!(WeightInit::Normal { std_dev: -1.0 }.validate().is_err());
            assert!(WeightInit::Normal { std_dev: f64::NAN }.validate().is_err());
            assert!(WeightInit::default().validate().is_ok());
        }

        #[test]
        fn normal_samples_are_finite() {
            let mut rng = Pcg64::seed_from_u64(1);
            let values = WeightInit::Normal { std_dev: 0.5 }
                .sample(&mut rng, 64)
                .unwrap();
            assert_eq!(values.len(), 64);
            assert!(values.iter().all(|v| v.is_finite()));
        }
    }

    #[test]
    fn activation_layer_keeps_width() {
        let layer = Layer::Activation(Activation::SIGMOID);
        assert_eq!(layer.output_size(7), 7);
        assert_eq!(layer.input_size(), None);
        assert_eq!(layer.forward(vec![0.0, 0.0]), vec![0.5, 0.5]);
    }
}
