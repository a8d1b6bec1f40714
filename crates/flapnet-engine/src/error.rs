/// A layer, network, or observation does not have the shape it claims.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ShapeError {
    #[display("dense layer expects {expected} weights, got {actual}")]
    WeightLength { expected: usize, actual: usize },
    #[display("dense layer expects {expected} biases, got {actual}")]
    BiasLength { expected: usize, actual: usize },
    #[display("layer {index} expects input width {expected}, got {actual}")]
    LayerWidth {
        index: usize,
        expected: usize,
        actual: usize,
    },
    #[display("dense layer {index} has a zero-width input or output")]
    ZeroWidth { index: usize },
    #[display("network has no layers")]
    EmptyNetwork,
    #[display("network must start with a dense layer")]
    LeadingActivation,
    #[display("observation must have {expected} components, got {actual}")]
    ObservationLength { expected: usize, actual: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("cannot select the best agent of an empty population")]
pub struct EmptyPopulationError;

/// Rejected engine configuration.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum ConfigError {
    #[display("population size must be at least 1")]
    EmptyPopulation,
    #[display("mutation rate must be within [0, 1], got {rate}")]
    MutationRate { rate: f64 },
    #[display("weight initialization parameter must be finite and positive, got {value}")]
    WeightInit { value: f64 },
    #[display("unknown activation function '{name}'")]
    UnknownActivation { name: String },
    #[display("invalid topology: {_0}")]
    Topology(ShapeError),
}
