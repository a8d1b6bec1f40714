use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::ConfigError;

/// Element-wise nonlinearity applied between dense layers.
///
/// An activation is a named, pure `f64 → f64` function. Values are `Copy` and
/// carry no numeric state, so networks share them freely when cloned and the
/// mutation operator never touches them.
///
/// # Example
///
/// ```
/// use flapnet_engine::Activation;
///
/// assert_eq!(Activation::SIGMOID.apply(0.0), 0.5);
/// assert_eq!(Activation::RELU.apply(-3.0), 0.0);
/// assert_eq!(Activation::from_name("tanh").unwrap(), Activation::TANH);
/// ```
#[derive(Clone, Copy)]
pub struct Activation {
    name: &'static str,
    func: fn(f64) -> f64,
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

fn relu(x: f64) -> f64 {
    x.max(0.0)
}

fn identity(x: f64) -> f64 {
    x
}

impl Activation {
    /// Logistic sigmoid `1 / (1 + e^-x)`, range `(0, 1)`.
    pub const SIGMOID: Self = Self::new("sigmoid", sigmoid);
    /// Hyperbolic tangent, range `(-1, 1)`.
    pub const TANH: Self = Self::new("tanh", f64::tanh);
    /// Rectified linear unit `max(x, 0)`.
    pub const RELU: Self = Self::new("relu", relu);
    /// Pass-through.
    pub const IDENTITY: Self = Self::new("identity", identity);

    /// All built-in activations, in lookup order.
    pub const BUILTIN: [Self; 4] = [Self::SIGMOID, Self::TANH, Self::RELU, Self::IDENTITY];

    /// Wraps an arbitrary pure function under a display name.
    #[must_use]
    pub const fn new(name: &'static str, func: fn(f64) -> f64) -> Self {
        Self { name, func }
    }

    /// Looks up a built-in activation by name (case-insensitive).
    pub fn from_name(name: &str) -> Result<Self, ConfigError> {
        Self::BUILTIN
            .into_iter()
            .find(|a| a.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| ConfigError::UnknownActivation {
                name: name.to_owned(),
            })
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    #[must_use]
    pub fn apply(&self, x: f64) -> f64 {
        (self.func)(x)
    }

    /// Applies the function to every element in place.
    pub fn apply_in_place(&self, values: &mut [f64]) {
        for v in values {
            *v = (self.func)(*v);
        }
    }
}

impl fmt::Debug for Activation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Activation").field(&self.name).finish()
    }
}

impl fmt::Display for Activation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

// Two activations are the same when they are the same named built-in; function
// pointer identity is not reliable across codegen units.
impl PartialEq for Activation {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Activation {}

impl std::str::FromStr for Activation {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s)
    }
}

impl Serialize for Activation {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.name)
    }
}

impl<'de> Deserialize<'de> for Activation {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let name = String::deserialize(deserializer)?;
        Self::from_name(&name).map_err(serde::de::Error::custom)
    }
}
