//! Reproduction-time perturbation of dense-layer parameters.
//!
//! The operator is deliberately small: with probability `rate` a child
//! receives exactly [`MUTATION_EVENTS`] point mutations, otherwise it is an
//! exact copy of its parent. Each event touches one weight or bias of one
//! dense layer, either overwriting it or nudging it by a sample from the open
//! interval `(-PERTURBATION_HALF_WIDTH, PERTURBATION_HALF_WIDTH)`.
//!
//! Magnitudes are never clamped, so repeated additive events let parameters
//! drift arbitrarily far over many generations.
//!
//! # Example
//!
//! ```
//! use flapnet_engine::{Topology, WeightInit, mutation};
//! use rand::SeedableRng as _;
//! use rand_pcg::Pcg64;
//!
//! let mut rng = Pcg64::seed_from_u64(42);
//! let parent = Topology::default().build(&WeightInit::default(), &mut rng).unwrap();
//!
//! // rate 1.0 always mutates
//! let child = mutation::mutate(&parent, 1.0, &mut rng);
//! assert_eq!(child.parameter_count(), parent.parameter_count());
//! ```

use rand::{Rng, distr::Open01};

use crate::{Dense, Network};

/// Point mutations applied when the mutation trial succeeds.
pub const MUTATION_EVENTS: usize = 3;

/// Half-width of the interval fresh values and deltas are drawn from.
pub const PERTURBATION_HALF_WIDTH: f64 = 0.5;

/// Parameter sequence targeted by a mutation event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum MutationTarget {
    Weight,
    Bias,
}

/// How the selected parameter was changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum MutationKind {
    /// Overwritten with a fresh sample.
    Replace,
    /// Shifted by a fresh sample.
    Add,
}

/// Record of one applied point mutation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MutationEvent {
    /// Index among the network's dense layers (activations not counted).
    pub layer: usize,
    pub target: MutationTarget,
    pub index: usize,
    pub kind: MutationKind,
    pub old: f64,
    pub new: f64,
}

/// Sample in the open interval `(-0.5, 0.5)`.
fn perturbation<R>(rng: &mut R) -> f64
where
    R: Rng + ?Sized,
{
    let u: f64 = rng.sample(Open01);
    u - PERTURBATION_HALF_WIDTH
}

/// Returns a deep copy of `parent`, mutated with probability `rate`.
///
/// # Panics
///
/// Panics if `rate` is outside `[0, 1]`.
#[must_use]
pub fn mutate<R>(parent: &Network, rate: f64, rng: &mut R) -> Network
where
    R: Rng + ?Sized,
{
    let mut child = parent.clone();
    mutate_in_place(&mut child, rate, rng);
    child
}

/// Runs the mutation trial on `network` and applies the events in place.
///
/// Returns the applied events, empty when the trial failed.
///
/// # Panics
///
/// Panics if `rate` is outside `[0, 1]`.
pub fn mutate_in_place<R>(network: &mut Network, rate: f64, rng: &mut R) -> Vec<MutationEvent>
where
    R: Rng + ?Sized,
{
    if !rng.random_bool(rate) {
        return vec![];
    }
    let mut layers = network.dense_layers_mut();
    let events: Vec<_> = (0..MUTATION_EVENTS)
        .filter_map(|_| apply_event(&mut layers, &mut *rng))
        .collect();
    tracing::trace!(?events, "mutated network");
    events
}

/// Applies one point mutation to a uniformly chosen dense layer.
///
/// Returns `None` only if there is no parameter to mutate.
pub fn apply_event<R>(layers: &mut [&mut Dense], rng: &mut R) -> Option<MutationEvent>
where
    R: Rng + ?Sized,
{
    if layers.is_empty() {
        return None;
    }
    let layer = rng.random_range(0..layers.len());
    let dense = &mut *layers[layer];
    let (target, values) = if rng.random_bool(0.5) {
        (MutationTarget::Weight, dense.weights_mut())
    } else {
        (MutationTarget::Bias, dense.bias_mut())
    };
    if values.is_empty() {
        return None;
    }
    let index = rng.random_range(0..values.len());
    let old = values[index];
    let kind = if rng.random_bool(0.5) {
        MutationKind::Replace
    } else {
        MutationKind::Add
    };
    let new = match kind {
        MutationKind::Replace => perturbation(rng),
        MutationKind::Add => old + perturbation(rng),
    };
    values[index] = new;
    Some(MutationEvent {
        layer,
        target,
        index,
        kind,
        old,
        new,
    })
}
