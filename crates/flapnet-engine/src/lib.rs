//! Inference and evolution engine for flapnet.
//!
//! This crate contains everything that decides and evolves, and nothing that
//! simulates or draws:
//!
//! - [`Activation`] - named element-wise nonlinearities
//! - [`Layer`] - either a [`Dense`] affine transform or an activation
//! - [`Network`] - ordered layers with a pure forward pass; [`Topology`]
//!   describes and builds one
//! - [`Agent`] - a network plus fitness, alive/dead state, and elite flag
//! - [`mutation`] - the point-mutation operator used during reproduction
//! - [`Population`] - cohort lifecycle, selection, and reproduction
//!
//! # Data Flow
//!
//! ```text
//! shell ── Observation ──▶ Agent::decide ──▶ Network::forward ──▶ Decision ──▶ shell
//!
//! cohort extinct ──▶ Population::regenerate
//!                      ├─ select_best (longest survivor, first on ties)
//!                      └─ reproduce   (size - 1 mutated children + 1 elite clone)
//! ```
//!
//! # Randomness
//!
//! Every operation that draws random numbers takes the generator as an
//! argument. Callers seed an [`EngineRng`] from [`resolve_seed`] and log the
//! seed so a run can be replayed.

use rand::Rng as _;
use rand_pcg::Pcg64;

pub use self::{activation::*, agent::*, error::*, layer::*, network::*, population::*};

mod activation;
mod agent;
mod error;
mod layer;
pub mod mutation;
mod network;
mod population;

/// Random generator used by the simulation and the CLI.
pub type EngineRng = Pcg64;

/// Returns `seed`, or a fresh one from the thread-local generator.
#[must_use]
pub fn resolve_seed(seed: Option<u64>) -> u64 {
    seed.unwrap_or_else(|| rand::rng().random())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_seed_is_kept() {
        assert_eq!(resolve_seed(Some(7)), 7);
        assert_eq!(resolve_seed(Some(0)), 0);
    }
}
