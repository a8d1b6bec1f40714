//! Obstacle-course simulation that trains flapnet agents.
//!
//! The engine only turns observations into decisions and breeds the next
//! cohort. This crate supplies the world around it:
//!
//! - [`Bird`] - the body each agent steers, with gravity and a flap impulse
//! - [`Pipe`] and [`Course`] - scrolling obstacles with a gap to fly through
//! - [`World`] - the tick loop tying bodies, course, and [`Population`]
//!   together
//! - [`FitnessStats`] - summary statistics of a finished cohort
//!
//! Coordinates are screen pixels with `y` growing downward.
//!
//! [`Population`]: flapnet_engine::Population

pub use self::{bird::*, geometry::*, pipe::*, stats::*, world::*};

mod bird;
mod geometry;
mod pipe;
mod stats;
mod world;
