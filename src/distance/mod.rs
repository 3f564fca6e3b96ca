//! Distances between delivery addresses.
//!
//! Provides a dense distance matrix and the named-address graph routes are
//! simulated on.

mod graph;
mod matrix;

pub use graph::{normalize_address, DistanceGraph, HUB};
pub use matrix::DistanceMatrix;
