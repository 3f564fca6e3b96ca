//! Truck assignment.
//!
//! Packages are merged into linked units and placed greedily on trucks in
//! dispatch order, honoring pinned trucks, availability delays, address
//! corrections, deadlines and capacity.

mod assigner;
mod units;

pub use assigner::{Assignment, ConstraintAssigner, TruckLoad};
pub use units::{build_units, LinkedUnit};
