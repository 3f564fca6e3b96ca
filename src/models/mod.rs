//! Domain model types for a delivery day.
//!
//! Provides the core abstractions: packages with typed constraints and a
//! lifecycle, trucks with capacities and departure rules, and the simulated
//! clock shared by every component.

mod constraint;
mod package;
mod time;
mod truck;

pub use constraint::Constraint;
pub use package::{Address, Package, PackageId, PackageStatus};
pub use time::{Deadline, Time, MINUTES_PER_HOUR};
pub use truck::{DepartureRule, TruckId, TruckSpec};
