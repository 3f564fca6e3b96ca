//! Point-in-time queries over a simulated day.

mod status;

pub use status::{PackageSnapshot, StatusQuery};
