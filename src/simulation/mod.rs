//! Route simulation and fleet scheduling.
//!
//! [`RouteSimulator`] drives one truck with a nearest-neighbor rule on the
//! simulated clock; [`FleetScheduler`] decides when each truck leaves and
//! collects the day into a [`DeliveryReport`].

mod fleet;
mod journal;
mod route;
mod trace;

pub use fleet::{DeliveryReport, FleetScheduler, TruckFailure};
pub use journal::{EventKind, EventLog, PackageEvent};
pub use route::{DeadlineViolation, RouteSimulator, Stop, TruckRun};
pub use trace::{MileageTrace, TracePoint};
