//! # u-dispatch
//!
//! Single-day delivery fleet simulation: packages with typed constraints are
//! assigned to trucks, each truck drives a nearest-neighbor route on a
//! simulated clock, and the finished day answers point-in-time status and
//! mileage questions.
//!
//! ## Modules
//!
//! - [`models`] — Domain types (Package, Constraint, TruckSpec, Time, Deadline)
//! - [`store`] — Chained hash table and the package store built on it
//! - [`distance`] — Distance matrix and the named-address graph
//! - [`config`] — Fleet configuration (trucks, departure rules, speed)
//! - [`assignment`] — Linked units and greedy constraint-satisfying assignment
//! - [`simulation`] — Route simulation, fleet scheduling, event log
//! - [`query`] — Status and mileage at any time of day
//! - [`error`] — Error types
//!
//! ## Example
//!
//! ```
//! use u_dispatch::config::FleetConfig;
//! use u_dispatch::distance::DistanceGraph;
//! use u_dispatch::models::{Address, Constraint, Deadline, Package, PackageStatus, Time};
//! use u_dispatch::query::StatusQuery;
//! use u_dispatch::simulation::FleetScheduler;
//! use u_dispatch::store::PackageStore;
//!
//! let graph = DistanceGraph::from_lower_triangle(
//!     vec!["Hub".into(), "1060 Dalton Ave S".into(), "1330 2100 S".into()],
//!     vec![
//!         vec![Some(0.0)],
//!         vec![Some(7.2), Some(0.0)],
//!         vec![Some(3.8), Some(7.1), Some(0.0)],
//!     ],
//! )?;
//! let mut store = PackageStore::from_packages([
//!     Package::new(1, Address::street("1060 Dalton Ave S"), Deadline::At(Time::hm(10, 30)), 7),
//!     Package::new(2, Address::street("1330 2100 S"), Deadline::EndOfDay, 44)
//!         .with_constraint(Constraint::MinDelay(Time::hm(9, 5))),
//! ])?;
//!
//! let config = FleetConfig::default();
//! let report = FleetScheduler::new(&config, &graph).run(&mut store)?;
//! assert!(report.is_complete());
//!
//! let query = StatusQuery::from_report(&store, &report);
//! assert_eq!(query.status_at(2, Time::hm(9, 0))?, PackageStatus::AtHub);
//! assert_eq!(query.status_at(1, Time::hm(17, 0))?, PackageStatus::Delivered);
//! # Ok::<(), u_dispatch::error::Error>(())
//! ```

pub mod assignment;
pub mod config;
pub mod distance;
pub mod error;
pub mod models;
pub mod query;
pub mod simulation;
pub mod store;

#[cfg(test)]
pub(crate) mod fixtures;

pub use error::Error;
