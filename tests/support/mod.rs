//! Shared builders for integration tests.
//!
//! Addresses lie on a straight road; the distance between two addresses is
//! the difference of their mile markers. At 60 mph one mile takes one minute.

#![allow(dead_code)]

use u_dispatch::config::FleetConfig;
use u_dispatch::distance::DistanceGraph;
use u_dispatch::models::{Address, Constraint, Deadline, Package, PackageId, Time, TruckSpec};
use u_dispatch::store::PackageStore;

pub const SPEED: f64 = 60.0;

/// Builds a graph with the hub at mile 0 and `stops[i]` at its marker.
pub fn road(stops: &[(&str, f64)]) -> DistanceGraph {
    let mut all = vec![("Hub", 0.0)];
    all.extend_from_slice(stops);
    let addresses = all.iter().map(|(name, _)| name.to_string()).collect();
    let rows = all
        .iter()
        .enumerate()
        .map(|(i, (_, a))| all[..=i].iter().map(|(_, b)| Some((a - b).abs())).collect())
        .collect();
    DistanceGraph::from_lower_triangle(addresses, rows).expect("road graph is valid")
}

pub fn standard_road() -> DistanceGraph {
    road(&[("A St", 1.0), ("B St", 2.0), ("C St", 3.0), ("D St", 5.0)])
}

pub fn pkg(id: PackageId, street: &str) -> Package {
    Package::new(id, Address::street(street), Deadline::EndOfDay, 1)
}

pub fn day_packages(correction_at: Time) -> Vec<Package> {
    vec![
        Package::new(1, Address::street("A St"), Deadline::At(Time::hm(9, 0)), 1),
        pkg(2, "B St").with_constraint(Constraint::LinkedWith(vec![3])),
        pkg(3, "C St"),
        pkg(4, "D St").with_constraint(Constraint::MinDelay(Time::hm(9, 5))),
        pkg(5, "A St").with_constraint(Constraint::RequiresTruck(2)),
        pkg(6, "Wrong Rd")
            .with_constraint(Constraint::RequiresTruck(3))
            .with_constraint(Constraint::AddressCorrection {
                at: correction_at,
                address: Address::street("D St"),
            }),
        pkg(7, "C St"),
    ]
}

pub fn store_of(packages: Vec<Package>) -> PackageStore {
    PackageStore::from_packages(packages).expect("ids are unique")
}

pub fn three_trucks(capacity: usize) -> FleetConfig {
    FleetConfig::new(
        vec![
            TruckSpec::fixed(1, capacity, Time::hm(8, 0)),
            TruckSpec::fixed(2, capacity, Time::hm(9, 5)),
            TruckSpec::after(3, capacity, 1, 0.0),
        ],
        SPEED,
    )
    .expect("config is valid")
}

pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}
