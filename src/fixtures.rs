//! Shared test data: a small delivery day on a straight road.
//!
//! The hub sits at mile 0; `A St`, `B St`, `C St` and `D St` sit at miles 1, 2,
//! 3 and 5. Trucks drive 60 mph, so one mile takes one minute.

use crate::config::FleetConfig;
use crate::distance::DistanceGraph;
use crate::models::{Address, Constraint, Deadline, Package, PackageId, Time, TruckSpec};
use crate::store::PackageStore;

pub(crate) const SPEED: f64 = 60.0;

const STOPS: [(&str, f64); 5] = [
    ("Hub", 0.0),
    ("A St", 1.0),
    ("B St", 2.0),
    ("C St", 3.0),
    ("D St", 5.0),
];

pub(crate) fn line_graph() -> DistanceGraph {
    let addresses = STOPS.iter().map(|(name, _)| name.to_string()).collect();
    let rows = STOPS
        .iter()
        .map(|(_, a)| STOPS.iter().map(|(_, b)| (a - b).abs()).collect())
        .collect();
    DistanceGraph::from_matrix(addresses, rows).expect("line graph is valid")
}

pub(crate) fn pkg(id: PackageId, street: &str) -> Package {
    Package::new(id, Address::street(street), Deadline::EndOfDay, 1)
}

/// Seven packages exercising every constraint kind.
///
/// 1 has a 09:00 deadline, 2 and 3 are linked, 4 is delayed to 09:05, 5 must
/// ride truck 2, 6 has a wrong address until 10:20, 7 is unconstrained.
pub(crate) fn sample_packages() -> Vec<Package> {
    vec![
        Package::new(1, Address::street("A St"), Deadline::At(Time::hm(9, 0)), 1),
        pkg(2, "B St").with_constraint(Constraint::LinkedWith(vec![3])),
        pkg(3, "C St"),
        pkg(4, "D St").with_constraint(Constraint::MinDelay(Time::hm(9, 5))),
        pkg(5, "A St").with_constraint(Constraint::RequiresTruck(2)),
        pkg(6, "Wrong Rd").with_constraint(Constraint::AddressCorrection {
            at: Time::hm(10, 20),
            address: Address::street("D St"),
        }),
        pkg(7, "C St"),
    ]
}

pub(crate) fn sample_store() -> PackageStore {
    PackageStore::from_packages(sample_packages()).expect("ids are unique")
}

/// Truck 1 at 08:00, truck 2 at 09:05, truck 3 after truck 1; three packages each.
pub(crate) fn sample_config() -> FleetConfig {
    FleetConfig::new(
        vec![
            TruckSpec::fixed(1, 3, Time::hm(8, 0)),
            TruckSpec::fixed(2, 3, Time::hm(9, 5)),
            TruckSpec::after(3, 3, 1, 0.0),
        ],
        SPEED,
    )
    .expect("config is valid")
}

pub(crate) fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

pub(crate) fn assert_time(actual: Time, expected: Time) {
    assert!(
        (actual.minutes() - expected.minutes()).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}
