//! Greedy constraint-satisfying truck assignment.
//!
//! # Algorithm
//!
//! Packages are first merged into linked units. Units are then placed one at
//! a time, in this order:
//!
//! 1. units pinned to a truck by `RequiresTruck`,
//! 2. units held at the hub by `MinDelay` or waiting for an address
//!    correction, earliest deadline first,
//! 3. units with a deadline, earliest deadline first,
//! 4. everything else.
//!
//! Ties are broken by the unit's lowest package id. Each unit goes to the
//! truck expected to leave first among those with room for the whole unit
//! that do not leave before the unit is available. A fixed truck is expected
//! at its departure time. A dependent truck is expected at
//! [`FleetConfig::earliest_departure`], raised to the latest hold already on
//! board. Held units prefer a truck expected to leave after their hold, and
//! only then a dependent truck that would wait for them. There is no
//! backtracking: a unit that fits nowhere is reported, never dropped.
//!
//! # Complexity
//!
//! O(u log u + u·t log t) for u units and t trucks, after the O(n α(n))
//! union-find.

use std::cmp::Ordering;

use log::{debug, info};

use super::units::{build_units, LinkedUnit};
use crate::config::FleetConfig;
use crate::error::AssignmentError;
use crate::models::{Constraint, PackageId, Time, TruckId};
use crate::store::PackageStore;

/// Packages loaded on one truck.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TruckLoad {
    truck: TruckId,
    packages: Vec<PackageId>,
}

impl TruckLoad {
    /// Truck id.
    pub fn truck(&self) -> TruckId {
        self.truck
    }

    /// Package ids, ascending.
    pub fn packages(&self) -> &[PackageId] {
        &self.packages
    }

    /// Number of packages.
    pub fn len(&self) -> usize {
        self.packages.len()
    }

    /// Returns `true` if nothing was loaded.
    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}

/// The result of assignment: one load per truck, in dispatch order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    loads: Vec<TruckLoad>,
}

impl Assignment {
    /// Loads in dispatch order, including empty ones.
    pub fn loads(&self) -> &[TruckLoad] {
        &self.loads
    }

    /// Packages on `truck`; empty if the truck is unknown.
    pub fn packages_for(&self, truck: TruckId) -> &[PackageId] {
        self.loads
            .iter()
            .find(|l| l.truck == truck)
            .map(|l| l.packages.as_slice())
            .unwrap_or(&[])
    }

    /// Truck carrying `package`.
    pub fn truck_of(&self, package: PackageId) -> Option<TruckId> {
        self.loads
            .iter()
            .find(|l| l.packages.contains(&package))
            .map(|l| l.truck)
    }

    /// Total packages assigned.
    pub fn len(&self) -> usize {
        self.loads.iter().map(TruckLoad::len).sum()
    }

    /// Returns `true` if no package was assigned.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Tier {
    Pinned,
    Held,
    Deadline,
    Open,
}

fn tier(unit: &LinkedUnit) -> Tier {
    if unit.required_truck().is_some() {
        Tier::Pinned
    } else if unit.min_delay().is_some() || unit.correction_at().is_some() {
        Tier::Held
    } else if unit.deadline().is_some() {
        Tier::Deadline
    } else {
        Tier::Open
    }
}

/// The time before which the unit cannot usefully leave the hub.
fn hold(unit: &LinkedUnit) -> Option<Time> {
    match (unit.min_delay(), unit.correction_at()) {
        (Some(a), Some(b)) => Some(a.max(b)),
        (a, b) => a.or(b),
    }
}

fn placement_order(a: &LinkedUnit, b: &LinkedUnit) -> Ordering {
    let by_deadline = match (a.deadline(), b.deadline()) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };
    tier(a)
        .cmp(&tier(b))
        .then(by_deadline)
        .then(a.anchor().cmp(&b.anchor()))
}

/// Partitions packages across the trucks of a [`FleetConfig`].
///
/// # Examples
///
/// ```
/// use u_dispatch::assignment::ConstraintAssigner;
/// use u_dispatch::config::FleetConfig;
/// use u_dispatch::models::{Address, Constraint, Deadline, Package, Time};
/// use u_dispatch::store::PackageStore;
///
/// let mut store = PackageStore::from_packages([
///     Package::new(1, Address::street("195 W Oakland Ave"), Deadline::At(Time::hm(10, 30)), 21),
///     Package::new(3, Address::street("233 Canyon Rd"), Deadline::EndOfDay, 2)
///         .with_constraint(Constraint::RequiresTruck(2)),
///     Package::new(6, Address::street("3060 Lester St"), Deadline::At(Time::hm(10, 30)), 88)
///         .with_constraint(Constraint::MinDelay(Time::hm(9, 5))),
/// ]).unwrap();
///
/// let config = FleetConfig::default();
/// let assignment = ConstraintAssigner::new(&config).assign(&mut store).unwrap();
///
/// assert_eq!(assignment.truck_of(1), Some(1));
/// assert_eq!(assignment.truck_of(3), Some(2));
/// assert_eq!(assignment.truck_of(6), Some(2));
/// assert_eq!(store.get(6).unwrap().truck(), Some(2));
/// ```
pub struct ConstraintAssigner<'a> {
    config: &'a FleetConfig,
}

impl<'a> ConstraintAssigner<'a> {
    /// Creates an assigner for the given fleet.
    pub fn new(config: &'a FleetConfig) -> Self {
        Self { config }
    }

    /// Computes an assignment without touching the store.
    pub fn plan(&self, store: &PackageStore) -> Result<Assignment, AssignmentError> {
        let mut units = build_units(store)?;
        units.sort_by(placement_order);

        let trucks = self.config.trucks();
        let mut loads: Vec<TruckLoad> = trucks
            .iter()
            .map(|t| TruckLoad {
                truck: t.id(),
                packages: Vec::new(),
            })
            .collect();
        let mut expected: Vec<Time> = trucks
            .iter()
            .map(|t| {
                self.config
                    .earliest_departure(t.id())
                    .unwrap_or(Time::MIDNIGHT)
            })
            .collect();

        for unit in &units {
            let slot = self.place(unit, &loads, &expected)?;
            debug!(
                "packages {:?} placed on truck {}",
                unit.members(),
                loads[slot].truck
            );
            loads[slot].packages.extend_from_slice(unit.members());
            if trucks[slot].departure().fixed_time().is_none() {
                if let Some(held) = hold(unit) {
                    expected[slot] = expected[slot].max(held);
                }
            }
        }
        for load in &mut loads {
            load.packages.sort_unstable();
        }

        let assignment = Assignment { loads };
        info!(
            "assigned {} packages in {} units to {} trucks",
            assignment.len(),
            units.len(),
            assignment.loads.len()
        );
        Ok(assignment)
    }

    /// Computes an assignment and writes each truck id onto its packages.
    pub fn assign(&self, store: &mut PackageStore) -> Result<Assignment, AssignmentError> {
        let assignment = self.plan(store)?;
        for load in &assignment.loads {
            for &id in &load.packages {
                store.get_mut(id)?.assign(load.truck);
            }
        }
        Ok(assignment)
    }

    fn place(
        &self,
        unit: &LinkedUnit,
        loads: &[TruckLoad],
        expected: &[Time],
    ) -> Result<usize, AssignmentError> {
        let trucks = self.config.trucks();
        let mut preference: Vec<usize> = (0..trucks.len()).collect();
        preference.sort_by(|&a, &b| expected[a].total_cmp(&expected[b]).then(a.cmp(&b)));
        let held = hold(unit);
        let ready = |i: usize| held.map_or(true, |t| expected[i] >= t);
        let fits = |i: usize| loads[i].packages.len() + unit.len() <= trucks[i].capacity();
        let available = |i: usize| {
            unit.min_delay()
                .map_or(true, |t| trucks[i].departure().can_leave_at_or_after(t))
        };
        let corrected = |i: usize| {
            unit.correction_at()
                .map_or(true, |t| trucks[i].departure().can_leave_at_or_after(t))
        };

        if let Some(required) = unit.required_truck() {
            let pinned = Some(Constraint::RequiresTruck(required));
            let i = trucks
                .iter()
                .position(|t| t.id() == required)
                .ok_or_else(|| {
                    unplaceable(unit, Some(required), pinned.clone(), "no such truck")
                })?;
            if !available(i) {
                return Err(unplaceable(
                    unit,
                    Some(required),
                    unit.min_delay().map(Constraint::MinDelay),
                    "truck leaves before the package reaches the hub",
                ));
            }
            if !fits(i) {
                return Err(unplaceable(unit, Some(required), pinned, "truck is full"));
            }
            return Ok(i);
        }

        let first = |eligible: &dyn Fn(usize) -> bool| {
            preference.iter().copied().find(|&i| eligible(i) && fits(i))
        };
        if let Some(i) = first(&|i: usize| available(i) && ready(i)) {
            return Ok(i);
        }
        if let Some(i) = first(&|i: usize| available(i) && corrected(i)) {
            return Ok(i);
        }
        if unit.correction_at().is_some() {
            if let Some(i) = first(&available) {
                debug!(
                    "packages {:?} leave before their address is corrected",
                    unit.members()
                );
                return Ok(i);
            }
        }
        Err(unplaceable(
            unit,
            None,
            unit.min_delay().map(Constraint::MinDelay),
            "no truck has room for it after it is available",
        ))
    }
}

fn unplaceable(
    unit: &LinkedUnit,
    truck: Option<TruckId>,
    constraint: Option<Constraint>,
    reason: &str,
) -> AssignmentError {
    if unit.len() > 1 {
        let on = truck.map(|t| format!(" on truck {t}")).unwrap_or_default();
        AssignmentError::UnsatisfiableLinkage {
            package: unit.anchor(),
            reason: format!("{} packages cannot ride together{on}: {reason}", unit.len()),
        }
    } else {
        AssignmentError::UnsatisfiableAssignment {
            package: unit.anchor(),
            truck,
            constraint,
            reason: reason.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{pkg, sample_config, sample_store, SPEED};
    use crate::models::{Address, Deadline, Package, Time, TruckSpec};

    #[test]
    fn test_sample_day() {
        let config = sample_config();
        let mut store = sample_store();
        let assignment = ConstraintAssigner::new(&config)
            .assign(&mut store)
            .expect("feasible");

        assert_eq!(assignment.packages_for(1), &[1, 2, 3]);
        assert_eq!(assignment.packages_for(2), &[4, 5, 7]);
        assert_eq!(assignment.packages_for(3), &[6]);
        assert_eq!(assignment.len(), store.len());
        for package in store.all() {
            assert_eq!(package.truck(), assignment.truck_of(package.id()));
        }
    }

    #[test]
    fn test_plan_leaves_store_untouched() {
        let config = sample_config();
        let store = sample_store();
        ConstraintAssigner::new(&config).plan(&store).expect("feasible");
        assert!(store.all().all(|p| p.truck().is_none()));
    }

    #[test]
    fn test_earliest_deadline_rides_first() {
        let config = FleetConfig::new(
            vec![
                TruckSpec::fixed(1, 1, Time::hm(8, 0)),
                TruckSpec::fixed(2, 1, Time::hm(9, 0)),
            ],
            SPEED,
        )
        .expect("valid");
        let store = PackageStore::from_packages([
            Package::new(1, Address::street("A St"), Deadline::At(Time::hm(10, 30)), 1),
            Package::new(2, Address::street("B St"), Deadline::At(Time::hm(9, 0)), 1),
        ])
        .expect("unique");
        let assignment = ConstraintAssigner::new(&config).plan(&store).expect("feasible");
        assert_eq!(assignment.truck_of(2), Some(1));
        assert_eq!(assignment.truck_of(1), Some(2));
    }

    #[test]
    fn test_delay_skips_early_truck() {
        let config = sample_config();
        let store = PackageStore::from_packages([
            pkg(1, "A St").with_constraint(Constraint::MinDelay(Time::hm(8, 30))),
        ])
        .expect("unique");
        let assignment = ConstraintAssigner::new(&config).plan(&store).expect("feasible");
        assert_eq!(assignment.truck_of(1), Some(2));
    }

    #[test]
    fn test_delay_with_no_eligible_truck() {
        let config = FleetConfig::new(vec![TruckSpec::fixed(1, 4, Time::hm(8, 0))], SPEED)
            .expect("valid");
        let store = PackageStore::from_packages([
            pkg(1, "A St").with_constraint(Constraint::MinDelay(Time::hm(9, 5))),
        ])
        .expect("unique");
        let err = ConstraintAssigner::new(&config).plan(&store).expect_err("infeasible");
        assert_eq!(
            err,
            AssignmentError::UnsatisfiableAssignment {
                package: 1,
                truck: None,
                constraint: Some(Constraint::MinDelay(Time::hm(9, 5))),
                reason: "no truck has room for it after it is available".to_string(),
            }
        );
    }

    #[test]
    fn test_pinned_truck_leaves_too_early() {
        let config = sample_config();
        let store = PackageStore::from_packages([pkg(1, "A St")
            .with_constraint(Constraint::RequiresTruck(1))
            .with_constraint(Constraint::MinDelay(Time::hm(9, 5)))])
        .expect("unique");
        let err = ConstraintAssigner::new(&config).plan(&store).expect_err("infeasible");
        assert!(matches!(
            err,
            AssignmentError::UnsatisfiableAssignment {
                package: 1,
                truck: Some(1),
                ..
            }
        ));
    }

    #[test]
    fn test_unknown_required_truck() {
        let config = sample_config();
        let store =
            PackageStore::from_packages([pkg(1, "A St").with_constraint(Constraint::RequiresTruck(9))])
                .expect("unique");
        let err = ConstraintAssigner::new(&config).plan(&store).expect_err("infeasible");
        assert!(matches!(
            err,
            AssignmentError::UnsatisfiableAssignment {
                truck: Some(9),
                ..
            }
        ));
    }

    #[test]
    fn test_capacity_exhausted() {
        let config = sample_config();
        let store = PackageStore::from_packages((1..=10).map(|id| pkg(id, "A St"))).expect("unique");
        let err = ConstraintAssigner::new(&config).plan(&store).expect_err("only 9 slots");
        assert!(matches!(
            err,
            AssignmentError::UnsatisfiableAssignment { package: 10, .. }
        ));
    }

    #[test]
    fn test_linked_group_too_large() {
        let config = sample_config();
        let store = PackageStore::from_packages([
            pkg(1, "A St").with_constraint(Constraint::LinkedWith(vec![2, 3, 4])),
            pkg(2, "A St"),
            pkg(3, "B St"),
            pkg(4, "C St"),
        ])
        .expect("unique");
        let err = ConstraintAssigner::new(&config).plan(&store).expect_err("group of 4");
        assert!(matches!(
            err,
            AssignmentError::UnsatisfiableLinkage { package: 1, .. }
        ));
    }

    #[test]
    fn test_linked_group_is_not_split() {
        let config = sample_config();
        let store = PackageStore::from_packages([
            pkg(1, "A St"),
            pkg(2, "A St"),
            pkg(3, "B St").with_constraint(Constraint::LinkedWith(vec![4])),
            pkg(4, "C St"),
        ])
        .expect("unique");
        let assignment = ConstraintAssigner::new(&config).plan(&store).expect("feasible");
        assert_eq!(assignment.packages_for(1), &[1, 2]);
        assert_eq!(assignment.truck_of(3), assignment.truck_of(4));
        // Truck 3 can leave as soon as truck 1 is back, before truck 2.
        assert_eq!(assignment.truck_of(3), Some(3));
    }

    #[test]
    fn test_deadline_prefers_dependent_truck_leaving_earlier() {
        let config = FleetConfig::new(
            vec![
                TruckSpec::fixed(1, 1, Time::hm(8, 0)),
                TruckSpec::fixed(2, 1, Time::hm(12, 0)),
                TruckSpec::after(3, 1, 1, 0.0),
            ],
            SPEED,
        )
        .expect("valid");
        let store = PackageStore::from_packages([
            Package::new(1, Address::street("A St"), Deadline::At(Time::hm(9, 0)), 1),
            Package::new(2, Address::street("B St"), Deadline::At(Time::hm(10, 0)), 1),
            pkg(3, "C St"),
        ])
        .expect("unique");
        let assignment = ConstraintAssigner::new(&config).plan(&store).expect("feasible");
        assert_eq!(assignment.truck_of(1), Some(1));
        assert_eq!(assignment.truck_of(2), Some(3));
        assert_eq!(assignment.truck_of(3), Some(2));
    }

    #[test]
    fn test_held_package_pushes_dependent_truck_back() {
        // Once truck 3 carries the corrected package it is expected at 10:20,
        // so the overflow rides truck 2 at 09:05.
        let config = sample_config();
        let store = PackageStore::from_packages([
            pkg(1, "A St").with_constraint(Constraint::AddressCorrection {
                at: Time::hm(10, 20),
                address: Address::street("D St"),
            }),
            Package::new(2, Address::street("B St"), Deadline::At(Time::hm(10, 0)), 1),
            pkg(3, "A St"),
            pkg(4, "A St"),
            pkg(5, "A St"),
        ])
        .expect("unique");
        let assignment = ConstraintAssigner::new(&config).plan(&store).expect("feasible");
        assert_eq!(assignment.truck_of(1), Some(3));
        assert_eq!(assignment.packages_for(1), &[2, 3, 4]);
        assert_eq!(assignment.truck_of(5), Some(2));
    }

    #[test]
    fn test_correction_falls_back_to_any_truck() {
        let config = FleetConfig::new(vec![TruckSpec::fixed(1, 4, Time::hm(8, 0))], SPEED)
            .expect("valid");
        let store = PackageStore::from_packages([pkg(1, "Wrong Rd").with_constraint(
            Constraint::AddressCorrection {
                at: Time::hm(10, 20),
                address: Address::street("D St"),
            },
        )])
        .expect("unique");
        let assignment = ConstraintAssigner::new(&config).plan(&store).expect("feasible");
        assert_eq!(assignment.truck_of(1), Some(1));
    }
}
