//! Fleet scheduling: departure timing and the day's report.

use std::collections::HashMap;

use log::{debug, info, warn};

use super::journal::{EventKind, EventLog, PackageEvent};
use super::route::{DeadlineViolation, RouteSimulator, TruckRun};
use crate::assignment::{Assignment, ConstraintAssigner};
use crate::config::FleetConfig;
use crate::distance::DistanceGraph;
use crate::error::{AssignmentError, RoutingError};
use crate::models::{DepartureRule, PackageId, Time, TruckId, TruckSpec};
use crate::store::PackageStore;

/// A truck whose run was aborted.
#[derive(Debug, Clone, PartialEq)]
pub struct TruckFailure {
    truck: TruckId,
    error: RoutingError,
}

impl TruckFailure {
    /// The failed truck.
    pub fn truck(&self) -> TruckId {
        self.truck
    }

    /// Why it failed.
    pub fn error(&self) -> &RoutingError {
        &self.error
    }
}

/// Outcome of a simulated delivery day.
#[derive(Debug, Clone)]
pub struct DeliveryReport {
    assignment: Assignment,
    runs: Vec<TruckRun>,
    failures: Vec<TruckFailure>,
    journal: EventLog,
    mileage_limit: Option<f64>,
}

impl DeliveryReport {
    /// Package-to-truck assignment the day was run with.
    pub fn assignment(&self) -> &Assignment {
        &self.assignment
    }

    /// Completed runs in dispatch order.
    pub fn runs(&self) -> &[TruckRun] {
        &self.runs
    }

    /// The run of `truck`, if it drove.
    pub fn run(&self, truck: TruckId) -> Option<&TruckRun> {
        self.runs.iter().find(|r| r.truck() == truck)
    }

    /// Aborted trucks.
    pub fn failures(&self) -> &[TruckFailure] {
        &self.failures
    }

    /// Late deliveries across all runs.
    pub fn violations(&self) -> impl Iterator<Item = &DeadlineViolation> + '_ {
        self.runs.iter().flat_map(|r| r.violations().iter())
    }

    /// Package events of the day.
    pub fn journal(&self) -> &EventLog {
        &self.journal
    }

    /// Sum of per-truck mileage, return legs included.
    pub fn total_mileage(&self) -> f64 {
        self.runs.iter().map(TruckRun::mileage).sum()
    }

    /// The configured fleet mileage target.
    pub fn mileage_limit(&self) -> Option<f64> {
        self.mileage_limit
    }

    /// Returns `true` unless a mileage target is set and exceeded.
    pub fn within_mileage_limit(&self) -> bool {
        self.mileage_limit
            .map_or(true, |limit| self.total_mileage() <= limit)
    }

    /// Returns `true` if every truck with a load completed its run.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Latest return to the hub.
    pub fn finished_at(&self) -> Option<Time> {
        self.runs
            .iter()
            .map(TruckRun::return_time)
            .reduce(Time::max)
    }
}

/// Runs the whole day: assignment, then each truck in dispatch order.
///
/// Trucks run one after another. A fixed-departure truck leaves at its time.
/// A dependent truck leaves once the truck it waits for is back (plus any
/// extra delay), and no earlier than the latest `MinDelay` or address
/// correction time of its load. Routing failures abort only the affected
/// truck, and trucks waiting on it.
///
/// # Examples
///
/// ```
/// use u_dispatch::config::FleetConfig;
/// use u_dispatch::distance::DistanceGraph;
/// use u_dispatch::models::{Address, Deadline, Package, Time, TruckSpec};
/// use u_dispatch::simulation::FleetScheduler;
/// use u_dispatch::store::PackageStore;
///
/// let graph = DistanceGraph::from_matrix(
///     vec!["Hub".into(), "1 Elm St".into()],
///     vec![vec![0.0, 9.0], vec![9.0, 0.0]],
/// ).unwrap();
/// let config = FleetConfig::new(vec![TruckSpec::fixed(1, 16, Time::hm(8, 0))], 18.0).unwrap();
/// let mut store = PackageStore::from_packages([
///     Package::new(1, Address::street("1 Elm St"), Deadline::At(Time::hm(10, 30)), 2),
/// ]).unwrap();
///
/// let report = FleetScheduler::new(&config, &graph).run(&mut store).unwrap();
/// assert_eq!(report.total_mileage(), 18.0);
/// assert_eq!(store.get(1).unwrap().delivery(), Some(Time::hm(8, 30)));
/// ```
pub struct FleetScheduler<'a> {
    config: &'a FleetConfig,
    graph: &'a DistanceGraph,
}

impl<'a> FleetScheduler<'a> {
    /// Creates a scheduler for `config` over `graph`.
    pub fn new(config: &'a FleetConfig, graph: &'a DistanceGraph) -> Self {
        Self { config, graph }
    }

    /// Assigns every package and simulates the day.
    ///
    /// Only assignment errors are returned; routing failures are collected in
    /// the report.
    pub fn run(&self, store: &mut PackageStore) -> Result<DeliveryReport, AssignmentError> {
        let assignment = ConstraintAssigner::new(self.config).assign(store)?;
        Ok(self.simulate(store, assignment))
    }

    /// Simulates the day for an existing assignment.
    pub fn simulate(&self, store: &mut PackageStore, assignment: Assignment) -> DeliveryReport {
        let simulator = RouteSimulator::from_config(self.graph, self.config);
        let mut returns: HashMap<TruckId, Time> = HashMap::new();
        let mut runs = Vec::new();
        let mut failures = Vec::new();
        let mut journal = EventLog::new();

        for spec in self.config.trucks() {
            let packages = assignment.packages_for(spec.id());
            let departure = match self.departure_time(spec, packages, store, &returns) {
                Ok(t) => t,
                Err(error) if packages.is_empty() => {
                    debug!("truck {} has no load: {error}", spec.id());
                    continue;
                }
                Err(error) => {
                    warn!("truck {} failed: {error}", spec.id());
                    failures.push(TruckFailure {
                        truck: spec.id(),
                        error,
                    });
                    continue;
                }
            };
            if packages.is_empty() {
                debug!("truck {} has no load and stays at the hub", spec.id());
                returns.insert(spec.id(), departure);
                continue;
            }

            match simulator.run(spec.id(), packages, store, departure) {
                Ok(run) => {
                    info!(
                        "truck {} left at {} with {} packages, returned at {} after {:.1} miles",
                        run.truck(),
                        run.departure(),
                        run.delivered(),
                        run.return_time(),
                        run.mileage()
                    );
                    for violation in run.violations() {
                        warn!(
                            "package {} delivered at {} after its {} deadline",
                            violation.package(),
                            violation.delivered(),
                            violation.deadline()
                        );
                    }
                    record_run(&mut journal, &run, store);
                    returns.insert(run.truck(), run.return_time());
                    runs.push(run);
                }
                Err(error) => {
                    warn!("truck {} failed: {error}", spec.id());
                    failures.push(TruckFailure {
                        truck: spec.id(),
                        error,
                    });
                }
            }
        }

        let report = DeliveryReport {
            assignment,
            runs,
            failures,
            journal,
            mileage_limit: self.config.mileage_limit(),
        };
        info!("fleet drove {:.1} miles", report.total_mileage());
        if let Some(limit) = report.mileage_limit.filter(|_| !report.within_mileage_limit()) {
            warn!(
                "fleet mileage {:.1} exceeds the {limit:.1} mile limit",
                report.total_mileage()
            );
        }
        report
    }

    fn departure_time(
        &self,
        spec: &TruckSpec,
        packages: &[PackageId],
        store: &PackageStore,
        returns: &HashMap<TruckId, Time>,
    ) -> Result<Time, RoutingError> {
        match spec.departure() {
            DepartureRule::Fixed(at) => Ok(*at),
            DepartureRule::AfterTruck { truck, extra_delay } => {
                let back = returns
                    .get(truck)
                    .ok_or(RoutingError::DependencyFailed {
                        truck: spec.id(),
                        dependency: *truck,
                    })?;
                let mut at = back.plus_minutes(*extra_delay);
                for &id in packages {
                    let package = store.get(id)?;
                    if let Some(delay) = package.min_delay() {
                        at = at.max(delay);
                    }
                    if let Some((corrected, _)) = package.correction() {
                        at = at.max(corrected);
                    }
                }
                Ok(at)
            }
        }
    }
}

fn record_run(journal: &mut EventLog, run: &TruckRun, store: &PackageStore) {
    let truck = run.truck();
    for (id, delivered) in run.deliveries() {
        journal.record(PackageEvent::new(
            id,
            run.departure(),
            EventKind::Departed { truck },
        ));
        if let Some((at, address)) = store.get(id).ok().and_then(|p| p.correction()) {
            journal.record(PackageEvent::new(
                id,
                at,
                EventKind::AddressCorrected {
                    address: address.clone(),
                },
            ));
        }
        journal.record(PackageEvent::new(id, delivered, EventKind::Delivered { truck }));
    }
    for violation in run.violations() {
        journal.record(PackageEvent::new(
            violation.package(),
            violation.delivered(),
            EventKind::DeadlineMissed {
                deadline: violation.deadline(),
            },
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{
        assert_close, assert_time, line_graph, pkg, sample_config, sample_store, SPEED,
    };
    use crate::models::{Address, Constraint, PackageStatus};

    #[test]
    fn test_sample_day() {
        let graph = line_graph();
        let config = sample_config();
        let mut store = sample_store();
        let report = FleetScheduler::new(&config, &graph)
            .run(&mut store)
            .expect("feasible");

        assert!(report.is_complete());
        let truck1 = report.run(1).expect("truck 1 ran");
        assert_time(truck1.departure(), Time::hm(8, 0));
        assert_time(truck1.return_time(), Time::hm(8, 6));
        assert_close(truck1.mileage(), 6.0);

        let truck2 = report.run(2).expect("truck 2 ran");
        assert_time(truck2.departure(), Time::hm(9, 5));
        assert_time(truck2.return_time(), Time::hm(9, 15));
        assert_close(truck2.mileage(), 10.0);

        let truck3 = report.run(3).expect("truck 3 ran");
        assert_time(truck3.departure(), Time::hm(10, 20));
        assert_time(truck3.return_time(), Time::hm(10, 30));

        assert_close(report.total_mileage(), 26.0);
        assert_eq!(report.violations().count(), 0);
        assert!(store.all().all(|p| p.status() == PackageStatus::Delivered));
        assert_eq!(report.finished_at(), Some(Time::hm(10, 30)));
    }

    #[test]
    fn test_dependent_leaves_at_return_when_correction_is_earlier() {
        let graph = line_graph();
        let config = sample_config();
        let mut store = PackageStore::from_packages([
            pkg(1, "C St"),
            pkg(6, "Wrong Rd")
                .with_constraint(Constraint::RequiresTruck(3))
                .with_constraint(Constraint::AddressCorrection {
                    at: Time::hm(8, 3),
                    address: Address::street("D St"),
                }),
        ])
        .expect("unique");
        let report = FleetScheduler::new(&config, &graph)
            .run(&mut store)
            .expect("feasible");
        assert_time(report.run(1).expect("ran").return_time(), Time::hm(8, 6));
        assert_time(report.run(3).expect("ran").departure(), Time::hm(8, 6));
    }

    #[test]
    fn test_empty_trucks_are_skipped() {
        let graph = line_graph();
        let config = sample_config();
        let mut store = PackageStore::from_packages([pkg(1, "A St")]).expect("unique");
        let report = FleetScheduler::new(&config, &graph)
            .run(&mut store)
            .expect("feasible");
        assert_eq!(report.runs().len(), 1);
        assert!(report.run(2).is_none());
        assert!(report.is_complete());
    }

    #[test]
    fn test_dependency_failure_propagates() {
        let graph = line_graph();
        let config = sample_config();
        let mut store = PackageStore::from_packages([
            pkg(1, "Nowhere Ln").with_constraint(Constraint::RequiresTruck(1)),
            pkg(2, "A St").with_constraint(Constraint::RequiresTruck(2)),
            pkg(3, "B St").with_constraint(Constraint::RequiresTruck(3)),
        ])
        .expect("unique");
        let report = FleetScheduler::new(&config, &graph)
            .run(&mut store)
            .expect("assignable");

        let failed: Vec<TruckId> = report.failures().iter().map(TruckFailure::truck).collect();
        assert_eq!(failed, vec![1, 3]);
        assert!(matches!(
            report.failures()[0].error(),
            RoutingError::AddressNotFound { package: 1, .. }
        ));
        assert_eq!(
            report.failures()[1].error(),
            &RoutingError::DependencyFailed {
                truck: 3,
                dependency: 1
            }
        );
        assert!(report.run(2).is_some());
        assert_eq!(store.get(3).expect("present").status(), PackageStatus::AtHub);
    }

    #[test]
    fn test_extra_delay_and_min_delay() {
        let graph = line_graph();
        let config = FleetConfig::new(
            vec![
                TruckSpec::fixed(1, 2, Time::hm(8, 0)),
                TruckSpec::after(2, 2, 1, 15.0),
            ],
            SPEED,
        )
        .expect("valid");

        let mut store = PackageStore::from_packages([
            pkg(1, "A St"),
            pkg(2, "B St").with_constraint(Constraint::RequiresTruck(2)),
        ])
        .expect("unique");
        let report = FleetScheduler::new(&config, &graph)
            .run(&mut store)
            .expect("feasible");
        // Truck 1 is back at 08:02.
        assert_time(report.run(2).expect("ran").departure(), Time::hm(8, 17));

        let mut store = PackageStore::from_packages([
            pkg(1, "A St"),
            pkg(2, "B St").with_constraint(Constraint::MinDelay(Time::hm(9, 5))),
        ])
        .expect("unique");
        let report = FleetScheduler::new(&config, &graph)
            .run(&mut store)
            .expect("feasible");
        assert_time(report.run(2).expect("ran").departure(), Time::hm(9, 5));
    }

    #[test]
    fn test_dependent_truck_meets_deadline_before_late_fixed_truck() {
        let graph = line_graph();
        let config = FleetConfig::new(
            vec![
                TruckSpec::fixed(1, 1, Time::hm(8, 0)),
                TruckSpec::fixed(2, 1, Time::hm(12, 0)),
                TruckSpec::after(3, 1, 1, 0.0),
            ],
            SPEED,
        )
        .expect("valid");
        let mut store = PackageStore::from_packages([
            pkg(1, "A St").with_constraint(Constraint::Deadline(Time::hm(9, 0))),
            pkg(2, "B St").with_constraint(Constraint::Deadline(Time::hm(10, 0))),
            pkg(3, "C St"),
        ])
        .expect("unique");
        let report = FleetScheduler::new(&config, &graph)
            .run(&mut store)
            .expect("feasible");

        assert_eq!(report.assignment().truck_of(2), Some(3));
        assert_time(report.run(3).expect("ran").departure(), Time::hm(8, 2));
        assert_time(
            store.get(2).expect("present").delivery().expect("delivered"),
            Time::hm(8, 4),
        );
        assert_eq!(report.violations().count(), 0);
    }

    #[test]
    fn test_mileage_limit() {
        let graph = line_graph();
        let config = sample_config().with_mileage_limit(20.0).expect("valid");
        let mut store = sample_store();
        let report = FleetScheduler::new(&config, &graph)
            .run(&mut store)
            .expect("feasible");
        assert_eq!(report.mileage_limit(), Some(20.0));
        assert!(!report.within_mileage_limit());
    }

    #[test]
    fn test_journal() {
        let graph = line_graph();
        let config = sample_config();
        let mut store = sample_store();
        let report = FleetScheduler::new(&config, &graph)
            .run(&mut store)
            .expect("feasible");

        let kinds: Vec<&EventKind> = report.journal().history(6).map(PackageEvent::kind).collect();
        assert_eq!(
            kinds,
            vec![
                &EventKind::Departed { truck: 3 },
                &EventKind::AddressCorrected {
                    address: Address::street("D St")
                },
                &EventKind::Delivered { truck: 3 },
            ]
        );
        let delivered = report
            .journal()
            .events()
            .iter()
            .filter(|e| matches!(e.kind(), EventKind::Delivered { .. }))
            .count();
        assert_eq!(delivered, store.len());
    }

    #[test]
    fn test_missed_deadline_is_reported() {
        let graph = line_graph();
        let config = sample_config();
        let mut store = PackageStore::from_packages([pkg(1, "D St")
            .with_constraint(Constraint::RequiresTruck(2))
            .with_constraint(Constraint::Deadline(Time::hm(9, 0)))])
        .expect("unique");
        let report = FleetScheduler::new(&config, &graph)
            .run(&mut store)
            .expect("feasible");

        let violations: Vec<&DeadlineViolation> = report.violations().collect();
        assert_eq!(violations.len(), 1);
        assert_time(violations[0].delivered(), Time::hm(9, 10));
        assert!(store.get(1).expect("present").deadline_missed());
        assert!(report
            .journal()
            .history(1)
            .any(|e| matches!(e.kind(), EventKind::DeadlineMissed { .. })));
    }
}
